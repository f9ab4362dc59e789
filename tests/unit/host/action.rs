use super::*;

#[test]
fn insert_keeps_keys_sorted_and_replaces_same_frame() {
    let mut a = Action::named("cam");
    a.insert(KeyChannel::Location, 10, Vec3::X);
    a.insert(KeyChannel::Location, 1, Vec3::ZERO);
    a.insert(KeyChannel::Location, 10, Vec3::Y);
    let keys = &a.channels[&KeyChannel::Location];
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].frame, 1);
    assert_eq!(keys[1].value, Vec3::Y);
}

#[test]
fn sample_interpolates_linearly_and_clamps() {
    let mut a = Action::default();
    a.insert(KeyChannel::SensorWidth, 1, Vec3::new(36.0, 0.0, 0.0));
    a.insert(KeyChannel::SensorWidth, 11, Vec3::new(46.0, 0.0, 0.0));
    assert_eq!(a.sample(KeyChannel::SensorWidth, 6).unwrap().x, 41.0);
    assert_eq!(a.sample(KeyChannel::SensorWidth, -5).unwrap().x, 36.0);
    assert_eq!(a.sample(KeyChannel::SensorWidth, 50).unwrap().x, 46.0);
    assert!(a.sample(KeyChannel::Location, 1).is_none());
}

#[test]
fn normalize_sorts_keys_and_keeps_last_duplicate() {
    let mut a = Action::default();
    a.channels.insert(
        KeyChannel::Location,
        vec![
            Keyframe { frame: 10, value: Vec3::new(10.0, 0.0, 0.0) },
            Keyframe { frame: 5, value: Vec3::new(1.0, 0.0, 0.0) },
            Keyframe { frame: 0, value: Vec3::ZERO },
            Keyframe { frame: 5, value: Vec3::new(2.0, 0.0, 0.0) },
        ],
    );
    a.normalize();
    let frames: Vec<i32> = a.channels[&KeyChannel::Location].iter().map(|k| k.frame).collect();
    assert_eq!(frames, vec![0, 5, 10]);
    assert_eq!(a.sample(KeyChannel::Location, 5).unwrap().x, 2.0);
    assert!((a.sample(KeyChannel::Location, 7).unwrap().x - 5.2).abs() < 1e-5);
}

#[test]
fn frame_range_spans_all_channels() {
    let mut a = Action::default();
    assert!(a.frame_range().is_none());
    assert!(a.is_empty());
    a.insert(KeyChannel::Location, 5, Vec3::ZERO);
    a.insert(KeyChannel::Rotation, 2, Vec3::ZERO);
    a.insert(KeyChannel::Aperture, 40, Vec3::ZERO);
    assert_eq!(a.frame_range(), Some(FrameSpan { start: 2, end: 40 }));
}

#[test]
fn capability_names_are_lowercase() {
    assert_eq!(Capability::Holdout.to_string(), "holdout");
    assert_eq!(Capability::ShaderSwitch.to_string(), "shader switch");
}
