use super::*;
use crate::jobs::tests::{Rig, pcb_scene};

fn scene() -> crate::host::scene_file::SceneDef {
    pcb_scene(&[("U1:MCU", "T"), ("J1:USB", "T"), ("IC1:EEPROM", "B"), ("R1:10k", "T")])
}

#[test]
fn defaults_render_covered_masks_only() {
    let job = MasksJob::from_params(&serde_json::Value::Null).unwrap();
    assert_eq!(job.states(), vec![MaskState::Covered]);
    assert_eq!(job.frames(), Some(&[][..]));
    assert!(job.parameters().contains(&("HIGHLIGHTED", "[A, J, PS, T, U, IC, POT]".to_string())));
}

#[test]
fn wrong_parameter_types_are_reported_together() {
    let err = MasksJob::from_params(&serde_json::json!({"FULL": "yes", "HIGHLIGHTED": 3})).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("MASKS"), "{msg}");
    assert!(msg.contains("FULL"), "{msg}");
    assert!(msg.contains("HIGHLIGHTED"), "{msg}");
    assert!(err.is_fatal());
}

#[test]
fn full_masks_follow_component_side() {
    let mut rig = Rig::new(scene(), |c| c.positions.bottom = true);
    let mut job = MasksJob::from_params(&serde_json::json!({"FULL": true, "COVERED": false})).unwrap();
    let summary = rig.execute(&mut job).unwrap();
    assert_eq!(summary.outputs, 3);
    assert_eq!(
        rig.renders(),
        vec![
            "masks/full/topB/IC1.png",
            "masks/full/topT/J1.png",
            "masks/full/topT/U1.png",
        ]
    );
    for id in rig.host.objects() {
        assert!(!rig.host.is_holdout(id), "{} kept holdout", rig.host.name(id));
    }
}

#[test]
fn disabled_subtypes_render_nothing() {
    let mut rig = Rig::new(scene(), |_| {});
    let mut job = MasksJob::from_params(&serde_json::json!({"FULL": false, "COVERED": false})).unwrap();
    let summary = rig.execute(&mut job).unwrap();
    assert_eq!(summary.outputs, 0);
    assert_eq!(rig.host.render_count(), 0);
}

#[test]
fn frame_suffix_becomes_a_directory() {
    let rig = Rig::new(scene(), |_| {});
    let u1 = rig.host.find_object("U1:MCU").unwrap();
    let name = output_name(&rig.host, &rig.studio, u1, MaskState::Covered, "iso", Position::Top, "_0012");
    assert_eq!(name, "masks/covered/isoT/0012/U1");
    let name = output_name(&rig.host, &rig.studio, u1, MaskState::Full, "top", Position::Bottom, "");
    assert_eq!(name, "masks/full/topB/U1");
}

#[test]
fn pcb_components_are_masked_from_their_side_only() {
    let rig = Rig::new(scene(), |_| {});
    let top = rig.host.find_object("U1:MCU").unwrap();
    let bottom = rig.host.find_object("IC1:EEPROM").unwrap();
    assert!(visible_from(&rig.studio, top, Position::Top));
    assert!(!visible_from(&rig.studio, top, Position::Bottom));
    assert!(visible_from(&rig.studio, bottom, Position::Bottom));
    assert!(!visible_from(&rig.studio, bottom, Position::Rear));
}
