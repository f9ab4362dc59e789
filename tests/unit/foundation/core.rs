use super::*;

#[test]
fn aabb_from_points_and_union() {
    let a = Aabb::from_points([Vec3::new(1.0, 2.0, 3.0), Vec3::new(-1.0, 0.0, 5.0)]).unwrap();
    assert_eq!(a.min, Vec3::new(-1.0, 0.0, 3.0));
    assert_eq!(a.max, Vec3::new(1.0, 2.0, 5.0));
    assert_eq!(a.center(), Vec3::new(0.0, 1.0, 4.0));

    let b = Aabb::new(Vec3::splat(10.0), Vec3::splat(9.0));
    assert_eq!(b.min, Vec3::splat(9.0));
    let u = a.union(b);
    assert_eq!(u.max, Vec3::splat(10.0));
    assert!(Aabb::from_points(std::iter::empty()).is_none());
}

#[test]
fn aabb_transform_by_rotation_swaps_extents() {
    let a = Aabb::new(Vec3::new(-2.0, -1.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
    let r = Mat4::from_quat(euler_to_quat(deg(0.0, 0.0, 90.0)));
    let t = a.transformed(r);
    assert!((t.size().x - 2.0).abs() < 1e-4);
    assert!((t.size().y - 4.0).abs() < 1e-4);
}

#[test]
fn euler_round_trip_matches_xyz_order() {
    let e = deg(30.0, -20.0, 45.0);
    let back = quat_to_euler(euler_to_quat(e));
    assert!((back - e).length() < 1e-4);

    // X is applied before Z: +Y rotated 90 deg about X lands on +Z, then stays on +Z.
    let q = euler_to_quat(deg(90.0, 0.0, 90.0));
    let v = q * Vec3::Y;
    assert!((v - Vec3::Z).length() < 1e-4);
}

#[test]
fn frame_span_validates_and_iterates() {
    assert!(FrameSpan::new(5, 1).is_err());
    let s = FrameSpan::new(1, 3).unwrap();
    assert_eq!(s.len_frames(), 3);
    assert_eq!(s.frames().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(s.contains(3));
    assert!(!s.contains(4));
}

#[test]
fn hex_colors_parse() {
    assert_eq!(hex_to_rgb("FFFFFF").unwrap(), [1.0, 1.0, 1.0]);
    assert_eq!(hex_to_rgb("#000000").unwrap(), [0.0, 0.0, 0.0]);
    assert!(hex_to_rgb("FFF").is_err());
    assert!(hex_to_rgb("GG0000").is_err());
}
