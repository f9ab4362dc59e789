use super::*;
use crate::foundation::core::deg;

fn unit_box() -> Aabb {
    Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
}

fn host_with_box() -> (MemoryHost, ObjectId) {
    let mut scene = SceneDef::default();
    let mut def = ObjectDef::mesh("box", unit_box());
    def.location = Vec3::new(5.0, 0.0, 0.0);
    scene.objects.push(def);
    let host = MemoryHost::from_scene(scene).unwrap();
    let id = host.find_object("box").unwrap();
    (host, id)
}

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-3
}

#[test]
fn parenting_keeps_world_transform() {
    let (mut host, b) = host_with_box();
    let anchor = host.add_empty("_parent", None).unwrap();
    host.set_location(anchor, Vec3::new(1.0, 2.0, 3.0)).unwrap();
    host.set_parent(b, Some(anchor)).unwrap();

    let before = host.world_bounds(b).unwrap();
    assert!(close(before.center(), Vec3::new(5.0, 0.0, 0.0)));

    host.set_rotation(anchor, deg(0.0, 0.0, 90.0)).unwrap();
    let after = host.world_bounds(b).unwrap();
    // (5,0,0) relative offset (4,-2,-3) rotated about Z by 90 deg around (1,2,3).
    assert!(close(after.center(), Vec3::new(3.0, 6.0, 0.0)));
    assert_eq!(host.children(anchor), vec![b]);
}

#[test]
fn parent_cycles_are_rejected() {
    let (mut host, b) = host_with_box();
    let a = host.add_empty("a", None).unwrap();
    host.set_parent(b, Some(a)).unwrap();
    assert!(host.set_parent(a, Some(b)).is_err());
}

#[test]
fn apply_transforms_bakes_rotation_and_keeps_children() {
    let mut scene = SceneDef::default();
    let mut board = ObjectDef::mesh(
        "board",
        Aabb::new(Vec3::new(-1.0, -3.0, 0.0), Vec3::new(1.0, 3.0, 0.2)),
    );
    board.rotation = Vec3::new(0.0, 0.0, -90.0);
    let mut part = ObjectDef::mesh("part", unit_box());
    part.parent = Some("board".into());
    part.location = Vec3::new(0.0, 2.0, 0.0);
    scene.objects.extend([board, part]);
    let mut host = MemoryHost::from_scene(scene).unwrap();
    let board = host.find_object("board").unwrap();
    let part = host.find_object("part").unwrap();

    let part_before = host.world_bounds(part).unwrap().center();
    host.apply_transforms(board).unwrap();

    assert_eq!(host.rotation(board), Vec3::ZERO);
    let size = host.world_bounds(board).unwrap().size();
    assert!(size.x > size.y);
    assert!(close(host.world_bounds(part).unwrap().center(), part_before));
}

#[test]
fn origin_to_geometry_moves_origin_only() {
    let mut scene = SceneDef::default();
    scene.objects.push(ObjectDef::mesh(
        "off",
        Aabb::new(Vec3::new(2.0, 2.0, 0.0), Vec3::new(4.0, 4.0, 2.0)),
    ));
    let mut host = MemoryHost::from_scene(scene).unwrap();
    let id = host.find_object("off").unwrap();
    let before = host.world_bounds(id).unwrap();
    host.set_origin_to_geometry(id).unwrap();
    assert!(close(host.location(id), Vec3::new(3.0, 3.0, 1.0)));
    assert!(close(host.world_bounds(id).unwrap().center(), before.center()));
}

#[test]
fn framing_fits_bounds_inside_view() {
    let (mut host, b) = host_with_box();
    let cam = host.add_camera("cam", Some("Cameras")).unwrap();
    host.frame_objects(cam, &[b]).unwrap();
    let loc = host.matrix_world(cam).w_axis.truncate();
    assert!((loc.x - 5.0).abs() < 1e-3);
    assert!(loc.z > 1.0);
    assert!(host.has_collection("Cameras"));
}

#[test]
fn keyframes_interpolate_on_frame_change() {
    let (mut host, b) = host_with_box();
    host.set_location(b, Vec3::ZERO).unwrap();
    host.insert_keyframe(b, KeyChannel::Location, 1).unwrap();
    host.set_location(b, Vec3::new(10.0, 0.0, 0.0)).unwrap();
    host.insert_keyframe(b, KeyChannel::Location, 11).unwrap();

    host.set_frame(6).unwrap();
    assert!(close(host.location(b), Vec3::new(5.0, 0.0, 0.0)));
    assert_eq!(host.current_frame(), 6);

    host.clear_animation();
    assert!(host.action(b).is_none());
    assert!(host.insert_keyframe(b, KeyChannel::SensorWidth, 1).is_err());
}

#[test]
fn saved_scene_keeps_hex_colors() {
    let mut scene = SceneDef::default();
    scene.materials.insert("highlight".into(), "004C3C".into());
    let mut obj = ObjectDef::mesh("b", unit_box());
    obj.color = Some("FF8000".into());
    scene.objects.push(obj);
    let host = MemoryHost::from_scene(scene).unwrap();

    let saved = host.to_scene();
    assert_eq!(saved.materials["highlight"], "004C3C");
    assert_eq!(saved.objects[0].color.as_deref(), Some("FF8000"));
    assert!(MemoryHost::from_scene(saved).is_ok());
}

#[test]
fn scene_actions_are_sorted_on_load() {
    let mut scene = SceneDef::default();
    scene.objects.push(ObjectDef::mesh("b", unit_box()));
    let mut action = Action::named("slide");
    action.channels.insert(
        KeyChannel::Location,
        vec![
            crate::host::Keyframe { frame: 10, value: Vec3::new(10.0, 0.0, 0.0) },
            crate::host::Keyframe { frame: 0, value: Vec3::ZERO },
        ],
    );
    scene.actions.insert("b".into(), action);
    let mut host = MemoryHost::from_scene(scene).unwrap();
    let b = host.find_object("b").unwrap();

    host.set_frame(5).unwrap();
    assert!(close(host.location(b), Vec3::new(5.0, 0.0, 0.0)));
}

#[test]
fn render_writes_png_and_counts() {
    let (mut host, b) = host_with_box();
    let cam = host.add_camera("cam", None).unwrap();
    host.frame_objects(cam, &[b]).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("r").join("still.png");
    host.render_still(cam, &out).unwrap();
    assert_eq!(host.render_count(), 1);

    let img = image::open(&out).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (64, 64));
    assert_eq!(img.get_pixel(32, 32)[3], 255);
    assert_eq!(img.get_pixel(0, 0)[3], 0);

    host.set_holdout(b, true).unwrap();
    host.render_still(cam, &out).unwrap();
    let img = image::open(&out).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(32, 32)[3], 0);
}

#[test]
fn unknown_parent_and_duplicates_fail_to_load() {
    let mut scene = SceneDef::default();
    let mut child = ObjectDef::mesh("c", unit_box());
    child.parent = Some("ghost".into());
    scene.objects.push(child);
    assert!(MemoryHost::from_scene(scene).is_err());

    let mut scene = SceneDef::default();
    scene.objects.push(ObjectDef::mesh("d", unit_box()));
    scene.objects.push(ObjectDef::mesh("d", unit_box()));
    assert!(MemoryHost::from_scene(scene).is_err());
}

#[test]
fn backgrounds_import_from_library() {
    let mut scene = SceneDef::default();
    scene.backgrounds.push(BackgroundDef {
        name: "paper_black".into(),
        color: "101010".into(),
        size: 100.0,
    });
    let mut host = MemoryHost::from_scene(scene).unwrap();
    assert_eq!(host.background_library(), vec!["paper_black".to_string()]);
    let bg = host.import_background("paper_black", "Backgrounds").unwrap();
    assert_eq!(host.name(bg), "paper_black");
    assert!(host.import_background("nope", "Backgrounds").is_err());
}

#[test]
fn capabilities_can_be_removed() {
    let host = MemoryHost::new().without_capability(Capability::Holdout);
    assert!(!host.supports(Capability::Holdout));
    assert!(host.supports(Capability::Compositing));
}
