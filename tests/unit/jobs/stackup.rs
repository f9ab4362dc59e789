use super::*;
use crate::foundation::core::Aabb;
use crate::host::scene_file::{ObjectDef, SceneDef};
use crate::jobs::tests::{Rig, pcb_scene};

fn layer(name: &str, z: f32) -> ObjectDef {
    let mut def = ObjectDef::mesh(
        name,
        Aabb::new(Vec3::new(-40.0, -20.0, z), Vec3::new(40.0, 20.0, z + 0.1)),
    );
    def.parent = Some("PCB".into());
    def
}

fn stackup_scene() -> SceneDef {
    let mut scene = pcb_scene(&[("U1:MCU", "T")]);
    for (name, z) in [("PCB_layer3", 1.5), ("PCB_layer1", 0.0), ("PCB_layer2", 0.8)] {
        scene.objects.push(layer(name, z));
    }
    scene
}

#[test]
fn layer_index_reads_trailing_digits() {
    assert_eq!(layer_index("PCB_layer12"), 12);
    assert_eq!(layer_index("PCB_layer"), 0);
    assert_eq!(layer_index("2PCB_layer"), 0);
}

#[test]
fn layers_are_found_bottom_first() {
    let rig = Rig::new(stackup_scene(), |_| {});
    let layers = find_layers(&rig.host, rig.studio.rendered_obj());
    let names: Vec<_> = layers.iter().map(|id| rig.host.name(*id)).collect();
    assert_eq!(names, vec!["PCB_layer1", "PCB_layer2", "PCB_layer3"]);
}

#[test]
fn move_layers_spreads_all_but_the_first() {
    let mut rig = Rig::new(stackup_scene(), |_| {});
    let layers = find_layers(&rig.host, rig.studio.rendered_obj());
    let size = rig.host.dimensions(layers[0]).unwrap();
    move_layers(&mut rig.host, &layers).unwrap();

    let offset = Vec3::new(0.0, size.y / 20.0, size.x / 7.5);
    assert_eq!(rig.host.delta_location(layers[0]), Vec3::ZERO);
    assert!(rig.host.delta_location(layers[1]).abs_diff_eq(offset, 1e-5));
    assert!(rig.host.delta_location(layers[2]).abs_diff_eq(offset, 1e-5));
}

#[test]
fn layer_spacing_ignores_layer_rotation() {
    let mut scene = pcb_scene(&[]);
    let mut first = ObjectDef::mesh(
        "PCB_layer1",
        Aabb::new(Vec3::new(-20.0, -10.0, 0.0), Vec3::new(20.0, 10.0, 0.1)),
    );
    first.parent = Some("PCB".into());
    first.rotation = Vec3::new(0.0, 0.0, 90.0);
    scene.objects.push(first);
    scene.objects.push(layer("PCB_layer2", 0.8));
    scene.objects.push(layer("PCB_layer3", 1.5));
    let mut rig = Rig::new(scene, |_| {});
    let layers = find_layers(&rig.host, rig.studio.rendered_obj());
    move_layers(&mut rig.host, &layers).unwrap();

    let expected = Vec3::new(0.0, 20.0 / 20.0, 40.0 / 7.5);
    assert!(
        rig.host.delta_location(layers[1]).abs_diff_eq(expected, 1e-4),
        "{:?}",
        rig.host.delta_location(layers[1])
    );
}

#[test]
fn renders_one_image_per_layer() {
    let mut rig = Rig::new(stackup_scene(), |c| c.cameras.iso = true);
    let summary = rig.execute(&mut StackupJob).unwrap();
    assert_eq!(summary.outputs, 3);
    assert_eq!(
        rig.renders(),
        vec![
            "layer1.png",
            "layer1_thumbnail.png",
            "layer2.png",
            "layer2_thumbnail.png",
            "layer3.png",
            "layer3_thumbnail.png",
        ]
    );

    let layers = find_layers(&rig.host, rig.studio.rendered_obj());
    for id in layers {
        assert_eq!(rig.host.delta_location(id), Vec3::ZERO);
        assert!(!rig.host.hide_render(id));
    }
}

#[test]
fn boards_without_layers_are_skipped() {
    let mut rig = Rig::new(pcb_scene(&[("U1:MCU", "T")]), |_| {});
    let summary = rig.execute(&mut StackupJob).unwrap();
    assert_eq!(summary.outputs, 0);
    assert_eq!(rig.host.render_count(), 0);
}
