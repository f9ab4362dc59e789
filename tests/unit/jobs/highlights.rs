use super::*;
use crate::jobs::tests::{Rig, component, pcb_scene};
use crate::foundation::core::{Aabb, Vec3};
use crate::host::scene_file::ObjectDef;

fn scene() -> crate::host::scene_file::SceneDef {
    let mut scene = pcb_scene(&[
        ("J1:USB", "T"),
        ("SW1:BTN", "B"),
        ("R1:10k", "T"),
        ("U1:MCU", "T"),
    ]);
    let mut screw = component("Screw", "T");
    screw.collections.clear();
    screw.linked = true;
    scene.objects.push(screw);
    scene.objects.push(ObjectDef::mesh(
        SOLDER_OBJECT,
        Aabb::new(Vec3::new(-1.0, -1.0, 1.6), Vec3::new(1.0, 1.0, 1.7)),
    ));
    scene
}

fn names(rig: &Rig, ids: &[ObjectId]) -> Vec<String> {
    ids.iter().map(|id| rig.host.name(*id).to_string()).collect()
}

#[test]
fn lists_split_highlighted_from_hidden() {
    let rig = Rig::new(scene(), |_| {});
    let lists = component_lists(&rig.host, &rig.studio);
    assert_eq!(names(&rig, &lists.highlighted), vec!["J1:USB", "SW1:BTN"]);
    assert_eq!(names(&rig, &lists.hidden), vec!["R1:10k", "Screw", "Solder"]);
}

#[test]
fn renders_each_component_on_its_side() {
    let mut rig = Rig::new(scene(), |c| c.cameras.iso = true);
    let summary = rig.execute(&mut HighlightsJob).unwrap();
    assert_eq!(summary.outputs, 4);
    assert_eq!(
        rig.renders(),
        vec![
            "highlights/J1.png",
            "highlights/J1_iso.png",
            "highlights/SW1.png",
            "highlights/SW1_iso.png",
        ]
    );
}

#[test]
fn scene_state_is_restored_afterwards() {
    let mut rig = Rig::new(scene(), |_| {});
    let resistor = rig.host.find_object("R1:10k").unwrap();
    let connector = rig.host.find_object("J1:USB").unwrap();
    let slots = rig.host.material_slots(connector);

    rig.execute(&mut HighlightsJob).unwrap();
    assert!(!rig.host.hide_render(resistor));
    assert_eq!(rig.host.material_slots(connector), slots);
}
