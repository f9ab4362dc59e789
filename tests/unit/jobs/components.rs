use super::*;
use crate::host::scene_file::ObjectDef;
use crate::jobs::tests::{Rig, component, pcb_scene};
use crate::foundation::core::{Aabb, Vec3};
use crate::host::scene_file::SceneDef;

#[test]
fn designator_is_name_before_colon() {
    assert_eq!(designator("J1:USB_C"), "J1");
    assert_eq!(designator("R12"), "R12");
    assert_eq!(designator(":odd"), "");
}

#[test]
fn prefixes_match_designator_start() {
    assert!(matches_prefix("SW3", &["J", "SW"]));
    assert!(matches_prefix("J10", &["J"]));
    assert!(!matches_prefix("U1", &["J", "SW"]));
    assert!(!matches_prefix("U1", &[] as &[&str]));
}

#[test]
fn pcb_components_are_selected_by_prefix() {
    let rig = Rig::new(pcb_scene(&[("J1:USB", "T"), ("U1:MCU", "T"), ("SW1:BTN", "B")]), |_| {});
    let picked: Vec<_> = select(&rig.host, &rig.studio, &["J", "SW"])
        .into_iter()
        .map(|id| output_stem(&rig.host, &rig.studio, id))
        .collect();
    assert_eq!(picked, vec!["J1", "SW1"]);
}

#[test]
fn other_models_select_everything_by_full_name() {
    let mut scene = SceneDef::default();
    for name in ["lid:top", "base"] {
        scene.objects.push(ObjectDef::mesh(
            name,
            Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0)),
        ));
    }
    let rig = Rig::new(scene, |_| {});
    assert!(!rig.studio.is_pcb());
    let mut names: Vec<_> = select(&rig.host, &rig.studio, &["X"])
        .into_iter()
        .map(|id| output_stem(&rig.host, &rig.studio, id))
        .collect();
    names.sort();
    assert_eq!(names, vec!["base", "lid:top"]);
}

#[test]
fn linked_props_exclude_studio_backgrounds() {
    let mut scene = pcb_scene(&[]);
    let mut screw = component("Screw", "T");
    screw.collections.clear();
    screw.linked = true;
    scene.objects.push(screw);
    let rig = Rig::new(scene, |_| {});

    let props: Vec<_> = linked_props(&rig.host)
        .into_iter()
        .map(|id| rig.host.name(id).to_string())
        .collect();
    assert_eq!(props, vec!["Screw"]);
    for bg in rig.studio.catalog().backgrounds() {
        assert!(is_background(&rig.host, bg.object));
    }
}
