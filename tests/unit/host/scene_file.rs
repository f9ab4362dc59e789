use super::*;

const SCENE: &str = r#"{
    "collections": ["Board", "Components"],
    "objects": [
        {"name": "PCB", "bounds": {"min": [-5, -3, 0], "max": [5, 3, 1]}, "collections": ["Board"]},
        {"name": "R1", "parent": "PCB", "collections": ["Components"], "properties": {"PCB_Side": "T"}},
        {"name": "lib_part", "linked": true},
        {"name": "anchor", "kind": "empty"}
    ]
}"#;

#[test]
fn missing_fields_take_defaults() {
    let scene = SceneDef::from_json_str(SCENE).unwrap();
    assert_eq!(scene.objects.len(), 4);
    let r1 = &scene.objects[1];
    assert_eq!(r1.kind, ObjectKind::Mesh);
    assert_eq!(r1.scale, Vec3::ONE);
    assert_eq!(r1.parent.as_deref(), Some("PCB"));
    assert_eq!(scene.objects[3].kind, ObjectKind::Empty);
}

#[test]
fn hierarchy_lists_children_indented() {
    let scene = SceneDef::from_json_str(SCENE).unwrap();
    let lines = hierarchy_lines(&scene);
    assert_eq!(lines[0], "Objects:");
    assert_eq!(lines[1], "  PCB [Mesh]");
    assert_eq!(lines[2], "    R1 [Mesh]");
    assert!(lines.contains(&"  lib_part [Mesh] (linked)".to_string()));
    assert!(lines.contains(&"  Board: PCB".to_string()));
    assert!(lines.contains(&"  Components: R1".to_string()));
}

#[test]
fn save_then_load_preserves_objects() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("scene.json");
    let scene = SceneDef::from_json_str(SCENE).unwrap();
    scene.save(&path).unwrap();
    let back = SceneDef::load(&path).unwrap();
    assert_eq!(back, scene);
}

#[test]
fn invalid_json_is_reported() {
    let err = SceneDef::from_json_str("{ nope").unwrap_err();
    assert!(err.to_string().contains("failed to parse scene JSON"));
}
