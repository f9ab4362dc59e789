use super::*;
use crate::config::JobEntry;
use crate::encode::RecordingRunner;
use crate::foundation::core::{Aabb, Vec3};
use crate::host::MemoryHost;
use crate::host::scene_file::{ObjectDef, SceneDef};

fn board() -> MemoryHost {
    let mut scene = SceneDef::default();
    let mut board = ObjectDef::mesh(
        "PCB",
        Aabb::new(Vec3::new(-30.0, -15.0, 0.0), Vec3::new(30.0, 15.0, 1.6)),
    );
    board.collections = vec!["Board".into()];
    scene.objects.push(board);
    MemoryHost::from_scene(scene).unwrap()
}

fn config(dir: &std::path::Path, outputs: Vec<JobEntry>) -> Config {
    let mut config = Config::default();
    config.settings.render_dir = dir.join("renders");
    config.settings.animation_dir = dir.join("animations");
    config.renderer.fps = 2;
    config.renderer.image_width = 16;
    config.renderer.image_height = 16;
    config.renderer.thumbnail_width = 8;
    config.renderer.thumbnail_height = 8;
    config.outputs = outputs;
    config
}

#[test]
fn empty_outputs_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = build_jobs(&config(dir.path(), Vec::new())).err().unwrap();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("OUTPUTS"));
}

#[test]
fn bad_parameters_stop_the_run_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = board();
    let cfg = config(
        dir.path(),
        vec![
            JobEntry::new("STATIC", serde_json::Value::Null),
            JobEntry::new("MASKS", serde_json::json!({"FULL": 1})),
        ],
    );
    let err = run(&mut host, &cfg, "PCB", Box::new(RecordingRunner::new())).unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(host.render_count(), 0);
}

#[test]
fn jobs_run_in_configured_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = board();
    let runner = RecordingRunner::new();
    let cfg = config(
        dir.path(),
        vec![
            JobEntry::new("STATIC", serde_json::Value::Null),
            JobEntry::new("FLIPTRANSITION", serde_json::Value::Null),
        ],
    );
    let report = run(&mut host, &cfg, "PCB", Box::new(runner.clone())).unwrap();
    let names: Vec<_> = report.completed.iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["STATIC", "FLIPTRANSITION"]);
    assert_eq!(report.outputs(), 2);
    assert!(report.is_success());
    assert!(dir.path().join("renders/topT_transparent.png").is_file());
    assert_eq!(
        runner.outputs(),
        vec![
            dir.path().join("animations/topT_topB.mp4"),
            dir.path().join("animations/topB_topT.mp4"),
        ]
    );
}

#[test]
fn encode_failures_are_counted_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = board();
    let cfg = config(dir.path(), vec![JobEntry::new("ANIMATION", serde_json::Value::Null)]);
    let runner = RecordingRunner::new().failing_on("animation");
    let report = run(&mut host, &cfg, "PCB", Box::new(runner)).unwrap();
    assert_eq!(report.outputs(), 0);
    assert_eq!(report.failures(), 1);
    assert!(!report.is_success());
}
