use super::*;
use crate::encode::runner::RecordingRunner;

fn sequencer(dir: &Path, formats: Vec<VideoFormat>) -> (VideoSequencer, RecordingRunner) {
    let mut config = Config::default();
    config.settings.render_dir = dir.join("renders");
    config.settings.animation_dir = dir.join("animations");
    config.settings.video_format = formats;
    config.renderer.fps = 30;
    config.renderer.video_width = 640;
    config.renderer.video_height = 480;
    config.renderer.thumbnail_width = 64;
    config.renderer.thumbnail_height = 48;
    let runner = RecordingRunner::new();
    (VideoSequencer::new(&config, Box::new(runner.clone())), runner)
}

#[test]
fn run_encodes_frames_per_format() {
    let dir = tempfile::tempdir().unwrap();
    let (mut seq, runner) = sequencer(dir.path(), vec![VideoFormat::Mp4, VideoFormat::Webm]);
    seq.run("leftT_rightT", "leftT_rightT").unwrap();

    let commands = runner.commands();
    assert_eq!(commands.len(), 2);
    let mp4 = &commands[0];
    assert_eq!(mp4.program, "ffmpeg");
    assert_eq!(mp4.value_of("-framerate"), Some("30"));
    assert_eq!(mp4.value_of("-s"), Some("640x480"));
    assert!(mp4.value_of("-i").unwrap().ends_with("leftT_rightT_%04d.png"));
    assert_eq!(mp4.value_of("-c:v"), Some("libx264"));
    assert_eq!(mp4.args.last().map(String::as_str), Some("-y"));
    assert_eq!(mp4.output, dir.path().join("animations/leftT_rightT.mp4"));
    assert_eq!(commands[1].value_of("-pix_fmt"), Some("yuva420p"));
    assert!(dir.path().join("animations").is_dir());
}

#[test]
fn reverse_and_thumbnail_read_the_encoded_video() {
    let dir = tempfile::tempdir().unwrap();
    let (mut seq, runner) = sequencer(dir.path(), vec![VideoFormat::Gif]);
    seq.reverse("leftT_rightT", "rightT_leftT").unwrap();
    seq.thumbnail("leftT_rightT", "leftT_rightT").unwrap();

    let commands = runner.commands();
    let input = dir.path().join("animations/leftT_rightT.gif");
    assert_eq!(commands[0].value_of("-vf"), Some("reverse"));
    assert_eq!(commands[0].value_of("-i"), Some(input.to_str().unwrap()));
    assert_eq!(commands[0].output, dir.path().join("animations/rightT_leftT.gif"));
    assert_eq!(commands[1].value_of("-vf"), Some("scale=64:48"));
    assert_eq!(
        commands[1].output,
        dir.path().join("animations/leftT_rightT_thumbnail.gif")
    );
}

#[test]
fn failing_format_does_not_stop_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.settings.animation_dir = dir.path().to_path_buf();
    config.settings.video_format = vec![VideoFormat::Avi, VideoFormat::Mp4];
    let runner = RecordingRunner::new().failing_on(".avi");
    let mut seq = VideoSequencer::new(&config, Box::new(runner.clone()));

    let err = seq.run("a", "a").unwrap_err();
    assert!(matches!(err, crate::foundation::error::PcboothError::Encode(_)));
    assert_eq!(runner.outputs().len(), 2);
}

#[test]
fn clear_frames_only_removes_numbered_files() {
    let dir = tempfile::tempdir().unwrap();
    let (seq, _) = sequencer(dir.path(), vec![VideoFormat::Mp4]);
    let renders = dir.path().join("renders");
    std::fs::create_dir_all(&renders).unwrap();
    for name in ["a_0001.png", "a_0002.png", "topT_transparent.png", "a_001.png"] {
        std::fs::write(renders.join(name), b"").unwrap();
    }

    assert_eq!(seq.clear_frames().unwrap(), 2);
    assert!(!renders.join("a_0001.png").exists());
    assert!(renders.join("topT_transparent.png").exists());
    assert!(renders.join("a_001.png").exists());
}

#[test]
fn keep_frames_leaves_render_dir_alone() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.settings.render_dir = dir.path().to_path_buf();
    config.settings.keep_frames = true;
    std::fs::write(dir.path().join("a_0001.png"), b"").unwrap();
    let seq = VideoSequencer::new(&config, Box::new(RecordingRunner::new()));
    assert_eq!(seq.clear_frames().unwrap(), 0);
    assert!(dir.path().join("a_0001.png").exists());
}

#[test]
fn missing_render_dir_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let (seq, _) = sequencer(dir.path(), vec![VideoFormat::Mp4]);
    assert_eq!(seq.clear_frames().unwrap(), 0);
}

#[test]
fn cleanup_logs_instead_of_failing() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    let not_a_dir = dir.path().join("renders");
    std::fs::write(&not_a_dir, b"").unwrap();
    config.settings.render_dir = not_a_dir.clone();
    let seq = VideoSequencer::new(&config, Box::new(RecordingRunner::new()));
    assert!(seq.clear_frames().is_err());
    assert_eq!(seq.cleanup_frames(), 0);
    assert!(not_a_dir.is_file());
}
