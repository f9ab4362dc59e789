use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{Config, VideoFormat};
use crate::encode::ffmpeg::{FFMPEG, preset_args};
use crate::encode::runner::{EncodeCommand, EncodeRunner};
use crate::foundation::error::PcboothResult;
use crate::foundation::fs::{ensure_parent_dir, remove_file_if_exists};

static FRAME_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+_\d{4}\..+$").expect("static regex is valid"));

/// Turns numbered frame files into videos, one per configured video format.
pub struct VideoSequencer {
    runner: Box<dyn EncodeRunner>,
    render_dir: PathBuf,
    animation_dir: PathBuf,
    formats: Vec<VideoFormat>,
    fps: u32,
    size: (u32, u32),
    thumbnail_size: (u32, u32),
    keep_frames: bool,
}

impl std::fmt::Debug for VideoSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoSequencer")
            .field("render_dir", &self.render_dir)
            .field("animation_dir", &self.animation_dir)
            .field("formats", &self.formats)
            .finish_non_exhaustive()
    }
}

impl VideoSequencer {
    pub fn new(config: &Config, runner: Box<dyn EncodeRunner>) -> Self {
        let r = &config.renderer;
        Self {
            runner,
            render_dir: config.settings.render_dir.clone(),
            animation_dir: config.settings.animation_dir.clone(),
            formats: config.settings.video_format.clone(),
            fps: r.fps,
            size: (r.video_width, r.video_height),
            thumbnail_size: (r.thumbnail_width, r.thumbnail_height),
            keep_frames: config.settings.keep_frames,
        }
    }

    pub fn animation_dir(&self) -> &Path {
        &self.animation_dir
    }

    /// Encode `<render_dir>/<input>_%04d.png` into `<animation_dir>/<output>.<ext>`.
    pub fn run(&mut self, input: &str, output: &str) -> PcboothResult<()> {
        let frames = self.render_dir.join(format!("{input}_%04d.png"));
        let (w, h) = self.size;
        let fps = self.fps.to_string();
        self.for_each_format(output, "", |_| {
            vec![
                "-framerate".into(),
                fps.clone(),
                "-i".into(),
                frames.to_string_lossy().into_owned(),
                "-s".into(),
                format!("{w}x{h}"),
            ]
        })
    }

    /// Re-encode an existing video backwards.
    pub fn reverse(&mut self, input: &str, output: &str) -> PcboothResult<()> {
        let dir = self.animation_dir.clone();
        self.for_each_format(output, "", |format| {
            vec![
                "-i".into(),
                video_path(&dir, input, "", format).to_string_lossy().into_owned(),
                "-vf".into(),
                "reverse".into(),
            ]
        })
    }

    /// Scale an existing video down into `<output>_thumbnail.<ext>`.
    pub fn thumbnail(&mut self, input: &str, output: &str) -> PcboothResult<()> {
        let dir = self.animation_dir.clone();
        let (w, h) = self.thumbnail_size;
        self.for_each_format(output, "_thumbnail", |format| {
            vec![
                "-i".into(),
                video_path(&dir, input, "", format).to_string_lossy().into_owned(),
                "-vf".into(),
                format!("scale={w}:{h}"),
            ]
        })
    }

    fn for_each_format(
        &mut self,
        output: &str,
        suffix: &str,
        input_args: impl Fn(VideoFormat) -> Vec<String>,
    ) -> PcboothResult<()> {
        let mut first_error = None;
        for format in self.formats.clone() {
            let target = video_path(&self.animation_dir, output, suffix, format);
            let command = EncodeCommand::new(FFMPEG, &target)
                .args(["-loglevel", "error"])
                .args(input_args(format))
                .args(preset_args(format).iter().copied())
                .arg(target.to_string_lossy())
                .arg("-y");
            let result = ensure_parent_dir(&target).and_then(|()| self.runner.run(&command));
            match result {
                Ok(()) => tracing::info!("sequenced (ffmpeg): {}", target.display()),
                Err(e) => {
                    tracing::error!("sequencing {} failed: {e}", target.display());
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Delete `<name>_<4 digits>.<ext>` files from the render directory.
    pub fn clear_frames(&self) -> PcboothResult<usize> {
        if self.keep_frames {
            return Ok(0);
        }
        tracing::debug!("removing frames");
        let entries = match std::fs::read_dir(&self.render_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let mut removed = 0;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            if entry.file_type()?.is_file() && FRAME_FILE_RE.is_match(&name.to_string_lossy()) {
                remove_file_if_exists(&entry.path())?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// [`clear_frames`](Self::clear_frames) after a job; a failure is only logged.
    pub fn cleanup_frames(&self) -> usize {
        match self.clear_frames() {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!("failed to remove frames from '{}': {e}", self.render_dir.display());
                0
            }
        }
    }
}

fn video_path(dir: &Path, name: &str, suffix: &str, format: VideoFormat) -> PathBuf {
    dir.join(format!("{name}{suffix}.{}", format.extension()))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sequencer.rs"]
mod tests;
