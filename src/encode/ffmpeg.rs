use std::process::{Command, Stdio};

use crate::config::VideoFormat;
use crate::encode::runner::{EncodeCommand, EncodeRunner};
use crate::foundation::error::{PcboothError, PcboothResult};

pub const FFMPEG: &str = "ffmpeg";

/// Codec arguments appended for each container.
pub fn preset_args(format: VideoFormat) -> &'static [&'static str] {
    match format {
        VideoFormat::Webm => &["-c:v", "libvpx-vp9", "-pix_fmt", "yuva420p", "-b:v", "5M"],
        VideoFormat::Mp4 => &[
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-b:v",
            "5M",
            "-movflags",
            "+faststart",
        ],
        VideoFormat::Mpeg => &["-c:v", "mpeg2video", "-pix_fmt", "yuv420p", "-b:v", "5M"],
        VideoFormat::Avi => &["-c:v", "libx264", "-pix_fmt", "yuv420p", "-b:v", "5M"],
        VideoFormat::Gif => &[],
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new(FFMPEG)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Runs commands with the system binary and waits for them.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegRunner;

impl EncodeRunner for FfmpegRunner {
    fn run(&mut self, command: &EncodeCommand) -> PcboothResult<()> {
        tracing::debug!("executing: {command}");
        // The system binary avoids native FFmpeg dev header/lib requirements.
        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                PcboothError::encode(format!(
                    "failed to spawn {} (is it installed and on PATH?): {e}",
                    command.program
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PcboothError::encode(format!(
                "{} exited with status {}: {}",
                command.program,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
