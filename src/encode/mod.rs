//! Video assembly through an external encoder.

pub mod ffmpeg;
pub mod runner;
pub mod sequencer;

pub use ffmpeg::{FfmpegRunner, is_ffmpeg_on_path};
pub use runner::{EncodeCommand, EncodeRunner, RecordingRunner};
pub use sequencer::VideoSequencer;
