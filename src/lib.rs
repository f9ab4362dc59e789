#![forbid(unsafe_code)]

pub mod config;
pub mod dispatch;
pub mod encode;
pub mod foundation;
pub mod host;
pub mod jobs;
pub mod overrides;
pub mod render;
pub mod studio;

pub use config::{Config, JobEntry};
pub use dispatch::{RunReport, build_jobs, run};
pub use encode::{EncodeRunner, FfmpegRunner, RecordingRunner, VideoSequencer};
pub use foundation::core::{FrameSpan, Vec3};
pub use foundation::error::{PcboothError, PcboothResult};
pub use host::{Host, MemoryHost, ObjectId};
pub use jobs::{Job, JobSummary};
pub use render::Renderer;
pub use studio::Studio;
pub use studio::presets::{CameraPreset, Position};
