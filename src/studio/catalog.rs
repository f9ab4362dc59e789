//! Studio actors and the per-job selection over them.

use crate::foundation::core::FrameSpan;
use crate::studio::background::Background;
use crate::studio::camera::Camera;
use crate::studio::light::Light;
use crate::studio::presets::{CameraPreset, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CameraId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BackgroundId(pub usize);

/// Every camera, light and background the studio created. Fixed after construction.
#[derive(Clone, Debug, Default)]
pub struct ActorCatalog {
    cameras: Vec<Camera>,
    lights: Vec<Light>,
    backgrounds: Vec<Background>,
}

impl ActorCatalog {
    pub fn new(cameras: Vec<Camera>, lights: Vec<Light>, backgrounds: Vec<Background>) -> Self {
        Self {
            cameras,
            lights,
            backgrounds,
        }
    }

    pub fn camera(&self, id: CameraId) -> &Camera {
        &self.cameras[id.0]
    }

    pub fn background(&self, id: BackgroundId) -> &Background {
        &self.backgrounds[id.0]
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn backgrounds(&self) -> &[Background] {
        &self.backgrounds
    }

    pub fn camera_ids(&self) -> impl Iterator<Item = CameraId> + '_ {
        (0..self.cameras.len()).map(CameraId)
    }

    pub fn background_ids(&self) -> impl Iterator<Item = BackgroundId> + '_ {
        (0..self.backgrounds.len()).map(BackgroundId)
    }

    pub fn find_camera(&self, preset: CameraPreset) -> Option<CameraId> {
        self.cameras
            .iter()
            .position(|c| c.preset == preset)
            .map(CameraId)
    }

    pub fn find_background(&self, name: &str) -> Option<BackgroundId> {
        self.backgrounds
            .iter()
            .position(|b| b.name == name)
            .map(BackgroundId)
    }
}

/// What one job renders: membership and order over the catalog plus the frame span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub cameras: Vec<CameraId>,
    pub backgrounds: Vec<BackgroundId>,
    pub positions: Vec<Position>,
    pub frames: FrameSpan,
}

impl Snapshot {
    pub fn camera_names(&self, catalog: &ActorCatalog) -> Vec<&'static str> {
        self.cameras.iter().map(|c| catalog.camera(*c).name()).collect()
    }

    pub fn background_names<'a>(&self, catalog: &'a ActorCatalog) -> Vec<&'a str> {
        self.backgrounds
            .iter()
            .map(|b| catalog.background(*b).name.as_str())
            .collect()
    }

    pub fn position_names(&self) -> Vec<&'static str> {
        self.positions.iter().map(|p| p.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty() || self.backgrounds.is_empty() || self.positions.is_empty()
    }
}
