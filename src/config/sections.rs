//! Typed configuration sections. Missing keys take defaults, unknown keys are ignored.

use std::path::PathBuf;

use crate::config::values::{FocalRatio, ImageFormat, RenderedObject, VideoFormat};
use crate::studio::presets::{CameraPreset, Position};

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Settings {
    pub render_dir: PathBuf,
    pub animation_dir: PathBuf,
    pub image_format: Vec<ImageFormat>,
    pub video_format: Vec<VideoFormat>,
    pub thumbnails: bool,
    /// Keep the render cache and intermediate frames on disk.
    pub keep_frames: bool,
    pub save_scene: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            render_dir: PathBuf::from("renders"),
            animation_dir: PathBuf::from("animations"),
            image_format: vec![ImageFormat::Png],
            video_format: vec![VideoFormat::Mp4],
            thumbnails: true,
            keep_frames: false,
            save_scene: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Renderer {
    pub samples: u32,
    pub fps: u32,
    pub image_width: u32,
    pub image_height: u32,
    pub video_width: u32,
    pub video_height: u32,
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            samples: 24,
            fps: 25,
            image_width: 1920,
            image_height: 1080,
            video_width: 1920,
            video_height: 1080,
            thumbnail_width: 480,
            thumbnail_height: 270,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Scene {
    pub lights_color: String,
    pub lights_intensity: f32,
    pub depth_of_field: bool,
    pub focal_ratio: FocalRatio,
    pub zoom_out: f32,
    pub led_on: bool,
    pub adjust_pos: bool,
    pub ortho_cam: bool,
    pub rendered_object: Option<RenderedObject>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            lights_color: "FFFFFF".to_string(),
            lights_intensity: 50.0,
            depth_of_field: false,
            focal_ratio: FocalRatio::Auto,
            zoom_out: 1.0,
            led_on: true,
            adjust_pos: true,
            ortho_cam: false,
            rendered_object: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Backgrounds {
    /// `null` in the file means no backgrounds.
    #[serde(deserialize_with = "null_as_empty")]
    pub list: Vec<String>,
}

impl Default for Backgrounds {
    fn default() -> Self {
        Self {
            list: vec!["transparent".to_string()],
        }
    }
}

fn null_as_empty<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v: Option<Vec<String>> = serde::Deserialize::deserialize(d)?;
    Ok(v.unwrap_or_default())
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Cameras {
    pub top: bool,
    pub iso: bool,
    pub front: bool,
    pub left: bool,
    pub right: bool,
    pub photo1: bool,
    pub photo2: bool,
    pub custom: bool,
}

impl Default for Cameras {
    fn default() -> Self {
        Self {
            top: true,
            iso: false,
            front: false,
            left: false,
            right: false,
            photo1: false,
            photo2: false,
            custom: false,
        }
    }
}

impl Cameras {
    pub fn is_enabled(&self, preset: CameraPreset) -> bool {
        match preset {
            CameraPreset::Top => self.top,
            CameraPreset::Iso => self.iso,
            CameraPreset::Front => self.front,
            CameraPreset::Left => self.left,
            CameraPreset::Right => self.right,
            CameraPreset::Photo1 => self.photo1,
            CameraPreset::Photo2 => self.photo2,
            CameraPreset::Custom => self.custom,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Positions {
    pub top: bool,
    pub bottom: bool,
    pub rear: bool,
}

impl Default for Positions {
    fn default() -> Self {
        Self {
            top: true,
            bottom: false,
            rear: false,
        }
    }
}

impl Positions {
    pub fn is_enabled(&self, position: Position) -> bool {
        match position {
            Position::Top => self.top,
            Position::Bottom => self.bottom,
            Position::Rear => self.rear,
        }
    }
}
