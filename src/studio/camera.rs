use std::collections::BTreeMap;

use crate::config::{FocalRatio, Scene};
use crate::foundation::core::{Mat4, Vec3};
use crate::foundation::error::{PcboothError, PcboothResult};
use crate::host::{Host, KeyChannel, ObjectId, hierarchy};
use crate::studio::bounds::Bounds;
use crate::studio::presets::{CameraPreset, Position};

const SENSOR_DEFAULT: f32 = 36.0;
const LENS_ORTHO: f32 = 1000.0;
const LENS_PERSPECTIVE: f32 = 105.0;
const FOCAL_MULTIPLIER: f32 = 9.5;

/// Focus distance and aperture saved per position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Focus {
    pub distance: f32,
    pub aperture: f32,
}

/// Studio camera with per-position transforms and focus.
#[derive(Clone, Debug)]
pub struct Camera {
    pub preset: CameraPreset,
    pub object: ObjectId,
    positions: BTreeMap<Position, Mat4>,
    focuses: BTreeMap<Position, Focus>,
    sensor_zoomed_out: f32,
    ortho: bool,
    focal_ratio: FocalRatio,
    depth_of_field: bool,
}

impl Camera {
    /// Create a preset camera object in `collection`.
    pub fn create(
        host: &mut dyn Host,
        preset: CameraPreset,
        scene: &Scene,
        collection: &str,
    ) -> PcboothResult<Self> {
        let rotation = preset.rotation().ok_or_else(|| {
            PcboothError::config("the custom camera is adopted from the scene, not created")
        })?;
        let object = host.add_camera(&preset.object_name(), Some(collection))?;
        host.set_rotation(object, rotation)?;
        tracing::debug!(camera = %preset, "added camera object");
        Self::configure(host, preset, object, scene)
    }

    /// Adopt an existing scene camera as the `CUSTOM` preset.
    pub fn adopt(host: &mut dyn Host, object: ObjectId, scene: &Scene) -> PcboothResult<Self> {
        host.camera_settings(object)?;
        tracing::debug!(object = host.name(object), "adopted custom camera");
        Self::configure(host, CameraPreset::Custom, object, scene)
    }

    fn configure(
        host: &mut dyn Host,
        preset: CameraPreset,
        object: ObjectId,
        scene: &Scene,
    ) -> PcboothResult<Self> {
        let mut settings = host.camera_settings(object)?;
        settings.lens = if scene.ortho_cam {
            LENS_ORTHO
        } else {
            LENS_PERSPECTIVE
        };
        settings.clip_start = 0.1;
        settings.clip_end = 15000.0;
        if scene.depth_of_field {
            settings.dof.use_dof = true;
        }
        host.set_camera_settings(object, settings)?;
        Ok(Self {
            preset,
            object,
            positions: BTreeMap::new(),
            focuses: BTreeMap::new(),
            sensor_zoomed_out: scene.zoom_out * SENSOR_DEFAULT,
            ortho: scene.ortho_cam,
            focal_ratio: scene.focal_ratio,
            depth_of_field: scene.depth_of_field,
        })
    }

    pub fn name(&self) -> &'static str {
        self.preset.name()
    }

    pub fn depth_of_field(&self) -> bool {
        self.depth_of_field
    }

    pub fn saved_position(&self, position: Position) -> Option<Mat4> {
        self.positions.get(&position).copied()
    }

    pub fn saved_focus(&self, position: Position) -> Option<Focus> {
        self.focuses.get(&position).copied()
    }

    pub fn save_position(&mut self, host: &dyn Host, position: Position) {
        self.positions.insert(position, host.matrix_world(self.object));
    }

    pub fn save_focus(&mut self, host: &dyn Host, position: Position) -> PcboothResult<()> {
        let dof = host.camera_settings(self.object)?.dof;
        self.focuses.insert(
            position,
            Focus {
                distance: dof.focus_distance,
                aperture: dof.aperture,
            },
        );
        Ok(())
    }

    /// Restore the saved transform and focus for `position`.
    pub fn change_position(&self, host: &mut dyn Host, position: Position) -> PcboothResult<()> {
        let matrix = self.saved_position(position).ok_or_else(|| {
            PcboothError::host(format!("{} has no saved {position} transform", self.name()))
        })?;
        host.set_matrix_world(self.object, matrix)?;
        self.change_focus(host, position)
    }

    pub fn change_focus(&self, host: &mut dyn Host, position: Position) -> PcboothResult<()> {
        let focus = self.saved_focus(position).ok_or_else(|| {
            PcboothError::host(format!("{} has no saved {position} focus", self.name()))
        })?;
        self.apply_focus(host, focus)
    }

    pub fn apply_focus(&self, host: &mut dyn Host, focus: Focus) -> PcboothResult<()> {
        let mut settings = host.camera_settings(self.object)?;
        settings.dof.focus_distance = focus.distance;
        settings.dof.aperture = focus.aperture;
        host.set_camera_settings(self.object, settings)
    }

    /// Fit `object` and its hierarchy in frame, then widen the sensor by the zoom-out factor.
    pub fn frame_selected(&self, host: &mut dyn Host, object: ObjectId) -> PcboothResult<()> {
        self.set_sensor(host, SENSOR_DEFAULT)?;
        host.set_active_camera(self.object)?;
        let targets = hierarchy(host, object);
        host.frame_objects(self.object, &targets)?;
        self.set_sensor(host, self.sensor_zoomed_out)
    }

    fn set_sensor(&self, host: &mut dyn Host, width: f32) -> PcboothResult<()> {
        let mut settings = host.camera_settings(self.object)?;
        settings.sensor_width = width;
        host.set_camera_settings(self.object, settings)
    }

    /// Focus on `target` and pick an aperture.
    pub fn set_focus(&self, host: &mut dyn Host, target: Vec3) -> PcboothResult<()> {
        let camera_location = host.matrix_world(self.object).w_axis.truncate();
        let distance = (target - camera_location).length();
        let aperture = match self.focal_ratio {
            FocalRatio::Auto => {
                let ortho = if self.ortho { 10.0 } else { 1.0 };
                FOCAL_MULTIPLIER / distance.max(f32::EPSILON) * ortho
            }
            FocalRatio::Value(v) => v,
        };
        self.apply_focus(host, Focus { distance, aperture })
    }

    pub fn align(&self, host: &mut dyn Host, object: ObjectId, bounds: &Bounds) -> PcboothResult<()> {
        self.frame_selected(host, object)?;
        self.set_focus(host, bounds.center())
    }

    /// Key transform, sensor and optionally focus at `frame`.
    pub fn add_keyframe(
        &self,
        host: &mut dyn Host,
        frame: i32,
        translations: bool,
        focus: bool,
        zoom_out: bool,
    ) -> PcboothResult<()> {
        if translations {
            host.insert_keyframe(self.object, KeyChannel::Rotation, frame)?;
            host.insert_keyframe(self.object, KeyChannel::Location, frame)?;
        }
        if zoom_out {
            host.insert_keyframe(self.object, KeyChannel::SensorWidth, frame)?;
        }
        if focus {
            host.insert_keyframe(self.object, KeyChannel::FocusDistance, frame)?;
            host.insert_keyframe(self.object, KeyChannel::Aperture, frame)?;
        }
        Ok(())
    }

    /// Keyframe at `trunc(frame_end * progress)` keeping `object` in view mid-transition.
    pub fn add_intermediate_keyframe(
        &self,
        host: &mut dyn Host,
        object: ObjectId,
        progress: f32,
        zoom: f32,
        frame_selected: bool,
    ) -> PcboothResult<()> {
        let frame = (host.frame_range().end as f32 * progress) as i32;
        self.add_keyframe_at(host, object, frame, zoom, frame_selected, self.ortho)
    }

    /// Explicit-frame variant; `focus` forces focus keys.
    pub fn add_keyframe_at(
        &self,
        host: &mut dyn Host,
        object: ObjectId,
        frame: i32,
        zoom: f32,
        frame_selected: bool,
        focus: bool,
    ) -> PcboothResult<()> {
        host.set_frame(frame)?;
        if frame_selected {
            self.frame_selected(host, object)?;
        }
        self.set_sensor(host, self.sensor_zoomed_out * zoom)?;
        if self.ortho || focus {
            let target = match host.world_bounds(object) {
                Some(b) => b.center(),
                None => Bounds::measure(host, &hierarchy(host, object))?.center(),
            };
            self.set_focus(host, target)?;
        }
        self.add_keyframe(host, frame, true, self.ortho || focus, true)
    }

    /// Toggle depth of field; restoring uses the configured setting.
    pub fn set_dof(&self, host: &mut dyn Host, enabled: bool) -> PcboothResult<()> {
        let mut settings = host.camera_settings(self.object)?;
        settings.dof.use_dof = enabled;
        host.set_camera_settings(self.object, settings)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/studio/camera.rs"]
mod tests;
