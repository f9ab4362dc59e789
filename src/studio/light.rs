use crate::config::Scene;
use crate::foundation::core::{Vec3, hex_to_rgb};
use crate::foundation::error::PcboothResult;
use crate::host::{Host, KeyChannel, LightParams, ObjectId};
use crate::studio::bounds::Bounds;
use crate::studio::presets::LightPreset;

const BASE_Z: f32 = 58.0;
const REFERENCE_X: f32 = 120.0;
const REFERENCE_Y: f32 = 60.0;

/// Area light scaled to the model footprint.
#[derive(Clone, Debug)]
pub struct Light {
    pub preset: LightPreset,
    pub object: ObjectId,
}

/// Energy grows with footprint beyond the reference size.
pub fn scale_intensity(intensity: f32, dims: Vec3) -> f32 {
    let ratio = (dims.x / REFERENCE_X).max(dims.y / REFERENCE_Y).max(1.0);
    intensity * ratio.powf(1.2)
}

/// Light height above the model's top.
pub fn light_z(dims: Vec3, max_z: f32) -> f32 {
    let ratio = (dims.x / REFERENCE_X).max(dims.y / REFERENCE_Y);
    if ratio < 1.0 {
        max_z + ratio * BASE_Z
    } else {
        max_z + BASE_Z
    }
}

impl Light {
    pub fn create(host: &mut dyn Host, preset: LightPreset, collection: &str) -> PcboothResult<Self> {
        let object = host.add_light(preset.object_name(), Some(collection))?;
        host.set_rotation(object, preset.rotation())?;
        Ok(Self { preset, object })
    }

    /// Re-fit position, size and energy to `bounds`.
    pub fn update(&self, host: &mut dyn Host, bounds: &Bounds, scene: &Scene) -> PcboothResult<()> {
        let dims = bounds.dimensions();
        let z = light_z(dims, bounds.max_z());
        let margin = dims.x.max(dims.y) * 0.4;
        let params = LightParams {
            color: hex_to_rgb(&scene.lights_color)?,
            energy: scale_intensity(scene.lights_intensity * self.preset.relative_intensity(), dims),
            size: dims.x + margin,
            size_y: dims.y + margin,
            spread: 140f32.to_radians(),
        };
        host.set_light_params(self.object, params)?;
        host.set_rotation(self.object, self.preset.rotation())?;
        host.set_location(self.object, self.preset.location(dims, z))
    }

    pub fn add_keyframe(&self, host: &mut dyn Host, frame: i32) -> PcboothResult<()> {
        host.insert_keyframe(self.object, KeyChannel::Location, frame)?;
        host.insert_keyframe(self.object, KeyChannel::LightEnergy, frame)?;
        host.insert_keyframe(self.object, KeyChannel::LightSize, frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/studio/light.rs"]
mod tests;
