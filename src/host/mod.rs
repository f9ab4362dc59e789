//! Host 3D engine boundary.
//!
//! Everything the studio does to a scene goes through [`Host`]: object graph queries,
//! transforms, camera and light data, visibility flags, materials, render state, keyframes
//! and the render call itself. The trait is object safe and always used as `&mut dyn Host`,
//! so only one mutation or render can be in flight at a time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::foundation::core::{Aabb, FrameSpan, Mat4, Vec3};
use crate::foundation::error::PcboothResult;

pub mod memory;
pub mod raster;
pub mod scene_file;

pub use memory::MemoryHost;

/// Stable handle to a host object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Mesh,
    Empty,
    Camera,
    Light,
}

/// Optional host features that scoped overrides depend on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    Holdout,
    MaterialOverride,
    MaterialSlots,
    Compositing,
    RenderQuality,
    ShadowVisibility,
    DepthOfField,
    ShaderSwitch,
    Keyframes,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Holdout => "holdout",
            Self::MaterialOverride => "material override",
            Self::MaterialSlots => "material slots",
            Self::Compositing => "compositing",
            Self::RenderQuality => "render quality",
            Self::ShadowVisibility => "shadow visibility",
            Self::DepthOfField => "depth of field",
            Self::ShaderSwitch => "shader switch",
            Self::Keyframes => "keyframes",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Dof {
    pub use_dof: bool,
    pub focus_distance: f32,
    pub aperture: f32,
}

impl Default for Dof {
    fn default() -> Self {
        Self {
            use_dof: false,
            focus_distance: 10.0,
            aperture: 2.8,
        }
    }
}

/// Camera data block. Sensor and lens are in millimetres.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraSettings {
    pub sensor_width: f32,
    pub lens: f32,
    pub clip_start: f32,
    pub clip_end: f32,
    pub dof: Dof,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            sensor_width: 36.0,
            lens: 50.0,
            clip_start: 0.1,
            clip_end: 1000.0,
            dof: Dof::default(),
        }
    }
}

/// Rectangular area light data block.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LightParams {
    pub color: [f32; 3],
    pub energy: f32,
    pub size: f32,
    pub size_y: f32,
    /// Spread angle in radians.
    pub spread: f32,
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            energy: 10.0,
            size: 1.0,
            size_y: 1.0,
            spread: std::f32::consts::PI,
        }
    }
}

/// Compositor graph installed on the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Compositing {
    /// Fog glow bloom over the render layer.
    #[default]
    Glare,
    /// Alpha mapped to white on black.
    MonochromeMask,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderQuality {
    #[default]
    Configured,
    UltraLow,
}

/// Render settings pushed to the host once per run and after quality restores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub film_transparent: bool,
}

/// Animatable channel. Scalar channels keep their value in `x`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyChannel {
    Location,
    Rotation,
    DeltaLocation,
    SensorWidth,
    FocusDistance,
    Aperture,
    LightEnergy,
    LightSize,
}

impl KeyChannel {
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            Self::SensorWidth | Self::FocusDistance | Self::Aperture | Self::LightEnergy
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    pub frame: i32,
    pub value: Vec3,
}

/// Keyframed channels of one object.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Action {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub channels: BTreeMap<KeyChannel, Vec<Keyframe>>,
}

impl Action {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channels: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.channels.values().all(Vec::is_empty)
    }

    /// Insert or replace the key at `frame`, keeping keys sorted.
    pub fn insert(&mut self, channel: KeyChannel, frame: i32, value: Vec3) {
        let keys = self.channels.entry(channel).or_default();
        match keys.binary_search_by_key(&frame, |k| k.frame) {
            Ok(i) => keys[i].value = value,
            Err(i) => keys.insert(i, Keyframe { frame, value }),
        }
    }

    /// Sort every channel by frame; of keys sharing a frame the last one wins.
    pub fn normalize(&mut self) {
        for keys in self.channels.values_mut() {
            keys.sort_by_key(|k| k.frame);
            let mut kept: Vec<Keyframe> = Vec::with_capacity(keys.len());
            for key in keys.drain(..) {
                match kept.last_mut() {
                    Some(prev) if prev.frame == key.frame => *prev = key,
                    _ => kept.push(key),
                }
            }
            *keys = kept;
        }
    }

    /// First and last keyed frame over all channels.
    pub fn frame_range(&self) -> Option<FrameSpan> {
        let mut frames = self.channels.values().flatten().map(|k| k.frame);
        let first = frames.next()?;
        let (lo, hi) = frames.fold((first, first), |(lo, hi), f| (lo.min(f), hi.max(f)));
        Some(FrameSpan { start: lo, end: hi })
    }

    /// Linear interpolation, held constant outside the keyed range.
    pub fn sample(&self, channel: KeyChannel, frame: i32) -> Option<Vec3> {
        let keys = self.channels.get(&channel)?;
        let first = keys.first()?;
        if frame <= first.frame {
            return Some(first.value);
        }
        for pair in keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if frame <= b.frame {
                let t = (frame - a.frame) as f32 / (b.frame - a.frame) as f32;
                return Some(a.value.lerp(b.value, t));
            }
        }
        keys.last().map(|k| k.value)
    }
}

/// Scene graph, transform and render operations the studio needs from a 3D engine.
pub trait Host {
    // Object graph.
    fn objects(&self) -> Vec<ObjectId>;
    fn find_object(&self, name: &str) -> Option<ObjectId>;
    fn has_collection(&self, name: &str) -> bool;
    fn collection_objects(&self, name: &str) -> Option<Vec<ObjectId>>;
    fn name(&self, id: ObjectId) -> &str;
    fn kind(&self, id: ObjectId) -> Option<ObjectKind>;
    /// Object comes from a linked library and must not be edited.
    fn is_linked(&self, id: ObjectId) -> bool;
    fn custom_property(&self, id: ObjectId, key: &str) -> Option<serde_json::Value>;
    fn parent(&self, id: ObjectId) -> Option<ObjectId>;
    fn children(&self, id: ObjectId) -> Vec<ObjectId>;
    /// Reparent keeping the world transform.
    fn set_parent(&mut self, child: ObjectId, parent: Option<ObjectId>) -> PcboothResult<()>;
    fn add_empty(&mut self, name: &str, collection: Option<&str>) -> PcboothResult<ObjectId>;
    fn add_camera(&mut self, name: &str, collection: Option<&str>) -> PcboothResult<ObjectId>;
    fn add_light(&mut self, name: &str, collection: Option<&str>) -> PcboothResult<ObjectId>;
    fn remove_object(&mut self, id: ObjectId) -> PcboothResult<()>;

    // Transforms. Rotations are `XYZ` euler radians.
    fn location(&self, id: ObjectId) -> Vec3;
    fn set_location(&mut self, id: ObjectId, location: Vec3) -> PcboothResult<()>;
    fn rotation(&self, id: ObjectId) -> Vec3;
    fn set_rotation(&mut self, id: ObjectId, rotation: Vec3) -> PcboothResult<()>;
    fn delta_location(&self, id: ObjectId) -> Vec3;
    fn set_delta_location(&mut self, id: ObjectId, delta: Vec3) -> PcboothResult<()>;
    fn delta_rotation(&self, id: ObjectId) -> Vec3;
    fn set_delta_rotation(&mut self, id: ObjectId, delta: Vec3) -> PcboothResult<()>;
    fn matrix_world(&self, id: ObjectId) -> Mat4;
    fn set_matrix_world(&mut self, id: ObjectId, matrix: Mat4) -> PcboothResult<()>;
    /// World bounds of the object's own geometry, `None` for objects without geometry.
    fn world_bounds(&self, id: ObjectId) -> Option<Aabb>;
    /// Local geometry size scaled by the object's own scale; rotation does not affect it.
    fn dimensions(&self, id: ObjectId) -> Option<Vec3>;
    /// Bake location, rotation and scale into geometry; children keep their world pose.
    fn apply_transforms(&mut self, id: ObjectId) -> PcboothResult<()>;
    /// Move the origin to the geometry bounds center without moving the geometry.
    fn set_origin_to_geometry(&mut self, id: ObjectId) -> PcboothResult<()>;

    // Cameras.
    fn camera_settings(&self, id: ObjectId) -> PcboothResult<CameraSettings>;
    fn set_camera_settings(&mut self, id: ObjectId, settings: CameraSettings)
    -> PcboothResult<()>;
    fn set_active_camera(&mut self, id: ObjectId) -> PcboothResult<()>;
    /// Move the camera along its view axis so every listed object fits in frame.
    fn frame_objects(&mut self, camera: ObjectId, objects: &[ObjectId]) -> PcboothResult<()>;

    // Lights.
    fn light_params(&self, id: ObjectId) -> PcboothResult<LightParams>;
    fn set_light_params(&mut self, id: ObjectId, params: LightParams) -> PcboothResult<()>;

    // Visibility.
    fn hide_render(&self, id: ObjectId) -> bool;
    fn set_hide_render(&mut self, id: ObjectId, hide: bool) -> PcboothResult<()>;
    fn hide_viewport(&self, id: ObjectId) -> bool;
    fn set_hide_viewport(&mut self, id: ObjectId, hide: bool) -> PcboothResult<()>;
    fn is_holdout(&self, id: ObjectId) -> bool;
    fn set_holdout(&mut self, id: ObjectId, holdout: bool) -> PcboothResult<()>;
    fn visible_shadow(&self, id: ObjectId) -> bool;
    fn set_visible_shadow(&mut self, id: ObjectId, visible: bool) -> PcboothResult<()>;

    // Materials.
    /// Create the material when missing; an existing material keeps its color unless one is given.
    fn ensure_material(&mut self, name: &str, color: Option<[f32; 3]>) -> PcboothResult<()>;
    fn global_material_override(&self) -> Option<String>;
    fn set_global_material_override(&mut self, material: Option<&str>) -> PcboothResult<()>;
    /// Whether the object carries mesh data that can hold material slots.
    fn has_material_data(&self, id: ObjectId) -> bool;
    fn material_slots(&self, id: ObjectId) -> Vec<Option<String>>;
    fn set_material_slots(&mut self, id: ObjectId, slots: Vec<Option<String>>)
    -> PcboothResult<()>;

    // Render state.
    fn configure_render(&mut self, settings: RenderSettings) -> PcboothResult<()>;
    fn compositing(&self) -> Compositing;
    fn set_compositing(&mut self, compositing: Compositing) -> PcboothResult<()>;
    fn render_quality(&self) -> RenderQuality;
    fn set_render_quality(&mut self, quality: RenderQuality) -> PcboothResult<()>;
    /// Render the current frame through `camera` and write a PNG to `path`.
    fn render_still(&mut self, camera: ObjectId, path: &Path) -> PcboothResult<()>;

    // Time and animation.
    fn frame_range(&self) -> FrameSpan;
    fn set_frame_range(&mut self, span: FrameSpan) -> PcboothResult<()>;
    fn current_frame(&self) -> i32;
    /// Seek and evaluate every action at `frame`.
    fn set_frame(&mut self, frame: i32) -> PcboothResult<()>;
    /// Key the channel's current value at `frame`.
    fn insert_keyframe(&mut self, id: ObjectId, channel: KeyChannel, frame: i32)
    -> PcboothResult<()>;
    fn action(&self, id: ObjectId) -> Option<Action>;
    fn set_action(&mut self, id: ObjectId, action: Option<Action>) -> PcboothResult<()>;
    /// Drop every action in the scene.
    fn clear_animation(&mut self);

    // Library and effects.
    fn background_library(&self) -> Vec<String>;
    fn import_background(&mut self, name: &str, collection: &str) -> PcboothResult<ObjectId>;
    fn shader_switch(&self, group: &str, node: &str) -> Option<f32>;
    fn set_shader_switch(&mut self, group: &str, node: &str, value: f32) -> PcboothResult<()>;
    fn set_emission_enabled(&mut self, enabled: bool) -> PcboothResult<()>;

    // Persistence.
    fn source_path(&self) -> Option<PathBuf>;
    fn save_scene(&self, path: &Path) -> PcboothResult<()>;

    fn supports(&self, capability: Capability) -> bool;
}

/// `parent` followed by all of its descendants, breadth first.
pub fn hierarchy(host: &dyn Host, parent: ObjectId) -> Vec<ObjectId> {
    let mut out = vec![parent];
    let mut i = 0;
    while i < out.len() {
        let children = host.children(out[i]);
        out.extend(children);
        i += 1;
    }
    out
}

/// Walk up the parent chain to the root.
pub fn top_parent(host: &dyn Host, mut id: ObjectId) -> ObjectId {
    while let Some(p) = host.parent(id) {
        id = p;
    }
    id
}

#[cfg(test)]
#[path = "../../tests/unit/host/action.rs"]
mod tests;
