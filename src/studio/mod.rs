//! The virtual photo studio: the classified model plus the cameras, lights and backgrounds
//! positioned around it.
//!
//! [`Studio::new`] runs once per scene. It classifies the model, straightens it, rotates it
//! through every [`Position`] to pre-compute each camera's transform and focus, then binds
//! lights and backgrounds to the model's final bounds. Later position changes are lookups
//! into those saved entries. Jobs never mutate the studio; they work on a [`Snapshot`].

use std::cell::Cell;
use std::path::PathBuf;

use crate::config::{Config, Scene};
use crate::foundation::core::{FrameSpan, Mat4, Vec3};
use crate::foundation::error::{PcboothError, PcboothResult};
use crate::host::{Capability, Compositing, Host, ObjectId, RenderSettings, hierarchy, top_parent};

pub mod animation;
pub mod background;
pub mod bounds;
pub mod camera;
pub mod catalog;
pub mod classify;
pub mod light;
pub mod presets;

use animation::AnimationBackup;
use background::{Background, TRANSPARENT};
use bounds::Bounds;
use camera::Camera;
use catalog::{ActorCatalog, BackgroundId, CameraId, Snapshot};
use classify::{Classification, ModelKind};
use light::Light;
use presets::{CUSTOM_CAMERA_OBJECT, CameraPreset, LightPreset, Position};

pub const CAMERAS_COLLECTION: &str = "Cameras";
pub const LIGHTS_COLLECTION: &str = "Lights";
pub const BACKGROUNDS_COLLECTION: &str = "Backgrounds";
pub const DISPLAY_ROT_PROPERTY: &str = "DISPLAY_ROT";

#[derive(Debug)]
pub struct Studio {
    classification: Classification,
    catalog: ActorCatalog,
    base: Snapshot,
    default_frames: FrameSpan,
    animation: AnimationBackup,
    scene: Scene,
    /// Current model orientation.
    position: Cell<Position>,
}

impl Studio {
    #[tracing::instrument(skip(host, config))]
    pub fn new(host: &mut dyn Host, config: &Config, board_name: &str) -> PcboothResult<Self> {
        tracing::info!("configuring studio");
        let fps = i32::try_from(config.renderer.fps)
            .map_err(|_| PcboothError::config("RENDERER.FPS is out of range"))?;
        let default_frames = FrameSpan::new(1, fps.max(1))?;
        apply_frames(host, default_frames)?;
        host.configure_render(RenderSettings {
            width: config.renderer.image_width,
            height: config.renderer.image_height,
            samples: config.renderer.samples,
            film_transparent: true,
        })?;
        if host.supports(Capability::Compositing) {
            host.set_compositing(Compositing::Glare)?;
        }

        let animation = AnimationBackup::capture(host);
        animation::clear_animation(host);

        let classification = classify::classify(host, &config.scene, board_name)?;
        adjust_position(host, &classification, &config.scene)?;

        let mut studio = Self {
            classification,
            catalog: ActorCatalog::default(),
            base: Snapshot {
                cameras: Vec::new(),
                backgrounds: Vec::new(),
                positions: Vec::new(),
                frames: default_frames,
            },
            default_frames,
            animation,
            scene: config.scene.clone(),
            position: Cell::new(Position::Top),
        };

        let cameras = studio.add_cameras(host, config)?;
        let lights = studio.add_lights(host)?;
        let backgrounds = studio.add_backgrounds(host)?;
        studio.catalog = ActorCatalog::new(cameras, lights, backgrounds);

        studio.base.cameras = studio
            .catalog
            .camera_ids()
            .filter(|id| config.cameras.is_enabled(studio.catalog.camera(*id).preset))
            .collect();
        studio.base.positions = Position::ALL
            .into_iter()
            .filter(|p| config.positions.is_enabled(*p))
            .collect();
        studio.base.backgrounds = studio.select_backgrounds(&config.backgrounds.list)?;

        if !config.scene.led_on {
            host.set_emission_enabled(false)?;
        }

        if config.settings.save_scene {
            studio.save_scene(host)?;
        }
        Ok(studio)
    }

    fn add_cameras(&mut self, host: &mut dyn Host, config: &Config) -> PcboothResult<Vec<Camera>> {
        let mut cameras = Vec::new();
        for preset in CameraPreset::BUILTIN {
            cameras.push(Camera::create(host, preset, &self.scene, CAMERAS_COLLECTION)?);
        }
        if config.cameras.custom {
            let object = host.find_object(CUSTOM_CAMERA_OBJECT).ok_or_else(|| {
                PcboothError::config(format!(
                    "CAMERAS.CUSTOM is enabled but the scene has no '{CUSTOM_CAMERA_OBJECT}' object"
                ))
            })?;
            cameras.push(Camera::adopt(host, object, &self.scene)?);
        }

        let rendered = self.classification.rendered_obj;
        for position in Position::ALL {
            self.change_position(host, position)?;
            let targets = hierarchy(host, rendered);
            Bounds::with(host, &targets, |h, bounds| {
                for camera in cameras.iter_mut() {
                    camera.align(h, rendered, bounds)?;
                    camera.save_position(h, position);
                    camera.save_focus(h, position)?;
                }
                Ok(())
            })?;
        }
        self.change_position(host, Position::Top)?;
        for camera in &cameras {
            camera.change_position(host, Position::Top)?;
        }
        let names: Vec<_> = cameras.iter().map(|c| host.name(c.object).to_string()).collect();
        tracing::info!("added {} cameras to studio: {names:?}", cameras.len());
        Ok(cameras)
    }

    fn add_lights(&self, host: &mut dyn Host) -> PcboothResult<Vec<Light>> {
        let lights = LightPreset::ALL
            .into_iter()
            .map(|preset| Light::create(host, preset, LIGHTS_COLLECTION))
            .collect::<PcboothResult<Vec<_>>>()?;
        sync_lights(host, self.classification.top_parent, &lights, &self.scene)?;
        tracing::info!("added {} lights to studio", lights.len());
        Ok(lights)
    }

    fn add_backgrounds(&self, host: &mut dyn Host) -> PcboothResult<Vec<Background>> {
        let mut names = vec![TRANSPARENT.to_string()];
        names.extend(host.background_library());
        let backgrounds = names
            .iter()
            .map(|name| Background::create(host, name, BACKGROUNDS_COLLECTION))
            .collect::<PcboothResult<Vec<_>>>()?;
        sync_backgrounds(host, self.classification.top_parent, &backgrounds)?;
        tracing::info!("added {} backgrounds to studio: {names:?}", backgrounds.len());
        Ok(backgrounds)
    }

    fn select_backgrounds(&self, list: &[String]) -> PcboothResult<Vec<BackgroundId>> {
        let missing: Vec<_> = list
            .iter()
            .filter(|name| self.catalog.find_background(name).is_none())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(PcboothError::config(format!(
                "no such background: {}",
                missing.join(", ")
            )));
        }
        Ok(self
            .catalog
            .background_ids()
            .filter(|id| list.iter().any(|n| *n == self.catalog.background(*id).name))
            .collect())
    }

    fn save_scene(&self, host: &mut dyn Host) -> PcboothResult<()> {
        let Some(source) = host.source_path() else {
            tracing::warn!("SETTINGS.SAVE_SCENE is set but the scene has no source file");
            return Ok(());
        };
        let path = scene_copy_path(&source);
        host.save_scene(&path)?;
        tracing::info!("saved prepared scene as {}", path.display());
        Ok(())
    }

    pub fn catalog(&self) -> &ActorCatalog {
        &self.catalog
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn kind(&self) -> ModelKind {
        self.classification.kind
    }

    pub fn is_pcb(&self) -> bool {
        self.classification.is_pcb()
    }

    pub fn rendered_obj(&self) -> ObjectId {
        self.classification.rendered_obj
    }

    pub fn top_parent(&self) -> ObjectId {
        self.classification.top_parent
    }

    pub fn top_components(&self) -> &[ObjectId] {
        &self.classification.top_components
    }

    pub fn bottom_components(&self) -> &[ObjectId] {
        &self.classification.bottom_components
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn position(&self) -> Position {
        self.position.get()
    }

    pub fn animation(&self) -> &AnimationBackup {
        &self.animation
    }

    pub fn default_frames(&self) -> FrameSpan {
        self.default_frames
    }

    /// Selection enabled by configuration, for jobs to narrow.
    pub fn snapshot(&self) -> Snapshot {
        self.base.clone()
    }

    pub fn camera(&self, id: CameraId) -> &Camera {
        self.catalog.camera(id)
    }

    pub fn background(&self, id: BackgroundId) -> &Background {
        self.catalog.background(id)
    }

    /// Rotate the model into `position`.
    pub fn change_position(&self, host: &mut dyn Host, position: Position) -> PcboothResult<()> {
        host.set_rotation(self.classification.top_parent, position.rotation())?;
        self.position.set(position);
        tracing::debug!("moved {} to '{position}' position", host.name(self.rendered_obj()));
        Ok(())
    }

    /// Frame span of the authored animation, or the configured default.
    pub fn frame_range(&self, default: bool) -> FrameSpan {
        if default {
            return self.default_frames;
        }
        self.animation.frame_range().unwrap_or(self.default_frames)
    }

    /// Resolve a frame span into `snapshot` and push it to the host.
    pub fn set_frames(
        &self,
        host: &mut dyn Host,
        snapshot: &mut Snapshot,
        default: bool,
    ) -> PcboothResult<()> {
        snapshot.frames = self.frame_range(default);
        apply_frames(host, snapshot.frames)
    }

    pub fn update_lights(&self, host: &mut dyn Host) -> PcboothResult<()> {
        sync_lights(host, self.top_parent(), self.catalog.lights(), &self.scene)
    }

    pub fn update_backgrounds(&self, host: &mut dyn Host) -> PcboothResult<()> {
        sync_backgrounds(host, self.top_parent(), self.catalog.backgrounds())
    }

    /// Key lights, backgrounds and `camera` on every frame of `frames` so the studio
    /// follows authored motion.
    pub fn add_studio_keyframes(
        &self,
        host: &mut dyn Host,
        camera: CameraId,
        frames: FrameSpan,
    ) -> PcboothResult<()> {
        let camera = self.catalog.camera(camera);
        for frame in frames.frames() {
            host.set_frame(frame)?;
            self.update_lights(host)?;
            for light in self.catalog.lights() {
                light.add_keyframe(host, frame)?;
            }
            self.update_backgrounds(host)?;
            for bg in self.catalog.backgrounds() {
                bg.add_keyframe(host, frame)?;
            }
            camera.add_keyframe_at(host, self.rendered_obj(), frame, 1.0, true, true)?;
        }
        host.set_frame(frames.start)
    }

    /// Put the model back in `TOP` and resync lights and backgrounds to it.
    pub fn reset_position(&self, host: &mut dyn Host) -> PcboothResult<()> {
        self.change_position(host, Position::Top)?;
        self.update_lights(host)?;
        self.update_backgrounds(host)
    }

    /// Remove all animation from the host; the authored backup survives.
    pub fn clear_animation(&self, host: &mut dyn Host) {
        animation::clear_animation(host);
    }
}

/// Set the host frame range and seek to its start.
pub fn apply_frames(host: &mut dyn Host, frames: FrameSpan) -> PcboothResult<()> {
    host.set_frame_range(frames)?;
    host.set_frame(frames.start)?;
    tracing::debug!(
        start = frames.start,
        end = frames.end,
        "set frames"
    );
    Ok(())
}

/// Refit every light to the bounds of `target`'s hierarchy.
pub fn sync_lights(
    host: &mut dyn Host,
    target: ObjectId,
    lights: &[Light],
    scene: &Scene,
) -> PcboothResult<()> {
    let objects = hierarchy(host, target);
    Bounds::with(host, &objects, |h, bounds| {
        for light in lights {
            light.update(h, bounds, scene)?;
        }
        Ok(())
    })
}

/// Rest every background at the lowest point of `target`'s hierarchy.
pub fn sync_backgrounds(
    host: &mut dyn Host,
    target: ObjectId,
    backgrounds: &[Background],
) -> PcboothResult<()> {
    let objects = hierarchy(host, target);
    let min_z = Bounds::measure(host, &objects)?.min.z;
    for bg in backgrounds {
        bg.set_z(host, min_z)?;
    }
    Ok(())
}

fn adjust_position(
    host: &mut dyn Host,
    classification: &Classification,
    scene: &Scene,
) -> PcboothResult<()> {
    let object = top_parent(host, classification.rendered_obj);
    let single = classification.kind == ModelKind::SingleObject
        && classification.top_components.len() == 1;

    if scene.adjust_pos {
        if classification.is_pcb() {
            rotate_horizontally(host, object)?;
        }
        if single {
            let display_rot = host
                .custom_property(classification.rendered_obj, DISPLAY_ROT_PROPERTY)
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0) as f32;
            tracing::info!("rotating model using {DISPLAY_ROT_PROPERTY} property ({display_rot}deg)");
            host.set_rotation(object, Vec3::new(0.0, 0.0, display_rot.to_radians()))?;
            host.apply_transforms(object)?;
        }
    }

    if single {
        host.set_origin_to_geometry(object)?;
        host.set_location(object, Vec3::ZERO)?;
        host.apply_transforms(object)?;
    }
    Ok(())
}

/// Turn a board that is taller than wide by -90 degrees about Z, bringing a custom camera along.
fn rotate_horizontally(host: &mut dyn Host, object: ObjectId) -> PcboothResult<()> {
    let dims = Bounds::measure(host, &[object])?.size();
    if dims.x >= dims.y {
        return Ok(());
    }
    tracing::info!("rotating the PCB horizontally");
    host.set_rotation(object, Vec3::new(0.0, 0.0, (-90f32).to_radians()))?;
    host.apply_transforms(object)?;
    if let Some(custom) = host.find_object(CUSTOM_CAMERA_OBJECT) {
        tracing::info!("rotating '{CUSTOM_CAMERA_OBJECT}' accordingly");
        let rotated = Mat4::from_rotation_z((-90f32).to_radians()) * host.matrix_world(custom);
        host.set_matrix_world(custom, rotated)?;
    }
    Ok(())
}

/// `<stem>_scene.<ext>` next to `source`.
pub fn scene_copy_path(source: &std::path::Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match source.extension() {
        Some(ext) => format!("{stem}_scene.{}", ext.to_string_lossy()),
        None => format!("{stem}_scene"),
    };
    source.with_file_name(name)
}

#[cfg(test)]
#[path = "../../tests/unit/studio/mod.rs"]
mod tests;
