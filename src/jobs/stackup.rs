use std::sync::LazyLock;

use regex::Regex;

use crate::foundation::core::Vec3;
use crate::foundation::error::PcboothResult;
use crate::host::{Host, ObjectId};
use crate::jobs::components::SOLDER_OBJECT;
use crate::jobs::{Job, JobContext, JobRun};
use crate::overrides::{
    DofOverride, HideOverride, OnMissing, PositionOverride, ScopedOverride, ShaderSwitchOverride,
    ShadowOverride, scoped, scoped_all,
};
use crate::studio::Studio;
use crate::studio::background::{TRANSPARENT, use_background};
use crate::studio::catalog::Snapshot;
use crate::studio::presets::{CameraPreset, Position};

/// Name fragment of the per-layer objects of stackup-enabled PCB models.
pub const LAYER_MARKER: &str = "PCB_layer";

static TRAILING_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)$").expect("static regex is valid"));

/// Exploded view of a PCB, one image per layer with every layer above it hidden.
///
/// Yields `layer1` (topmost) to `layer<N>`. Only PCB models generated with separate layer
/// objects are supported; anything else is skipped with a warning.
#[derive(Clone, Copy, Debug, Default)]
pub struct StackupJob;

impl StackupJob {
    pub const NAME: &'static str = "STACKUP";
}

/// Index from the trailing digits of a layer name; `0` when there are none.
pub fn layer_index(name: &str) -> u32 {
    TRAILING_INDEX
        .captures(name)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0)
}

/// Layer objects under `rendered`, bottom layer first.
pub fn find_layers(host: &dyn Host, rendered: ObjectId) -> Vec<ObjectId> {
    let mut layers: Vec<ObjectId> = host
        .children(rendered)
        .into_iter()
        .filter(|id| host.name(*id).contains(LAYER_MARKER))
        .collect();
    layers.sort_by_key(|id| layer_index(host.name(*id)));
    layers
}

/// Spread layers upwards with a slight Y offset scaled by the board size. The first layer
/// stays in place and the last one shares the offset of the layer below it.
pub fn move_layers(host: &mut dyn Host, layers: &[ObjectId]) -> PcboothResult<()> {
    let Some(first) = layers.first() else {
        return Ok(());
    };
    let dims = host.dimensions(*first).unwrap_or(Vec3::ZERO);
    let offset = Vec3::new(0.0, dims.y / 20.0, dims.x / 7.5);
    for (i, layer) in layers.iter().enumerate() {
        let step = if i + 1 == layers.len() { i.saturating_sub(1) } else { i };
        if step == 0 {
            continue;
        }
        host.set_delta_location(*layer, offset * step as f32)?;
    }
    Ok(())
}

impl Job for StackupJob {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn override_snapshot(&self, studio: &Studio, snapshot: &mut Snapshot) {
        if let Some(bg) = studio.catalog().find_background(TRANSPARENT) {
            snapshot.backgrounds = vec![bg];
        }
        if let Some(cam) = studio.catalog().find_camera(CameraPreset::Front) {
            snapshot.cameras = vec![cam];
        }
        snapshot.positions = vec![Position::Top];
    }

    fn iterate(
        &mut self,
        host: &mut dyn Host,
        ctx: &mut JobContext<'_>,
        run: &mut JobRun,
    ) -> PcboothResult<()> {
        let studio = ctx.studio;
        if !studio.is_pcb() {
            tracing::warn!("This is not a supported PCB model type, skipping this job.");
            return Ok(());
        }
        let layers = find_layers(host, studio.rendered_obj());
        if layers.len() < 2 {
            tracing::warn!("No layers found in this PCB model, skipping this job.");
            return Ok(());
        }
        run.progress.set_total(layers.len());

        let snapshot = run.snapshot.clone();
        let position = snapshot.positions[0];
        let background = studio.background(snapshot.backgrounds[0]);
        let camera = studio.camera(snapshot.cameras[0]);
        let mut components: Vec<ObjectId> = studio.bottom_components().to_vec();
        components.extend_from_slice(studio.top_components());
        if let Some(solder) = host.find_object(SOLDER_OBJECT) {
            components.push(solder);
        }

        studio.change_position(host, position)?;
        use_background(host, studio.catalog().backgrounds(), background)?;
        camera.change_position(host, position)?;

        let mut spread = PositionOverride::new(layers.clone(), move_layers).resync(studio);
        let mut shadows = ShadowOverride::new(layers.clone());
        let mut dof = DofOverride::new(camera.object, camera.depth_of_field());
        let mut solder_switch = ShaderSwitchOverride::solder();
        let mut overrides: [&mut dyn ScopedOverride; 4] =
            [&mut spread, &mut shadows, &mut dof, &mut solder_switch];

        scoped_all(host, &mut overrides, OnMissing::Skip, |host| {
            let mut framing = HideOverride::new(components.clone(), true);
            scoped(host, &mut framing, OnMissing::Fail, |host| {
                camera.frame_selected(host, studio.rendered_obj())
            })?;

            let mut everything: Vec<ObjectId> = components.clone();
            everything.extend_from_slice(&layers);
            let mut hide = HideOverride::new(everything, false);
            scoped(host, &mut hide, OnMissing::Fail, |host| {
                for (idx, layer) in layers.iter().enumerate() {
                    host.set_hide_render(*layer, false)?;
                    let name = format!("layer{}", layers.len() - idx);
                    let result = ctx
                        .renderer
                        .render(host, camera.object, &name)
                        .and_then(|()| ctx.renderer.thumbnail(host, camera.object, &name));
                    ctx.renderer.clear_cache();
                    run.record(result)?;
                }
                Ok(())
            })
            .map(|s| s.value)
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/jobs/stackup.rs"]
mod tests;
