use crate::foundation::core::hex_to_rgb;
use crate::foundation::error::PcboothResult;
use crate::host::{Host, ObjectId};
use crate::jobs::components::{SOLDER_OBJECT, designator, linked_props, output_stem, select};
use crate::jobs::{Job, JobContext, JobRun};
use crate::overrides::{HideOverride, MaterialOverride, OnMissing, ScopedOverride, scoped, scoped_all};
use crate::studio::Studio;
use crate::studio::background::{TRANSPARENT, use_background};
use crate::studio::camera::Camera;
use crate::studio::catalog::Snapshot;
use crate::studio::presets::{CameraPreset, Position};

/// Designator prefixes of highlighted PCB components.
pub const HIGHLIGHTED: [&str; 2] = ["J", "SW"];
/// Designator prefixes of PCB components hidden from every render.
pub const HIDDEN: [&str; 5] = ["R", "C", "T", "Q", "FB"];

const WHITE_RGB: &str = "FFFFFF";
const HIGHLIGHT_RGB: &str = "004C3C";

/// Documentation images: the model in plain white with one component in a contrasting color.
///
/// Output goes to `highlights/`. PCB renders are named by designator with a `_<camera>`
/// suffix for cameras other than `TOP`; other models use the component name followed by the
/// camera suffix and the position initial. Linked objects keep their own materials, so they
/// are hidden instead.
#[derive(Clone, Copy, Debug, Default)]
pub struct HighlightsJob;

impl HighlightsJob {
    pub const NAME: &'static str = "HIGHLIGHTS";
}

/// Components to highlight and objects to hide while rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComponentLists {
    pub highlighted: Vec<ObjectId>,
    pub hidden: Vec<ObjectId>,
}

pub fn component_lists(host: &dyn Host, studio: &Studio) -> ComponentLists {
    let mut hidden: Vec<ObjectId> = if studio.is_pcb() {
        select(host, studio, &HIDDEN)
    } else {
        Vec::new()
    };
    for id in linked_props(host) {
        if !hidden.contains(&id) {
            hidden.push(id);
        }
    }
    let highlighted: Vec<ObjectId> = select(host, studio, &HIGHLIGHTED)
        .into_iter()
        .filter(|id| !hidden.contains(id))
        .collect();

    if studio.is_pcb()
        && let Some(solder) = host.find_object(SOLDER_OBJECT)
        && !hidden.contains(&solder)
    {
        hidden.push(solder);
    }
    if highlighted.is_empty() {
        tracing::warn!("No highlighted components found!");
    }
    ComponentLists { highlighted, hidden }
}

/// Output name of `component` rendered on `side` with `camera`.
pub fn output_name(host: &dyn Host, studio: &Studio, component: ObjectId, side: Position, camera: &Camera) -> String {
    let suffix = if camera.preset == CameraPreset::Top {
        String::new()
    } else {
        format!("_{}", camera.preset.file_name())
    };
    let stem = output_stem(host, studio, component);
    if studio.is_pcb() {
        format!("highlights/{stem}{suffix}")
    } else {
        format!("highlights/{stem}{suffix}{}", side.initial())
    }
}

impl Job for HighlightsJob {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn override_snapshot(&self, studio: &Studio, snapshot: &mut Snapshot) {
        if let Some(bg) = studio.catalog().find_background(TRANSPARENT) {
            snapshot.backgrounds = vec![bg];
        }
        snapshot.positions = vec![Position::Top, Position::Bottom];
    }

    fn iterate(
        &mut self,
        host: &mut dyn Host,
        ctx: &mut JobContext<'_>,
        run: &mut JobRun,
    ) -> PcboothResult<()> {
        let studio = ctx.studio;
        let snapshot = run.snapshot.clone();
        let lists = component_lists(host, studio);
        let sides = if studio.is_pcb() { 1 } else { 2 };
        run.progress
            .set_total(lists.highlighted.len() * snapshot.cameras.len() * sides);

        let background = studio.background(snapshot.backgrounds[0]);
        use_background(host, studio.catalog().backgrounds(), background)?;

        let mut hide = HideOverride::new(lists.hidden.clone(), false);
        let mut white = MaterialOverride::new("white", host.objects()).with_color(hex_to_rgb(WHITE_RGB)?);
        let highlight_rgb = hex_to_rgb(HIGHLIGHT_RGB)?;
        let mut overrides: [&mut dyn ScopedOverride; 2] = [&mut hide, &mut white];

        scoped_all(host, &mut overrides, OnMissing::Fail, |host| {
            for cam_id in &snapshot.cameras {
                let camera = studio.camera(*cam_id);
                for component in &lists.highlighted {
                    let mut highlight =
                        MaterialOverride::new("highlight", vec![*component]).with_color(highlight_rgb);
                    scoped(host, &mut highlight, OnMissing::Fail, |host| {
                        for (side, members) in [
                            (Position::Top, studio.top_components()),
                            (Position::Bottom, studio.bottom_components()),
                        ] {
                            if members.contains(component) {
                                render_side(host, ctx, run, *component, side, camera)?;
                            }
                        }
                        Ok(())
                    })?;
                }
            }
            Ok(())
        })
    }
}

fn render_side(
    host: &mut dyn Host,
    ctx: &mut JobContext<'_>,
    run: &mut JobRun,
    component: ObjectId,
    side: Position,
    camera: &Camera,
) -> PcboothResult<()> {
    let studio = ctx.studio;
    let name = output_name(host, studio, component, side, camera);
    tracing::debug!("highlighting {} on {side}", designator(host.name(component)));
    studio.change_position(host, side)?;
    studio.update_backgrounds(host)?;
    camera.change_position(host, side)?;
    let result = ctx.renderer.render(host, camera.object, &name);
    ctx.renderer.clear_cache();
    run.record(result)
}

#[cfg(test)]
#[path = "../../tests/unit/jobs/highlights.rs"]
mod tests;

