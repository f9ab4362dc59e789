use crate::foundation::error::PcboothResult;
use crate::host::{Host, ObjectId};
use crate::jobs::components::{output_stem, select};
use crate::jobs::frames::FrameSelector;
use crate::jobs::params::ParamReader;
use crate::jobs::{Job, JobContext, JobRun, frames_param};
use crate::overrides::{
    CompositingOverride, DofOverride, GlobalMaterialOverride, HoldoutOverride, OnMissing,
    RenderQualityOverride, ScopedOverride, scoped, scoped_all,
};
use crate::studio::Studio;
use crate::studio::background::{TRANSPARENT, use_background};
use crate::studio::catalog::Snapshot;
use crate::studio::presets::Position;

pub const DEFAULT_HIGHLIGHTED: [&str; 7] = ["A", "J", "PS", "T", "U", "IC", "POT"];

/// Mask variant: the component alone, or the component as seen with the rest of the model
/// occluding it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaskState {
    Full,
    Covered,
}

impl MaskState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Covered => "covered",
        }
    }
}

/// Black and white component masks, for locating each component in a full-color render.
///
/// Yields `masks/<state>/<camera><position initial>/<frame>/<designator or name>`.
#[derive(Clone, Debug)]
pub struct MasksJob {
    full: bool,
    covered: bool,
    highlighted: Vec<String>,
    frames: Vec<FrameSelector>,
}

impl Default for MasksJob {
    fn default() -> Self {
        Self {
            full: false,
            covered: true,
            highlighted: DEFAULT_HIGHLIGHTED.iter().map(ToString::to_string).collect(),
            frames: Vec::new(),
        }
    }
}

impl MasksJob {
    pub const NAME: &'static str = "MASKS";

    pub fn from_params(params: &serde_json::Value) -> PcboothResult<Self> {
        let defaults = Self::default();
        let mut reader = ParamReader::new(Self::NAME, params)?;
        let full = reader.get("FULL", defaults.full);
        let covered = reader.get("COVERED", defaults.covered);
        let highlighted = reader.strings("HIGHLIGHTED", &DEFAULT_HIGHLIGHTED);
        let frames = reader.get("FRAMES", Vec::new());
        reader.finish()?;
        Ok(Self {
            full,
            covered,
            highlighted,
            frames,
        })
    }

    pub fn states(&self) -> Vec<MaskState> {
        let mut states = Vec::new();
        if self.full {
            states.push(MaskState::Full);
        }
        if self.covered {
            states.push(MaskState::Covered);
        }
        states
    }
}

/// On PCBs a component is only masked from the side it is mounted on.
pub fn visible_from(studio: &Studio, component: ObjectId, position: Position) -> bool {
    if !studio.is_pcb() {
        return true;
    }
    let hidden = (studio.top_components().contains(&component) && position != Position::Top)
        || (studio.bottom_components().contains(&component) && position != Position::Bottom);
    !hidden
}

pub fn output_name(
    host: &dyn Host,
    studio: &Studio,
    component: ObjectId,
    state: MaskState,
    camera: &str,
    position: Position,
    frame_suffix: &str,
) -> String {
    let mut name = format!("masks/{}/{camera}{}/", state.name(), position.initial());
    let frame = frame_suffix.replace('_', "");
    if !frame.is_empty() {
        name.push_str(&frame);
        name.push('/');
    }
    name.push_str(&output_stem(host, studio, component));
    name
}

impl Job for MasksJob {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("FULL", self.full.to_string()),
            ("COVERED", self.covered.to_string()),
            ("HIGHLIGHTED", format!("[{}]", self.highlighted.join(", "))),
            ("FRAMES", frames_param(&self.frames)),
        ]
    }

    fn frames(&self) -> Option<&[FrameSelector]> {
        Some(&self.frames)
    }

    fn override_snapshot(&self, studio: &Studio, snapshot: &mut Snapshot) {
        if let Some(bg) = studio.catalog().find_background(TRANSPARENT) {
            snapshot.backgrounds = vec![bg];
        }
    }

    fn iterate(
        &mut self,
        host: &mut dyn Host,
        ctx: &mut JobContext<'_>,
        run: &mut JobRun,
    ) -> PcboothResult<()> {
        let states = self.states();
        if states.is_empty() {
            tracing::warn!("All subtypes of masks are disabled, nothing to render within this job.");
            return Ok(());
        }

        let studio = ctx.studio;
        let snapshot = run.snapshot.clone();
        let plan = run.plan.clone();
        let highlighted = select(host, studio, &self.highlighted);
        if highlighted.is_empty() {
            tracing::warn!("No highlighted components found!");
        }
        let per_camera: usize = snapshot
            .positions
            .iter()
            .map(|p| highlighted.iter().filter(|c| visible_from(studio, **c, *p)).count())
            .sum();
        run.progress
            .set_total(per_camera * snapshot.cameras.len() * states.len() * plan.frames().len());

        let background = studio.background(snapshot.backgrounds[0]);
        use_background(host, studio.catalog().backgrounds(), background)?;

        let mut quality = RenderQualityOverride::new();
        let mut compositing = CompositingOverride::monochrome_mask();
        let mut material = GlobalMaterialOverride::new();
        let mut overrides: [&mut dyn ScopedOverride; 3] = [&mut quality, &mut compositing, &mut material];

        scoped_all(host, &mut overrides, OnMissing::Skip, |host| {
            for position in &snapshot.positions {
                studio.change_position(host, *position)?;
                studio.update_backgrounds(host)?;
                for cam_id in &snapshot.cameras {
                    let camera = studio.camera(*cam_id);
                    camera.change_position(host, *position)?;
                    if plan.has_animation_data() {
                        studio.add_studio_keyframes(host, *cam_id, snapshot.frames)?;
                    }

                    let mut dof = DofOverride::new(camera.object, camera.depth_of_field());
                    scoped(host, &mut dof, OnMissing::Skip, |host| {
                        for frame in plan.frames() {
                            host.set_frame(*frame)?;
                            let suffix = plan.suffix(*frame);
                            for component in &highlighted {
                                if !visible_from(studio, *component, *position) {
                                    continue;
                                }
                                for state in &states {
                                    let name = output_name(
                                        host,
                                        studio,
                                        *component,
                                        *state,
                                        &camera.preset.file_name(),
                                        *position,
                                        &suffix,
                                    );
                                    let mut holdout =
                                        HoldoutOverride::new(vec![*component], *state == MaskState::Full);
                                    let result = scoped(host, &mut holdout, OnMissing::Fail, |host| {
                                        let rendered = ctx.renderer.render(host, camera.object, &name);
                                        ctx.renderer.clear_cache();
                                        Ok(rendered)
                                    })?
                                    .value;
                                    run.record(result)?;
                                }
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

#[cfg(test)]
#[path = "../../tests/unit/jobs/masks.rs"]
mod tests;
