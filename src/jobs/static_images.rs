use crate::foundation::error::PcboothResult;
use crate::host::Host;
use crate::jobs::frames::FrameSelector;
use crate::jobs::params::ParamReader;
use crate::jobs::{Job, JobContext, JobRun, frames_param};
use crate::studio::background::use_background;

/// Still images for every position, background and camera, optionally at frames of the
/// authored animation.
///
/// Yields `<camera><position initial>_<background><frame suffix>` plus a thumbnail, e.g.
/// `rightT_paper_black.png`.
#[derive(Clone, Debug, Default)]
pub struct StaticJob {
    frames: Vec<FrameSelector>,
}

impl StaticJob {
    pub const NAME: &'static str = "STATIC";

    pub fn from_params(params: &serde_json::Value) -> PcboothResult<Self> {
        let mut reader = ParamReader::new(Self::NAME, params)?;
        let frames = reader.get("FRAMES", Vec::new());
        reader.finish()?;
        Ok(Self { frames })
    }
}

impl Job for StaticJob {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![("FRAMES", frames_param(&self.frames))]
    }

    fn frames(&self) -> Option<&[FrameSelector]> {
        Some(&self.frames)
    }

    fn iterate(
        &mut self,
        host: &mut dyn Host,
        ctx: &mut JobContext<'_>,
        run: &mut JobRun,
    ) -> PcboothResult<()> {
        let studio = ctx.studio;
        let snapshot = run.snapshot.clone();
        let plan = run.plan.clone();
        run.progress.set_total(
            snapshot.positions.len()
                * snapshot.cameras.len()
                * snapshot.backgrounds.len()
                * plan.frames().len(),
        );

        for position in &snapshot.positions {
            studio.change_position(host, *position)?;
            studio.update_backgrounds(host)?;
            for bg_id in &snapshot.backgrounds {
                let background = studio.background(*bg_id);
                use_background(host, studio.catalog().backgrounds(), background)?;
                for cam_id in &snapshot.cameras {
                    let camera = studio.camera(*cam_id);
                    camera.change_position(host, *position)?;
                    if plan.has_animation_data() {
                        studio.add_studio_keyframes(host, *cam_id, snapshot.frames)?;
                    }

                    for frame in plan.frames() {
                        host.set_frame(*frame)?;
                        let name = format!(
                            "{}{}_{}{}",
                            camera.preset.file_name(),
                            position.initial(),
                            background.name,
                            plan.suffix(*frame)
                        );
                        let result = ctx
                            .renderer
                            .render(host, camera.object, &name)
                            .and_then(|()| ctx.renderer.thumbnail(host, camera.object, &name));
                        ctx.renderer.clear_cache();
                        run.record(result)?;
                    }
                }
            }
        }
        Ok(())
    }
}
