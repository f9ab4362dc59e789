use crate::foundation::error::PcboothResult;
use crate::host::Host;
use crate::jobs::{Job, JobContext, JobRun};
use crate::overrides::{OnMissing, UserAnimationOverride, scoped};
use crate::studio::Studio;
use crate::studio::background::use_background;
use crate::studio::camera::Camera;

/// Videos of the authored animation for every position, background and camera.
///
/// Yields `<camera><position initial>_<background>_animation.<ext>`, plus a scaled-down
/// copy when `SETTINGS.THUMBNAILS` is set.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnimationJob;

impl AnimationJob {
    pub const NAME: &'static str = "ANIMATION";
}

impl Job for AnimationJob {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn iterate(
        &mut self,
        host: &mut dyn Host,
        ctx: &mut JobContext<'_>,
        run: &mut JobRun,
    ) -> PcboothResult<()> {
        let studio = ctx.studio;
        let mut animation = UserAnimationOverride::new(studio);
        scoped(host, &mut animation, OnMissing::Fail, |host| {
            let snapshot = run.snapshot.clone();
            let thumbnails = ctx.config.settings.thumbnails;
            run.progress.set_total(
                snapshot.positions.len() * snapshot.backgrounds.len() * snapshot.cameras.len(),
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
                        follow_model(host, studio, camera)?;

                        let name = format!(
                            "{}{}_{}_animation",
                            camera.preset.file_name(),
                            position.initial(),
                            background.name
                        );
                        let result = ctx
                            .renderer
                            .render_animation(host, camera.object, &name)
                            .and_then(|_| ctx.sequencer.run(&name, &name))
                            .and_then(|()| {
                                if thumbnails {
                                    ctx.sequencer.thumbnail(&name, &name)
                                } else {
                                    Ok(())
                                }
                            });
                        run.record(result)?;
                    }
                }
            }
            ctx.sequencer.cleanup_frames();
            Ok(())
        })
        .map(|s| s.value)
    }
}

/// Key `camera` on every authored frame so the model stays framed while it moves.
fn follow_model(host: &mut dyn Host, studio: &Studio, camera: &Camera) -> PcboothResult<()> {
    host.set_action(camera.object, None)?;
    let frames = host.frame_range();
    for frame in frames.start..frames.end {
        camera.add_keyframe_at(host, studio.top_parent(), frame, 1.0, true, true)?;
    }
    host.set_frame(frames.start)
}
