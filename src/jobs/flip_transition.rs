use crate::foundation::error::PcboothResult;
use crate::host::{Host, KeyChannel};
use crate::jobs::{Job, JobContext, JobRun};
use crate::studio::Studio;
use crate::studio::background::{TRANSPARENT, use_background};
use crate::studio::camera::Camera;
use crate::studio::catalog::Snapshot;
use crate::studio::presets::Position;

/// Animations of the model flipping from `TOP` to `BOTTOM`, one per camera.
///
/// Yields `<camera>T_<camera>B` and the reverse `<camera>B_<camera>T`. Always rendered on
/// `transparent`; disabled with the orthographic camera.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlipTransitionJob;

impl FlipTransitionJob {
    pub const NAME: &'static str = "FLIPTRANSITION";
}

impl Job for FlipTransitionJob {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn override_snapshot(&self, studio: &Studio, snapshot: &mut Snapshot) {
        if let Some(bg) = studio.catalog().find_background(TRANSPARENT) {
            snapshot.backgrounds = vec![bg];
        }
        snapshot.positions = vec![Position::Top, Position::Bottom];
        if studio.scene().ortho_cam {
            tracing::warn!("{} is not supported with SCENE.ORTHO_CAM", Self::NAME);
            snapshot.cameras.clear();
        }
    }

    fn iterate(
        &mut self,
        host: &mut dyn Host,
        ctx: &mut JobContext<'_>,
        run: &mut JobRun,
    ) -> PcboothResult<()> {
        let studio = ctx.studio;
        let snapshot = run.snapshot.clone();
        let background = studio.background(snapshot.backgrounds[0]);
        use_background(host, studio.catalog().backgrounds(), background)?;
        run.progress.set_total(snapshot.cameras.len());

        create_model_keyframes(host, studio)?;
        for cam_id in &snapshot.cameras {
            let camera = studio.camera(*cam_id);
            let n = camera.preset.file_name();
            let name = format!("{n}T_{n}B");
            let reversed = format!("{n}B_{n}T");

            create_camera_keyframes(host, studio, camera)?;
            let result = ctx
                .renderer
                .render_animation(host, camera.object, &name)
                .and_then(|_| ctx.sequencer.run(&name, &name))
                .and_then(|()| ctx.sequencer.reverse(&name, &reversed));
            run.record(result)?;
        }
        ctx.sequencer.cleanup_frames();
        Ok(())
    }
}

/// Key the model's rotation: `TOP` on the first frame, `BOTTOM` on the last.
fn create_model_keyframes(host: &mut dyn Host, studio: &Studio) -> PcboothResult<()> {
    let frames = host.frame_range();
    let model = studio.top_parent();
    studio.change_position(host, Position::Top)?;
    host.insert_keyframe(model, KeyChannel::Rotation, frames.start)?;
    studio.change_position(host, Position::Bottom)?;
    host.insert_keyframe(model, KeyChannel::Rotation, frames.end)
}

fn create_camera_keyframes(host: &mut dyn Host, studio: &Studio, camera: &Camera) -> PcboothResult<()> {
    let frames = host.frame_range();
    camera.change_position(host, Position::Top)?;
    camera.add_keyframe(host, frames.start, true, true, true)?;

    camera.add_intermediate_keyframe(host, studio.rendered_obj(), 0.3, 1.4, true)?;
    camera.add_intermediate_keyframe(host, studio.rendered_obj(), 0.7, 1.4, true)?;

    camera.change_position(host, Position::Bottom)?;
    camera.add_keyframe(host, frames.end, true, true, true)
}
