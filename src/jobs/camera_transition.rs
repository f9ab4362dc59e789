use crate::foundation::error::{PcboothError, PcboothResult};
use crate::host::Host;
use crate::jobs::{Job, JobContext, JobRun};
use crate::studio::Studio;
use crate::studio::background::{TRANSPARENT, use_background};
use crate::studio::camera::Camera;
use crate::studio::catalog::{CameraId, Snapshot};
use crate::studio::presets::Position;

/// Animations flying from one camera angle to another within the same position.
///
/// Every pair of enabled cameras yields `<a><P>_<b><P>` and its reverse `<b><P>_<a><P>`,
/// e.g. `leftT_rightT.webm` and `rightT_leftT.webm`. Always rendered on `transparent`;
/// disabled with the orthographic camera.
#[derive(Clone, Copy, Debug, Default)]
pub struct CameraTransitionJob;

impl CameraTransitionJob {
    pub const NAME: &'static str = "CAMERATRANSITION";
}

/// Unordered pairs in selection order, like `(a, b), (a, c), (b, c)`.
pub fn camera_pairs(cameras: &[CameraId]) -> Vec<(CameraId, CameraId)> {
    let mut pairs = Vec::new();
    for (i, a) in cameras.iter().enumerate() {
        for b in &cameras[i + 1..] {
            pairs.push((*a, *b));
        }
    }
    pairs
}

impl Job for CameraTransitionJob {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn override_snapshot(&self, studio: &Studio, snapshot: &mut Snapshot) {
        if let Some(bg) = studio.catalog().find_background(TRANSPARENT) {
            snapshot.backgrounds = vec![bg];
        }
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

        let pairs = camera_pairs(&snapshot.cameras);
        tracing::debug!("combined pairs: {pairs:?}");
        run.progress.set_total(pairs.len() * snapshot.positions.len());

        for position in &snapshot.positions {
            studio.change_position(host, *position)?;
            for (start_id, end_id) in &pairs {
                let start = studio.camera(*start_id);
                let end = studio.camera(*end_id);
                start.change_position(host, *position)?;
                end.change_position(host, *position)?;

                let p = position.initial();
                let (a, b) = (start.preset.file_name(), end.preset.file_name());
                let name = format!("{a}{p}_{b}{p}");
                let reversed = format!("{b}{p}_{a}{p}");

                create_keyframes(host, studio, start, end, *position)?;
                let result = ctx
                    .renderer
                    .render_animation(host, start.object, &name)
                    .and_then(|_| ctx.sequencer.run(&name, &name))
                    .and_then(|()| ctx.sequencer.reverse(&name, &reversed));
                run.record(result)?;
                studio.clear_animation(host);
            }
        }
        ctx.sequencer.cleanup_frames();
        Ok(())
    }
}

/// Key `start` at the first frame, move it onto `end`'s saved pose and key the last frame,
/// then add zoomed-out keys in between so the model stays in view.
fn create_keyframes(
    host: &mut dyn Host,
    studio: &Studio,
    start: &Camera,
    end: &Camera,
    position: Position,
) -> PcboothResult<()> {
    let frames = host.frame_range();
    start.add_keyframe(host, frames.start, true, true, true)?;

    let matrix = end.saved_position(position).ok_or_else(|| {
        PcboothError::host(format!("{} has no saved {position} transform", end.name()))
    })?;
    let focus = end.saved_focus(position).ok_or_else(|| {
        PcboothError::host(format!("{} has no saved {position} focus", end.name()))
    })?;
    host.set_matrix_world(start.object, matrix)?;
    start.apply_focus(host, focus)?;
    start.add_keyframe(host, frames.end, true, true, true)?;

    start.add_intermediate_keyframe(host, studio.rendered_obj(), 0.2, 1.1, true)?;
    start.add_intermediate_keyframe(host, studio.top_parent(), 0.5, 1.1, true)?;
    start.add_intermediate_keyframe(host, studio.rendered_obj(), 0.8, 1.1, true)
}
