//! Rendering jobs: one `OUTPUTS` entry each.
//!
//! [`execute`] drives a [`Job`] through its lifecycle. It takes a copy of the studio's
//! selection, lets the job narrow it, resolves `FRAMES` for jobs that render the authored
//! animation, reports what is enabled and finally hands control to [`Job::iterate`].
//! Whatever happens, animation data is cleared from the host afterwards and the model is
//! returned to the `TOP` position.

use crate::config::Config;
use crate::encode::VideoSequencer;
use crate::foundation::error::PcboothResult;
use crate::host::Host;
use crate::overrides::{OnMissing, UserAnimationOverride, scoped};
use crate::render::Renderer;
use crate::studio::catalog::{ActorCatalog, Snapshot};
use crate::studio::{Studio, apply_frames};

pub mod animation;
pub mod camera_transition;
pub mod components;
pub mod flip_transition;
pub mod frames;
pub mod highlights;
pub mod masks;
pub mod params;
pub mod registry;
pub mod stackup;
pub mod static_images;

use frames::{FramePlan, FrameSelector};

/// Collaborators shared by every job of a run.
#[derive(Debug)]
pub struct JobContext<'a> {
    pub studio: &'a Studio,
    pub config: &'a Config,
    pub renderer: &'a mut Renderer,
    pub sequencer: &'a mut VideoSequencer,
}

pub trait Job: std::fmt::Debug {
    /// Upper-case name as written in `OUTPUTS`.
    fn name(&self) -> &'static str;

    /// `(key, value)` pairs listed in the job report.
    fn parameters(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// `FRAMES` request of jobs that can render frames of the authored animation.
    fn frames(&self) -> Option<&[FrameSelector]> {
        None
    }

    /// Narrow the configured selection for this job.
    fn override_snapshot(&self, _studio: &Studio, _snapshot: &mut Snapshot) {}

    fn iterate(
        &mut self,
        host: &mut dyn Host,
        ctx: &mut JobContext<'_>,
        run: &mut JobRun,
    ) -> PcboothResult<()>;
}

/// Render counter behind the `### Progress` log lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    iter: usize,
    total: usize,
}

impl Progress {
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        tracing::info!("Total renders: {total}");
    }

    pub fn step(&mut self) {
        self.iter += 1;
        let percent = self.iter * 100 / self.total.max(1);
        tracing::info!("### Progress: {}/{} ({percent}%)", self.iter, self.total);
    }

    pub fn iter(&self) -> usize {
        self.iter
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

/// State of one job execution.
#[derive(Clone, Debug)]
pub struct JobRun {
    pub snapshot: Snapshot,
    pub plan: FramePlan,
    pub progress: Progress,
    outputs: usize,
    failures: usize,
}

impl JobRun {
    pub fn new(snapshot: Snapshot, plan: FramePlan) -> Self {
        Self {
            snapshot,
            plan,
            progress: Progress::default(),
            outputs: 0,
            failures: 0,
        }
    }

    /// Count one combination. Output failures were logged where they happened and only
    /// skip the combination; any other error aborts the job.
    pub fn record(&mut self, result: PcboothResult<()>) -> PcboothResult<()> {
        self.progress.step();
        match result {
            Ok(()) => {
                self.outputs += 1;
                Ok(())
            }
            Err(e) if e.is_output_failure() => {
                self.failures += 1;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn summary(&self, name: &'static str) -> JobSummary {
        JobSummary {
            name,
            outputs: self.outputs,
            failures: self.failures,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JobSummary {
    pub name: &'static str,
    pub outputs: usize,
    pub failures: usize,
}

/// Run `job` against `ctx.studio`. On every exit animation data is cleared from the host
/// and the model is reset to `TOP`; a reset error never masks the job's own error.
#[tracing::instrument(skip_all, fields(job = job.name()))]
pub fn execute(
    job: &mut dyn Job,
    host: &mut dyn Host,
    ctx: &mut JobContext<'_>,
) -> PcboothResult<JobSummary> {
    let studio = ctx.studio;
    let result = run(job, host, ctx);
    studio.clear_animation(host);
    let reset = studio.reset_position(host);
    match (result, reset) {
        (Ok(summary), Ok(())) => Ok(summary),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(reset)) => {
            tracing::error!("failed to reset studio after {}: {reset}", job.name());
            Err(e)
        }
    }
}

fn run(job: &mut dyn Job, host: &mut dyn Host, ctx: &mut JobContext<'_>) -> PcboothResult<JobSummary> {
    let studio = ctx.studio;
    let mut snapshot = studio.snapshot();
    studio.set_frames(host, &mut snapshot, true)?;
    let configured = snapshot.clone();
    job.override_snapshot(studio, &mut snapshot);
    if snapshot != configured {
        tracing::warn!(
            "Studio components from config will be overridden with values defined in {}!",
            job.name()
        );
    }

    match job.frames().map(<[FrameSelector]>::to_vec) {
        None => {
            let plan = FramePlan::resolve(&[], snapshot.frames);
            start(job, host, ctx, JobRun::new(snapshot, plan))
        }
        Some(request) if request.is_empty() => {
            let plan = FramePlan::resolve(&[], snapshot.frames);
            apply_frames(host, plan.span())?;
            start(job, host, ctx, JobRun::new(snapshot, plan))
        }
        Some(request) => {
            let mut animation = UserAnimationOverride::new(studio);
            scoped(host, &mut animation, OnMissing::Fail, |host| {
                studio.set_frames(host, &mut snapshot, false)?;
                let plan = FramePlan::resolve(&request, snapshot.frames);
                apply_frames(host, plan.span())?;
                start(job, host, ctx, JobRun::new(snapshot, plan))
            })
            .map(|s| s.value)
        }
    }
}

fn start(
    job: &mut dyn Job,
    host: &mut dyn Host,
    ctx: &mut JobContext<'_>,
    mut run: JobRun,
) -> PcboothResult<JobSummary> {
    if !report(job, ctx.studio.catalog(), &run.snapshot) {
        return Ok(run.summary(job.name()));
    }
    job.iterate(host, ctx, &mut run)?;
    let summary = run.summary(job.name());
    if summary.outputs == 0 {
        tracing::warn!("{} finished without producing any output", job.name());
    }
    Ok(summary)
}

/// Log the job's enabled selection; `false` when any dimension is empty.
pub fn report(job: &dyn Job, catalog: &ActorCatalog, snapshot: &Snapshot) -> bool {
    tracing::info!("### {} rendering job", job.name());
    let mut items = vec![
        ("rendered object positions", snapshot.position_names().join(", ")),
        ("cameras", snapshot.camera_names(catalog).join(", ")),
        ("backgrounds", snapshot.background_names(catalog).join(", ")),
    ];
    let params = job.parameters();
    if !params.is_empty() {
        let joined: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        items.push(("parameters", joined.join(", ")));
    }

    for (item, value) in &items {
        if value.is_empty() {
            tracing::warn!("\t* no enabled {item}!");
        } else {
            tracing::info!("\t* enabled {item}: {value}");
        }
    }
    if items.iter().any(|(_, v)| v.is_empty()) {
        tracing::warn!("Nothing to render within this job.");
        return false;
    }
    true
}

/// `FRAMES` as shown in reports, e.g. `[start, 12]`.
pub fn frames_param(frames: &[FrameSelector]) -> String {
    let items: Vec<String> = frames.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
#[path = "../../tests/unit/jobs/mod.rs"]
mod tests;
