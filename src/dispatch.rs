//! Top-level run: build every `OUTPUTS` job up front, then execute them in order.

use crate::config::Config;
use crate::encode::{EncodeRunner, VideoSequencer};
use crate::foundation::error::{PcboothError, PcboothResult};
use crate::host::Host;
use crate::jobs::{self, Job, JobContext, JobSummary, registry};
use crate::render::Renderer;
use crate::studio::Studio;

/// Outcome of one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub completed: Vec<JobSummary>,
    /// Jobs aborted by a host or output error, with the error message.
    pub aborted: Vec<(String, String)>,
}

impl RunReport {
    pub fn outputs(&self) -> usize {
        self.completed.iter().map(|s| s.outputs).sum()
    }

    pub fn failures(&self) -> usize {
        self.completed.iter().map(|s| s.failures).sum::<usize>() + self.aborted.len()
    }

    pub fn is_success(&self) -> bool {
        self.aborted.is_empty() && self.completed.iter().all(|s| s.failures == 0)
    }
}

/// Construct the configured jobs; parameter errors surface before anything renders.
pub fn build_jobs(config: &Config) -> PcboothResult<Vec<Box<dyn Job>>> {
    if config.outputs.is_empty() {
        return Err(PcboothError::config("No rendering jobs specified in OUTPUTS"));
    }
    tracing::debug!("Execution plan:");
    config
        .outputs
        .iter()
        .map(|entry| {
            tracing::debug!("- job: {} (params: {})", entry.name, entry.params);
            registry::build(entry)
        })
        .collect()
}

/// Build the studio on `host` and run every configured job against it.
///
/// Configuration and classification errors stop the run. A job aborted by anything else is
/// logged and recorded, and the remaining jobs still run.
#[tracing::instrument(skip_all)]
pub fn run(
    host: &mut dyn Host,
    config: &Config,
    board_name: &str,
    runner: Box<dyn EncodeRunner>,
) -> PcboothResult<RunReport> {
    config.ensure_valid()?;
    let mut jobs = build_jobs(config)?;
    let studio = Studio::new(host, config, board_name)?;
    let mut renderer = Renderer::new(config);
    let mut sequencer = VideoSequencer::new(config, runner);
    let mut ctx = JobContext {
        studio: &studio,
        config,
        renderer: &mut renderer,
        sequencer: &mut sequencer,
    };

    tracing::info!("Number of jobs to run: {}", jobs.len());
    let mut report = RunReport::default();
    for job in jobs.iter_mut() {
        tracing::debug!("Running job: {}", job.name());
        match jobs::execute(&mut **job, host, &mut ctx) {
            Ok(summary) => {
                tracing::debug!(
                    "Finished {}: {} outputs, {} failures",
                    summary.name,
                    summary.outputs,
                    summary.failures
                );
                report.completed.push(summary);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::error!("{} aborted: {e}", job.name());
                report.aborted.push((job.name().to_string(), e.to_string()));
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
#[path = "../tests/unit/dispatch.rs"]
mod tests;
