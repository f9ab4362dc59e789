//! Explicit mapping from `OUTPUTS` names to job constructors.

use crate::config::JobEntry;
use crate::foundation::error::{PcboothError, PcboothResult};
use crate::jobs::Job;
use crate::jobs::animation::AnimationJob;
use crate::jobs::camera_transition::CameraTransitionJob;
use crate::jobs::flip_transition::FlipTransitionJob;
use crate::jobs::highlights::HighlightsJob;
use crate::jobs::masks::MasksJob;
use crate::jobs::stackup::StackupJob;
use crate::jobs::static_images::StaticJob;

/// Every job name accepted in `OUTPUTS`.
pub const JOB_NAMES: [&str; 7] = [
    StaticJob::NAME,
    AnimationJob::NAME,
    CameraTransitionJob::NAME,
    FlipTransitionJob::NAME,
    HighlightsJob::NAME,
    MasksJob::NAME,
    StackupJob::NAME,
];

pub fn is_registered(name: &str) -> bool {
    JOB_NAMES.contains(&name)
}

/// Build the job for one `OUTPUTS` entry, validating its parameters.
pub fn build(entry: &JobEntry) -> PcboothResult<Box<dyn Job>> {
    let job: Box<dyn Job> = match entry.name.as_str() {
        StaticJob::NAME => Box::new(StaticJob::from_params(&entry.params)?),
        MasksJob::NAME => Box::new(MasksJob::from_params(&entry.params)?),
        name => {
            let unit: Box<dyn Job> = match name {
                AnimationJob::NAME => Box::new(AnimationJob),
                CameraTransitionJob::NAME => Box::new(CameraTransitionJob),
                FlipTransitionJob::NAME => Box::new(FlipTransitionJob),
                HighlightsJob::NAME => Box::new(HighlightsJob),
                StackupJob::NAME => Box::new(StackupJob),
                other => {
                    return Err(PcboothError::config(format!(
                        "unknown job '{other}' (known: {})",
                        JOB_NAMES.join(", ")
                    )));
                }
            };
            if entry.params.as_object().is_some_and(|m| !m.is_empty()) {
                tracing::warn!("{name} takes no parameters, ignoring them");
            }
            unit
        }
    };
    Ok(job)
}

#[cfg(test)]
#[path = "../../tests/unit/jobs/registry.rs"]
mod tests;
