use std::collections::BTreeMap;

use crate::foundation::core::FrameSpan;
use crate::foundation::error::PcboothResult;
use crate::host::{Action, Host, KeyChannel, ObjectId};

/// Authored animation found in the scene before the studio touched it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationBackup {
    actions: BTreeMap<ObjectId, Action>,
}

impl AnimationBackup {
    /// Copy every authored action. Object location keys become delta keys so that
    /// position presets and authored motion compose instead of fighting.
    pub fn capture(host: &dyn Host) -> Self {
        let mut actions = BTreeMap::new();
        for id in host.objects() {
            let Some(mut action) = host.action(id) else {
                continue;
            };
            if action.is_empty() {
                continue;
            }
            if let Some(keys) = action.channels.remove(&KeyChannel::Location) {
                let rest = host.location(id);
                let deltas = action.channels.entry(KeyChannel::DeltaLocation).or_default();
                for mut key in keys {
                    key.value -= rest;
                    deltas.push(key);
                }
                deltas.sort_by_key(|k| k.frame);
            }
            actions.insert(id, action);
        }
        tracing::debug!(objects = actions.len(), "backed up authored animation");
        Self { actions }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.actions.keys().copied()
    }

    /// Span from the earliest to the latest authored key.
    pub fn frame_range(&self) -> Option<FrameSpan> {
        self.actions
            .values()
            .filter_map(Action::frame_range)
            .reduce(|a, b| FrameSpan {
                start: a.start.min(b.start),
                end: a.end.max(b.end),
            })
    }

    /// Reattach the authored actions to their objects.
    pub fn restore(&self, host: &mut dyn Host) -> PcboothResult<()> {
        for (id, action) in &self.actions {
            host.set_action(*id, Some(action.clone()))?;
        }
        Ok(())
    }
}

/// Drop every action in the scene. The backup stays intact.
pub fn clear_animation(host: &mut dyn Host) {
    tracing::debug!("clearing animation data");
    host.clear_animation();
}

#[cfg(test)]
#[path = "../../tests/unit/studio/animation.rs"]
mod tests;
