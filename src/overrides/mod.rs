//! Reversible mutations of global host state.
//!
//! Every override is a [`ScopedOverride`] value driven by [`scoped`]: acquire, run the body,
//! release. Release runs on every exit path, also when acquisition or the body failed, and
//! a release error never hides the body's error. Overrides that need an optional host
//! feature name it through [`ScopedOverride::capability`]; the caller decides with
//! [`OnMissing`] whether a missing feature degrades to a no-op or fails.

use crate::foundation::error::{PcboothError, PcboothResult};
use crate::host::{Capability, Host};

pub mod objects;
pub mod render_state;

pub use objects::{HideOverride, HoldoutOverride, MaterialOverride, PositionOverride, ShadowOverride};
pub use render_state::{
    CompositingOverride, DofOverride, GlobalMaterialOverride, RenderQualityOverride,
    ShaderSwitchOverride, UserAnimationOverride,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnMissing {
    /// Run the body without the override.
    Skip,
    /// Return [`PcboothError::Unsupported`].
    Fail,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
    Applied,
    Unsupported(Capability),
}

/// Body result plus whether the override actually took effect.
#[derive(Clone, Debug, PartialEq)]
pub struct Scoped<T> {
    pub value: T,
    pub availability: Availability,
}

pub trait ScopedOverride {
    fn label(&self) -> &'static str;

    /// Host feature the override depends on, if any.
    fn capability(&self) -> Option<Capability> {
        None
    }

    fn acquire(&mut self, host: &mut dyn Host) -> PcboothResult<()>;

    /// Must be safe to call after a partial or failed `acquire`.
    fn release(&mut self, host: &mut dyn Host) -> PcboothResult<()>;
}

/// Run `body` with `ov` applied.
pub fn scoped<O, T>(
    host: &mut dyn Host,
    ov: &mut O,
    on_missing: OnMissing,
    body: impl FnOnce(&mut dyn Host) -> PcboothResult<T>,
) -> PcboothResult<Scoped<T>>
where
    O: ScopedOverride + ?Sized,
{
    if let Some(cap) = ov.capability()
        && !host.supports(cap)
    {
        return match on_missing {
            OnMissing::Skip => {
                tracing::debug!(
                    "{} override skipped: host does not support {cap}",
                    ov.label()
                );
                Ok(Scoped {
                    value: body(host)?,
                    availability: Availability::Unsupported(cap),
                })
            }
            OnMissing::Fail => Err(PcboothError::Unsupported(cap)),
        };
    }

    let out = ov.acquire(host).and_then(|()| body(host));
    let released = ov.release(host);
    match (out, released) {
        (Ok(value), Ok(())) => Ok(Scoped {
            value,
            availability: Availability::Applied,
        }),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(release)) => {
            tracing::error!("{} override release failed: {release}", ov.label());
            Err(e)
        }
        (Ok(_), Err(release)) => Err(release),
    }
}

/// Nest `overrides` in order (first outermost) around `body`.
pub fn scoped_all<T>(
    host: &mut dyn Host,
    overrides: &mut [&mut dyn ScopedOverride],
    on_missing: OnMissing,
    body: impl FnOnce(&mut dyn Host) -> PcboothResult<T>,
) -> PcboothResult<T> {
    let mut body = Some(body);
    let mut run = |h: &mut dyn Host| match body.take() {
        Some(f) => f(h),
        None => Err(PcboothError::host("override body already ran")),
    };
    nest(host, overrides, on_missing, &mut run)
}

fn nest<T>(
    host: &mut dyn Host,
    overrides: &mut [&mut dyn ScopedOverride],
    on_missing: OnMissing,
    body: &mut dyn FnMut(&mut dyn Host) -> PcboothResult<T>,
) -> PcboothResult<T> {
    match overrides.split_first_mut() {
        None => body(host),
        Some((first, rest)) => scoped(host, &mut **first, on_missing, |h| {
            nest(h, rest, on_missing, body)
        })
        .map(|s| s.value),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overrides/mod.rs"]
mod tests;
