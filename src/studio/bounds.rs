//! Scoped bounding volume of a set of objects.

use crate::foundation::core::{Aabb, Vec3};
use crate::foundation::error::{PcboothError, PcboothResult};
use crate::host::{Host, ObjectId, ObjectKind};

const ANCHOR_NAME: &str = "_bbox";

/// Combined world bounds plus a synthetic anchor object placed at their center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub aabb: Aabb,
    pub anchor: ObjectId,
}

impl Bounds {
    /// Compute bounds of `objects`, run `body`, then remove the anchor.
    ///
    /// The anchor is removed on every exit path. Lights, cameras and objects without
    /// geometry do not contribute; an empty result is an error.
    pub fn with<T>(
        host: &mut dyn Host,
        objects: &[ObjectId],
        body: impl FnOnce(&mut dyn Host, &Bounds) -> PcboothResult<T>,
    ) -> PcboothResult<T> {
        let aabb = Self::measure(host, objects)?;
        let anchor = host.add_empty(ANCHOR_NAME, None)?;
        let out = host
            .set_location(anchor, aabb.center())
            .and_then(|()| body(host, &Bounds { aabb, anchor }));
        let removed = host.remove_object(anchor);
        match (out, removed) {
            (Ok(v), Ok(())) => Ok(v),
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(e),
        }
    }

    /// Bounds without creating an anchor.
    pub fn measure(host: &dyn Host, objects: &[ObjectId]) -> PcboothResult<Aabb> {
        objects
            .iter()
            .filter(|o| {
                !matches!(
                    host.kind(**o),
                    Some(ObjectKind::Light | ObjectKind::Camera) | None
                )
            })
            .filter_map(|o| host.world_bounds(*o))
            .reduce(Aabb::union)
            .ok_or_else(|| PcboothError::host("no bounding box vertices found"))
    }

    pub fn center(&self) -> Vec3 {
        self.aabb.center()
    }

    pub fn dimensions(&self) -> Vec3 {
        self.aabb.size()
    }

    pub fn min_z(&self) -> f32 {
        self.aabb.min.z
    }

    pub fn max_z(&self) -> f32 {
        self.aabb.max.z
    }
}

#[cfg(test)]
#[path = "../../tests/unit/studio/bounds.rs"]
mod tests;
