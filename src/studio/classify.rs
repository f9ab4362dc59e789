//! Model-shape recognition: which object the cameras frame, which one gets rotated and
//! which components sit on each side of the model.

use crate::config::{RenderedObject, Scene};
use crate::foundation::core::Vec3;
use crate::foundation::error::{PcboothError, PcboothResult};
use crate::host::{Host, ObjectId, ObjectKind};
use crate::studio::bounds::Bounds;

pub const BOARD_COLLECTION: &str = "Board";
pub const COMPONENTS_COLLECTION: &str = "Components";
pub const SIDE_PROPERTY: &str = "PCB_Side";
pub const PARENT_ANCHOR: &str = "_parent";
pub const RENDERED_ANCHOR: &str = "_rendered_parent";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    Pcb,
    Collection,
    SingleObject,
    Unknown,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pcb => "PCB",
            Self::Collection => "collection",
            Self::SingleObject => "single object",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug)]
pub struct Classification {
    pub kind: ModelKind,
    /// Framed by cameras.
    pub rendered_obj: ObjectId,
    /// Rotated into each position.
    pub top_parent: ObjectId,
    pub top_components: Vec<ObjectId>,
    pub bottom_components: Vec<ObjectId>,
}

impl Classification {
    pub fn is_pcb(&self) -> bool {
        self.kind == ModelKind::Pcb
    }

    /// Union of both sides, top first, without duplicates.
    pub fn components(&self) -> Vec<ObjectId> {
        let mut out = self.top_components.clone();
        for c in &self.bottom_components {
            if !out.contains(c) {
                out.push(*c);
            }
        }
        out
    }
}

/// Recognize the loaded model. Names given in `scene.rendered_object` must exist.
#[tracing::instrument(skip(host, scene))]
pub fn classify(
    host: &mut dyn Host,
    scene: &Scene,
    board_name: &str,
) -> PcboothResult<Classification> {
    match &scene.rendered_object {
        Some(RenderedObject::Object(name)) => {
            tracing::info!("rendering from object: {name}");
            return as_single_object(host, name);
        }
        Some(RenderedObject::Collection(name)) => {
            tracing::info!("rendering from collection: {name}");
            return as_collection(host, name);
        }
        None => {}
    }

    if host.has_collection(BOARD_COLLECTION)
        && let Some(board) = host.find_object(board_name)
    {
        tracing::info!("PCB type model was recognized");
        let (top_components, bottom_components) = pcb_sides(host);
        return Ok(Classification {
            kind: ModelKind::Pcb,
            rendered_obj: board,
            top_parent: board,
            top_components,
            bottom_components,
        });
    }

    let objects = host.objects();
    if let [only] = objects.as_slice() {
        let name = host.name(*only).to_string();
        tracing::info!("rendering from object: {name}");
        return as_single_object(host, &name);
    }

    tracing::info!("unknown type model was recognized");
    let components = side_candidates(host, &objects);
    let parent = add_anchor(host, PARENT_ANCHOR, &objects, Vec3::ZERO)?;
    Ok(Classification {
        kind: ModelKind::Unknown,
        rendered_obj: parent,
        top_parent: parent,
        top_components: components.clone(),
        bottom_components: components,
    })
}

fn as_single_object(host: &mut dyn Host, name: &str) -> PcboothResult<Classification> {
    let rendered = host.find_object(name).ok_or_else(|| {
        PcboothError::classification(format!("object '{name}' could not be found in the scene"))
    })?;
    let objects = host.objects();
    let components = side_candidates(host, &objects);
    let origin = host.matrix_world(rendered).w_axis.truncate();
    let parent = add_anchor(host, PARENT_ANCHOR, &objects, origin)?;
    host.set_origin_to_geometry(rendered)?;
    Ok(Classification {
        kind: ModelKind::SingleObject,
        rendered_obj: rendered,
        top_parent: parent,
        top_components: components.clone(),
        bottom_components: components,
    })
}

fn as_collection(host: &mut dyn Host, name: &str) -> PcboothResult<Classification> {
    let members = host.collection_objects(name).ok_or_else(|| {
        PcboothError::classification(format!("collection '{name}' could not be found in the scene"))
    })?;
    let objects = host.objects();
    let components = side_candidates(host, &members);
    let center = match Bounds::measure(host, &members) {
        Ok(aabb) => aabb.center(),
        Err(_) => Vec3::ZERO,
    };
    let rendered = add_anchor(host, RENDERED_ANCHOR, &members, Vec3::ZERO)?;
    let parent = add_anchor(host, PARENT_ANCHOR, &objects, center)?;
    host.set_parent(rendered, Some(parent))?;
    Ok(Classification {
        kind: ModelKind::Collection,
        rendered_obj: rendered,
        top_parent: parent,
        top_components: components.clone(),
        bottom_components: components,
    })
}

/// Non-linked objects whose names do not start with `_`.
fn side_candidates(host: &dyn Host, objects: &[ObjectId]) -> Vec<ObjectId> {
    objects
        .iter()
        .copied()
        .filter(|o| !host.name(*o).starts_with('_') && !host.is_linked(*o))
        .collect()
}

/// Split the `Components` collection by the `PCB_Side` tag.
fn pcb_sides(host: &dyn Host) -> (Vec<ObjectId>, Vec<ObjectId>) {
    let mut top = Vec::new();
    let mut bottom = Vec::new();
    let Some(components) = host.collection_objects(COMPONENTS_COLLECTION) else {
        return (top, bottom);
    };
    for comp in components {
        if host.is_linked(comp) {
            continue;
        }
        match host.custom_property(comp, SIDE_PROPERTY).as_ref().and_then(|v| v.as_str()) {
            Some("T") => top.push(comp),
            Some("B") => bottom.push(comp),
            _ => {}
        }
    }
    tracing::debug!(top = top.len(), bottom = bottom.len(), "read component sides");
    (top, bottom)
}

/// Create an empty at `origin` and parent every eligible object to it, keeping world transforms.
pub fn add_anchor(
    host: &mut dyn Host,
    name: &str,
    children: &[ObjectId],
    origin: Vec3,
) -> PcboothResult<ObjectId> {
    let anchor = host.add_empty(name, None)?;
    host.set_location(anchor, origin)?;
    for child in children {
        if !adoptable(host, *child) {
            continue;
        }
        host.set_parent(*child, Some(anchor))?;
    }
    Ok(anchor)
}

fn adoptable(host: &dyn Host, id: ObjectId) -> bool {
    host.parent(id).is_none()
        && !host.is_linked(id)
        && !matches!(host.kind(id), Some(ObjectKind::Light | ObjectKind::Camera) | None)
}

#[cfg(test)]
#[path = "../../tests/unit/studio/classify.rs"]
mod tests;
