//! Component selection shared by the highlight and mask jobs.

use crate::host::{Host, ObjectId};
use crate::studio::{BACKGROUNDS_COLLECTION, Studio};

/// Solder paste object of generated PCB models.
pub const SOLDER_OBJECT: &str = "Solder";

/// Reference designator of a component object, e.g. `J1` for `J1:USB_C`.
pub fn designator(name: &str) -> &str {
    name.split(':').next().unwrap_or(name)
}

pub fn matches_prefix<S: AsRef<str>>(designator: &str, prefixes: &[S]) -> bool {
    prefixes.iter().any(|p| designator.starts_with(p.as_ref()))
}

/// File stem for a component: its designator on PCBs, its full name otherwise.
pub fn output_stem(host: &dyn Host, studio: &Studio, id: ObjectId) -> String {
    let name = host.name(id);
    if studio.is_pcb() {
        designator(name).to_string()
    } else {
        name.to_string()
    }
}

/// Components on PCBs selected by designator prefix; every component on other models.
pub fn select<S: AsRef<str>>(host: &dyn Host, studio: &Studio, prefixes: &[S]) -> Vec<ObjectId> {
    studio
        .classification()
        .components()
        .into_iter()
        .filter(|id| !studio.is_pcb() || matches_prefix(designator(host.name(*id)), prefixes))
        .collect()
}

pub fn is_background(host: &dyn Host, id: ObjectId) -> bool {
    host.collection_objects(BACKGROUNDS_COLLECTION)
        .is_some_and(|objs| objs.contains(&id))
}

/// Linked objects other than studio backgrounds.
pub fn linked_props(host: &dyn Host) -> Vec<ObjectId> {
    host.objects()
        .into_iter()
        .filter(|id| host.is_linked(*id) && !is_background(host, *id))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/jobs/components.rs"]
mod tests;
