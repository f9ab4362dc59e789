//! Overrides scoped to a set of scene objects.

use crate::foundation::core::Vec3;
use crate::foundation::error::PcboothResult;
use crate::host::{Capability, Host, ObjectId};
use crate::overrides::ScopedOverride;
use crate::studio::Studio;

/// Put one material into every slot of `components`; slotless meshes get a slot for the
/// duration. Linked objects are left alone.
#[derive(Clone, Debug)]
pub struct MaterialOverride {
    material: String,
    color: Option<[f32; 3]>,
    components: Vec<ObjectId>,
    backup: Vec<(ObjectId, Vec<Option<String>>)>,
}

impl MaterialOverride {
    pub fn new(material: impl Into<String>, components: Vec<ObjectId>) -> Self {
        Self {
            material: material.into(),
            color: None,
            components,
            backup: Vec::new(),
        }
    }

    /// Create or recolor the material on acquire.
    pub fn with_color(mut self, rgb: [f32; 3]) -> Self {
        self.color = Some(rgb);
        self
    }
}

impl ScopedOverride for MaterialOverride {
    fn label(&self) -> &'static str {
        "material"
    }

    fn capability(&self) -> Option<Capability> {
        Some(Capability::MaterialSlots)
    }

    fn acquire(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        host.ensure_material(&self.material, self.color)?;
        for id in &self.components {
            if host.is_linked(*id) || !host.has_material_data(*id) {
                continue;
            }
            let slots = host.material_slots(*id);
            let replaced = if slots.is_empty() {
                vec![Some(self.material.clone())]
            } else {
                vec![Some(self.material.clone()); slots.len()]
            };
            self.backup.push((*id, slots));
            host.set_material_slots(*id, replaced)?;
        }
        Ok(())
    }

    fn release(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        for (id, slots) in self.backup.drain(..) {
            host.set_material_slots(id, slots)?;
        }
        Ok(())
    }
}

/// Render `components` as transparent holes. With `full`, every other non-linked object is
/// hidden so only the holes' silhouettes remain.
#[derive(Clone, Debug)]
pub struct HoldoutOverride {
    components: Vec<ObjectId>,
    full: bool,
    visibility: Vec<(ObjectId, bool)>,
    holdouts: Vec<(ObjectId, bool)>,
}

impl HoldoutOverride {
    pub fn new(components: Vec<ObjectId>, full: bool) -> Self {
        Self {
            components,
            full,
            visibility: Vec::new(),
            holdouts: Vec::new(),
        }
    }
}

impl ScopedOverride for HoldoutOverride {
    fn label(&self) -> &'static str {
        "holdout"
    }

    fn capability(&self) -> Option<Capability> {
        Some(Capability::Holdout)
    }

    fn acquire(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        self.visibility = host
            .objects()
            .into_iter()
            .filter(|id| !host.is_linked(*id))
            .map(|id| (id, host.hide_render(id)))
            .collect();
        if self.full {
            for (id, _) in &self.visibility {
                host.set_hide_render(*id, true)?;
            }
        }
        for id in &self.components {
            if host.is_linked(*id) {
                continue;
            }
            self.holdouts.push((*id, host.is_holdout(*id)));
            host.set_holdout(*id, true)?;
            host.set_hide_render(*id, false)?;
        }
        Ok(())
    }

    fn release(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        for (id, hidden) in self.visibility.drain(..) {
            host.set_hide_render(id, hidden)?;
        }
        for (id, holdout) in self.holdouts.drain(..) {
            host.set_holdout(id, holdout)?;
        }
        Ok(())
    }
}

/// Hide `components` from render, and optionally from the viewport so framing ignores them.
#[derive(Clone, Debug)]
pub struct HideOverride {
    components: Vec<ObjectId>,
    viewport: bool,
    backup: Vec<(ObjectId, bool, bool)>,
}

impl HideOverride {
    pub fn new(components: Vec<ObjectId>, viewport: bool) -> Self {
        Self {
            components,
            viewport,
            backup: Vec::new(),
        }
    }
}

impl ScopedOverride for HideOverride {
    fn label(&self) -> &'static str {
        "hide"
    }

    fn acquire(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        for id in &self.components {
            self.backup
                .push((*id, host.hide_render(*id), host.hide_viewport(*id)));
            host.set_hide_render(*id, true)?;
            if self.viewport {
                host.set_hide_viewport(*id, true)?;
            }
        }
        Ok(())
    }

    fn release(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        for (id, render, viewport) in self.backup.drain(..) {
            host.set_hide_render(id, render)?;
            host.set_hide_viewport(id, viewport)?;
        }
        Ok(())
    }
}

/// Stop `components` from casting shadows.
#[derive(Clone, Debug)]
pub struct ShadowOverride {
    components: Vec<ObjectId>,
    backup: Vec<(ObjectId, bool)>,
}

impl ShadowOverride {
    pub fn new(components: Vec<ObjectId>) -> Self {
        Self {
            components,
            backup: Vec::new(),
        }
    }
}

impl ScopedOverride for ShadowOverride {
    fn label(&self) -> &'static str {
        "shadow"
    }

    fn capability(&self) -> Option<Capability> {
        Some(Capability::ShadowVisibility)
    }

    fn acquire(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        for id in &self.components {
            self.backup.push((*id, host.visible_shadow(*id)));
            host.set_visible_shadow(*id, false)?;
        }
        Ok(())
    }

    fn release(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        for (id, visible) in self.backup.drain(..) {
            host.set_visible_shadow(id, visible)?;
        }
        Ok(())
    }
}

/// Moves objects through their delta transforms.
pub type Relocate = fn(&mut dyn Host, &[ObjectId]) -> PcboothResult<()>;

/// Relocate `objects` with a caller function and keep lights and backgrounds fitted.
///
/// Release zeroes the delta transforms instead of restoring a backup, so callers must only
/// move objects through deltas.
pub struct PositionOverride<'a> {
    studio: Option<&'a Studio>,
    objects: Vec<ObjectId>,
    relocate: Relocate,
}

impl<'a> PositionOverride<'a> {
    pub fn new(objects: Vec<ObjectId>, relocate: Relocate) -> Self {
        Self {
            studio: None,
            objects,
            relocate,
        }
    }

    /// Refit the studio's lights and backgrounds after moving and after resetting.
    pub fn resync(mut self, studio: &'a Studio) -> Self {
        self.studio = Some(studio);
        self
    }

    fn sync(&self, host: &mut dyn Host) -> PcboothResult<()> {
        if let Some(studio) = self.studio {
            studio.update_lights(host)?;
            studio.update_backgrounds(host)?;
        }
        Ok(())
    }
}

impl ScopedOverride for PositionOverride<'_> {
    fn label(&self) -> &'static str {
        "position"
    }

    fn acquire(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        (self.relocate)(host, &self.objects)?;
        self.sync(host)
    }

    fn release(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        for id in &self.objects {
            host.set_delta_location(*id, Vec3::ZERO)?;
            host.set_delta_rotation(*id, Vec3::ZERO)?;
        }
        self.sync(host)
    }
}
