use crate::foundation::error::PcboothResult;
use crate::host::{Host, KeyChannel, ObjectId};

pub const TRANSPARENT: &str = "transparent";

/// Backdrop actor. `transparent` is an empty placeholder; others come from the host library.
#[derive(Clone, Debug)]
pub struct Background {
    pub name: String,
    pub object: ObjectId,
}

impl Background {
    pub fn create(host: &mut dyn Host, name: &str, collection: &str) -> PcboothResult<Self> {
        let object = if name == TRANSPARENT {
            host.add_empty(TRANSPARENT, Some(collection))?
        } else {
            host.import_background(name, collection)?
        };
        let mut loc = host.location(object);
        loc.z = 0.0;
        host.set_location(object, loc)?;
        host.set_hide_render(object, true)?;
        host.set_hide_viewport(object, true)?;
        tracing::debug!(background = name, "added background");
        Ok(Self {
            name: name.to_string(),
            object,
        })
    }

    pub fn is_transparent(&self) -> bool {
        self.name == TRANSPARENT
    }

    /// Rest the backdrop at height `z`.
    pub fn set_z(&self, host: &mut dyn Host, z: f32) -> PcboothResult<()> {
        let mut loc = host.location(self.object);
        loc.z = z;
        host.set_location(self.object, loc)
    }

    pub fn add_keyframe(&self, host: &mut dyn Host, frame: i32) -> PcboothResult<()> {
        host.insert_keyframe(self.object, KeyChannel::Location, frame)
    }
}

/// Make `active` the only render-visible background.
pub fn use_background(
    host: &mut dyn Host,
    all: &[Background],
    active: &Background,
) -> PcboothResult<()> {
    for bg in all {
        host.set_hide_render(bg.object, true)?;
    }
    host.set_hide_render(active.object, false)?;
    tracing::debug!(background = %active.name, "enabled background for render");
    Ok(())
}
