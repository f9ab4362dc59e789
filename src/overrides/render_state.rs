//! Overrides of scene-wide render state.

use crate::foundation::core::FrameSpan;
use crate::foundation::error::PcboothResult;
use crate::host::{Capability, Compositing, Host, ObjectId, RenderQuality};
use crate::overrides::ScopedOverride;
use crate::studio::{Studio, apply_frames};

pub const OVERRIDE_MATERIAL: &str = "_override";
pub const SOLDER_GROUP: &str = "Color_group";
pub const SOLDER_NODE: &str = "Solder_Switch";

/// Render every object with one material.
#[derive(Clone, Debug, Default)]
pub struct GlobalMaterialOverride {
    material: Option<String>,
    previous: Option<String>,
}

impl GlobalMaterialOverride {
    /// Use `_override`, created on demand.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_material(material: impl Into<String>) -> Self {
        Self {
            material: Some(material.into()),
            previous: None,
        }
    }
}

impl ScopedOverride for GlobalMaterialOverride {
    fn label(&self) -> &'static str {
        "global material"
    }

    fn capability(&self) -> Option<Capability> {
        Some(Capability::MaterialOverride)
    }

    fn acquire(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        self.previous = host.global_material_override();
        let name = self.material.as_deref().unwrap_or(OVERRIDE_MATERIAL);
        host.ensure_material(name, None)?;
        host.set_global_material_override(Some(name))
    }

    fn release(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        host.set_global_material_override(self.previous.take().as_deref())
    }
}

/// Swap the compositing graph; the graph found at acquisition comes back on release.
#[derive(Clone, Copy, Debug)]
pub struct CompositingOverride {
    compositing: Compositing,
    previous: Option<Compositing>,
}

impl CompositingOverride {
    pub fn new(compositing: Compositing) -> Self {
        Self {
            compositing,
            previous: None,
        }
    }

    pub fn monochrome_mask() -> Self {
        Self::new(Compositing::MonochromeMask)
    }
}

impl ScopedOverride for CompositingOverride {
    fn label(&self) -> &'static str {
        "compositing"
    }

    fn capability(&self) -> Option<Capability> {
        Some(Capability::Compositing)
    }

    fn acquire(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        self.previous = Some(host.compositing());
        host.set_compositing(self.compositing)
    }

    fn release(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        host.set_compositing(self.previous.take().unwrap_or_default())
    }
}

/// Drop to the ultra-low quality profile; the profile found at acquisition comes back on release.
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderQualityOverride {
    previous: Option<RenderQuality>,
}

impl RenderQualityOverride {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScopedOverride for RenderQualityOverride {
    fn label(&self) -> &'static str {
        "render quality"
    }

    fn capability(&self) -> Option<Capability> {
        Some(Capability::RenderQuality)
    }

    fn acquire(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        self.previous = Some(host.render_quality());
        host.set_render_quality(RenderQuality::UltraLow)
    }

    fn release(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        host.set_render_quality(self.previous.take().unwrap_or_default())
    }
}

/// Disable depth of field on one camera; release applies the configured setting.
#[derive(Clone, Copy, Debug)]
pub struct DofOverride {
    camera: ObjectId,
    configured: bool,
}

impl DofOverride {
    pub fn new(camera: ObjectId, configured: bool) -> Self {
        Self { camera, configured }
    }
}

impl ScopedOverride for DofOverride {
    fn label(&self) -> &'static str {
        "depth of field"
    }

    fn capability(&self) -> Option<Capability> {
        Some(Capability::DepthOfField)
    }

    fn acquire(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        set_dof(host, self.camera, false)
    }

    fn release(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        set_dof(host, self.camera, self.configured)
    }
}

fn set_dof(host: &mut dyn Host, camera: ObjectId, enabled: bool) -> PcboothResult<()> {
    let mut settings = host.camera_settings(camera)?;
    settings.dof.use_dof = enabled;
    host.set_camera_settings(camera, settings)
}

/// Flip a shader switch node to 1.0 (defaults to the board's solder switch), back to 0.0
/// on release. Scenes without the node are left untouched.
#[derive(Clone, Debug)]
pub struct ShaderSwitchOverride {
    group: String,
    node: String,
    applied: bool,
}

impl ShaderSwitchOverride {
    pub fn new(group: impl Into<String>, node: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            node: node.into(),
            applied: false,
        }
    }

    pub fn solder() -> Self {
        Self::new(SOLDER_GROUP, SOLDER_NODE)
    }
}

impl ScopedOverride for ShaderSwitchOverride {
    fn label(&self) -> &'static str {
        "shader switch"
    }

    fn capability(&self) -> Option<Capability> {
        Some(Capability::ShaderSwitch)
    }

    fn acquire(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        if host.shader_switch(&self.group, &self.node).is_none() {
            tracing::debug!("no shader node '{}/{}' in scene", self.group, self.node);
            return Ok(());
        }
        self.applied = true;
        host.set_shader_switch(&self.group, &self.node, 1.0)
    }

    fn release(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        if !std::mem::take(&mut self.applied) {
            return Ok(());
        }
        host.set_shader_switch(&self.group, &self.node, 0.0)
    }
}

/// Play the authored animation: frames follow the authored range and the backed-up actions
/// are reattached. Release clears all animation.
#[derive(Debug)]
pub struct UserAnimationOverride<'a> {
    studio: &'a Studio,
    frames: Option<FrameSpan>,
}

impl<'a> UserAnimationOverride<'a> {
    pub fn new(studio: &'a Studio) -> Self {
        Self {
            studio,
            frames: None,
        }
    }

    /// Authored span pushed to the host on acquire.
    pub fn frames(&self) -> Option<FrameSpan> {
        self.frames
    }
}

impl ScopedOverride for UserAnimationOverride<'_> {
    fn label(&self) -> &'static str {
        "user animation"
    }

    fn capability(&self) -> Option<Capability> {
        Some(Capability::Keyframes)
    }

    fn acquire(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        let frames = self.studio.frame_range(false);
        apply_frames(host, frames)?;
        self.frames = Some(frames);
        self.studio.animation().restore(host)
    }

    fn release(&mut self, host: &mut dyn Host) -> PcboothResult<()> {
        self.studio.clear_animation(host);
        Ok(())
    }
}
