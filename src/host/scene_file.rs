//! JSON scene description loaded by [`MemoryHost`](super::MemoryHost).

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{Aabb, Vec3};
use crate::foundation::error::PcboothResult;
use crate::foundation::fs::ensure_parent_dir;
use crate::host::{Action, CameraSettings, LightParams, ObjectKind};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneDef {
    #[serde(default)]
    pub objects: Vec<ObjectDef>,
    /// Collection names, including ones without members.
    #[serde(default)]
    pub collections: Vec<String>,
    /// Material name to `RRGGBB` color.
    #[serde(default)]
    pub materials: BTreeMap<String, String>,
    #[serde(default)]
    pub backgrounds: Vec<BackgroundDef>,
    /// Authored animation keyed by object name.
    #[serde(default)]
    pub actions: BTreeMap<String, Action>,
    /// Shader node group inputs, `group -> node -> value`.
    #[serde(default)]
    pub node_groups: BTreeMap<String, BTreeMap<String, f32>>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ObjectDef {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: ObjectKind,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub location: Vec3,
    /// Degrees.
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    /// Geometry bounds in object space.
    #[serde(default)]
    pub bounds: Option<Aabb>,
    #[serde(default)]
    pub collections: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub linked: bool,
    #[serde(default)]
    pub materials: Vec<Option<String>>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub hide_render: bool,
    #[serde(default)]
    pub camera: Option<CameraSettings>,
    #[serde(default)]
    pub light: Option<LightParams>,
}

fn default_kind() -> ObjectKind {
    ObjectKind::Mesh
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

impl ObjectDef {
    pub fn mesh(name: impl Into<String>, bounds: Aabb) -> Self {
        Self {
            name: name.into(),
            kind: ObjectKind::Mesh,
            parent: None,
            location: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            bounds: Some(bounds),
            collections: Vec::new(),
            properties: BTreeMap::new(),
            linked: false,
            materials: Vec::new(),
            color: None,
            hide_render: false,
            camera: None,
            light: None,
        }
    }
}

/// Backdrop available for import.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BackgroundDef {
    pub name: String,
    #[serde(default = "default_background_color")]
    pub color: String,
    /// Edge length of the square backdrop plane.
    #[serde(default = "default_background_size")]
    pub size: f32,
}

fn default_background_color() -> String {
    "808080".to_string()
}

fn default_background_size() -> f32 {
    1000.0
}

impl SceneDef {
    pub fn from_json_str(s: &str) -> PcboothResult<Self> {
        let scene = serde_json::from_str(s).context("failed to parse scene JSON")?;
        Ok(scene)
    }

    pub fn load(path: &Path) -> PcboothResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scene '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn save(&self, path: &Path) -> PcboothResult<()> {
        ensure_parent_dir(path)?;
        let f = std::fs::File::create(path)
            .with_context(|| format!("failed to create '{}'", path.display()))?;
        serde_json::to_writer_pretty(f, self).context("failed to write scene JSON")?;
        Ok(())
    }
}

/// Indented object tree followed by collection membership.
pub fn hierarchy_lines(scene: &SceneDef) -> Vec<String> {
    let mut children: BTreeMap<Option<&str>, Vec<&ObjectDef>> = BTreeMap::new();
    for obj in &scene.objects {
        children.entry(obj.parent.as_deref()).or_default().push(obj);
    }

    let mut lines = vec!["Objects:".to_string()];
    let mut stack: Vec<(&ObjectDef, usize)> = children
        .get(&None)
        .map(|roots| roots.iter().rev().map(|o| (*o, 1)).collect())
        .unwrap_or_default();
    while let Some((obj, depth)) = stack.pop() {
        let linked = if obj.linked { " (linked)" } else { "" };
        lines.push(format!(
            "{}{} [{:?}]{linked}",
            "  ".repeat(depth),
            obj.name,
            obj.kind
        ));
        if let Some(kids) = children.get(&Some(obj.name.as_str())) {
            stack.extend(kids.iter().rev().map(|o| (*o, depth + 1)));
        }
    }

    let mut members: BTreeMap<&str, Vec<&str>> = scene
        .collections
        .iter()
        .map(|c| (c.as_str(), Vec::new()))
        .collect();
    for obj in &scene.objects {
        for c in &obj.collections {
            members.entry(c.as_str()).or_default().push(obj.name.as_str());
        }
    }
    lines.push("Collections:".to_string());
    for (name, objs) in members {
        lines.push(format!("  {name}: {}", objs.join(", ")));
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/host/scene_file.rs"]
mod tests;
