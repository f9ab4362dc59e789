//! Run configuration: a JSON file with a `default` object and optional named presets.
//!
//! A preset is merged over `default` key by key, recursing into objects, so a preset only
//! needs to spell out what it changes. Sections are typed; missing keys take defaults and
//! unknown keys are ignored.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::hex_to_rgb;
use crate::foundation::error::{PcboothError, PcboothResult};

pub mod sections;
pub mod values;

pub use sections::{Backgrounds, Cameras, Positions, Renderer, Scene, Settings};
pub use values::{FocalRatio, ImageFormat, RenderedObject, VideoFormat};

pub const DEFAULT_PRESET: &str = "default";

/// Configuration file shipped with the binary.
pub const TEMPLATE: &str = include_str!("template.json");

/// How [`sync_with_template`] combines a local file with [`TEMPLATE`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemplateSync {
    /// Template values win; local keys the template lacks (custom presets) are kept.
    Reset,
    /// Local values win; keys only the template has are added.
    Update,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    pub settings: Settings,
    pub renderer: Renderer,
    pub scene: Scene,
    pub backgrounds: Backgrounds,
    pub cameras: Cameras,
    pub positions: Positions,
    #[serde(deserialize_with = "null_as_empty_jobs")]
    pub outputs: Vec<JobEntry>,
}

/// One `OUTPUTS` item: a job name and its raw parameter map (`null` when omitted).
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(try_from = "RawJobEntry")]
pub struct JobEntry {
    pub name: String,
    pub params: serde_json::Value,
}

impl JobEntry {
    pub fn new(name: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawJobEntry {
    Name(String),
    Map(BTreeMap<String, serde_json::Value>),
}

impl TryFrom<RawJobEntry> for JobEntry {
    type Error = String;

    fn try_from(raw: RawJobEntry) -> Result<Self, Self::Error> {
        match raw {
            RawJobEntry::Name(name) => Ok(Self::new(name, serde_json::Value::Null)),
            RawJobEntry::Map(map) => {
                if map.len() != 1 {
                    return Err(format!(
                        "each OUTPUTS entry must hold exactly one job, found {}",
                        map.len()
                    ));
                }
                let (name, params) = map.into_iter().next().ok_or("empty OUTPUTS entry")?;
                Ok(Self::new(name, params))
            }
        }
    }
}

fn null_as_empty_jobs<'de, D>(d: D) -> Result<Vec<JobEntry>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v: Option<Vec<JobEntry>> = serde::Deserialize::deserialize(d)?;
    Ok(v.unwrap_or_default())
}

/// Validation finding, rendered as `SECTION.KEY: message`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigIssue {
    pub section: &'static str,
    pub key: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn new(section: &'static str, key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            section,
            key: key.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}: {}", self.section, self.key, self.message)
    }
}

impl Config {
    /// Read `path` and resolve `preset` (or `default`).
    pub fn load(path: &Path, preset: Option<&str>) -> PcboothResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        Self::from_json_str(&text, preset)
            .map_err(|e| PcboothError::config(format!("{}: {e}", path.display())))
    }

    pub fn from_json_str(text: &str, preset: Option<&str>) -> PcboothResult<Self> {
        let root: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| PcboothError::config(format!("invalid JSON: {e}")))?;
        let resolved = resolve_preset(root, preset)?;
        serde_json::from_value(resolved).map_err(|e| PcboothError::config(e.to_string()))
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.settings.image_format.is_empty() {
            issues.push(ConfigIssue::new(
                "SETTINGS",
                "IMAGE_FORMAT",
                "at least one image format is required",
            ));
        }

        let r = &self.renderer;
        for (key, v) in [
            ("FPS", r.fps),
            ("IMAGE_WIDTH", r.image_width),
            ("IMAGE_HEIGHT", r.image_height),
            ("VIDEO_WIDTH", r.video_width),
            ("VIDEO_HEIGHT", r.video_height),
            ("THUMBNAIL_WIDTH", r.thumbnail_width),
            ("THUMBNAIL_HEIGHT", r.thumbnail_height),
        ] {
            if v == 0 {
                issues.push(ConfigIssue::new("RENDERER", key, "must be positive"));
            }
        }
        let odd = !r.video_width.is_multiple_of(2) || !r.video_height.is_multiple_of(2);
        if odd
            && let Some(f) = self
                .settings
                .video_format
                .iter()
                .find(|f| f.needs_even_size())
        {
            issues.push(ConfigIssue::new(
                "RENDERER",
                "VIDEO_WIDTH",
                format!(
                    "{}x{} must be even for {f:?} (yuv420p)",
                    r.video_width, r.video_height
                ),
            ));
        }

        let s = &self.scene;
        if let Err(e) = hex_to_rgb(&s.lights_color) {
            issues.push(ConfigIssue::new("SCENE", "LIGHTS_COLOR", e.to_string()));
        }
        if s.zoom_out <= 0.0 {
            issues.push(ConfigIssue::new("SCENE", "ZOOM_OUT", "must be positive"));
        }
        if s.lights_intensity < 0.0 {
            issues.push(ConfigIssue::new(
                "SCENE",
                "LIGHTS_INTENSITY",
                "must not be negative",
            ));
        }

        for entry in &self.outputs {
            if !crate::jobs::registry::is_registered(&entry.name) {
                issues.push(ConfigIssue::new(
                    "OUTPUTS",
                    entry.name.clone(),
                    format!(
                        "unknown job (known: {})",
                        crate::jobs::registry::JOB_NAMES.join(", ")
                    ),
                ));
            }
        }
        issues
    }

    /// `validate` folded into one configuration error.
    pub fn ensure_valid(&self) -> PcboothResult<()> {
        let issues = self.validate();
        if issues.is_empty() {
            return Ok(());
        }
        let joined: Vec<String> = issues.iter().map(ToString::to_string).collect();
        Err(PcboothError::config(joined.join("; ")))
    }
}

/// Pick the preset object out of the file root and merge it over `default`.
fn resolve_preset(root: serde_json::Value, preset: Option<&str>) -> PcboothResult<serde_json::Value> {
    let serde_json::Value::Object(mut presets) = root else {
        return Err(PcboothError::config("config root must be an object"));
    };
    let Some(mut base) = presets.remove(DEFAULT_PRESET) else {
        // A file without presets is the configuration itself.
        return match preset {
            None | Some(DEFAULT_PRESET) => Ok(serde_json::Value::Object(presets)),
            Some(p) => Err(PcboothError::config(format!(
                "preset '{p}' requested but the file defines no presets"
            ))),
        };
    };
    match preset {
        None | Some(DEFAULT_PRESET) => {}
        Some(p) => {
            let overlay = presets
                .remove(p)
                .ok_or_else(|| PcboothError::config(format!("unknown config preset '{p}'")))?;
            tracing::debug!(preset = p, "merging config preset over default");
            merge(&mut base, overlay);
        }
    }
    Ok(base)
}

/// Rewrite the config at `path` against [`TEMPLATE`]. A missing file gets a copy of the template.
pub fn sync_with_template(path: &Path, mode: TemplateSync) -> PcboothResult<()> {
    let template: serde_json::Value = serde_json::from_str(TEMPLATE)
        .map_err(|e| PcboothError::config(format!("bundled template is invalid: {e}")))?;
    let synced = if path.exists() {
        let text = std::fs::read_to_string(path)?;
        let local: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| PcboothError::config(format!("{}: invalid JSON: {e}", path.display())))?;
        match mode {
            TemplateSync::Reset => {
                tracing::warn!(
                    "Merging default config from template with local one found (overwriting local values)."
                );
                let mut merged = template;
                fill_missing(&mut merged, local);
                merged
            }
            TemplateSync::Update => {
                tracing::warn!("Merging default config from template with local one found.");
                let mut merged = local;
                fill_missing(&mut merged, template);
                merged
            }
        }
    } else {
        tracing::warn!("Copying default config from template.");
        template
    };
    crate::foundation::fs::ensure_parent_dir(path)?;
    let mut text = serde_json::to_string_pretty(&synced)
        .map_err(|e| PcboothError::config(e.to_string()))?;
    text.push('\n');
    std::fs::write(path, text)?;
    Ok(())
}

/// Recursive object merge that only adds keys `base` lacks; existing values are kept.
pub fn fill_missing(base: &mut serde_json::Value, extra: serde_json::Value) {
    if let (serde_json::Value::Object(b), serde_json::Value::Object(e)) = (base, extra) {
        for (k, v) in e {
            match b.get_mut(&k) {
                Some(existing) => fill_missing(existing, v),
                None => {
                    b.insert(k, v);
                }
            }
        }
    }
}

/// Recursive object merge; non-object overlay values replace the base value.
pub fn merge(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(b), serde_json::Value::Object(o)) => {
            for (k, v) in o {
                match b.get_mut(&k) {
                    Some(existing) => merge(existing, v),
                    None => {
                        b.insert(k, v);
                    }
                }
            }
        }
        (b, o) => *b = o,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/mod.rs"]
mod tests;
