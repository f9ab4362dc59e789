//! Scalar configuration values with their own parsing rules.

use std::sync::LazyLock;

use regex::Regex;

static RENDERED_OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Collection|Object)([^\w\s])(.+)$").expect("static regex is valid")
});

static FOCAL_FRACTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1f]/(\d+)$").expect("static regex is valid"));

/// Aperture f-stop: computed from focus distance, or fixed.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(try_from = "FocalRatioRaw")]
pub enum FocalRatio {
    #[default]
    Auto,
    Value(f32),
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum FocalRatioRaw {
    Number(f32),
    Text(String),
}

impl TryFrom<FocalRatioRaw> for FocalRatio {
    type Error = String;

    fn try_from(raw: FocalRatioRaw) -> Result<Self, Self::Error> {
        match raw {
            FocalRatioRaw::Number(v) if v > 0.0 => Ok(Self::Value(v)),
            FocalRatioRaw::Number(v) => Err(format!("focal ratio must be positive, got {v}")),
            FocalRatioRaw::Text(s) => s.parse(),
        }
    }
}

impl std::str::FromStr for FocalRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "auto" {
            return Ok(Self::Auto);
        }
        if let Some(caps) = FOCAL_FRACTION_RE.captures(s) {
            let denom: u32 = caps[1]
                .parse()
                .map_err(|e| format!("invalid focal ratio '{s}': {e}"))?;
            if denom == 0 {
                return Err(format!("invalid focal ratio '{s}': zero denominator"));
            }
            return Ok(Self::Value(1.0 / denom as f32));
        }
        Err(format!(
            "'{s}' is not a valid focal ratio (can be 'auto', a number or a fraction like '1/4' or 'f/4')"
        ))
    }
}

impl std::fmt::Display for FocalRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Value(v) => write!(f, "{v}"),
        }
    }
}

/// Explicit choice of what the cameras frame.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "String")]
pub enum RenderedObject {
    Object(String),
    Collection(String),
}

impl TryFrom<String> for RenderedObject {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let caps = RENDERED_OBJECT_RE.captures(&s).ok_or_else(|| {
            format!("'{s}' is not a valid <Object|Collection>/<name> data-block string")
        })?;
        let name = caps[3].to_string();
        Ok(match &caps[1] {
            "Object" => Self::Object(name),
            _ => Self::Collection(name),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Bmp,
    Tiff,
    Targa,
    Webp,
    OpenExr,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
            Self::Tiff => "tif",
            Self::Targa => "tga",
            Self::Webp => "webp",
            Self::OpenExr => "exr",
        }
    }

    pub fn codec(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Bmp => image::ImageFormat::Bmp,
            Self::Tiff => image::ImageFormat::Tiff,
            Self::Targa => image::ImageFormat::Tga,
            Self::Webp => image::ImageFormat::WebP,
            Self::OpenExr => image::ImageFormat::OpenExr,
        }
    }

    pub fn supports_alpha(self) -> bool {
        !matches!(self, Self::Jpeg)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoFormat {
    Avi,
    Mp4,
    Mpeg,
    Webm,
    Gif,
}

impl VideoFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Avi => "avi",
            Self::Mp4 => "mp4",
            Self::Mpeg => "mpeg",
            Self::Webm => "webm",
            Self::Gif => "gif",
        }
    }

    /// Chroma-subsampled formats need even frame dimensions.
    pub fn needs_even_size(self) -> bool {
        !matches!(self, Self::Gif)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/values.rs"]
mod tests;
