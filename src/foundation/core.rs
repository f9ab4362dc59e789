use crate::foundation::error::{PcboothError, PcboothResult};

pub use glam::{Mat4, Quat, Vec3};

/// Axis-aligned bounding box in world space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Smallest box containing every point, `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let (min, max) = it.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self { min, max })
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(self) -> Vec3 {
        self.max - self.min
    }

    /// Radius of the sphere enclosing the box.
    pub fn radius(self) -> f32 {
        self.size().length() * 0.5
    }

    /// The eight corners, bottom face first.
    pub fn corners(self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
        ]
    }

    pub fn transformed(self, m: Mat4) -> Self {
        let corners = self.corners().map(|c| m.transform_point3(c));
        // Eight corners, never empty.
        Self::from_points(corners).unwrap_or(self)
    }
}

/// Inclusive scene frame span `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FrameSpan {
    pub start: i32,
    pub end: i32,
}

impl FrameSpan {
    pub fn new(start: i32, end: i32) -> PcboothResult<Self> {
        if start > end {
            return Err(PcboothError::config(format!(
                "frame span start ({start}) must be <= end ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn len_frames(self) -> u32 {
        (self.end - self.start + 1) as u32
    }

    pub fn frames(self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }

    pub fn contains(self, frame: i32) -> bool {
        self.start <= frame && frame <= self.end
    }
}

/// Degrees to radians for a whole euler triple.
pub fn deg(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x.to_radians(), y.to_radians(), z.to_radians())
}

/// Rotation for an `XYZ` euler triple (X applied first).
pub fn euler_to_quat(euler: Vec3) -> Quat {
    Quat::from_euler(glam::EulerRot::ZYX, euler.z, euler.y, euler.x)
}

pub fn quat_to_euler(q: Quat) -> Vec3 {
    let (z, y, x) = q.to_euler(glam::EulerRot::ZYX);
    Vec3::new(x, y, z)
}

/// Parse `RRGGBB` (optionally `#`-prefixed) into linear 0..1 channels.
pub fn hex_to_rgb(hex: &str) -> PcboothResult<[f32; 3]> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PcboothError::config(format!(
            "'{hex}' is not a hex color (expected RRGGBB)"
        )));
    }
    let mut out = [0.0f32; 3];
    for (i, chunk) in out.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
            .map_err(|e| PcboothError::config(format!("invalid hex color '{hex}': {e}")))?;
        *chunk = f32::from(byte) / 255.0;
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
