use crate::foundation::core::{Vec3, deg};

/// Model orientation presets, in rendering order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Position {
    Top,
    Bottom,
    Rear,
}

impl Position {
    pub const ALL: [Position; 3] = [Position::Top, Position::Bottom, Position::Rear];

    pub fn name(self) -> &'static str {
        match self {
            Self::Top => "TOP",
            Self::Bottom => "BOTTOM",
            Self::Rear => "REAR",
        }
    }

    /// Single letter used in output file names.
    pub fn initial(self) -> char {
        match self {
            Self::Top => 'T',
            Self::Bottom => 'B',
            Self::Rear => 'R',
        }
    }

    /// Rotation applied to the top parent, radians.
    pub fn rotation(self) -> Vec3 {
        match self {
            Self::Top => deg(0.0, 0.0, 0.0),
            Self::Bottom => deg(0.0, 180.0, 0.0),
            Self::Rear => deg(0.0, 0.0, 180.0),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CameraPreset {
    Top,
    Iso,
    Front,
    Left,
    Right,
    Photo1,
    Photo2,
    /// Adopted from a `camera_custom` object in the scene.
    Custom,
}

impl CameraPreset {
    /// Presets created by the studio itself.
    pub const BUILTIN: [CameraPreset; 7] = [
        CameraPreset::Top,
        CameraPreset::Iso,
        CameraPreset::Front,
        CameraPreset::Left,
        CameraPreset::Right,
        CameraPreset::Photo1,
        CameraPreset::Photo2,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Top => "TOP",
            Self::Iso => "ISO",
            Self::Front => "FRONT",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Photo1 => "PHOTO1",
            Self::Photo2 => "PHOTO2",
            Self::Custom => "CUSTOM",
        }
    }

    /// Lowercase name used in output file names.
    pub fn file_name(self) -> String {
        self.name().to_lowercase()
    }

    /// Scene object name for studio-created cameras.
    pub fn object_name(self) -> String {
        match self {
            Self::Custom => CUSTOM_CAMERA_OBJECT.to_string(),
            _ => format!("camera_{}", self.file_name()),
        }
    }

    /// Base orientation, radians. `None` for the adopted custom camera.
    pub fn rotation(self) -> Option<Vec3> {
        Some(match self {
            Self::Top => deg(0.0, 0.0, 0.0),
            Self::Iso => deg(54.736, 0.0, 45.0),
            Self::Front => deg(30.0, 0.0, 0.0),
            Self::Left => deg(190.0, -155.0, -200.0),
            Self::Right => deg(190.0, -200.0, -155.0),
            Self::Photo1 => deg(38.0, 0.0, 13.0),
            Self::Photo2 => deg(60.0, 0.0, 20.0),
            Self::Custom => return None,
        })
    }
}

impl std::fmt::Display for CameraPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub const CUSTOM_CAMERA_OBJECT: &str = "camera_custom";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LightPreset {
    Top,
    Back,
}

impl LightPreset {
    pub const ALL: [LightPreset; 2] = [LightPreset::Top, LightPreset::Back];

    pub fn object_name(self) -> &'static str {
        match self {
            Self::Top => "light_top",
            Self::Back => "light_back",
        }
    }

    pub fn rotation(self) -> Vec3 {
        match self {
            Self::Top => deg(0.0, 0.0, 0.0),
            Self::Back => deg(-25.0, 0.0, 0.0),
        }
    }

    pub fn relative_intensity(self) -> f32 {
        match self {
            Self::Top => 1.0,
            Self::Back => 0.66,
        }
    }

    /// Location for a footprint of `dims` lit from height `z`.
    pub fn location(self, dims: Vec3, z: f32) -> Vec3 {
        match self {
            Self::Top => Vec3::new(0.0, 0.0, z),
            Self::Back => Vec3::new(0.0, dims.y / 2.0, z),
        }
    }
}
