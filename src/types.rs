use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};

/// Value written into canonical joints that have no source data. Anything
/// holding this value must never be treated as geometry.
pub const FILL: f32 = f32::NAN;

/// Joint radius for body keypoints
pub const BODY_RADIUS: f32 = 0.03;

/// Joint radius for the two wrist keypoints
pub const WRIST_RADIUS: f32 = 0.015;

/// Joint radius for finger keypoints
pub const HAND_RADIUS: f32 = 0.007;

/// Anatomical region of a vertex, face, joint or segment
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Body,
    Hand,
}

impl Region {
    /// Material slot used by hosts that shade regions differently. Slot 0 is
    /// the body material and slot 1 the hand material.
    #[must_use]
    pub const fn material_index(self) -> usize {
        match self {
            Self::Body => 0,
            Self::Hand => 1,
        }
    }
}

/// Visual treatment of a skeleton entity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub region: Region,
    pub radius: f32,
}

/// Spatial state of an animation entity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub location: glm::Vec3,
    pub rotation: glm::Quat,
    pub scale: glm::Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: glm::Vec3::zeros(),
            rotation: glm::Quat::identity(),
            scale: glm::vec3(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Transform that only places an entity at a location
    #[must_use]
    pub fn from_location(location: glm::Vec3) -> Self {
        Self {
            location,
            ..Default::default()
        }
    }
}
