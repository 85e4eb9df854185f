//! Conversion of estimator coordinates into the animation host convention.
//!
//! The steps always run in the same order: axis permutation, fixed in-plane
//! rotation, grounding on the global vertical minimum and translation.
use crate::{frames::FrameArray, pm_error::PmError};
use log::debug;
use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source channels feeding target x, y and z. Source (x, y, z) becomes
/// (x, z, y).
const AXIS_ORDER: [usize; 3] = [0, 2, 1];

/// Fixed signed permutation applied after reordering. Swaps and negates the
/// two horizontal axes, leaving the vertical axis untouched.
fn rotation() -> glm::Mat3 {
    glm::mat3(
        0.0, -1.0, 0.0, //
        -1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0,
    )
}

fn permute(p: &glm::Vec3) -> glm::Vec3 {
    glm::vec3(p[AXIS_ORDER[0]], p[AXIS_ORDER[1]], p[AXIS_ORDER[2]])
}

/// Converts a whole sequence into the target convention.
///
/// Grounding subtracts the minimum vertical value over every frame and point
/// at once, so the lowest point of the sequence sits at zero while frames
/// keep their relative heights. Non-finite points (unfilled joints) are
/// carried through unchanged and do not take part in the minimum.
#[must_use]
pub fn normalize(input: &FrameArray, offset: &glm::Vec3) -> FrameArray {
    let rot = rotation();
    let rotated = input.map_points(|p| rot * permute(p));
    let ground = rotated
        .as_slice()
        .iter()
        .map(|p| p.z)
        .filter(|z| z.is_finite())
        .reduce(f32::min)
        .unwrap_or(0.0);
    debug!("normalize ground={} offset={:?}", ground, offset);
    let shift = offset - glm::vec3(0.0, 0.0, ground);
    rotated.map_points(|p| p + shift)
}

/// Moves a skeleton so that `joint` sits at `offset` in frame 0. The same
/// shift is applied to every frame so the motion relative to the first frame
/// is kept instead of pinning the joint in place.
///
/// # Errors
/// Returns `PmError::IndexOutOfRange` if `joint` is not a point of the array
pub fn center_on_joint(
    input: &FrameArray,
    joint: usize,
    offset: &glm::Vec3,
) -> Result<FrameArray, PmError> {
    if input.is_empty() {
        return Ok(input.clone());
    }
    let reference = input.get(0, joint).ok_or(PmError::IndexOutOfRange {
        index: joint,
        limit: input.point_count(),
    })?;
    let shift = offset - reference;
    Ok(input.map_points(|p| p + shift))
}

/// Final translation per dataset. The offset for a dataset is `base` plus
/// its entry in `datasets`, unknown datasets get `base` alone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetTable {
    pub base: [f32; 3],
    pub datasets: BTreeMap<String, [f32; 3]>,
}

impl Default for OffsetTable {
    fn default() -> Self {
        let datasets = [
            ("cha1", [0.0, -0.04, -0.02]),
            ("cha2", [0.23, 0.23, -0.09]),
            ("cha3", [0.25, 0.06, -0.05]),
            ("cha4", [0.69, -0.68, -0.05]),
            ("cha5", [0.05, -0.03, -0.02]),
            ("cha6", [0.0, 0.01, -0.03]),
            ("cha7", [0.0, 0.04, -0.03]),
            ("anna1", [0.09, 0.0, 0.0]),
            ("anna2", [0.09, 0.0, 0.0]),
            ("anna3", [0.09, 0.0, 0.0]),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Self {
            base: [0.49, -0.03, 0.06],
            datasets,
        }
    }
}

impl OffsetTable {
    /// Table with no per-dataset entries
    #[must_use]
    pub fn with_base(base: [f32; 3]) -> Self {
        Self {
            base,
            datasets: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn offset(&self, dataset: Option<&str>) -> glm::Vec3 {
        let base = glm::Vec3::from(self.base);
        match dataset.and_then(|d| self.datasets.get(d)) {
            Some(delta) => base + glm::Vec3::from(*delta),
            None => base,
        }
    }
}
