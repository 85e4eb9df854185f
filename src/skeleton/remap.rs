use super::mapping::{JointMapping, JointSource};
use crate::{frames::FrameArray, pm_error::PmError, types::FILL};
use log::{debug, trace};
use nalgebra_glm as glm;

/// Why canonical joints were left unfilled. Not an error, only a signal of
/// how complete the canonical skeleton is.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RemapReport {
    /// Targets whose table entry says there is no source
    pub missing: Vec<usize>,
    /// Targets whose source index is beyond the source joint count
    pub out_of_range: Vec<usize>,
    /// Number of targets computed as midpoints
    pub synthesized: usize,
}

impl RemapReport {
    /// Targets with a table entry that could not be filled
    #[must_use]
    pub fn unmapped_count(&self) -> usize {
        self.missing.len() + self.out_of_range.len()
    }
}

/// Canonical skeleton frames plus a validity flag per canonical joint
#[derive(Clone, Debug)]
pub struct Remapped {
    pub joints: FrameArray,
    pub mask: Vec<bool>,
    pub report: RemapReport,
}

impl Remapped {
    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.mask.iter().filter(|m| **m).count()
    }
}

/// Maps source frames shaped (frames, source joints) into canonical frames
/// shaped (frames, `mapping.target_count()`).
///
/// Entries are applied in ascending target order. Targets without a usable
/// source hold `FILL` and are flagged invalid in the mask. Midpoint targets
/// are the mean of their two source joints in every frame.
#[must_use]
pub fn remap(mapping: &JointMapping, source: &FrameArray) -> Remapped {
    let frames = source.frame_count();
    let source_count = source.point_count();
    let fill = glm::vec3(FILL, FILL, FILL);
    let mut joints = FrameArray::filled(frames, mapping.target_count(), fill);
    let mut mask = vec![false; mapping.target_count()];
    let mut report = RemapReport::default();

    for (target, entry) in mapping.iter() {
        match entry {
            JointSource::None => report.missing.push(target),
            JointSource::Joint(s) if s < source_count => {
                for f in 0..frames {
                    joints.set(f, target, source.frame(f)[s]);
                }
                mask[target] = true;
            }
            JointSource::Midpoint(a, b)
                if a < source_count && b < source_count =>
            {
                for f in 0..frames {
                    let frame = source.frame(f);
                    joints.set(f, target, (frame[a] + frame[b]) * 0.5);
                }
                mask[target] = true;
                report.synthesized += 1;
            }
            _ => {
                debug!(
                    "target {} source {:?} beyond {} source joints",
                    target, entry, source_count
                );
                report.out_of_range.push(target);
            }
        }
    }
    trace!("remap report {:?}", report);

    Remapped {
        joints,
        mask,
        report,
    }
}

/// Concatenates source skeletons along the joint axis, in the order given,
/// then remaps the result
///
/// # Errors
/// Returns `PmError::FrameCountMismatch` if the sources differ in length
pub fn remap_sources(
    mapping: &JointMapping,
    sources: &[&FrameArray],
) -> Result<Remapped, PmError> {
    let combined = FrameArray::concat_points(sources)?;
    Ok(remap(mapping, &combined))
}

/// Remaps flat row-major data shaped (joints, 3) or (frames, joints, 3)
///
/// # Errors
/// Returns `PmError::BadShape` for any other shape
pub fn remap_flat(
    mapping: &JointMapping,
    data: &[f32],
    shape: &[usize],
) -> Result<Remapped, PmError> {
    let source = FrameArray::from_flat(data, shape)?;
    Ok(remap(mapping, &source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mapping() {
        let source = FrameArray::filled(3, 4, glm::Vec3::zeros());
        let res = remap(&JointMapping::new(), &source);
        assert_eq!(res.joints.shape(), [3, 0, 3]);
        assert!(res.mask.is_empty());
        assert_eq!(res.report, RemapReport::default());
    }

    #[test]
    fn out_of_range_is_reported() {
        let mut mapping = JointMapping::new();
        mapping.insert(0, JointSource::Joint(1));
        mapping.insert(1, JointSource::Joint(8));
        mapping.insert(2, JointSource::Midpoint(0, 8));
        mapping.insert(4, JointSource::None);
        let source = FrameArray::filled(2, 2, glm::vec3(1.0, 2.0, 3.0));
        let res = remap(&mapping, &source);
        assert_eq!(res.joints.shape(), [2, 5, 3]);
        assert_eq!(res.mask, [true, false, false, false, false]);
        assert_eq!(res.report.out_of_range, [1, 2]);
        assert_eq!(res.report.missing, [4]);
        assert_eq!(res.report.unmapped_count(), 3);
        assert!(res.joints.frame(1)[3].x.is_nan());
    }
}
