use super::layout::STICK_MIDPOINTS;
use crate::{frames::FrameArray, pm_error::PmError};
use nalgebra_glm as glm;
use std::collections::BTreeMap;

/// Paired body and hand estimator output for one sequence. Body keypoints
/// occupy indices `0..body_len` of the combined index space and hand
/// keypoints follow directly after.
#[derive(Clone, Debug)]
pub struct PoseSource {
    body: FrameArray,
    hand: FrameArray,
    midpoints: BTreeMap<usize, (usize, usize)>,
}

impl PoseSource {
    /// Pairs body and hand frames, with neck and pelvis synthesized from the
    /// body keypoints
    ///
    /// # Errors
    /// Returns `PmError::FrameCountMismatch` if the two sources differ in
    /// frame count
    pub fn new(body: FrameArray, hand: FrameArray) -> Result<Self, PmError> {
        if body.frame_count() != hand.frame_count() {
            return Err(PmError::FrameCountMismatch {
                expected: body.frame_count(),
                actual: hand.frame_count(),
            });
        }
        Ok(Self {
            body,
            hand,
            midpoints: STICK_MIDPOINTS.into_iter().collect(),
        })
    }

    /// Replaces the midpoint table. Midpoint pairs index the body keypoints.
    #[must_use]
    pub fn with_midpoints<I>(mut self, midpoints: I) -> Self
    where
        I: IntoIterator<Item = (usize, (usize, usize))>,
    {
        self.midpoints = midpoints.into_iter().collect();
        self
    }

    #[must_use]
    pub const fn body(&self) -> &FrameArray {
        &self.body
    }

    #[must_use]
    pub const fn hand(&self) -> &FrameArray {
        &self.hand
    }

    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.body.frame_count()
    }

    /// Size of the combined index space
    #[must_use]
    pub const fn len(&self) -> usize {
        self.body.point_count() + self.hand.point_count()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Body keypoints followed by hand keypoints for every frame
    ///
    /// # Errors
    /// Cannot fail for a source built with `new`, the frame counts were
    /// checked there
    pub fn combined(&self) -> Result<FrameArray, PmError> {
        FrameArray::concat_points(&[&self.body, &self.hand])
    }

    /// Position of one keypoint of the combined index space
    ///
    /// # Errors
    /// Returns `PmError::IndexOutOfRange` if `index` is in neither the body
    /// nor the hand range, or a midpoint refers outside the body, and
    /// `PmError::FrameOutOfRange` for a missing frame
    pub fn point(&self, index: usize, frame: usize) -> Result<glm::Vec3, PmError> {
        let body = self.body.try_frame(frame)?;
        let out_of_range = |index| PmError::IndexOutOfRange {
            index,
            limit: self.len(),
        };
        if let Some(&(a, b)) = self.midpoints.get(&index) {
            let a = body.get(a).ok_or_else(|| out_of_range(a))?;
            let b = body.get(b).ok_or_else(|| out_of_range(b))?;
            return Ok((a + b) * 0.5);
        }
        if index < body.len() {
            return Ok(body[index]);
        }
        let hand = self.hand.try_frame(frame)?;
        hand.get(index - body.len())
            .copied()
            .ok_or_else(|| out_of_range(index))
    }
}
