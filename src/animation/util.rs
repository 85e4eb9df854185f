use super::types::{AnimationChannel, Interpolation, Keyframe};
use crate::types::Transform;
use nalgebra_glm as glm;

/// Values that can be blended between two keyframes
pub trait Blend: Copy {
    #[must_use]
    fn blend(&self, other: &Self, t: f32) -> Self;
}

impl Blend for f32 {
    fn blend(&self, other: &Self, t: f32) -> Self {
        (other - self).mul_add(t, *self)
    }
}

impl Blend for glm::Vec3 {
    fn blend(&self, other: &Self, t: f32) -> Self {
        glm::lerp(self, other, t)
    }
}

impl Blend for Transform {
    fn blend(&self, other: &Self, t: f32) -> Self {
        Self {
            location: self.location.blend(&other.location, t),
            rotation: glm::quat_slerp(&self.rotation, &other.rotation, t),
            scale: self.scale.blend(&other.scale, t),
        }
    }
}

/// Helper to calculate the parameter used for interpolation
fn weight(start: f32, end: f32, current: f32) -> f32 {
    const EPSILON: f32 = 0.0005;
    ((current - start) / (end - start).max(EPSILON)).clamp(0.0f32, 1.0f32)
}

/// Helper to find the value at a time between the candidate keyframe and the
/// next one
#[allow(clippy::cast_precision_loss)]
fn calculate<T: Blend>(
    interpolation: Interpolation,
    frame: &Keyframe<T>,
    next: &Keyframe<T>,
    current_time: f32,
) -> T {
    if interpolation == Interpolation::Step {
        // Step interpolation uses the candidate frame
        return frame.data;
    }
    frame.data.blend(
        &next.data,
        weight(frame.frame as f32, next.frame as f32, current_time),
    )
}

/// Samples a channel at an arbitrary (fractional) frame. Times before the
/// first keyframe hold the first value and times after the last keyframe
/// hold the last value. Returns `None` for an empty channel.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sample<T: Blend>(
    channel: &AnimationChannel<T>,
    current_time: f32,
) -> Option<T> {
    let mut frame = channel.data.first()?;
    for f in &channel.data {
        if (f.frame as f32) <= current_time {
            // This keyframe is not after the current time, so make it the
            // new candidate
            frame = f;
        } else {
            return Some(calculate(
                channel.interpolation,
                frame,
                f,
                current_time,
            ));
        }
    }
    // Fall through past the end of the channel so return data from the
    // candidate frame
    Some(frame.data)
}
