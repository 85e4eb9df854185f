use crate::pm_error::PmError;
use nalgebra_glm as glm;

const SHAPE_HINT: &str = "(points, 3) or (frames, points, 3)";

/// Dense array of 3D points shaped (frames, points). Used for pose keypoints,
/// canonical joints and mesh vertex positions alike.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameArray {
    frames: usize,
    points: usize,
    data: Vec<glm::Vec3>,
}

impl FrameArray {
    /// Creates an array with every point set to `value`
    #[must_use]
    pub fn filled(frames: usize, points: usize, value: glm::Vec3) -> Self {
        Self {
            frames,
            points,
            data: vec![value; frames * points],
        }
    }

    /// Creates an array from per-frame point lists
    ///
    /// # Errors
    /// Returns `PmError::PointCountMismatch` if the frames do not all hold
    /// the same number of points
    pub fn from_frames(frames: Vec<Vec<glm::Vec3>>) -> Result<Self, PmError> {
        let points = frames.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(frames.len() * points);
        for frame in &frames {
            if frame.len() != points {
                return Err(PmError::PointCountMismatch {
                    expected: points,
                    actual: frame.len(),
                });
            }
            data.extend_from_slice(frame);
        }
        Ok(Self {
            frames: frames.len(),
            points,
            data,
        })
    }

    /// Creates an array from flat row-major data and a numpy style shape.
    /// A 2 dimensional shape is treated as a single frame.
    ///
    /// # Errors
    /// Returns `PmError::BadShape` unless the shape has 2 or 3 dimensions
    /// with a trailing axis of 3 and matches the data length
    pub fn from_flat(data: &[f32], shape: &[usize]) -> Result<Self, PmError> {
        let bad_shape = || PmError::BadShape {
            expected: SHAPE_HINT,
            actual: shape.to_vec(),
        };
        let (frames, points) = match *shape {
            [points, 3] => (1, points),
            [frames, points, 3] => (frames, points),
            _ => return Err(bad_shape()),
        };
        let len = frames.checked_mul(points).and_then(|n| n.checked_mul(3));
        if len != Some(data.len()) {
            return Err(bad_shape());
        }
        Ok(Self {
            frames,
            points,
            data: data
                .chunks_exact(3)
                .map(|c| glm::vec3(c[0], c[1], c[2]))
                .collect(),
        })
    }

    /// Concatenates several arrays along the point axis, e.g. body keypoints
    /// followed by hand keypoints
    ///
    /// # Errors
    /// Returns `PmError::FrameCountMismatch` if the parts do not have the
    /// same number of frames
    pub fn concat_points(parts: &[&Self]) -> Result<Self, PmError> {
        let frames = parts.first().map_or(0, |p| p.frames);
        if let Some(p) = parts.iter().find(|p| p.frames != frames) {
            return Err(PmError::FrameCountMismatch {
                expected: frames,
                actual: p.frames,
            });
        }
        let points = parts.iter().map(|p| p.points).sum();
        let mut data = Vec::with_capacity(frames * points);
        for f in 0..frames {
            for p in parts {
                data.extend_from_slice(p.frame(f));
            }
        }
        Ok(Self {
            frames,
            points,
            data,
        })
    }

    /// Appends one frame to the end of the array. An array without points
    /// takes its point count from the first frame pushed.
    ///
    /// # Errors
    /// Returns `PmError::PointCountMismatch` if the frame has the wrong
    /// number of points
    pub fn push_frame(&mut self, frame: &[glm::Vec3]) -> Result<(), PmError> {
        if self.frames == 0 && self.points == 0 {
            self.points = frame.len();
        }
        if frame.len() != self.points {
            return Err(PmError::PointCountMismatch {
                expected: self.points,
                actual: frame.len(),
            });
        }
        self.data.extend_from_slice(frame);
        self.frames += 1;
        Ok(())
    }

    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.frames
    }

    #[must_use]
    pub const fn point_count(&self) -> usize {
        self.points
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Points of one frame. Panics if `frame` is out of range, use
    /// `try_frame` for a checked version.
    #[must_use]
    pub fn frame(&self, frame: usize) -> &[glm::Vec3] {
        &self.data[frame * self.points..(frame + 1) * self.points]
    }

    /// Points of one frame
    ///
    /// # Errors
    /// Returns `PmError::FrameOutOfRange` if `frame` does not exist
    pub fn try_frame(&self, frame: usize) -> Result<&[glm::Vec3], PmError> {
        if frame < self.frames {
            Ok(self.frame(frame))
        } else {
            Err(PmError::FrameOutOfRange {
                frame,
                frame_count: self.frames,
            })
        }
    }

    pub fn frame_mut(&mut self, frame: usize) -> &mut [glm::Vec3] {
        &mut self.data[frame * self.points..(frame + 1) * self.points]
    }

    #[must_use]
    pub fn get(&self, frame: usize, point: usize) -> Option<&glm::Vec3> {
        if frame < self.frames && point < self.points {
            self.data.get(frame * self.points + point)
        } else {
            None
        }
    }

    pub fn set(&mut self, frame: usize, point: usize, value: glm::Vec3) {
        self.data[frame * self.points + point] = value;
    }

    /// Iterates over frames in ascending order
    pub fn frames(&self) -> impl Iterator<Item = &[glm::Vec3]> + '_ {
        (0..self.frames).map(|f| self.frame(f))
    }

    /// All points of all frames in frame-major order
    #[must_use]
    pub fn as_slice(&self) -> &[glm::Vec3] {
        &self.data
    }

    /// Returns a new array of the same shape with `op` applied to every point
    #[must_use]
    pub fn map_points<F>(&self, op: F) -> Self
    where
        F: FnMut(&glm::Vec3) -> glm::Vec3,
    {
        Self {
            frames: self.frames,
            points: self.points,
            data: self.data.iter().map(op).collect(),
        }
    }

    /// Shape as a numpy style triple
    #[must_use]
    pub const fn shape(&self) -> [usize; 3] {
        [self.frames, self.points, 3]
    }
}
