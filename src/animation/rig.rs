use super::{
    host::AnimationHost,
    types::{EntityKey, EntityKind, Handle},
};
use crate::{
    frames::FrameArray,
    pm_error::PmError,
    skeleton::Layout,
    types::{Style, Transform},
};
use ahash::{HashMap, HashMapExt};
use log::{debug, info};
use nalgebra::{UnitQuaternion, Vector3};
use nalgebra_glm as glm;
use std::collections::BTreeMap;

/// Below this length a segment has no usable direction
const MIN_SEGMENT_LENGTH: f32 = 1.0e-6;

#[derive(Clone, Debug)]
struct JointEntity {
    handle: Handle,
    style: Style,
    location: glm::Vec3,
}

#[derive(Clone, Debug)]
struct SegmentEntity {
    start: usize,
    end: usize,
    handle: Handle,
    style: Style,
    transform: Transform,
}

/// Counts from one `Rig::build` call
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BuildReport {
    pub created: usize,
    pub reused: usize,
    /// Joints left out because they are hidden or have no valid data
    pub skipped_joints: usize,
    /// Segments left out because one of their joints was left out
    pub skipped_segments: usize,
}

/// Rotation that points local +Z from `start` towards `end` with local +Y
/// kept as close to world up as possible, plus the distance between the two
fn track(start: &glm::Vec3, end: &glm::Vec3) -> (glm::Quat, f32) {
    let dir = end - start;
    let length = dir.norm();
    if length < MIN_SEGMENT_LENGTH {
        return (glm::Quat::identity(), length);
    }
    let dir = dir / length;
    // Looking straight up or down leaves no room for an up vector, fall
    // back to world y
    let up = if dir.z.abs() > 1.0 - 1.0e-4 {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let rotation = UnitQuaternion::face_towards(&dir, &up);
    (rotation.into_inner(), length)
}

/// Transform of a segment between two joints: placed at their midpoint,
/// oriented along the joints and stretched along local z to their distance
#[must_use]
pub fn segment_transform(start: &glm::Vec3, end: &glm::Vec3) -> Transform {
    let (rotation, length) = track(start, end);
    Transform {
        location: (start + end) * 0.5,
        rotation,
        scale: glm::vec3(1.0, 1.0, length),
    }
}

/// Skeleton of joint markers and segment connectors on an animation host.
///
/// Entities are remembered by canonical joint index and by joint pair so
/// repeated builds against the same host reuse rather than duplicate them.
#[derive(Clone, Debug)]
pub struct Rig {
    layout: Layout,
    joints: BTreeMap<usize, JointEntity>,
    segments: Vec<SegmentEntity>,
    segment_index: HashMap<(usize, usize), usize>,
}

impl Rig {
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            joints: BTreeMap::new(),
            segments: Vec::new(),
            segment_index: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Creates or reuses entities for every visible joint flagged valid in
    /// `mask` and every connection between two such joints.
    ///
    /// Running this again, with the same or another `Rig` against the same
    /// host, only finds existing entities and creates nothing new.
    ///
    /// # Errors
    /// May return `PmError` if the host fails to create an entity
    pub fn build<H: AnimationHost>(
        &mut self,
        host: &mut H,
        mask: &[bool],
    ) -> Result<BuildReport, PmError> {
        let mut report = BuildReport::default();
        for (joint, valid) in mask.iter().enumerate() {
            if !valid || self.layout.is_hidden(joint) {
                report.skipped_joints += 1;
                continue;
            }
            if self.joints.contains_key(&joint) {
                report.reused += 1;
                continue;
            }
            let style = self.layout.joint_style(joint);
            let (handle, created) = host
                .acquire(EntityKey::Joint(joint), EntityKind::Joint(style))?;
            if created {
                report.created += 1;
            } else {
                report.reused += 1;
            }
            self.joints.insert(
                joint,
                JointEntity {
                    handle,
                    style,
                    location: glm::Vec3::zeros(),
                },
            );
        }

        let connections: Vec<(usize, usize)> =
            self.layout.visible_connections().collect();
        for (start, end) in connections {
            if !self.joints.contains_key(&start)
                || !self.joints.contains_key(&end)
            {
                debug!("segment {}-{} skipped", start, end);
                report.skipped_segments += 1;
                continue;
            }
            if self.segment_index.contains_key(&(start, end)) {
                report.reused += 1;
                continue;
            }
            let style = self.layout.segment_style(start, end);
            let (handle, created) = host.acquire(
                EntityKey::Segment(start, end),
                EntityKind::Segment(style),
            )?;
            if created {
                report.created += 1;
            } else {
                report.reused += 1;
            }
            self.segment_index.insert((start, end), self.segments.len());
            self.segments.push(SegmentEntity {
                start,
                end,
                handle,
                style,
                transform: Transform::default(),
            });
        }
        info!(
            "Rig build: joints={}, segments={}, created={}, reused={}",
            self.joints.len(),
            self.segments.len(),
            report.created,
            report.reused
        );
        Ok(report)
    }

    /// Moves every entity to its state in `frame` of `joints`, which is
    /// indexed by canonical joint index
    ///
    /// # Errors
    /// Returns `PmError::FrameOutOfRange` for a missing frame and
    /// `PmError::NonFinite` if a built joint has no valid position in that
    /// frame
    pub fn advance<H: AnimationHost>(
        &mut self,
        host: &mut H,
        joints: &FrameArray,
        frame: usize,
    ) -> Result<(), PmError> {
        let points = joints.try_frame(frame)?;
        for (index, joint) in &mut self.joints {
            let location = points
                .get(*index)
                .copied()
                .filter(|p| p.iter().all(|c| c.is_finite()))
                .ok_or(PmError::NonFinite {
                    frame,
                    joint: *index,
                })?;
            joint.location = location;
            host.set_transform(joint.handle, Transform::from_location(location))?;
        }
        for segment in &mut self.segments {
            let start = &self.joints[&segment.start].location;
            let end = &self.joints[&segment.end].location;
            segment.transform = segment_transform(start, end);
            host.set_transform(segment.handle, segment.transform)?;
        }
        Ok(())
    }

    /// Records the current state of every entity as keyframes at `frame`
    ///
    /// # Errors
    /// May return `PmError` if the host rejects a keyframe
    pub fn record<H: AnimationHost>(
        &self,
        host: &mut H,
        frame: usize,
    ) -> Result<(), PmError> {
        for joint in self.joints.values() {
            host.key_transform(joint.handle, frame)?;
        }
        for segment in &self.segments {
            host.key_transform(segment.handle, frame)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn joint_location(&self, joint: usize) -> Option<glm::Vec3> {
        self.joints.get(&joint).map(|j| j.location)
    }

    #[must_use]
    pub fn joint_style(&self, joint: usize) -> Option<Style> {
        self.joints.get(&joint).map(|j| j.style)
    }

    #[must_use]
    pub fn segment_transform(&self, start: usize, end: usize) -> Option<Transform> {
        self.segment_index
            .get(&(start, end))
            .map(|i| self.segments[*i].transform)
    }

    #[must_use]
    pub fn segment_style(&self, start: usize, end: usize) -> Option<Style> {
        self.segment_index
            .get(&(start, end))
            .map(|i| self.segments[*i].style)
    }
}
