use crate::{
    region::Topology,
    types::{Region, Style},
};
use nalgebra_glm as glm;
use std::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Interpolation {
    Linear,
    Step,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Keyframe<T> {
    pub frame: usize,
    pub data: T,
}

/// Keyframes of one animated property, kept sorted by frame with at most one
/// keyframe per frame
#[derive(Clone, Debug)]
pub struct AnimationChannel<T> {
    pub interpolation: Interpolation,
    pub data: Vec<Keyframe<T>>,
}

impl<T> AnimationChannel<T> {
    #[must_use]
    pub const fn new(interpolation: Interpolation) -> Self {
        Self {
            interpolation,
            data: Vec::new(),
        }
    }

    /// Inserts a keyframe, replacing any existing keyframe at the same frame
    pub fn insert(&mut self, frame: usize, data: T) {
        match self.data.binary_search_by_key(&frame, |k| k.frame) {
            Ok(i) => self.data[i].data = data,
            Err(i) => self.data.insert(i, Keyframe { frame, data }),
        }
    }

    #[must_use]
    pub fn get(&self, frame: usize) -> Option<&T> {
        self.data
            .binary_search_by_key(&frame, |k| k.frame)
            .ok()
            .map(|i| &self.data[i].data)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Stable structural identity of an entity on an animation host. Building
/// against a host that already holds an entity with the same key reuses it.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum EntityKey {
    Joint(usize),
    Segment(usize, usize),
    Mesh(String),
    ShapeChannel { mesh: String, frame: usize },
}

/// Names as they appear in the host's outliner
impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Joint(a) => write!(f, "Keypoint_{a}"),
            Self::Segment(a, b) => write!(f, "Connection_{a}_{b}"),
            Self::Mesh(name) => write!(f, "{name}"),
            Self::ShapeChannel { frame, .. } => write!(f, "Frame_{frame:04}"),
        }
    }
}

/// Handle to an entity owned by an animation host
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Handle(pub usize);

/// Geometry a deformable mesh is created from
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub topology: Topology,
    /// Rest positions, normally frame 0
    pub base: Vec<glm::Vec3>,
    /// Region per face, empty if the mesh is not segmented
    pub face_regions: Vec<Region>,
}

/// What a host is asked to create
#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    /// Position-only marker
    Joint(Style),
    /// Stretched connector between two joints
    Segment(Style),
    /// Deformable mesh
    Mesh(MeshData),
    /// One full set of vertex positions for a mesh, selected by weight
    ShapeChannel {
        mesh: Handle,
        positions: Vec<glm::Vec3>,
    },
}
