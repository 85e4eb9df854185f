use crate::region::Topology;
use nalgebra_glm as glm;

/// Reference mesh read from a file: fixed topology plus one frame of vertex
/// positions
#[derive(Clone, Debug, PartialEq)]
pub struct ImportedMesh {
    pub topology: Topology,
    pub vertices: Vec<glm::Vec3>,
    /// Name and vertex count of each submesh in file order
    pub submeshes: Vec<(String, usize)>,
}

/// Errors specific to importing data. `PmError` has a `From` trait to
/// handle these.
#[derive(Debug)]
pub enum ImportError {
    NoMesh,
    NoTriangles,
    NoPositions,
    CountMismatch,
    VertexCountTooLarge,
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::NoMesh => write!(f, "the file contains no mesh"),
            Self::NoTriangles => {
                write!(f, "only triangulated meshes are supported")
            }
            Self::NoPositions => {
                write!(f, "vertex positions are required")
            }
            Self::CountMismatch => {
                write!(f, "position data is not a multiple of 3")
            }
            Self::VertexCountTooLarge => {
                write!(f, "vertex count does not fit 32 bit indices")
            }
        }
    }
}
