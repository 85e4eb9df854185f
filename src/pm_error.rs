use std::{error, fmt};

/// Unified error type
///
/// Shape and index problems are fatal input-validation errors and carry the
/// expected and actual values so a failing run can be diagnosed from the
/// message alone. Completeness problems such as unmapped joints are not
/// errors and are reported through `pipeline::Diagnostics` instead.
#[derive(Debug)]
pub enum PmError {
    BadShape {
        expected: &'static str,
        actual: Vec<usize>,
    },
    FrameCountMismatch {
        expected: usize,
        actual: usize,
    },
    PointCountMismatch {
        expected: usize,
        actual: usize,
    },
    IndexOutOfRange {
        index: usize,
        limit: usize,
    },
    FaceIndexOutOfRange {
        face: usize,
        vertex: usize,
        vertex_count: usize,
    },
    FrameOutOfRange {
        frame: usize,
        frame_count: usize,
    },
    NonFinite {
        frame: usize,
        joint: usize,
    },
    InvalidSource(i64),
    UnknownHandle(usize),
    WrongEntityKind(usize),
    ImportError(crate::mesh_import::ImportError),
    SerdeYamlError(Box<serde_yaml::Error>),
    StdIoError(std::io::Error),
    TObjLoadError(tobj::LoadError),
}

impl error::Error for PmError {}

impl fmt::Display for PmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::BadShape { expected, actual } => {
                write!(f, "expected array shape {expected}, got {actual:?}")
            }
            Self::FrameCountMismatch { expected, actual } => {
                write!(f, "expected {expected} frames, got {actual}")
            }
            Self::PointCountMismatch { expected, actual } => {
                write!(f, "expected {expected} points per frame, got {actual}")
            }
            Self::IndexOutOfRange { index, limit } => {
                write!(f, "index {index} is outside the valid range 0..{limit}")
            }
            Self::FaceIndexOutOfRange {
                face,
                vertex,
                vertex_count,
            } => {
                write!(
                    f,
                    "face {face} references vertex {vertex} but the mesh has \
                     {vertex_count} vertices"
                )
            }
            Self::FrameOutOfRange { frame, frame_count } => {
                write!(f, "frame {frame} requested but only {frame_count} exist")
            }
            Self::NonFinite { frame, joint } => {
                write!(f, "joint {joint} has no valid position in frame {frame}")
            }
            Self::InvalidSource(a) => {
                write!(f, "mapping source {a} is neither an index nor -1")
            }
            Self::UnknownHandle(a) => write!(f, "entity handle {a} not found"),
            Self::WrongEntityKind(a) => {
                write!(f, "entity handle {a} does not support this operation")
            }
            Self::ImportError(e) => write!(f, "import error: {e}"),
            Self::SerdeYamlError(e) => {
                write!(f, "serde_yaml::Error: {e}")
            }
            Self::StdIoError(e) => write!(f, "std::io::Error: {}", e.kind()),
            Self::TObjLoadError(e) => write!(f, "tobj crate LoadError: {e}"),
        }
    }
}

impl From<serde_yaml::Error> for PmError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::SerdeYamlError(Box::new(e))
    }
}

impl From<std::io::Error> for PmError {
    fn from(e: std::io::Error) -> Self {
        Self::StdIoError(e)
    }
}

impl From<tobj::LoadError> for PmError {
    fn from(e: tobj::LoadError) -> Self {
        Self::TObjLoadError(e)
    }
}

impl From<crate::mesh_import::ImportError> for PmError {
    fn from(e: crate::mesh_import::ImportError) -> Self {
        Self::ImportError(e)
    }
}
