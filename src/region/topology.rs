use crate::pm_error::PmError;

/// Triangle faces over a fixed vertex count. Shared by every frame of a
/// sequence, only vertex positions change over time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    vertex_count: usize,
    faces: Vec<[u32; 3]>,
}

impl Topology {
    /// # Errors
    /// Returns `PmError::FaceIndexOutOfRange` for the first face that
    /// references a vertex beyond `vertex_count`
    pub fn new(vertex_count: usize, faces: Vec<[u32; 3]>) -> Result<Self, PmError> {
        for (face, tri) in faces.iter().enumerate() {
            if let Some(&v) = tri.iter().find(|v| **v as usize >= vertex_count) {
                return Err(PmError::FaceIndexOutOfRange {
                    face,
                    vertex: v as usize,
                    vertex_count,
                });
            }
        }
        Ok(Self {
            vertex_count,
            faces,
        })
    }

    /// Creates topology from a flat row-major (faces, 3) index array
    ///
    /// # Errors
    /// Returns `PmError::BadShape` unless the shape is (faces, 3) and
    /// matches the data, otherwise as `new`
    pub fn from_flat(
        vertex_count: usize,
        indices: &[u32],
        shape: &[usize],
    ) -> Result<Self, PmError> {
        match *shape {
            [count, 3] if count.checked_mul(3) == Some(indices.len()) => Self::new(
                vertex_count,
                indices
                    .chunks_exact(3)
                    .map(|c| [c[0], c[1], c[2]])
                    .collect(),
            ),
            _ => Err(PmError::BadShape {
                expected: "(faces, 3)",
                actual: shape.to_vec(),
            }),
        }
    }

    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Faces for which `keep` is true, in their original order. Vertex
    /// indices are left as they are so the result still indexes the full
    /// vertex array.
    #[must_use]
    pub fn select_faces(&self, keep: &[bool]) -> Vec<[u32; 3]> {
        self.faces
            .iter()
            .zip(keep)
            .filter(|(_, k)| **k)
            .map(|(f, _)| *f)
            .collect()
    }
}
