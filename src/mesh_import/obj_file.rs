use super::types::{ImportError, ImportedMesh};
use crate::{pm_error::PmError, region::Topology};
use log::info;
use nalgebra_glm as glm;
use std::path::Path;

/// Positions and faces are all that matter here, so no single index and no
/// points or lines
const LOAD_OPTIONS: tobj::LoadOptions = tobj::LoadOptions {
    single_index: false,
    triangulate: true,
    ignore_points: true,
    ignore_lines: true,
};

/// Load the reference mesh of a sequence from a Wavefront .obj file. Loads
/// the file into memory and calls `process_obj`. You may call that directly
/// if you've loaded or generated OBJ data some other way.
///
/// # Errors
/// May return `PmError`
pub fn load_obj(path: &Path) -> Result<ImportedMesh, PmError> {
    let load_result = tobj::load_obj(path, &LOAD_OPTIONS);
    process_obj(load_result)
}

/// Load OBJ data from any buffered reader. Material libraries are ignored.
///
/// # Errors
/// May return `PmError`
pub fn load_obj_buf<B: std::io::BufRead>(
    reader: &mut B,
) -> Result<ImportedMesh, PmError> {
    let load_result = tobj::load_obj_buf(reader, &LOAD_OPTIONS, |_| {
        Err(tobj::LoadError::OpenFileFailed)
    });
    process_obj(load_result)
}

/// Process loaded Wavefront OBJ data. Every model in the file becomes part
/// of one mesh, with face indices offset by the vertices of the models
/// before it.
///
/// # Errors
/// May return `PmError`
pub fn process_obj(
    load_result: tobj::LoadResult,
) -> Result<ImportedMesh, PmError> {
    let (tobj_models, _) = load_result?;
    info!("Found {} submeshes", tobj_models.len());
    if tobj_models.is_empty() {
        Err(ImportError::NoMesh)?;
    }

    let mut vertices = Vec::new();
    let mut faces = Vec::new();
    let mut submeshes = Vec::new();
    for m in &tobj_models {
        let mesh = &m.mesh;
        if mesh.positions.is_empty() {
            Err(ImportError::NoPositions)?;
        }
        if mesh.positions.len() % 3 != 0 {
            Err(ImportError::CountMismatch)?;
        }
        // Triangulated input leaves face_arities empty
        if mesh.indices.len() % 3 != 0
            || mesh.face_arities.iter().any(|a| *a != 3)
        {
            Err(ImportError::NoTriangles)?;
        }
        let offset = u32::try_from(vertices.len())
            .map_err(|_| ImportError::VertexCountTooLarge)?;
        let pos_count = mesh.positions.len() / 3;
        info!(
            "Submesh {} vertices={}, triangles={}",
            m.name,
            pos_count,
            mesh.indices.len() / 3,
        );
        vertices.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|p| glm::vec3(p[0], p[1], p[2])),
        );
        faces.extend(
            mesh.indices
                .chunks_exact(3)
                .map(|t| [t[0] + offset, t[1] + offset, t[2] + offset]),
        );
        submeshes.push((m.name.clone(), pos_count));
    }
    if faces.is_empty() {
        Err(ImportError::NoTriangles)?;
    }
    let topology = Topology::new(vertices.len(), faces)?;
    Ok(ImportedMesh {
        topology,
        vertices,
        submeshes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const QUAD: &str = "o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";

    #[test]
    fn quad_is_triangulated() {
        let mesh = load_obj_buf(&mut Cursor::new(QUAD)).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.topology.face_count(), 2);
        assert_eq!(mesh.submeshes, vec![("quad".to_string(), 4)]);
    }

    #[test]
    fn models_are_merged() {
        let text = format!("{QUAD}o tri\nv 0 0 1\nv 1 0 1\nv 0 1 1\nf 5 6 7\n");
        let mesh = load_obj_buf(&mut Cursor::new(text)).unwrap();
        assert_eq!(mesh.vertices.len(), 7);
        assert_eq!(mesh.topology.face_count(), 3);
        assert_eq!(mesh.topology.faces()[2], [4, 5, 6]);
    }

    #[test]
    fn no_faces() {
        let res = load_obj_buf(&mut Cursor::new("v 0 0 0\nv 1 0 0\n"));
        assert!(matches!(
            res,
            Err(PmError::ImportError(
                ImportError::NoTriangles | ImportError::NoMesh
            ))
        ));
    }
}
