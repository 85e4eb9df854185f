pub mod obj_file;
mod types;

// Re-exports
pub use {
    obj_file::{load_obj, load_obj_buf, process_obj},
    types::{ImportError, ImportedMesh},
};
