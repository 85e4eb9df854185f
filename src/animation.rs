//! Frame indexed animation of skeletons and deforming meshes on an external
//! animation host
mod host;
mod rig;
mod scene;
mod shape;
mod types;
mod util;

// Re-exports
pub use {
    host::AnimationHost,
    rig::{segment_transform, BuildReport, Rig},
    scene::{Entity, Scene},
    shape::ShapeSequence,
    types::{
        AnimationChannel, EntityKey, EntityKind, Handle, Interpolation,
        Keyframe, MeshData,
    },
    util::{sample, Blend},
};
