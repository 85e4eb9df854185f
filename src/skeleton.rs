//! Mapping of heterogeneous estimator skeletons onto the canonical skeleton
mod layout;
mod mapping;
mod remap;
mod source;

// Re-exports
pub use {
    layout::{
        hand_connections, Layout, BODY_LEN, HAND_LEN, LEFT_HAND_START, NECK,
        PELVIS, RIGHT_HAND_START, SMPLX_HAND_ANCHORS, STICK_MIDPOINTS,
    },
    mapping::{JointMapping, JointSource, RawSource, NO_SOURCE},
    remap::{remap, remap_flat, remap_sources, RemapReport, Remapped},
    source::PoseSource,
};
