//! Hand region segmentation of a body mesh
mod adjacency;
mod classify;
mod topology;

// Re-exports
pub use {
    adjacency::Adjacency,
    classify::{
        classify, classify_faces, fallback_seeds, percentile, proximity_seeds,
        select_seeds, FacePolicy, RegionOptions, Regions, Seeds,
    },
    topology::Topology,
};
