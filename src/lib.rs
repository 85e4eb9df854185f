//! Turns per-frame body and hand pose estimates, plus an optional estimated
//! body mesh, into a canonical skeleton and a region tagged deforming mesh
//! animated frame by frame on an animation host.
pub mod animation;
pub mod config;
pub mod frames;
pub mod mesh_import;
pub mod normalize;
pub mod pipeline;
pub mod pm_error;
pub mod region;
pub mod skeleton;
pub mod types;
