//! Spatial indexing on the ground plane

pub mod sparse_hash;

pub use sparse_hash::{Positioned, SpatialHash};
