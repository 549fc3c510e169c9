//! Distributed voxel-driven back-projection for cone-beam CT.
//!
//! The projections of a scan are divided statically among the members of a
//! [`group::ProcessGroup`]. Each member back-projects its share onto a private
//! volume, in parallel over Z slices, and the partial volumes are summed onto
//! the coordinator. See [`reconstruct::reconstruct`].

pub mod backproject;
pub mod config;
pub mod detector;
pub mod error;
pub mod io;
pub mod loader;
pub mod partition;
pub mod reconstruct;
pub mod types;
pub mod utils;
pub mod volume;

pub use detector::Detector;
pub use error::{Error, Result};
pub use reconstruct::{reconstruct, Reconstruction, Report};
pub use volume::Volume;
