//! Frame-to-frame feature tracking by patch comparison.
//!
//! Each sampled previous feature is described by the 7x7 intensity patch
//! around it and searched for in the current frame inside a square window.
//! The offset with the lowest sum of squared differences wins.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod tracker;

pub use config::TrackerConfig;
pub use descriptor::{PatchDescriptor, DESCRIPTOR_SIZE, PATCH_RADIUS};
pub use error::{TrackError, TrackResult};
pub use tracker::FeatureTracker;
