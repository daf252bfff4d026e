//! Host side of the visual odometry pipeline: image-sequence frame sources,
//! batch detection and rendering of overlays and maps.

pub mod batch;
pub mod render;
pub mod source;

use std::path::PathBuf;

use thiserror::Error;
use vo_fast::DetectError;
use vo_slam::{GeoAnchor, SlamError};

pub use batch::{DetectionOutcome, detect_images};
pub use render::{MapRenderer, draw_features, feature_overlay};
pub use source::{DirectorySource, image_paths, load_luma, load_raw_frame};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pipeline error: {0}")]
    Slam(#[from] SlamError),

    #[error("Detection error: {0}")]
    Detect(#[from] DetectError),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No images found in {0}")]
    NoImages(PathBuf),

    #[error("Buffer of {actual} bytes does not fit a {width}x{height} image")]
    BufferSize { width: usize, height: usize, actual: usize },

    #[error("Invalid anchor '{0}' (expected LAT,LON in degrees)")]
    InvalidAnchor(String),
}

pub type CliResult<T> = Result<T, CliError>;

/// Configure the global rayon pool used by batch detection
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads.max(1))
        .build_global()
}

/// Parse `LAT,LON` into a geographic anchor
pub fn parse_anchor(s: &str) -> CliResult<GeoAnchor> {
    let invalid = || CliError::InvalidAnchor(s.to_string());
    let (lat, lon) = s.split_once(',').ok_or_else(invalid)?;
    let latitude: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let longitude: f64 = lon.trim().parse().map_err(|_| invalid())?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(invalid());
    }
    Ok(GeoAnchor::new(latitude, longitude))
}
