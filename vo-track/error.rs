use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    #[error("Invalid image dimensions: {width}x{height} (must be > 0)")]
    InvalidImageSize { width: usize, height: usize },

    #[error("{which} image length mismatch: expected {expected_len}, got {actual_len}")]
    InvalidImageData {
        which: &'static str,
        expected_len: usize,
        actual_len: usize,
    },

    #[error("Invalid {name}: {value} (must be > 0)")]
    InvalidParameter { name: &'static str, value: usize },

    #[error("Search stride {stride} exceeds search radius {radius}")]
    StrideExceedsRadius { stride: usize, radius: usize },
}

pub type TrackResult<T> = Result<T, TrackError>;
