use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectError {
    #[error("Invalid image dimensions: {width}x{height} (must be > 0)")]
    InvalidImageSize { width: usize, height: usize },

    #[error("Image data length mismatch: expected {expected_len}, got {actual_len}")]
    InvalidImageData { expected_len: usize, actual_len: usize },

    #[error("Depth data length mismatch: expected {expected_len}, got {actual_len}")]
    InvalidDepthData { expected_len: usize, actual_len: usize },

    #[error("Invalid threshold: {0} (must be 1-127)")]
    InvalidThreshold(u8),

    #[error("Invalid minimum arc: {0} (must be 1-16)")]
    InvalidMinArc(usize),

    #[error("Invalid {name}: {value} (must be > 0)")]
    InvalidCellSize { name: &'static str, value: usize },

    #[error("Image {width}x{height} too small for a {border}px scan border (minimum {min_size}x{min_size})")]
    ImageTooSmall {
        width: usize,
        height: usize,
        border: usize,
        min_size: usize,
    },
}

pub type DetectResult<T> = Result<T, DetectError>;
