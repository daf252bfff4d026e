use thiserror::Error;
use vo_fast::DetectError;
use vo_track::TrackError;

#[derive(Debug, Error)]
pub enum SlamError {
    #[error("Detection failed: {0}")]
    Detect(#[from] DetectError),

    #[error("Tracking failed: {0}")]
    Track(#[from] TrackError),

    #[error("Invalid {name}: {value}")]
    InvalidConfig { name: &'static str, value: String },

    #[error("Session is already running")]
    AlreadyRunning,

    #[error("Session is not running")]
    NotRunning,

    #[cfg(feature = "serde")]
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "serde")]
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[cfg(feature = "serde")]
    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl SlamError {
    pub(crate) fn invalid(name: &'static str, value: impl ToString) -> Self {
        SlamError::InvalidConfig { name, value: value.to_string() }
    }
}

pub type SlamResult<T> = Result<T, SlamError>;
