//! Grayscale reduction and obstacle-oriented corner detection.
//!
//! Corners come from a 16-pixel segment test on a strided scan, one survivor
//! per suppression cell. Survivors are bucketed into coarse clusters and kept
//! only when a depth, density or contrast heuristic marks them as likely
//! obstacles.

pub mod builder;
pub mod classification;
pub mod config;
pub mod corner_detection;
pub mod detector;
pub mod error;
pub mod preprocessing;
pub mod types;

pub use builder::DetectorBuilder;
pub use classification::{ClusterIndex, ObstacleClassifier};
pub use config::{DetectorConfig, ObstacleRules};
pub use corner_detection::CornerDetector;
pub use detector::FeatureDetector;
pub use error::{DetectError, DetectResult};
pub use preprocessing::ImagePreprocessing;
pub use types::{ClusterStats, CornerCandidate, CornerType};
