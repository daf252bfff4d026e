//! Monocular visual odometry on top of the detector and tracker crates.
//!
//! [`VisualOdometry`] runs one cycle per frame: obstacle features are
//! detected, the previous frame's features are tracked into the current
//! frame, the median flow becomes a pose delta, the pose is integrated into
//! a bounded trajectory and the features are fused into a landmark map.
//! [`Session`] drives a pipeline from a [`FrameSource`].

pub mod config;
pub mod error;
pub mod estimator;
pub mod geo;
pub mod landmarks;
pub mod pipeline;
pub mod rate;
pub mod session;
pub mod trajectory;

pub use config::{EstimatorConfig, MapConfig, PipelineConfig};
pub use error::{SlamError, SlamResult};
pub use estimator::PoseEstimator;
pub use geo::{GeoAnchor, GeoPoint, METERS_PER_DEGREE};
pub use landmarks::{LandmarkMap, MapUpdate};
pub use pipeline::{CycleReport, Snapshot, VisualOdometry};
pub use rate::RateMeter;
pub use session::{FrameSource, IterSource, RunEnd, RunState, RunSummary, Session, SessionControl};
pub use trajectory::{integrate, Trajectory};

pub use vo_core::{
    normalize_angle, Correspondence, DepthMap, Feature, FeatureKind, Frame, FrameInput, Landmark, LandmarkId,
    ObstacleCue, PixelCoord, PixelFormat, Pose, PoseDelta, PositionFix, RawFrame, TrajectoryPoint,
};
pub use vo_fast::{DetectorBuilder, DetectorConfig, FeatureDetector, ImagePreprocessing};
pub use vo_track::{FeatureTracker, TrackerConfig};
