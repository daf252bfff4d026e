use log::{debug, info, warn};
use vo_core::{DepthMap, Feature, Frame, FrameInput, Image, Landmark, Pose, PoseDelta, TrajectoryPoint};
use vo_fast::{FeatureDetector, ImagePreprocessing};
use vo_track::FeatureTracker;

use crate::config::PipelineConfig;
use crate::error::SlamResult;
use crate::estimator::PoseEstimator;
use crate::landmarks::{LandmarkMap, MapUpdate};
use crate::trajectory::{integrate, Trajectory};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What one processing cycle did
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CycleReport {
    /// 1-based index since construction or the last reset
    pub cycle: u64,
    pub timestamp: f64,
    pub features: usize,
    pub matches: usize,
    pub delta: PoseDelta,
    pub pose: Pose,
    pub map: MapUpdate,
    /// No previous frame was available to track against
    pub cold_start: bool,
}

/// Observer view of the pipeline state after a cycle
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot {
    pub cycle: u64,
    pub pose: Pose,
    pub trajectory: Vec<TrajectoryPoint>,
    pub landmarks: Vec<Landmark>,
    pub features: Vec<Feature>,
    /// Cycles per second
    pub rate: f64,
}

impl Snapshot {
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> SlamResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save snapshot to JSON file
    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> SlamResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Luminance and features of the last processed frame
#[derive(Debug, Clone)]
struct PreviousFrame {
    luma: Image,
    features: Vec<Feature>,
}

/// Per-frame visual odometry: detect, track, estimate, integrate, map.
///
/// Owns all cross-cycle state. A cycle either completes or leaves the state
/// untouched.
#[derive(Debug, Clone)]
pub struct VisualOdometry {
    cfg: PipelineConfig,
    detector: FeatureDetector,
    tracker: FeatureTracker,
    estimator: PoseEstimator,
    previous: Option<PreviousFrame>,
    pose: Pose,
    trajectory: Trajectory,
    landmarks: LandmarkMap,
    features: Vec<Feature>,
    cycles: u64,
}

impl VisualOdometry {
    pub fn new(cfg: PipelineConfig) -> SlamResult<Self> {
        cfg.validate()?;
        let (width, height) = cfg.dimensions();
        let detector = FeatureDetector::new(cfg.detector.clone())?;
        let tracker = FeatureTracker::new(cfg.tracker.clone(), width, height)?;
        info!("pipeline ready: {}x{}", width, height);

        Ok(Self {
            detector,
            tracker,
            estimator: PoseEstimator::new(cfg.estimator.clone()),
            previous: None,
            pose: Pose::ORIGIN,
            trajectory: Trajectory::new(cfg.trajectory_capacity),
            landmarks: LandmarkMap::new(cfg.map.clone()),
            features: Vec::new(),
            cycles: 0,
            cfg,
        })
    }

    /// Run one cycle on a luminance frame
    pub fn process(&mut self, frame: &Frame, depth: Option<&DepthMap>) -> SlamResult<CycleReport> {
        self.process_owned(frame.clone(), depth)
    }

    /// Run one cycle on a raw supplier frame, reducing it to luminance first
    pub fn process_input(&mut self, input: &FrameInput) -> SlamResult<CycleReport> {
        let frame = ImagePreprocessing::to_luma(&input.frame)?;
        self.process_owned(frame, input.depth.as_ref())
    }

    /// Like [`process`](Self::process), keeping the frame as the next cycle's reference
    pub fn process_owned(&mut self, frame: Frame, depth: Option<&DepthMap>) -> SlamResult<CycleReport> {
        let features = self.detector.detect_frame(&frame, depth)?;
        let luma = frame.luma;

        let (matches, cold_start) = match &self.previous {
            Some(prev) => (self.tracker.track(&prev.luma, &luma, &prev.features)?, false),
            None => (Vec::new(), true),
        };

        let delta = self.estimator.estimate(&matches);
        if !cold_start && matches.len() < self.cfg.estimator.min_correspondences {
            warn!(
                "only {} correspondences (need {}), holding pose",
                matches.len(),
                self.cfg.estimator.min_correspondences
            );
        }

        self.pose = integrate(&self.pose, &delta);
        self.trajectory.push(self.pose.position());
        let map = self.landmarks.update(&features, &self.pose);

        self.cycles += 1;
        let report = CycleReport {
            cycle: self.cycles,
            timestamp: frame.timestamp,
            features: features.len(),
            matches: matches.len(),
            delta,
            pose: self.pose,
            map,
            cold_start,
        };
        debug!(
            "cycle {}: {} features, {} matches, delta ({:.4}, {:.4}, {:.4}), pose ({:.4}, {:.4}, {:.4})",
            report.cycle,
            report.features,
            report.matches,
            delta.dx,
            delta.dy,
            delta.dheading,
            self.pose.x,
            self.pose.y,
            self.pose.heading
        );

        self.previous = Some(PreviousFrame { luma, features: features.clone() });
        self.features = features;
        Ok(report)
    }

    /// Back to the origin with an empty map; the next cycle is a cold start
    pub fn reset(&mut self) {
        self.previous = None;
        self.pose = Pose::ORIGIN;
        self.trajectory.reset();
        self.landmarks.clear();
        self.features.clear();
        self.cycles = 0;
        info!("pipeline reset");
    }

    pub fn snapshot(&self, rate: f64) -> Snapshot {
        Snapshot {
            cycle: self.cycles,
            pose: self.pose,
            trajectory: self.trajectory.to_vec(),
            landmarks: self.landmarks.landmarks().to_vec(),
            features: self.features.clone(),
            rate,
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn landmarks(&self) -> &LandmarkMap {
        &self.landmarks
    }

    /// Obstacle features of the last cycle
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Luminance of the last processed frame, the next cycle's tracking reference
    pub fn reference_luma(&self) -> Option<&Image> {
        self.previous.as_ref().map(|p| &p.luma)
    }

    /// True until a frame has been processed since construction or reset
    pub fn is_cold(&self) -> bool {
        self.previous.is_none()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }
}
