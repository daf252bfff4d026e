use std::f64::consts::PI;

use vo_fast::DetectorConfig;
use vo_track::TrackerConfig;

use crate::error::{SlamError, SlamResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of the median-flow pose estimator
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EstimatorConfig {
    /// Below this many correspondences the delta is exactly zero
    pub min_correspondences: usize,
    /// Pivot of the rotation estimate, in pixels
    pub optical_center: (f64, f64),
    /// Per-match angle changes larger than this (radians) are ignored
    pub max_rotation_step: f64,
    /// Motion units per pixel of median flow
    pub pixel_to_motion: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            min_correspondences: 5,
            optical_center: (320.0, 240.0),
            max_rotation_step: 0.5,
            pixel_to_motion: 0.001,
        }
    }
}

impl EstimatorConfig {
    /// Defaults with the optical center in the middle of a `width` x `height` frame
    pub fn centered(width: usize, height: usize) -> Self {
        Self {
            optical_center: (width as f64 / 2.0, height as f64 / 2.0),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SlamResult<()> {
        if self.min_correspondences == 0 {
            return Err(SlamError::invalid("min_correspondences", self.min_correspondences));
        }
        if !(self.optical_center.0.is_finite() && self.optical_center.1.is_finite()) {
            return Err(SlamError::invalid("optical_center", format!("{:?}", self.optical_center)));
        }
        if !(self.max_rotation_step > 0.0 && self.max_rotation_step <= PI) {
            return Err(SlamError::invalid("max_rotation_step", self.max_rotation_step));
        }
        if !(self.pixel_to_motion.is_finite() && self.pixel_to_motion > 0.0) {
            return Err(SlamError::invalid("pixel_to_motion", self.pixel_to_motion));
        }
        Ok(())
    }
}

/// Parameters of the landmark map
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MapConfig {
    /// Inserts beyond this count are rejected
    pub capacity: usize,
    /// Match radius in pixels, converted with `match_scale`
    pub match_threshold_px: f64,
    pub match_scale: f64,
    /// World units per pixel of horizontal image offset
    pub projection_scale: f64,
    pub max_quality: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            capacity: 500,
            match_threshold_px: 10.0,
            match_scale: 0.001,
            projection_scale: 0.001,
            max_quality: 10,
        }
    }
}

impl MapConfig {
    /// Match radius in world units
    pub fn match_distance(&self) -> f64 {
        self.match_threshold_px * self.match_scale
    }

    pub fn validate(&self) -> SlamResult<()> {
        if !(self.match_threshold_px.is_finite() && self.match_threshold_px >= 0.0) {
            return Err(SlamError::invalid("match_threshold_px", self.match_threshold_px));
        }
        if !(self.match_scale.is_finite() && self.match_scale > 0.0) {
            return Err(SlamError::invalid("match_scale", self.match_scale));
        }
        if !self.projection_scale.is_finite() {
            return Err(SlamError::invalid("projection_scale", self.projection_scale));
        }
        if self.max_quality == 0 {
            return Err(SlamError::invalid("max_quality", self.max_quality));
        }
        Ok(())
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineConfig {
    #[cfg_attr(feature = "serde", serde(default = "default_trajectory_capacity"))]
    pub trajectory_capacity: usize,
    pub detector: DetectorConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tracker: TrackerConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub estimator: EstimatorConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub map: MapConfig,
}

#[cfg(feature = "serde")]
fn default_trajectory_capacity() -> usize {
    PipelineConfig::DEFAULT_TRAJECTORY_CAPACITY
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl PipelineConfig {
    pub const DEFAULT_TRAJECTORY_CAPACITY: usize = 500;

    pub fn new(width: usize, height: usize) -> Self {
        Self::with_detector(DetectorConfig::new(width, height))
    }

    /// Pipeline around an existing detector configuration.
    ///
    /// The estimator keeps its fixed optical center whatever the frame size;
    /// use [`EstimatorConfig::centered`] to pivot on the frame middle instead.
    pub fn with_detector(detector: DetectorConfig) -> Self {
        Self {
            trajectory_capacity: Self::DEFAULT_TRAJECTORY_CAPACITY,
            detector,
            tracker: TrackerConfig::default(),
            estimator: EstimatorConfig::default(),
            map: MapConfig::default(),
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.detector.width, self.detector.height)
    }

    pub fn summary(&self) -> String {
        format!(
            "{}\n{}\nEstimator: min_matches={}, center=({}, {}), max_rot={} rad, scale={}\n\
             Map: capacity={}, match<{}, projection={}, max_quality={}\nTrajectory: capacity={}",
            self.detector.summary(),
            self.tracker.summary(),
            self.estimator.min_correspondences,
            self.estimator.optical_center.0,
            self.estimator.optical_center.1,
            self.estimator.max_rotation_step,
            self.estimator.pixel_to_motion,
            self.map.capacity,
            self.map.match_distance(),
            self.map.projection_scale,
            self.map.max_quality,
            self.trajectory_capacity
        )
    }

    pub fn validate(&self) -> SlamResult<()> {
        self.detector.validate()?;
        self.tracker.validate()?;
        self.estimator.validate()?;
        self.map.validate()?;
        if self.trajectory_capacity == 0 {
            return Err(SlamError::invalid("trajectory_capacity", self.trajectory_capacity));
        }
        Ok(())
    }

    /// Save configuration to JSON file
    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> SlamResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load configuration from JSON file
    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> SlamResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save configuration to TOML file
    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> SlamResult<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Load configuration from TOML file
    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> SlamResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load from a `.json` or `.toml` file, chosen by extension
    #[cfg(feature = "serde")]
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> SlamResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::load_json(path),
            _ => Self::load_toml(path),
        }
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> SlamResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> SlamResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> SlamResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> SlamResult<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::PoseEstimator;
    use vo_core::{Correspondence, PixelCoord};

    #[test]
    fn test_defaults() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.dimensions(), (640, 480));
        assert_eq!(cfg.estimator, EstimatorConfig::default());
        assert_eq!(cfg.estimator.optical_center, (320.0, 240.0));
        assert_eq!(cfg.map.match_distance(), 10.0 * 0.001);
        assert_eq!(cfg.map.capacity, 500);
        assert_eq!(cfg.trajectory_capacity, 500);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_optical_center_is_fixed_across_frame_sizes() {
        let cfg = PipelineConfig::new(200, 200);
        assert_eq!(cfg.estimator.optical_center, (320.0, 240.0));
        assert_eq!(cfg.estimator, EstimatorConfig::default());
        assert_eq!(EstimatorConfig::centered(200, 200).optical_center, (100.0, 100.0));

        // Vertical motion left of the pivot turns the other way about the frame middle
        let matches: Vec<Correspondence> = (0..5)
            .map(|i| Correspondence::new(PixelCoord::new(150, 100 + i), PixelCoord::new(150, 110 + i), 0))
            .collect();
        let fixed = PoseEstimator::new(cfg.estimator.clone()).estimate(&matches);
        let centered = PoseEstimator::new(EstimatorConfig::centered(200, 200)).estimate(&matches);
        assert!(fixed.dheading < 0.0 && fixed.dheading > -0.1);
        assert!(centered.dheading > 0.1);
    }

    #[test]
    fn test_validation_reaches_every_section() {
        let mut cfg = PipelineConfig::default();
        cfg.detector.threshold = 0;
        assert!(matches!(cfg.validate(), Err(SlamError::Detect(_))));

        let mut cfg = PipelineConfig::default();
        cfg.tracker.search_stride = 0;
        assert!(matches!(cfg.validate(), Err(SlamError::Track(_))));

        let mut cfg = PipelineConfig::default();
        cfg.estimator.min_correspondences = 0;
        assert!(matches!(
            cfg.validate(),
            Err(SlamError::InvalidConfig { name: "min_correspondences", .. })
        ));

        let mut cfg = PipelineConfig::default();
        cfg.map.max_quality = 0;
        assert!(matches!(cfg.validate(), Err(SlamError::InvalidConfig { name: "max_quality", .. })));

        let mut cfg = PipelineConfig::default();
        cfg.trajectory_capacity = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_summary() {
        let summary = PipelineConfig::default().summary();
        assert!(summary.contains("640x480"));
        assert!(summary.contains("max_ssd=3000"));
        assert!(summary.contains("capacity=500"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_and_toml_round_trip() {
        let mut cfg = PipelineConfig::new(320, 240);
        cfg.map.capacity = 42;
        cfg.tracker.refine_radius = 0;

        let back = PipelineConfig::from_json(&cfg.to_json().unwrap()).unwrap();
        assert_eq!(back, cfg);
        let back = PipelineConfig::from_toml(&cfg.to_toml().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_toml_uses_defaults() {
        let text = r#"
[detector]
width = 640
height = 480
threshold = 25
border = 10
stride = 3
min_arc = 12
nms_cell = 6
cluster_cell = 35
max_features = 1500
"#;
        let cfg = PipelineConfig::from_toml(text).unwrap();
        assert_eq!(cfg.detector.threshold, 25);
        assert_eq!(cfg.tracker, TrackerConfig::default());
        assert_eq!(cfg.trajectory_capacity, 500);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_loading_validates() {
        let mut cfg = PipelineConfig::default();
        cfg.estimator.pixel_to_motion = -1.0;
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(PipelineConfig::from_json(&json).is_err());
    }
}
