use crate::config::{DetectorConfig, ObstacleRules};
use crate::detector::FeatureDetector;
use crate::error::DetectResult;

/// Builder for creating a `FeatureDetector`
#[derive(Debug, Clone)]
pub struct DetectorBuilder {
    config: DetectorConfig,
}

impl DetectorBuilder {
    /// Create a new builder with default settings
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            config: DetectorConfig::new(width, height),
        }
    }

    /// Set the segment-test threshold (1-127)
    pub fn threshold(mut self, threshold: u8) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Set the number of brighter/darker circle pixels that make a corner
    pub fn min_arc(mut self, min_arc: usize) -> Self {
        self.config.min_arc = min_arc;
        self
    }

    pub fn border(mut self, border: usize) -> Self {
        self.config.border = border;
        self
    }

    pub fn stride(mut self, stride: usize) -> Self {
        self.config.stride = stride;
        self
    }

    /// Set the non-maximum suppression cell size
    pub fn nms_cell(mut self, cell: usize) -> Self {
        self.config.nms_cell = cell;
        self
    }

    pub fn cluster_cell(mut self, cell: usize) -> Self {
        self.config.cluster_cell = cell;
        self
    }

    pub fn max_features(mut self, max_features: usize) -> Self {
        self.config.max_features = max_features;
        self
    }

    pub fn obstacle_rules(mut self, rules: ObstacleRules) -> Self {
        self.config.obstacle = rules;
        self
    }

    /// Apply the sparse preset
    pub fn preset_sparse(mut self) -> Self {
        self.config = DetectorConfig::sparse_preset(self.config.width, self.config.height);
        self
    }

    /// Apply the dense preset
    pub fn preset_dense(mut self) -> Self {
        self.config = DetectorConfig::dense_preset(self.config.width, self.config.height);
        self
    }

    /// Build the `FeatureDetector`
    pub fn build(self) -> DetectResult<FeatureDetector> {
        FeatureDetector::new(self.config)
    }

    /// Generate a summary of the builder's configuration
    pub fn summary(&self) -> String {
        self.config.summary()
    }

    /// Create a builder from an existing `DetectorConfig`
    pub fn from_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Convert the builder into a `DetectorConfig`
    pub fn to_config(self) -> DetectorConfig {
        self.config
    }
}
