use crate::error::{DetectError, DetectResult};
use crate::builder::DetectorBuilder;

#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};

/// Thresholds of the obstacle classification rules
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ObstacleRules {
    /// Depth below which a corner is always an obstacle
    pub near_depth: f32,
    /// Open depth band that counts when the cluster has company
    pub depth_band: (f32, f32),
    pub depth_min_cluster: usize,
    /// Lower bound of the dense-cluster threshold
    pub density_floor: f32,
    pub mean_factor: f32,
    pub dense_margin: f32,
    pub contrast_score: u8,
    pub max_imbalance: u8,
    /// Central region as (x_min, x_max, y_min, y_max) fractions of the frame
    pub center_region: (f32, f32, f32, f32),
    pub center_median_factor: f32,
    pub strong_score: u8,
    pub anomaly_median_factor: f32,
}

impl Default for ObstacleRules {
    fn default() -> Self {
        Self {
            near_depth: 1.8,
            depth_band: (0.5, 4.0),
            depth_min_cluster: 2,
            density_floor: 2.5,
            mean_factor: 1.4,
            dense_margin: 1.1,
            contrast_score: 15,
            max_imbalance: 2,
            center_region: (0.3, 0.7, 0.2, 0.8),
            center_median_factor: 1.4,
            strong_score: 16,
            anomaly_median_factor: 2.2,
        }
    }
}

/// Complete detector configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorConfig {
    /// Image dimensions
    pub width: usize,
    pub height: usize,
    /// Intensity margin of the segment test
    pub threshold: u8,
    /// Pixels excluded along every edge
    pub border: usize,
    /// Scan step in rows and columns
    pub stride: usize,
    /// Brighter or darker circle pixels needed for a corner
    pub min_arc: usize,
    /// Non-maximum suppression cell size in pixels
    pub nms_cell: usize,
    /// Cluster cell size used for density statistics
    pub cluster_cell: usize,
    pub max_features: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub obstacle: ObstacleRules,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl DetectorConfig {
    /// Create new configuration with default settings
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            threshold: 20,
            border: 10,
            stride: 3,
            min_arc: 12,
            nms_cell: 6,
            cluster_cell: 35,
            max_features: 1500,
            obstacle: ObstacleRules::default(),
        }
    }

    /// Coarser scan for slow hosts
    pub fn sparse_preset(width: usize, height: usize) -> Self {
        Self {
            stride: 4,
            nms_cell: 8,
            max_features: 800,
            ..Self::new(width, height)
        }
    }

    /// Denser scan with a lower contrast margin
    pub fn dense_preset(width: usize, height: usize) -> Self {
        Self {
            threshold: 15,
            stride: 2,
            nms_cell: 4,
            ..Self::new(width, height)
        }
    }

    /// Convert to DetectorBuilder for further customization
    pub fn to_builder(self) -> DetectorBuilder {
        DetectorBuilder::from_config(self)
    }

    /// Smallest width/height that leaves an interior to scan
    pub fn min_image_size(&self) -> usize {
        2 * self.border + 1
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "DetectorConfig: {}x{}, threshold={}, arc>={}, stride={}, border={}, nms={}px, cluster={}px, max={}",
            self.width, self.height, self.threshold, self.min_arc, self.stride,
            self.border, self.nms_cell, self.cluster_cell, self.max_features
        )
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> DetectResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(DetectError::InvalidImageSize { width: self.width, height: self.height });
        }
        if self.threshold == 0 || self.threshold > 127 {
            return Err(DetectError::InvalidThreshold(self.threshold));
        }
        if self.min_arc == 0 || self.min_arc > 16 {
            return Err(DetectError::InvalidMinArc(self.min_arc));
        }
        for (name, value) in [
            ("stride", self.stride),
            ("nms_cell", self.nms_cell),
            ("cluster_cell", self.cluster_cell),
        ] {
            if value == 0 {
                return Err(DetectError::InvalidCellSize { name, value });
            }
        }
        // The circle has radius 3, so the border must keep it inside the image
        let border = self.border.max(3);
        let min_size = 2 * border + 1;
        if self.width < min_size || self.height < min_size || self.border < 3 {
            return Err(DetectError::ImageTooSmall {
                width: self.width,
                height: self.height,
                border: self.border,
                min_size,
            });
        }
        Ok(())
    }
}
