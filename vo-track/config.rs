use crate::error::{TrackError, TrackResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Search parameters of the patch tracker
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrackerConfig {
    /// Previous features sampled per cycle (approximate upper bound)
    pub max_tracked: usize,
    /// Half-width of the square search window
    pub search_radius: usize,
    /// Step of the coarse search lattice
    pub search_stride: usize,
    /// Unit-step refinement around the best coarse offset; 0 disables it
    pub refine_radius: usize,
    /// Candidates closer than this to any edge are skipped
    pub border: usize,
    /// Matches with a larger SSD are discarded
    pub max_ssd: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_tracked: 300,
            search_radius: 20,
            search_stride: 3,
            refine_radius: 2,
            border: 10,
            max_ssd: 3000,
        }
    }
}

impl TrackerConfig {
    /// Coarse lattice only, as cheap as possible
    pub fn coarse_only() -> Self {
        Self { refine_radius: 0, ..Self::default() }
    }

    /// Sampling stride for a previous feature list of `count` entries
    pub fn sample_stride(&self, count: usize) -> usize {
        (count / self.max_tracked.max(1)).max(1)
    }

    pub fn summary(&self) -> String {
        format!(
            "TrackerConfig: max_tracked={}, radius={}px, stride={}, refine={}px, border={}px, max_ssd={}",
            self.max_tracked, self.search_radius, self.search_stride,
            self.refine_radius, self.border, self.max_ssd
        )
    }

    pub fn validate(&self) -> TrackResult<()> {
        for (name, value) in [
            ("max_tracked", self.max_tracked),
            ("search_radius", self.search_radius),
            ("search_stride", self.search_stride),
        ] {
            if value == 0 {
                return Err(TrackError::InvalidParameter { name, value });
            }
        }
        if self.search_stride > self.search_radius {
            return Err(TrackError::StrideExceedsRadius {
                stride: self.search_stride,
                radius: self.search_radius,
            });
        }
        Ok(())
    }
}
