use log::trace;
use vo_core::{normalize_angle, Correspondence, PoseDelta};

use crate::config::EstimatorConfig;

/// Robust planar motion from a set of correspondences
#[derive(Debug, Clone, Default)]
pub struct PoseEstimator {
    cfg: EstimatorConfig,
}

impl PoseEstimator {
    pub fn new(cfg: EstimatorConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.cfg
    }

    /// Median flow for translation, mean polar-angle change for rotation.
    ///
    /// Returns exactly [`PoseDelta::ZERO`] when there are too few matches.
    /// Image-plane flow to the right means the camera moved left, hence the
    /// sign flip on x.
    pub fn estimate(&self, matches: &[Correspondence]) -> PoseDelta {
        if matches.len() < self.cfg.min_correspondences.max(1) {
            return PoseDelta::ZERO;
        }

        let (mut xs, mut ys): (Vec<f64>, Vec<f64>) = matches.iter().map(Correspondence::displacement).unzip();
        let median_dx = Self::median(&mut xs);
        let median_dy = Self::median(&mut ys);
        let dheading = self.rotation(matches);

        trace!(
            "median flow ({}, {}) px, rotation {:.5} rad over {} matches",
            median_dx,
            median_dy,
            dheading,
            matches.len()
        );

        PoseDelta::new(
            -median_dx * self.cfg.pixel_to_motion,
            median_dy * self.cfg.pixel_to_motion,
            dheading,
        )
    }

    /// Upper median: element `len / 2` after sorting
    fn median(values: &mut [f64]) -> f64 {
        values.sort_by(f64::total_cmp);
        values[values.len() / 2]
    }

    /// Mean angle change about the optical center, ignoring steps above the limit
    fn rotation(&self, matches: &[Correspondence]) -> f64 {
        let (cx, cy) = self.cfg.optical_center;
        let (sum, count) = matches
            .iter()
            .map(|m| {
                let before = (m.prev.y as f64 - cy).atan2(m.prev.x as f64 - cx);
                let after = (m.curr.y as f64 - cy).atan2(m.curr.x as f64 - cx);
                normalize_angle(after - before)
            })
            .filter(|d| d.abs() <= self.cfg.max_rotation_step)
            .fold((0.0, 0usize), |(sum, count), d| (sum + d, count + 1));

        if count > 0 {
            sum / count as f64
        } else {
            0.0
        }
    }
}
