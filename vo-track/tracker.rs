use log::{debug, trace};
use vo_core::{Correspondence, Feature, Image, PixelCoord};

use crate::config::TrackerConfig;
use crate::descriptor::PatchDescriptor;
use crate::error::{TrackError, TrackResult};

/// Best candidate seen so far during a window search
#[derive(Debug, Clone, Copy)]
struct Candidate {
    dx: i64,
    dy: i64,
    cost: u32,
}

/// Matches previous-frame features into the current frame
#[derive(Debug, Clone)]
pub struct FeatureTracker {
    cfg: TrackerConfig,
    width: usize,
    height: usize,
}

impl FeatureTracker {
    pub fn new(cfg: TrackerConfig, width: usize, height: usize) -> TrackResult<Self> {
        if width == 0 || height == 0 {
            return Err(TrackError::InvalidImageSize { width, height });
        }
        cfg.validate()?;
        Ok(Self { cfg, width, height })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.cfg
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn check_len(&self, which: &'static str, img: &Image) -> TrackResult<()> {
        let expected_len = self.width * self.height;
        if img.len() != expected_len {
            return Err(TrackError::InvalidImageData {
                which,
                expected_len,
                actual_len: img.len(),
            });
        }
        Ok(())
    }

    /// Correspondences for a strided sample of `prev_features`, in sample order.
    ///
    /// Features whose best match costs more than `max_ssd`, or whose window
    /// holds no admissible candidate, produce nothing.
    pub fn track(
        &self,
        prev: &Image,
        curr: &Image,
        prev_features: &[Feature],
    ) -> TrackResult<Vec<Correspondence>> {
        self.check_len("previous", prev)?;
        self.check_len("current", curr)?;

        let stride = self.cfg.sample_stride(prev_features.len());
        let mut sampled = 0usize;
        let mut matches = Vec::with_capacity(prev_features.len().min(self.cfg.max_tracked + 1));

        for feature in prev_features.iter().step_by(stride) {
            sampled += 1;
            if let Some(m) = self.track_one(prev, curr, feature) {
                matches.push(m);
            }
        }

        debug!(
            "tracked {} of {} sampled features (stride {})",
            matches.len(),
            sampled,
            stride
        );
        Ok(matches)
    }

    fn track_one(&self, prev: &Image, curr: &Image, feature: &Feature) -> Option<Correspondence> {
        let (fx, fy) = (feature.x as i64, feature.y as i64);
        let reference = PatchDescriptor::extract(prev, self.width, self.height, fx, fy);
        let best = self.search(&reference, curr, fx, fy)?;

        if best.cost > self.cfg.max_ssd {
            trace!(
                "rejected ({}, {}): best ssd {} over {}",
                feature.x, feature.y, best.cost, self.cfg.max_ssd
            );
            return None;
        }

        // Admissible candidates are inside the border, so the sum is non-negative
        let curr_coord = PixelCoord::new((fx + best.dx) as usize, (fy + best.dy) as usize);
        Some(Correspondence::new(feature.coord(), curr_coord, best.cost))
    }

    /// Minimum-SSD offset within the search window.
    ///
    /// The zero offset is tried first and only a strictly lower cost replaces
    /// the incumbent, so ties resolve towards no motion and then towards
    /// lattice order. A unit-step pass around the best coarse offset recovers
    /// shifts that fall between lattice points.
    fn search(&self, reference: &PatchDescriptor, curr: &Image, fx: i64, fy: i64) -> Option<Candidate> {
        let radius = self.cfg.search_radius as i64;
        let step = self.cfg.search_stride as i64;
        let reach = radius / step;

        let mut best: Option<Candidate> = None;
        self.consider(reference, curr, fx, fy, 0, 0, &mut best);
        for ky in -reach..=reach {
            for kx in -reach..=reach {
                if kx != 0 || ky != 0 {
                    self.consider(reference, curr, fx, fy, kx * step, ky * step, &mut best);
                }
            }
        }

        let refine = self.cfg.refine_radius as i64;
        if let Some(coarse) = best {
            if refine > 0 {
                for ry in -refine..=refine {
                    for rx in -refine..=refine {
                        let (dx, dy) = (coarse.dx + rx, coarse.dy + ry);
                        if (rx == 0 && ry == 0) || dx.abs() > radius || dy.abs() > radius {
                            continue;
                        }
                        self.consider(reference, curr, fx, fy, dx, dy, &mut best);
                    }
                }
            }
        }

        best
    }

    #[allow(clippy::too_many_arguments)]
    fn consider(
        &self,
        reference: &PatchDescriptor,
        curr: &Image,
        fx: i64,
        fy: i64,
        dx: i64,
        dy: i64,
        best: &mut Option<Candidate>,
    ) {
        let (cx, cy) = (fx + dx, fy + dy);
        if !self.admissible(cx, cy) {
            return;
        }
        let cost = reference.ssd(&PatchDescriptor::extract(curr, self.width, self.height, cx, cy));
        if best.is_none_or(|b| cost < b.cost) {
            *best = Some(Candidate { dx, dy, cost });
        }
    }

    #[inline]
    fn admissible(&self, x: i64, y: i64) -> bool {
        let border = self.cfg.border as i64;
        x >= border
            && y >= border
            && x < self.width as i64 - border
            && y < self.height as i64 - border
    }
}
