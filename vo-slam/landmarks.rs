use log::trace;
use vo_core::{Feature, Landmark, LandmarkId, Pose};

use crate::config::MapConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of one map update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MapUpdate {
    pub fused: usize,
    pub inserted: usize,
    /// New landmarks turned away because the map was full
    pub rejected: usize,
}

/// Sparse 2-D landmark map with running-average fusion
#[derive(Debug, Clone)]
pub struct LandmarkMap {
    cfg: MapConfig,
    landmarks: Vec<Landmark>,
    next_id: u64,
}

impl Default for LandmarkMap {
    fn default() -> Self {
        Self::new(MapConfig::default())
    }
}

impl LandmarkMap {
    pub fn new(cfg: MapConfig) -> Self {
        Self {
            landmarks: Vec::with_capacity(cfg.capacity),
            cfg,
            next_id: 0,
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.cfg
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn get(&self, id: LandmarkId) -> Option<&Landmark> {
        self.landmarks.iter().find(|lm| lm.id == id)
    }

    /// World position of a feature seen from `pose`.
    ///
    /// Only the horizontal image offset is used; it is laid out along the
    /// heading direction.
    pub fn project(&self, feature: &Feature, pose: &Pose) -> (f64, f64) {
        let offset = feature.x as f64 * self.cfg.projection_scale;
        (
            pose.x + offset * pose.heading.cos(),
            pose.y + offset * pose.heading.sin(),
        )
    }

    /// Index of the closest landmark strictly inside the match distance
    pub fn nearest(&self, x: f64, y: f64) -> Option<usize> {
        let limit = self.cfg.match_distance();
        let mut best: Option<(usize, f64)> = None;
        for (i, lm) in self.landmarks.iter().enumerate() {
            let dist = (lm.x - x).hypot(lm.y - y);
            if dist < limit && best.map_or(true, |(_, d)| dist < d) {
                best = Some((i, dist));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Fold the features of one cycle into the map, in order
    pub fn update(&mut self, features: &[Feature], pose: &Pose) -> MapUpdate {
        let mut stats = MapUpdate::default();

        for feature in features {
            let (wx, wy) = self.project(feature, pose);
            match self.nearest(wx, wy) {
                Some(i) => {
                    let max_quality = self.cfg.max_quality;
                    let lm = &mut self.landmarks[i];
                    let q = lm.quality as f64;
                    lm.x = (lm.x * q + wx) / (q + 1.0);
                    lm.y = (lm.y * q + wy) / (q + 1.0);
                    lm.quality = lm.quality.saturating_add(1).min(max_quality);
                    stats.fused += 1;
                }
                None if self.landmarks.len() < self.cfg.capacity => {
                    let id = LandmarkId(self.next_id);
                    self.next_id += 1;
                    self.landmarks.push(Landmark { id, x: wx, y: wy, quality: 1 });
                    stats.inserted += 1;
                }
                None => stats.rejected += 1,
            }
        }

        trace!(
            "map update: {} fused, {} inserted, {} rejected, {} landmarks",
            stats.fused,
            stats.inserted,
            stats.rejected,
            self.landmarks.len()
        );
        stats
    }

    /// Drop every landmark. Identities are not reused afterwards.
    pub fn clear(&mut self) {
        self.landmarks.clear();
    }
}
