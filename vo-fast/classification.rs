use std::collections::HashMap;

use vo_core::ObstacleCue;
use crate::config::ObstacleRules;
use crate::types::{ClusterStats, CornerCandidate};

/// Coarse spatial buckets of surviving corners, keyed by cluster cell
#[derive(Debug, Default)]
pub struct ClusterIndex {
    cell: usize,
    members: HashMap<(usize, usize), Vec<usize>>,
    stats: ClusterStats,
}

impl ClusterIndex {
    /// Bucket candidates into `cell`-sized clusters and compute size statistics
    pub fn build(candidates: &[CornerCandidate], cell: usize) -> Self {
        let mut members: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for (i, c) in candidates.iter().enumerate() {
            members.entry((c.x / cell, c.y / cell)).or_default().push(i);
        }

        let mut sizes: Vec<usize> = members.values().map(Vec::len).collect();
        sizes.sort_unstable();

        let total: usize = sizes.iter().sum();
        let stats = ClusterStats {
            clusters: sizes.len(),
            max_size: sizes.last().copied().unwrap_or(0),
            median_size: sizes.get(sizes.len() / 2).copied().filter(|&m| m > 0).unwrap_or(1),
            mean_size: total as f32 / sizes.len().max(1) as f32,
        };

        Self { cell, members, stats }
    }

    /// Number of corners sharing the cluster of (x, y)
    pub fn density_at(&self, x: usize, y: usize) -> usize {
        self.members
            .get(&(x / self.cell, y / self.cell))
            .map_or(0, Vec::len)
    }

    pub fn stats(&self) -> &ClusterStats {
        &self.stats
    }
}

/// Obstacle heuristics over depth, cluster density and contrast
pub struct ObstacleClassifier;

impl ObstacleClassifier {
    /// Apply the rules in order; the first one that fires names the cue.
    pub fn classify(
        candidate: &CornerCandidate,
        density: usize,
        stats: &ClusterStats,
        rules: &ObstacleRules,
        width: usize,
        height: usize,
    ) -> Option<ObstacleCue> {
        let density_f = density as f32;
        let median = stats.median_size as f32;

        if let Some(depth) = candidate.depth {
            let (near, far) = rules.depth_band;
            if depth < rules.near_depth
                || (depth > near && depth < far && density >= rules.depth_min_cluster)
            {
                return Some(ObstacleCue::Depth);
            }
        }

        let dense_threshold = rules.density_floor.max(stats.mean_size * rules.mean_factor);
        if density_f >= dense_threshold * rules.dense_margin {
            return Some(ObstacleCue::DenseCluster);
        }

        let imbalance = candidate.brighter.abs_diff(candidate.darker);
        if candidate.score >= rules.contrast_score && imbalance <= rules.max_imbalance {
            return Some(ObstacleCue::AmbiguousContrast);
        }

        let (x_min, x_max, y_min, y_max) = rules.center_region;
        let (x, y) = (candidate.x as f32, candidate.y as f32);
        let (w, h) = (width as f32, height as f32);
        if x > w * x_min
            && x < w * x_max
            && y > h * y_min
            && y < h * y_max
            && density_f >= median * rules.center_median_factor
        {
            return Some(ObstacleCue::CentralDensity);
        }

        if candidate.score >= rules.strong_score || density_f > median * rules.anomaly_median_factor {
            return Some(ObstacleCue::StrongCorner);
        }

        None
    }
}
