use vo_core::{DepthMap, Image};
use crate::config::DetectorConfig;
use crate::types::{CornerCandidate, CornerType};

/// Segment-test corner detection with per-cell non-maximum suppression
pub struct CornerDetector;

impl CornerDetector {
    /// Bresenham circle of radius 3
    pub const FAST_OFFSETS: [(i32, i32); 16] = [
        (-3, 0), (-3, 1), (-2, 2), (-1, 3),
        (0, 3), (1, 3), (2, 2), (3, 1),
        (3, 0), (3, -1), (2, -2), (1, -3),
        (0, -3), (-1, -3), (-2, -2), (-3, -1),
    ];

    /// Count circle pixels strictly brighter than `center + threshold` and
    /// strictly darker than `center - threshold`.
    ///
    /// The caller keeps (x, y) at least 3 pixels away from every edge.
    #[inline]
    pub fn segment_tallies(img: &Image, width: usize, x: usize, y: usize, threshold: u8) -> (u8, u8) {
        let center = img[y * width + x] as i32;
        let threshold = threshold as i32;
        let mut brighter = 0u8;
        let mut darker = 0u8;

        for &(dx, dy) in Self::FAST_OFFSETS.iter() {
            let px = (x as i32 + dx) as usize;
            let py = (y as i32 + dy) as usize;
            let pixel = img[py * width + px] as i32;

            if pixel > center + threshold {
                brighter += 1;
            }
            if pixel < center - threshold {
                darker += 1;
            }
        }

        (brighter, darker)
    }

    pub fn corner_type(brighter: u8, darker: u8, min_arc: usize) -> CornerType {
        if brighter as usize >= min_arc {
            CornerType::Bright
        } else if darker as usize >= min_arc {
            CornerType::Dark
        } else {
            CornerType::None
        }
    }

    /// Scan the interior on the configured stride and keep the best corner of
    /// every suppression cell, in the order the cells were first hit.
    pub fn detect_candidates(
        img: &Image,
        cfg: &DetectorConfig,
        depth: Option<&DepthMap>,
    ) -> Vec<CornerCandidate> {
        let (width, height) = (cfg.width, cfg.height);
        let mut grid = SuppressionGrid::new(width, height, cfg.nms_cell);

        let mut y = cfg.border;
        while y < height.saturating_sub(cfg.border) {
            let mut x = cfg.border;
            while x < width.saturating_sub(cfg.border) {
                let (brighter, darker) = Self::segment_tallies(img, width, x, y, cfg.threshold);

                if Self::corner_type(brighter, darker, cfg.min_arc) != CornerType::None {
                    grid.offer(CornerCandidate {
                        x,
                        y,
                        score: brighter.max(darker),
                        brighter,
                        darker,
                        depth: depth.and_then(|d| d.get(x, y)),
                    });
                }
                x += cfg.stride;
            }
            y += cfg.stride;
        }

        grid.into_candidates()
    }
}

/// Dense arena mapping each suppression cell to the index of its best corner
pub(crate) struct SuppressionGrid {
    cell: usize,
    cols: usize,
    cells: Vec<Option<usize>>,
    candidates: Vec<CornerCandidate>,
}

impl SuppressionGrid {
    pub(crate) fn new(width: usize, height: usize, cell: usize) -> Self {
        let cols = width / cell + 1;
        let rows = height / cell + 1;
        Self {
            cell,
            cols,
            cells: vec![None; cols * rows],
            candidates: Vec::new(),
        }
    }

    /// Keep the candidate if its cell is empty or it beats the current holder;
    /// ties go to the corner found first.
    pub(crate) fn offer(&mut self, candidate: CornerCandidate) {
        let idx = (candidate.y / self.cell) * self.cols + candidate.x / self.cell;
        match self.cells[idx] {
            None => {
                self.cells[idx] = Some(self.candidates.len());
                self.candidates.push(candidate);
            }
            Some(slot) => {
                if self.candidates[slot].score < candidate.score {
                    self.candidates[slot] = candidate;
                }
            }
        }
    }

    pub(crate) fn into_candidates(self) -> Vec<CornerCandidate> {
        self.candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_image(width: usize, height: usize, cx: usize, cy: usize, half: usize) -> Image {
        let mut img = vec![50u8; width * height];
        for y in cy - half..=cy + half {
            for x in cx - half..=cx + half {
                img[y * width + x] = 220;
            }
        }
        img
    }

    #[test]
    fn test_offsets_form_radius_three_circle() {
        for &(dx, dy) in CornerDetector::FAST_OFFSETS.iter() {
            let r2 = dx * dx + dy * dy;
            assert!((9..=10).contains(&r2) || r2 == 8, "offset ({}, {}) off circle", dx, dy);
        }
    }

    #[test]
    fn test_tallies_on_isolated_bright_square() {
        let img = square_image(40, 40, 20, 20, 1);
        // Center of the square: every circle pixel lies outside it
        assert_eq!(CornerDetector::segment_tallies(&img, 40, 20, 20, 20), (0, 16));
        // Flat background far from the square
        assert_eq!(CornerDetector::segment_tallies(&img, 40, 6, 6, 20), (0, 0));
    }

    #[test]
    fn test_tallies_on_five_pixel_square() {
        // The four diagonal circle pixels (+-2, +-2) fall inside the square
        let img = square_image(40, 40, 20, 20, 2);
        assert_eq!(CornerDetector::segment_tallies(&img, 40, 20, 20, 20), (0, 12));
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut img = vec![100u8; 20 * 20];
        for &(dx, dy) in CornerDetector::FAST_OFFSETS.iter() {
            let x = (10 + dx) as usize;
            let y = (10 + dy) as usize;
            img[y * 20 + x] = 120;
        }
        assert_eq!(CornerDetector::segment_tallies(&img, 20, 10, 10, 20), (0, 0));
        assert_eq!(CornerDetector::segment_tallies(&img, 20, 10, 10, 19), (16, 0));
    }

    #[test]
    fn test_corner_type() {
        assert_eq!(CornerDetector::corner_type(12, 0, 12), CornerType::Bright);
        assert_eq!(CornerDetector::corner_type(3, 13, 12), CornerType::Dark);
        assert_eq!(CornerDetector::corner_type(11, 5, 12), CornerType::None);
    }

    #[test]
    fn test_grid_keeps_best_and_first_on_ties() {
        let mut grid = SuppressionGrid::new(60, 60, 6);
        let make = |x, y, score| CornerCandidate { x, y, score, brighter: score, darker: 0, depth: None };
        grid.offer(make(12, 12, 12));
        grid.offer(make(13, 13, 14));
        grid.offer(make(14, 14, 14));
        grid.offer(make(30, 30, 12));
        let kept = grid.into_candidates();
        assert_eq!(kept.len(), 2);
        assert_eq!((kept[0].x, kept[0].score), (13, 14));
        assert_eq!(kept[1].x, 30);
    }

    #[test]
    fn test_detect_candidates_reads_depth() {
        let cfg = DetectorConfig::new(40, 40);
        let img = square_image(40, 40, 19, 19, 2);
        let depth = DepthMap::new(40, 40, vec![0.7; 40 * 40]);
        let candidates = CornerDetector::detect_candidates(&img, &cfg, Some(&depth));
        assert_eq!(candidates.len(), 1);
        assert_eq!((candidates[0].x, candidates[0].y), (19, 19));
        assert_eq!(candidates[0].depth, Some(0.7));
    }
}
