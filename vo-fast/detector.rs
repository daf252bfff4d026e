use log::{debug, trace};
use vo_core::{DepthMap, Feature, FeatureKind, Frame, Image};
use crate::classification::{ClusterIndex, ObstacleClassifier};
use crate::config::DetectorConfig;
use crate::corner_detection::CornerDetector;
use crate::error::{DetectError, DetectResult};
use crate::types::ClusterStats;

/// Corner detector that keeps only obstacle-like features
#[derive(Debug, Clone)]
pub struct FeatureDetector {
    cfg: DetectorConfig,
}

impl FeatureDetector {
    /// Creates a new detector with validation
    pub fn new(cfg: DetectorConfig) -> DetectResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Validates image and depth data before processing
    fn validate_input(&self, img: &Image, depth: Option<&DepthMap>) -> DetectResult<()> {
        let expected_len = self.cfg.width * self.cfg.height;
        if img.len() != expected_len {
            return Err(DetectError::InvalidImageData {
                expected_len,
                actual_len: img.len(),
            });
        }
        if let Some(depth) = depth {
            if depth.width != self.cfg.width || depth.data.len() != expected_len {
                return Err(DetectError::InvalidDepthData {
                    expected_len,
                    actual_len: depth.data.len(),
                });
            }
        }
        Ok(())
    }

    /// Obstacle features in scan order, capped at `max_features`
    pub fn detect(&self, img: &Image, depth: Option<&DepthMap>) -> DetectResult<Vec<Feature>> {
        let (classified, stats) = self.classify_corners(img, depth)?;
        let total = classified.len();

        let features: Vec<Feature> = classified
            .into_iter()
            .filter(Feature::is_obstacle)
            .take(self.cfg.max_features)
            .collect();

        debug!(
            "detected {} obstacle features from {} corners in {} clusters (max {}, median {}, mean {:.2})",
            features.len(),
            total,
            stats.clusters,
            stats.max_size,
            stats.median_size,
            stats.mean_size
        );
        Ok(features)
    }

    pub fn detect_frame(&self, frame: &Frame, depth: Option<&DepthMap>) -> DetectResult<Vec<Feature>> {
        if frame.width != self.cfg.width || frame.height != self.cfg.height {
            return Err(DetectError::InvalidImageData {
                expected_len: self.cfg.width * self.cfg.height,
                actual_len: frame.width * frame.height,
            });
        }
        self.detect(&frame.luma, depth)
    }

    /// Every corner that survived suppression, tagged `Corner` or `Obstacle`
    pub fn classify_corners(
        &self,
        img: &Image,
        depth: Option<&DepthMap>,
    ) -> DetectResult<(Vec<Feature>, ClusterStats)> {
        self.validate_input(img, depth)?;

        let candidates = CornerDetector::detect_candidates(img, &self.cfg, depth);
        let clusters = ClusterIndex::build(&candidates, self.cfg.cluster_cell);
        let stats = *clusters.stats();
        trace!("{} corners after suppression", candidates.len());

        let features = candidates
            .iter()
            .map(|c| {
                let density = clusters.density_at(c.x, c.y);
                let kind = match ObstacleClassifier::classify(
                    c,
                    density,
                    &stats,
                    &self.cfg.obstacle,
                    self.cfg.width,
                    self.cfg.height,
                ) {
                    Some(cue) => FeatureKind::Obstacle(cue),
                    None => FeatureKind::Corner,
                };
                Feature {
                    x: c.x,
                    y: c.y,
                    score: c.score,
                    brighter: c.brighter,
                    darker: c.darker,
                    kind,
                    depth: c.depth,
                }
            })
            .collect();

        Ok((features, stats))
    }

    /// Get detector configuration
    pub fn config(&self) -> &DetectorConfig {
        &self.cfg
    }

    /// Get image dimensions
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cfg.width, self.cfg.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vo_core::ObstacleCue;

    fn create_test_image(width: usize, height: usize) -> Image {
        vec![128; width * height]
    }

    /// Bright 3x3 square centered at (cx, cy) on a dark background
    fn create_square_image(width: usize, height: usize, cx: usize, cy: usize) -> Image {
        let mut img = vec![30; width * height];
        for y in cy - 1..=cy + 1 {
            for x in cx - 1..=cx + 1 {
                img[y * width + x] = 230;
            }
        }
        img
    }

    /// Isolated bright dots on the scan lattice, 6 px apart
    fn create_dot_lattice(width: usize, height: usize) -> Image {
        let mut img = vec![20; width * height];
        for y in (10..height - 10).step_by(6) {
            for x in (10..width - 10).step_by(6) {
                img[y * width + x] = 240;
            }
        }
        img
    }

    #[test]
    fn test_flat_image_yields_no_features() {
        let detector = FeatureDetector::new(DetectorConfig::new(640, 480)).unwrap();
        let features = detector.detect(&create_test_image(640, 480), None).unwrap();
        assert!(features.is_empty());
    }

    #[test]
    fn test_single_square_yields_one_feature() {
        let detector = FeatureDetector::new(DetectorConfig::new(200, 200)).unwrap();
        let img = create_square_image(200, 200, 100, 100);

        let features = detector.detect(&img, None).unwrap();
        assert_eq!(features.len(), 1);
        let f = features[0];
        assert_eq!((f.x, f.y), (100, 100));
        assert_eq!((f.brighter, f.darker, f.score), (0, 16, 16));
        assert_eq!(f.kind, FeatureKind::Obstacle(ObstacleCue::StrongCorner));
    }

    #[test]
    fn test_feature_cap() {
        let detector = FeatureDetector::new(DetectorConfig::new(640, 480)).unwrap();
        let img = create_dot_lattice(640, 480);

        let (all, _) = detector.classify_corners(&img, None).unwrap();
        assert!(all.len() > 1500);

        let features = detector.detect(&img, None).unwrap();
        assert_eq!(features.len(), 1500);
        // Truncation keeps scan order: first row of dots comes first
        assert_eq!((features[0].x, features[0].y), (10, 10));
        assert_eq!((features[1].x, features[1].y), (16, 10));
    }

    #[test]
    fn test_depth_marks_obstacle_cue() {
        let detector = FeatureDetector::new(DetectorConfig::new(200, 200)).unwrap();
        let img = create_square_image(200, 200, 100, 100);
        let depth = DepthMap::new(200, 200, vec![1.2; 200 * 200]);

        let features = detector.detect(&img, Some(&depth)).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].kind, FeatureKind::Obstacle(ObstacleCue::Depth));
        assert_eq!(features[0].depth, Some(1.2));
    }

    #[test]
    fn test_unclassified_corner_is_dropped() {
        let mut cfg = DetectorConfig::new(200, 200);
        cfg.obstacle.strong_score = 17;
        let detector = FeatureDetector::new(cfg).unwrap();
        let img = create_square_image(200, 200, 100, 100);

        let (all, _) = detector.classify_corners(&img, None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].kind, FeatureKind::Corner);
        assert!(detector.detect(&img, None).unwrap().is_empty());
    }

    #[test]
    fn test_five_pixel_square_is_plain_corner() {
        let detector = FeatureDetector::new(DetectorConfig::new(200, 200)).unwrap();
        let mut img = vec![30; 200 * 200];
        for y in 98..=102 {
            for x in 98..=102 {
                img[y * 200 + x] = 230;
            }
        }

        let (all, _) = detector.classify_corners(&img, None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!((all[0].x, all[0].y), (100, 100));
        assert_eq!((all[0].brighter, all[0].darker, all[0].score), (0, 12, 12));
        assert_eq!(all[0].kind, FeatureKind::Corner);
        assert!(detector.detect(&img, None).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_image_data() {
        let detector = FeatureDetector::new(DetectorConfig::new(100, 100)).unwrap();
        let result = detector.detect(&vec![0; 50], None);
        assert!(matches!(result, Err(DetectError::InvalidImageData { .. })));

        let depth = DepthMap::new(100, 10, vec![1.0; 1000]);
        let result = detector.detect(&create_test_image(100, 100), Some(&depth));
        assert!(matches!(result, Err(DetectError::InvalidDepthData { .. })));
    }

    #[test]
    fn test_frame_dimension_mismatch() {
        let detector = FeatureDetector::new(DetectorConfig::new(100, 100)).unwrap();
        let frame = Frame::filled(50, 200, 0, 0.0);
        assert!(detector.detect_frame(&frame, None).is_err());
    }

    #[test]
    fn test_configuration_access() {
        let detector = FeatureDetector::new(DetectorConfig::new(64, 48)).unwrap();
        assert_eq!(detector.dimensions(), (64, 48));
        assert_eq!(detector.config().threshold, 20);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_features_are_capped_interior_obstacles(
            pixels in proptest::collection::vec(any::<u8>(), 64 * 64),
            max_features in 1usize..40,
        ) {
            let mut cfg = DetectorConfig::new(64, 64);
            cfg.max_features = max_features;
            let detector = FeatureDetector::new(cfg).unwrap();

            let features = detector.detect(&pixels, None).unwrap();
            prop_assert!(features.len() <= max_features);
            for f in &features {
                prop_assert!(f.is_obstacle());
                prop_assert!(f.x >= 10 && f.x < 54 && f.y >= 10 && f.y < 54);
                prop_assert!(f.score >= 12);
            }
        }
    }
}
