use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::info;
use rayon::prelude::*;
use vo_core::Feature;
use vo_fast::{DetectorConfig, FeatureDetector};

use crate::CliResult;
use crate::source::load_luma;

/// Features found in one still image
#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    pub path: PathBuf,
    pub width: usize,
    pub height: usize,
    pub features: Vec<Feature>,
    pub elapsed: Duration,
}

fn detect_one(path: &Path, template: &DetectorConfig) -> CliResult<DetectionOutcome> {
    let frame = load_luma(path, 0.0)?;
    let detector = FeatureDetector::new(DetectorConfig {
        width: frame.width,
        height: frame.height,
        ..template.clone()
    })?;

    let t0 = Instant::now();
    let features = detector.detect_frame(&frame, None)?;
    Ok(DetectionOutcome {
        path: path.to_path_buf(),
        width: frame.width,
        height: frame.height,
        features,
        elapsed: t0.elapsed(),
    })
}

/// Run the detector over independent images on the rayon pool.
///
/// Each image gets `template` sized to its own dimensions. Results keep the
/// order of `paths`.
pub fn detect_images(paths: &[PathBuf], template: &DetectorConfig) -> Vec<CliResult<DetectionOutcome>> {
    let t0 = Instant::now();
    let results: Vec<_> = paths.par_iter().map(|p| detect_one(p, template)).collect();
    info!(
        "detected features in {} images on {} threads in {:.2?}",
        paths.len(),
        rayon::current_num_threads(),
        t0.elapsed()
    );
    results
}
