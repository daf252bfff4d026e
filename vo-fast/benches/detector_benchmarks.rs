use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vo_core::{Image, PixelFormat, RawFrame};
use vo_fast::{
    ClusterIndex, CornerDetector, DetectorBuilder, DetectorConfig, FeatureDetector, ImagePreprocessing,
};

/// Create benchmark image with realistic corner patterns
fn create_benchmark_image(width: usize, height: usize, complexity: &str) -> Image {
    let mut img = vec![128; width * height];

    match complexity {
        "flat" => {}
        "blocks" => {
            // Bright squares on a regular lattice
            for by in (20..height - 20).step_by(40) {
                for bx in (20..width - 20).step_by(40) {
                    for y in by..by + 12 {
                        for x in bx..bx + 12 {
                            img[y * width + x] = 230;
                        }
                    }
                }
            }
        }
        "realistic" => {
            // Gradient with texture and scattered spots
            for y in 0..height {
                for x in 0..width {
                    let gradient = ((x as f32 / width as f32) * 50.0) as u8;
                    let noise = ((x * 7 + y * 13) % 11) as u8;
                    img[y * width + x] = 90 + gradient + noise;
                }
            }
            for i in 0..200 {
                let cx = 15 + (i * 37) % (width - 30);
                let cy = 15 + (i * 53) % (height - 30);
                for dy in -1i32..=1 {
                    for dx in -1i32..=1 {
                        let x = (cx as i32 + dx) as usize;
                        let y = (cy as i32 + dy) as usize;
                        img[y * width + x] = if i % 2 == 0 { 250 } else { 10 };
                    }
                }
            }
        }
        _ => {}
    }

    img
}

/// Benchmark full detection on the reference frame size
fn bench_full_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_detection");

    for &(width, height) in &[(320, 240), (640, 480)] {
        for complexity in ["flat", "blocks", "realistic"] {
            let detector = FeatureDetector::new(DetectorConfig::new(width, height)).unwrap();
            let img = create_benchmark_image(width, height, complexity);

            group.bench_with_input(
                BenchmarkId::new(format!("{}x{}", width, height), complexity),
                &(detector, img),
                |b, (detector, img)| b.iter(|| black_box(detector.detect(black_box(img), None).unwrap())),
            );
        }
    }

    group.finish();
}

/// Benchmark individual detection stages
fn bench_detection_stages(c: &mut Criterion) {
    let (width, height) = (640, 480);
    let cfg = DetectorConfig::new(width, height);
    let img = create_benchmark_image(width, height, "realistic");

    let mut group = c.benchmark_group("detection_stages");

    group.bench_function("segment_test_and_suppression", |b| {
        b.iter(|| black_box(CornerDetector::detect_candidates(black_box(&img), &cfg, None)))
    });

    let candidates = CornerDetector::detect_candidates(&img, &cfg, None);
    group.bench_function("clustering", |b| {
        b.iter(|| black_box(ClusterIndex::build(black_box(&candidates), cfg.cluster_cell)))
    });

    let rgba: Vec<u8> = img.iter().flat_map(|&v| [v, v, v, 255]).collect();
    let raw = RawFrame::new(width, height, PixelFormat::Rgba8, rgba, 0.0);
    group.bench_function("grayscale_reduction", |b| {
        b.iter(|| black_box(ImagePreprocessing::to_luma(black_box(&raw)).unwrap()))
    });

    group.finish();
}

/// Benchmark the presets against each other
fn bench_presets(c: &mut Criterion) {
    let (width, height) = (640, 480);
    let img = create_benchmark_image(width, height, "realistic");

    let mut group = c.benchmark_group("presets");
    let presets = [
        ("default", DetectorBuilder::new(width, height)),
        ("sparse", DetectorBuilder::new(width, height).preset_sparse()),
        ("dense", DetectorBuilder::new(width, height).preset_dense()),
    ];

    for (name, builder) in presets {
        let detector = builder.build().unwrap();
        group.bench_function(name, |b| b.iter(|| black_box(detector.detect(black_box(&img), None).unwrap())));
    }

    group.finish();
}

criterion_group!(benches, bench_full_detection, bench_detection_stages, bench_presets);
criterion_main!(benches);
