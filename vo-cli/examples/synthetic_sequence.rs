use std::time::Instant;

use vo_cli::{MapRenderer, feature_overlay};
use vo_slam::{Frame, FrameInput, IterSource, PipelineConfig, PixelFormat, RawFrame, Session};

const WIDTH: usize = 640;
const HEIGHT: usize = 480;
const FRAMES: usize = 60;

/// Bright squares on a dark floor, panned `offset` pixels to the right
fn render_scene(offset: usize) -> Vec<u8> {
    let mut frame = Frame::filled(WIDTH, HEIGHT, 30, 0.0);
    for row in 0..5 {
        for col in 0..6 {
            let cx = 61 + col * 60 + offset;
            let cy = 91 + row * 60;
            for y in cy - 1..=cy + 1 {
                for x in cx - 1..=cx + 1 {
                    frame.luma[y * WIDTH + x] = 230;
                }
            }
        }
    }
    frame.luma
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("🎥 Synthetic Visual Odometry Sequence");
    println!("=====================================\n");

    // Pan by one scan step per frame so squares stay on the detector lattice
    let frames: Vec<FrameInput> = (0..FRAMES)
        .map(|i| {
            let rgba: Vec<u8> = render_scene(i * 3).iter().flat_map(|&v| [v, v, v, 255]).collect();
            FrameInput::new(RawFrame::new(WIDTH, HEIGHT, PixelFormat::Rgba8, rgba, i as f64 / 30.0))
        })
        .collect();

    let cfg = PipelineConfig::new(WIDTH, HEIGHT);
    println!("📋 {}", cfg.summary());

    let mut session = Session::new(cfg)?;
    let mut source = IterSource::new(frames);

    let t0 = Instant::now();
    let summary = session.run(&mut source, |report, session| {
        if report.cycle % 10 == 0 {
            println!(
                "   cycle {:>3}: {:>3} features, {:>3} matches, x={:+.3} y={:+.3} heading={:+.3}, {:.0} fps",
                report.cycle,
                report.features,
                report.matches,
                report.pose.x,
                report.pose.y,
                report.pose.heading,
                session.rate()
            );
        }
    })?;
    let elapsed = t0.elapsed();

    let snapshot = session.snapshot();
    println!("\n⏱️  {} cycles in {:.2?} ({:?})", summary.cycles, elapsed, summary.end);
    println!("📍 Final pose: x={:.4} y={:.4}", snapshot.pose.x, snapshot.pose.y);
    println!("🗺️  {} landmarks, {} trajectory points", snapshot.landmarks.len(), snapshot.trajectory.len());

    MapRenderer::default().render(&snapshot).save("synthetic_map.png")?;
    if let Some(luma) = session.pipeline().reference_luma() {
        feature_overlay(luma, WIDTH, HEIGHT, &snapshot.features)?.save("synthetic_features.png")?;
    }
    println!("\n✅ Saved synthetic_map.png and synthetic_features.png");

    Ok(())
}
