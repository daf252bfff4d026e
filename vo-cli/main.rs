use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use vo_cli::{
    CliError, CliResult, DirectorySource, MapRenderer, detect_images, feature_overlay, image_paths,
    init_thread_pool, parse_anchor,
};
use vo_slam::{GeoAnchor, PipelineConfig, Session, Snapshot};

#[derive(Parser, Debug)]
#[command(name = "vo", version, about = "Monocular visual odometry over image sequences")]
struct Cli {
    /// Pipeline configuration (.json or .toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Track motion through a directory of frames
    Run {
        /// Directory of frames, played in lexical order
        dir: PathBuf,

        /// Nominal frame rate used for timestamps
        #[arg(long, default_value_t = 30.0)]
        fps: f64,

        /// Write the final snapshot as JSON
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Write one feature overlay per frame into this directory
        #[arg(long)]
        overlay_dir: Option<PathBuf>,

        /// Render the trajectory and landmark map to an image
        #[arg(long)]
        map: Option<PathBuf>,

        /// Geographic origin of the trajectory as LAT,LON
        #[arg(long, value_parser = parse_anchor_arg)]
        anchor: Option<GeoAnchor>,

        /// Write the geo-projected path as JSON (requires --anchor)
        #[arg(long, requires = "anchor")]
        geo_out: Option<PathBuf>,
    },
    /// Detect obstacle features in still images in parallel
    Detect {
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Worker threads (defaults to the number of CPUs)
        #[arg(long)]
        threads: Option<usize>,

        /// Write feature overlays into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Print the effective configuration
    Config {
        #[arg(long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ConfigFormat {
    Toml,
    Json,
}

fn parse_anchor_arg(s: &str) -> Result<GeoAnchor, String> {
    parse_anchor(s).map_err(|e| e.to_string())
}

fn load_config(path: Option<&Path>, size: Option<(usize, usize)>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            let cfg = PipelineConfig::load(path).with_context(|| format!("loading config {}", path.display()))?;
            if let Some(size) = size {
                if cfg.dimensions() != size {
                    bail!(
                        "config expects {}x{} frames but the sequence is {}x{}",
                        cfg.detector.width,
                        cfg.detector.height,
                        size.0,
                        size.1
                    );
                }
            }
            Ok(cfg)
        }
        None => {
            let (w, h) = size.unwrap_or((640, 480));
            Ok(PipelineConfig::new(w, h))
        }
    }
}

fn write_overlay(dir: &Path, session: &Session, cycle: u64) -> CliResult<()> {
    let pipeline = session.pipeline();
    let (width, height) = pipeline.config().dimensions();
    let Some(luma) = pipeline.reference_luma() else {
        return Ok(());
    };
    let canvas = feature_overlay(luma, width, height, pipeline.features())?;
    canvas.save(dir.join(format!("overlay_{cycle:05}.png")))?;
    Ok(())
}

fn write_geo_path(path: &Path, anchor: &GeoAnchor, snapshot: &Snapshot) -> CliResult<()> {
    let points: Vec<[f64; 2]> = anchor
        .project(&snapshot.trajectory)
        .into_iter()
        .map(|p| [p.latitude, p.longitude])
        .collect();
    fs::write(path, serde_json::to_string_pretty(&points)?)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run(
    config: Option<&Path>,
    dir: &Path,
    fps: f64,
    snapshot_out: Option<&Path>,
    overlay_dir: Option<&Path>,
    map_out: Option<&Path>,
    anchor: Option<GeoAnchor>,
    geo_out: Option<&Path>,
) -> Result<()> {
    let mut source = DirectorySource::open(dir, fps).with_context(|| format!("opening {}", dir.display()))?;
    let size = source.frame_size().context("reading first frame")?;
    let cfg = load_config(config, Some(size))?;
    info!("{}", cfg.summary());

    if let Some(dir) = overlay_dir {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let mut session = Session::new(cfg)?;
    let control = session.control();
    let mut overlay_error: Option<CliError> = None;

    let summary = session.run(&mut source, |report, session| {
        info!(
            "cycle {}: {} features, {} matches, pose ({:.4}, {:.4}, {:.3}), {} landmarks, {:.0} fps",
            report.cycle,
            report.features,
            report.matches,
            report.pose.x,
            report.pose.y,
            report.pose.heading,
            session.pipeline().landmarks().len(),
            session.rate()
        );
        if let Some(dir) = overlay_dir {
            if overlay_error.is_none() {
                if let Err(e) = write_overlay(dir, session, report.cycle) {
                    overlay_error = Some(e);
                    control.request_stop();
                }
            }
        }
    })?;

    if let Some(e) = overlay_error {
        return Err(e).context("writing overlay");
    }
    if source.skipped() > 0 {
        warn!("{} frames skipped", source.skipped());
    }

    let snapshot = session.snapshot();
    println!(
        "{} cycles ({:?}), final pose x={:.4} y={:.4} heading={:.3}, {} landmarks",
        summary.cycles,
        summary.end,
        snapshot.pose.x,
        snapshot.pose.y,
        snapshot.pose.heading,
        snapshot.landmarks.len()
    );

    if let Some(path) = snapshot_out {
        snapshot.save_json(path).with_context(|| format!("writing {}", path.display()))?;
        info!("snapshot saved to {}", path.display());
    }
    if let Some(path) = map_out {
        MapRenderer::default()
            .render(&snapshot)
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("map saved to {}", path.display());
    }
    if let (Some(anchor), Some(path)) = (anchor, geo_out) {
        write_geo_path(path, &anchor, &snapshot).with_context(|| format!("writing {}", path.display()))?;
        info!("geo path saved to {}", path.display());
    }
    Ok(())
}

fn detect(config: Option<&Path>, images: &[PathBuf], threads: Option<usize>, out_dir: Option<&Path>) -> Result<()> {
    init_thread_pool(threads.unwrap_or_else(num_cpus::get)).context("building thread pool")?;
    let template = load_config(config, None)?.detector;

    // A directory argument expands to its images
    let mut paths = Vec::new();
    for p in images {
        if p.is_dir() {
            paths.extend(image_paths(p)?);
        } else {
            paths.push(p.clone());
        }
    }

    if let Some(dir) = out_dir {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let mut failures = 0;
    for result in detect_images(&paths, &template) {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("{}", e);
                failures += 1;
                continue;
            }
        };
        println!(
            "{}: {} features ({}x{}) in {:.2?}",
            outcome.path.display(),
            outcome.features.len(),
            outcome.width,
            outcome.height,
            outcome.elapsed
        );

        if let Some(dir) = out_dir {
            let luma = image::open(&outcome.path)?.to_luma8();
            let canvas = feature_overlay(luma.as_raw(), outcome.width, outcome.height, &outcome.features)?;
            let stem = outcome.path.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
            canvas.save(dir.join(format!("{stem}_features.png")))?;
        }
    }

    if failures > 0 {
        bail!("{} of {} images failed", failures, paths.len());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Command::Run { dir, fps, snapshot, overlay_dir, map, anchor, geo_out } => run(
            config,
            &dir,
            fps,
            snapshot.as_deref(),
            overlay_dir.as_deref(),
            map.as_deref(),
            anchor,
            geo_out.as_deref(),
        ),
        Command::Detect { images, threads, out_dir } => detect(config, &images, threads, out_dir.as_deref()),
        Command::Config { format } => {
            let cfg = load_config(config, None)?;
            let text = match format {
                ConfigFormat::Toml => cfg.to_toml()?,
                ConfigFormat::Json => cfg.to_json()?,
            };
            println!("{text}");
            Ok(())
        }
    }
}
