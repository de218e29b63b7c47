use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use image::{ImageReader, Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use log::{error, info, warn};
use serde::Serialize;
use wire_cli::wire_core::{Point2D, WireObservation};
use wire_cli::wire_extract::{Annotation, ExtractionConfig, Extraction, Handle};
use wire_cli::wire_fit::Measurement;
use wire_cli::{load_config, parse_point, CliResult, WireMaster};

#[derive(Parser)]
#[command(name = "wiremaster")]
#[command(about = "Measure the length and sag of a suspended wire from a photo")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the wire in an image, optionally correct key points, and measure it.
    Analyze {
        /// Path to the input image.
        #[arg(long)]
        image: PathBuf,

        /// Real distance between the two attachment points, in meters.
        #[arg(long)]
        span: f64,

        /// Override the left attachment point (x,y in image pixels).
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        p1: Option<Point2D>,

        /// Override the right attachment point.
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        p2: Option<Point2D>,

        /// Override the lowest point of the wire.
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        sag: Option<Point2D>,

        /// Extraction config (.toml or .json).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Downsample the image towards this size before analysis.
        #[arg(long)]
        max_dim: Option<u32>,

        /// Print a JSON report instead of text.
        #[arg(long)]
        json: bool,

        /// Write the image with the key points and wire samples drawn on it.
        #[arg(long)]
        overlay: Option<PathBuf>,
    },
    /// Measure from manually placed key points.
    Measure {
        /// Real distance between the two attachment points, in meters.
        #[arg(long)]
        span: f64,

        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        p1: Point2D,

        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        p2: Point2D,

        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        sag: Point2D,
    },
}

#[derive(Serialize)]
struct Report<'a> {
    image: &'a Path,
    width: u32,
    height: u32,
    scale: u32,
    extraction: &'a Extraction,
    p1: Point2D,
    p2: Point2D,
    p_sag: Point2D,
    measurement: &'a Measurement,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Analyze {
            image,
            span,
            p1,
            p2,
            sag,
            config,
            max_dim,
            json,
            overlay,
        } => run_analyze(&image, span, [p1, p2, sag], config.as_deref(), max_dim, json, overlay.as_deref()),
        Commands::Measure { span, p1, p2, sag } => run_measure(span, p1, p2, sag),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_analyze(
    image_path: &Path,
    span: f64,
    overrides: [Option<Point2D>; 3],
    config_path: Option<&Path>,
    max_dim: Option<u32>,
    json: bool,
    overlay_path: Option<&Path>,
) -> CliResult<()> {
    let mut config = match config_path {
        Some(path) => {
            info!("Loading config: {}", path.display());
            load_config(path)?
        }
        None => ExtractionConfig::new(1, 1),
    };
    if let Some(max_dim) = max_dim {
        config.vision.max_dimension = max_dim;
    }
    let master = WireMaster::new(config)?;
    info!("{}", master.config().summary());

    info!("Loading image: {}", image_path.display());
    let img = ImageReader::open(image_path)?.decode()?;
    let gray = img.to_luma8();
    let (w, h) = gray.dimensions();

    let analysis = master.analyze_downsampled(&gray)?;
    if analysis.extraction.is_degraded() {
        warn!(
            "detection fell back to defaults (left {:?}, right {:?}, sag {:?}); consider passing --p1/--p2/--sag",
            analysis.extraction.left, analysis.extraction.right, analysis.extraction.sag
        );
    }

    let observation = analysis.observation();
    let mut annotation = Annotation::from_observation(&observation);
    for (handle, point) in Handle::ALL.into_iter().zip(overrides) {
        if let Some(point) = point {
            annotation = annotation.arm(handle).press(point, 0.0);
        }
    }
    let corrected = annotation.apply_to(&observation);

    let measurement = master.measure(span, &annotation)?;
    if measurement.is_fallback() {
        warn!("wire is effectively straight; length equals the span");
    }

    if let Some(path) = overlay_path {
        write_overlay(img.into_rgba8(), &corrected, path)?;
        info!("Overlay written to {}", path.display());
    }

    if json {
        let report = Report {
            image: image_path,
            width: w,
            height: h,
            scale: analysis.scale,
            extraction: &analysis.extraction,
            p1: corrected.p1,
            p2: corrected.p2,
            p_sag: corrected.p_sag,
            measurement: &measurement,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "P1: ({:.1}, {:.1})  P2: ({:.1}, {:.1})  Sag point: ({:.1}, {:.1})",
            corrected.p1.x, corrected.p1.y, corrected.p2.x, corrected.p2.y, corrected.p_sag.x, corrected.p_sag.y
        );
        println!("{}", measurement);
    }
    Ok(())
}

fn run_measure(span: f64, p1: Point2D, p2: Point2D, sag: Point2D) -> CliResult<()> {
    let annotation = Annotation {
        p1,
        p2,
        p_sag: sag,
        armed: None,
        dragging: None,
    };
    let measurement = WireMaster::new(ExtractionConfig::new(1, 1))?.measure(span, &annotation)?;
    println!("{}", measurement);
    Ok(())
}

fn write_overlay(mut output: RgbaImage, observation: &WireObservation, path: &Path) -> CliResult<()> {
    let (w, h) = output.dimensions();
    for p in &observation.candidate_points {
        let (x, y) = (p.x.round() as i64, p.y.round() as i64);
        if x >= 0 && y >= 0 && (x as u32) < w && (y as u32) < h {
            output.put_pixel(x as u32, y as u32, Rgba([255, 255, 0, 255]));
        }
    }

    let (p1, p2) = (observation.p1, observation.p2);
    draw_line_segment_mut(
        &mut output,
        (p1.x as f32, p1.y as f32),
        (p2.x as f32, p2.y as f32),
        Rgba([0, 160, 255, 255]),
    );

    let radius = ((w.max(h) / 100) as i32).max(4);
    for (p, color) in [
        (p1, Rgba([255, 0, 0, 255])),
        (p2, Rgba([255, 0, 0, 255])),
        (observation.p_sag, Rgba([0, 255, 0, 255])),
    ] {
        draw_hollow_circle_mut(&mut output, (p.x.round() as i32, p.y.round() as i32), radius, color);
    }

    output.save(path)?;
    Ok(())
}
