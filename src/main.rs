//! Command-line interface for detecting document boundaries and scoring them against ground truth.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use doc_bound::{
    crop_to_boundary, detect_boundary_dynamic, render_overlay, run_evaluation, EvaluationConfig,
    OverlayConfig,
};

#[derive(Parser)]
#[command(name = "doc-bound")]
#[command(about = "Locate the bounding rectangle of a document in an image")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the boundary of a single image.
    Detect(DetectArgs),

    /// Score detections over a numbered image set against a ground-truth table.
    Evaluate(EvaluateArgs),
}

#[derive(Debug, Clone, Args)]
struct DetectArgs {
    /// Path to the input image.
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Write the image cropped to the detected boundary.
    #[arg(long, value_name = "PATH")]
    crop: Option<PathBuf>,

    /// Write the image with the detected boundary drawn on it.
    #[arg(long, value_name = "PATH")]
    overlay: Option<PathBuf>,

    /// Stroke width of the overlay rectangle, in source pixels.
    #[arg(long, default_value = "10")]
    line_thickness: u32,

    /// Downscale factor applied to the overlay output.
    #[arg(long, default_value = "4")]
    scale_factor: u32,
}

#[derive(Debug, Clone, Args)]
struct EvaluateArgs {
    /// Directory holding the images and the ground-truth table.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Number of images, named {prefix}1.{extension} through {prefix}N.{extension}.
    #[arg(long, default_value = "25")]
    count: usize,

    /// Image file name prefix.
    #[arg(long, default_value = "input_")]
    prefix: String,

    /// Image file extension.
    #[arg(long, default_value = "jpg")]
    extension: String,

    /// Ground-truth table, relative to the data directory unless absolute.
    #[arg(long, default_value = "truth.csv")]
    truth: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Detect(args) => run_detect(args),
        Commands::Evaluate(args) => run_evaluate(args),
    }
}

fn run_detect(args: DetectArgs) -> anyhow::Result<()> {
    let image = image::open(&args.image)
        .with_context(|| format!("failed to load image {}", args.image.display()))?;
    info!("loaded {}: {}x{}", args.image.display(), image.width(), image.height());

    let boundary = detect_boundary_dynamic(&image);
    println!(
        "{} {} {} {}",
        boundary.x1, boundary.y1, boundary.x2, boundary.y2
    );

    if let Some(path) = &args.crop {
        match crop_to_boundary(&image, boundary) {
            Some(cropped) => {
                cropped
                    .save(path)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!("cropped image written to {}", path.display());
            }
            None => anyhow::bail!("detected boundary has zero area, nothing to crop"),
        }
    }

    if let Some(path) = &args.overlay {
        let config = OverlayConfig::default()
            .with_line_thickness(args.line_thickness)
            .with_scale_factor(args.scale_factor);
        render_overlay(&image, boundary, &config)
            .save(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("overlay written to {}", path.display());
    }

    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> anyhow::Result<()> {
    let config = EvaluationConfig::default()
        .with_data_dir(args.data_dir)
        .with_image_count(args.count)
        .with_image_prefix(args.prefix)
        .with_image_extension(args.extension)
        .with_truth_file(args.truth);

    let summary = run_evaluation(&config).context("evaluation aborted")?;
    println!("{summary}");
    Ok(())
}
