use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use exif_carry::{config, exif, pickers, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "exif-carry",
    version,
    about = "Convert images to JPEG while keeping their EXIF metadata"
)]
struct Cli {
    /// Image files or directories to convert
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Directory converted files are written to
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Decode and report without writing any files
    #[arg(long)]
    dry_run: bool,

    /// JPEG quality (1-100), overrides the config file
    #[arg(short, long, value_name = "N")]
    quality: Option<u8>,

    /// Number of files to convert at once, overrides the config file
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Display the EXIF summary of each input and exit
    #[arg(long = "show-exif")]
    show_exif: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    let images = pipeline::collect_images(&cli.paths);
    if images.is_empty() {
        anyhow::bail!("No supported image files found in the specified paths.");
    }

    // Handle --show-exif
    if cli.show_exif {
        for image_path in &images {
            print_summary(image_path);
        }
        return Ok(());
    }

    // Load config, then apply CLI overrides
    let mut config = config::Config::load(cli.config.as_deref())?;
    if cli.dry_run {
        config.output.dry_run = true;
    }
    if let Some(quality) = cli.quality {
        config.output.quality = quality;
    }
    if let Some(jobs) = cli.jobs {
        config.batch.jobs = jobs;
    }
    config.validate()?;

    let Some(out_dir) = cli.output else {
        anyhow::bail!("No output directory specified. Use --output DIR.");
    };
    if !config.output.dry_run {
        pickers::ensure_output_dir(&out_dir)?;
    }

    log::info!("Found {} image(s) to convert", images.len());
    if config.output.dry_run {
        log::info!("DRY RUN: no files will be written");
    }

    let results = if config.batch.jobs > 1 {
        log::info!("Converting with {} jobs", config.batch.jobs);
        pipeline::convert_all_parallel(&images, &out_dir, &config).await
    } else {
        pipeline::convert_all(&images, &out_dir, &config)
    };

    // JSON output
    if cli.json {
        let json_results: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "input": r.input.display().to_string(),
                    "output": r.output.as_ref().map(|p| p.display().to_string()),
                    "exif_bytes": r.exif_bytes,
                    "error": r.error,
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&json_results)?);
    }

    // Summary
    let summary = pipeline::BatchSummary::from_results(&results);
    log::info!(
        "Done: {} succeeded ({} with EXIF), {} failed out of {} images",
        summary.succeeded,
        summary.with_exif,
        summary.failed,
        summary.total
    );

    if summary.failed > 0 {
        anyhow::bail!("{} of {} conversions failed", summary.failed, summary.total);
    }
    Ok(())
}

/// Print the EXIF fields that will be carried across.
fn print_summary(path: &std::path::Path) {
    println!("{}", path.display());
    match exif::read_summary(path) {
        Ok(summary) if summary.is_empty() => println!("  (no EXIF)"),
        Ok(summary) => {
            print_row("Make", summary.make.as_deref());
            print_row("Model", summary.model.as_deref());
            print_row("DateTimeOriginal", summary.taken_at.as_deref());
            print_row("GPS", Some(if summary.has_gps { "yes" } else { "no" }));
        }
        Err(e) => println!("  error: {e}"),
    }
}

fn print_row(tag: &str, value: Option<&str>) {
    if let Some(value) = value {
        println!("  {tag:<18} {value}");
    }
}
