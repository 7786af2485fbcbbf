//! retouch: apply a plain-language edit instruction to an image file.
//!
//! Reads an image, matches the instruction against the transform catalog,
//! applies the resulting plan and writes the edited image. Per-step
//! timings are printed as a report (or JSON with `--json`).
//!
//! # Usage
//!
//! ```text
//! retouch photo.png -p "make it brighter and add some blur" -o out.jpg
//! retouch photo.png -p "mirror and rotate" --plan-only
//! RUST_LOG=debug retouch photo.png -o out.png
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use retouch_engine::diagnostics::Clock;
use retouch_engine::{EditDiagnostics, EditPlan, EncodeConfig, ImageInfo, OutputFormat};
use serde::Serialize;

/// Apply a plain-language edit instruction to an image.
///
/// Trigger words in the prompt (e.g. "brighter", "blur", "sepia",
/// "mirror", "rotate") select transforms from a fixed catalog. A prompt
/// that matches nothing applies a mild general enhancement.
#[derive(Parser)]
#[command(name = "retouch", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    input: PathBuf,

    /// Edit instruction.
    #[arg(short, long, default_value = retouch_engine::DEFAULT_INSTRUCTION)]
    prompt: String,

    /// Where to write the edited image. Required unless `--plan-only`.
    #[arg(short, long, required_unless_present = "plan_only")]
    output: Option<PathBuf>,

    /// Output format. Defaults to the output file's extension, else JPEG.
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = EncodeConfig::DEFAULT_JPEG_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Full encode config as a JSON string.
    ///
    /// When provided, `--format` and `--quality` are ignored. The JSON
    /// must be a valid `EncodeConfig` serialization; missing fields take
    /// their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Print the plan and exit without reading or writing pixels.
    #[arg(long)]
    plan_only: bool,

    /// Output JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,
}

/// Output format selection.
#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Baseline JPEG.
    Jpeg,
    /// Lossless PNG.
    Png,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Jpeg => Self::Jpeg,
            Format::Png => Self::Png,
        }
    }
}

/// Machine-readable summary printed with `--json`.
#[derive(Serialize)]
struct Summary<'a> {
    prompt: &'a str,
    image_info: &'a ImageInfo,
    diagnostics: &'a EditDiagnostics,
}

/// Build an [`EncodeConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual flags are ignored. Otherwise the format comes from
/// `--format`, then the output extension, then the default.
fn config_from_cli(cli: &Cli) -> Result<EncodeConfig, String> {
    let config: EncodeConfig = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        let format = cli
            .format
            .map(OutputFormat::from)
            .or_else(|| cli.output.as_deref().and_then(format_from_path))
            .unwrap_or(EncodeConfig::DEFAULT_FORMAT);
        EncodeConfig {
            format,
            jpeg_quality: cli.quality,
        }
    };
    config.validate().map_err(|e| format!("Invalid config: {e}"))?;
    Ok(config)
}

fn format_from_path(path: &Path) -> Option<OutputFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(OutputFormat::from_extension)
}

fn print_plan(plan: &EditPlan, json: bool) -> ExitCode {
    if json {
        match serde_json::to_string_pretty(plan) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("Error serializing plan: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", plan.describe());
    }
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.plan_only {
        return print_plan(&retouch_engine::plan(&cli.prompt), cli.json);
    }

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let Some(ref output_path) = cli.output else {
        eprintln!("--output is required unless --plan-only is given");
        return ExitCode::FAILURE;
    };

    let image_bytes = match std::fs::read(&cli.input) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.input.display());
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "read {} ({} bytes)",
        cli.input.display(),
        image_bytes.len()
    );

    let decoded = match retouch_engine::decode_image(&image_bytes) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Decode error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let (edited, diagnostics) =
        match retouch_engine::dispatch_with_diagnostics(&cli.prompt, decoded.raster, &StdClock) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Transform error: {e}");
                return ExitCode::FAILURE;
            }
        };

    let bytes = match retouch_engine::encode_image(&edited, &config) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Encode error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = std::fs::write(output_path, &bytes) {
        eprintln!("Error writing {}: {e}", output_path.display());
        return ExitCode::FAILURE;
    }
    log::info!(
        "wrote {} ({}, {} bytes)",
        output_path.display(),
        config.format.media_type(),
        bytes.len(),
    );

    if cli.json {
        let summary = Summary {
            prompt: &cli.prompt,
            image_info: &decoded.info,
            diagnostics: &diagnostics,
        };
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing summary: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!(
            "Input: {} ({}, {})",
            cli.input.display(),
            decoded.info.format,
            decoded.info.size_label(),
        );
        println!("Plan: {}", diagnostics.plan.describe());
        println!();
        println!("{}", diagnostics.report());
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
