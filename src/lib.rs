//! yolo2coco: convert YOLO detection datasets into COCO annotation files.
//!
//! Each split is described by a manifest listing image paths. For every
//! image the converter copies the file, reads its size, finds its YOLO label
//! file and turns each normalized `class cx cy w h` line into a COCO
//! annotation with a pixel-space `[x, y, w, h]` box. Image and annotation
//! ids count up from 1 per split; category ids are the YOLO class ids.
//!
//! # Modules
//!
//! - [`conversion`]: the per-split converter and its report
//! - [`ir`]: COCO records, typed boxes and ids, YOLO/COCO readers and writers
//! - [`config`] / [`splits`]: YAML-driven conversion of train/val/test
//! - [`validation`]: structural checks on COCO documents
//! - [`error`]: error types

pub mod config;
pub mod conversion;
pub mod error;
pub mod ir;
pub mod splits;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub use conversion::{Conversion, ConversionReport, DatasetConverter};
pub use error::Yolo2CocoError;

/// The yolo2coco CLI application.
#[derive(Parser)]
#[command(name = "yolo2coco")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Show a progress bar while converting.
    #[arg(long, global = true)]
    progress: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single split from its manifest.
    Convert(ConvertArgs),
    /// Convert every split listed in a YAML configuration.
    Splits(SplitsArgs),
    /// Validate a COCO annotation file.
    Validate(ValidateArgs),
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Text file with one image path per line.
    #[arg(long)]
    manifest: PathBuf,

    /// Directory the images are copied into.
    #[arg(long)]
    images_out: PathBuf,

    /// Path of the COCO JSON file to write.
    #[arg(long)]
    annotations_out: PathBuf,

    /// Class names: a YOLO data.yaml or a classes.txt with one name per line.
    #[arg(long)]
    classes: Option<PathBuf>,

    /// Where label files live relative to their images.
    #[arg(long, value_enum, default_value_t = config::LabelLayout::ImagesToLabels)]
    label_layout: config::LabelLayout,

    /// Format of the conversion summary printed to stdout.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

#[derive(clap::Args)]
struct SplitsArgs {
    /// YAML configuration naming the input root, output root and manifests.
    config: PathBuf,

    /// Override `input_path` from the configuration.
    #[arg(long)]
    input_path: Option<PathBuf>,

    /// Override `output_path` from the configuration.
    #[arg(long)]
    output_path: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

#[derive(clap::Args)]
struct ValidateArgs {
    /// COCO JSON file to validate.
    input: PathBuf,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Run the yolo2coco CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), Yolo2CocoError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args, cli.progress),
        Some(Commands::Splits(args)) => run_splits(args, cli.progress),
        Some(Commands::Validate(args)) => run_validate(args),
        None => {
            println!("yolo2coco {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Convert YOLO detection datasets into COCO annotation files.");
            println!();
            println!("Run 'yolo2coco --help' for usage information.");
            Ok(())
        }
    }
}

fn run_convert(args: ConvertArgs, progress: bool) -> Result<(), Yolo2CocoError> {
    let class_names: Option<BTreeMap<u64, String>> = args
        .classes
        .as_deref()
        .map(ir::io_yolo::read_class_names)
        .transpose()?;

    let mut converter = args
        .label_layout
        .apply(DatasetConverter::new())
        .with_progress(progress);
    if let Some(names) = class_names {
        converter = converter.with_class_names(names);
    }

    let conversion = converter.convert(&args.manifest, &args.images_out, &args.annotations_out)?;
    print_reports(&[&conversion.report], args.report)
}

fn run_splits(args: SplitsArgs, progress: bool) -> Result<(), Yolo2CocoError> {
    let mut config = config::SplitsConfig::load(&args.config)?;
    if let Some(input_path) = args.input_path {
        config.input_path = input_path;
    }
    if let Some(output_path) = args.output_path {
        config.output_path = output_path;
    }

    let outcomes = splits::convert_splits(&config, progress)?;
    let reports: Vec<&ConversionReport> = outcomes
        .iter()
        .map(|outcome| &outcome.conversion.report)
        .collect();
    print_reports(&reports, args.report)
}

fn print_reports(reports: &[&ConversionReport], format: ReportFormat) -> Result<(), Yolo2CocoError> {
    match format {
        ReportFormat::Json => {
            let json =
                serde_json::to_string_pretty(reports).map_err(Yolo2CocoError::ReportSerialize)?;
            println!("{json}");
        }
        ReportFormat::Text => {
            for report in reports {
                print!("{report}");
            }
        }
    }
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), Yolo2CocoError> {
    let document = ir::io_coco_json::read_coco_json(&args.input)?;

    let opts = validation::ValidateOptions {
        strict: args.strict,
    };
    let report = validation::validate_document(&document, &opts);

    match args.output {
        ReportFormat::Json => {
            let summary = serde_json::json!({
                "error_count": report.error_count(),
                "warning_count": report.warning_count(),
                "issues": &report.issues,
            });
            let json =
                serde_json::to_string_pretty(&summary).map_err(Yolo2CocoError::ReportSerialize)?;
            println!("{json}");
        }
        ReportFormat::Text => print!("{report}"),
    }

    let has_errors = report.error_count() > 0;
    let has_warnings = report.warning_count() > 0;

    if has_errors || (args.strict && has_warnings) {
        Err(Yolo2CocoError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    } else {
        Ok(())
    }
}
