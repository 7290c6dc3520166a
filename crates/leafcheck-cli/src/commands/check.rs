//! Check command - flag photos that are too dark, too bright or too blurry.

use std::collections::HashMap;
use std::io::{Cursor, IsTerminal};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use leafcheck_adapters::FsImageSource;
use leafcheck_core::{
    iso_timestamp, AnalysisResult, ImageDecoder, ImageSource, ProgressEvent, ProgressSink,
    QualityAnalyzer, QualityConfig, QualityReport, RasterDecoder, ResultOutput, UploadIntake,
    DEFAULT_MAX_UPLOAD_BYTES,
};
use tracing::{debug, info};

use super::classify::Diagnosis;
use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Parse and validate a brightness threshold (0-255).
fn parse_brightness(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=255.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0..=255"))
    }
}

/// Parse and validate an edge score threshold (non-negative).
fn parse_edge_score(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("{value} must be a non-negative number"))
    }
}

/// Shared arguments for photo checks.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct CheckArgs {
    /// Files or directories to check
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Mean brightness below which a photo is too dark (0-255)
    #[arg(long, value_parser = parse_brightness)]
    pub dark_threshold: Option<f64>,

    /// Mean brightness above which a photo is too bright (0-255)
    #[arg(long, value_parser = parse_brightness)]
    pub bright_threshold: Option<f64>,

    /// Edge score below which a photo is too blurry
    #[arg(long, value_parser = parse_edge_score)]
    pub blur_threshold: Option<f64>,

    /// Largest accepted file in MiB
    #[arg(long, value_name = "MB", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_upload_mb: Option<u64>,

    /// Include EXIF metadata in output
    #[arg(long)]
    pub exif: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,
}

impl CheckArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        // Thresholds: CLI > config (accessor provides hardcoded fallback)
        args.dark_threshold = args.dark_threshold.or(config.quality.dark_threshold);
        args.bright_threshold = args.bright_threshold.or(config.quality.bright_threshold);
        args.blur_threshold = args.blur_threshold.or(config.quality.blur_threshold);
        args.max_upload_mb = args.max_upload_mb.or(config.intake.max_upload_mb);

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }

        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.exif {
            args.exif = config.output.exif.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        args
    }

    /// Quality thresholds with fallback to hardcoded defaults.
    pub fn quality_config(&self) -> QualityConfig {
        let defaults = QualityConfig::default();
        QualityConfig {
            dark_threshold: self.dark_threshold.unwrap_or(defaults.dark_threshold),
            bright_threshold: self.bright_threshold.unwrap_or(defaults.bright_threshold),
            blur_threshold: self.blur_threshold.unwrap_or(defaults.blur_threshold),
            ..defaults
        }
    }

    /// Upload limit in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb
            .map_or(DEFAULT_MAX_UPLOAD_BYTES, |mb| mb.saturating_mul(BYTES_PER_MB))
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or(OutputFormat::Jsonl)
    }

    /// Builds the intake with the configured thresholds and limit.
    pub fn intake(&self) -> UploadIntake<RasterDecoder> {
        let analyzer = QualityAnalyzer::new(RasterDecoder::new(), self.quality_config());
        UploadIntake::with_limit(analyzer, self.max_upload_bytes())
    }

    /// Builds the progress reporter for the given number of images.
    pub fn progress_bar(&self, total: Option<usize>) -> ProgressBar {
        let show_bar = !self.quiet && (self.progress || std::io::stderr().is_terminal());
        ProgressBar::new(total.map(|t| t as u64), self.quiet, show_bar)
    }
}

/// Counters for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of images processed.
    pub processed: usize,
    /// Number of images skipped (unreadable or too large).
    pub skipped: usize,
    /// Number of images with a quality warning.
    pub with_warnings: usize,
    /// Number of failed classifications.
    pub failed: usize,
}

impl RunSummary {
    /// Exit code for a check run.
    pub const fn check_exit_code(&self) -> ExitCode {
        if self.with_warnings > 0 {
            ExitCode::IssuesFound
        } else {
            ExitCode::Success
        }
    }
}

/// Run the check command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub async fn run(args: &CheckArgs) -> Result<RunSummary> {
    info!("Running check command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let source = FsImageSource::new(args.paths.clone(), args.recursive)
        .with_max_bytes(args.max_upload_bytes());
    let progress = args.progress_bar(source.count_hint());
    let output = JsonOutput::stdout();
    let intake = args.intake();

    process_images(&source, &intake, None, &output, &progress, args).await
}

/// Runs every image through intake, the quality check and, when given,
/// the diagnosis step. Results are written as they complete.
pub async fn process_images<D: ImageDecoder>(
    source: &dyn ImageSource,
    intake: &UploadIntake<D>,
    mut diagnosis: Option<&mut Diagnosis>,
    output: &JsonOutput,
    progress: &dyn ProgressSink,
    args: &CheckArgs,
) -> Result<RunSummary> {
    let total = source.count_hint();
    let mut summary = RunSummary::default();
    let mut all_results: Vec<AnalysisResult> = Vec::new();

    for (index, image_result) in source.images().enumerate() {
        let image = match image_result {
            Ok(img) => img,
            Err(e) => {
                // Note: error message contains the path via anyhow context
                progress.on_event(ProgressEvent::Skipped {
                    path: format!("image {index}"),
                    reason: format!("{e:#}"),
                });
                summary.skipped += 1;
                continue;
            }
        };

        let path = image.name.clone();
        let selection = match intake.select(image) {
            Ok(selection) => selection,
            Err(e) => {
                progress.on_event(ProgressEvent::Skipped {
                    path,
                    reason: e.to_string(),
                });
                summary.skipped += 1;
                continue;
            }
        };

        progress.on_event(ProgressEvent::Started {
            path: path.clone(),
            index,
            total,
        });

        let report = intake
            .assess(&selection)
            .await
            .unwrap_or_else(QualityReport::unassessed);

        if diagnosis.as_ref().is_some_and(|d| d.dismiss_warnings) {
            intake.dismiss();
        }

        let image = selection.image();
        let mut result = AnalysisResult {
            path,
            timestamp: iso_timestamp(),
            media_type: image.media_type.clone(),
            size_bytes: image.size(),
            sha256: image.sha256(),
            verdict: report.verdict,
            stats: report.stats,
            sample: report.sample,
            advisory: intake.advisory(),
            crop: None,
            prediction: None,
            error: None,
            exif: if args.exif {
                extract_exif(image.bytes())
            } else {
                None
            },
        };

        if let Some(diagnosis) = diagnosis.as_deref_mut() {
            diagnosis.run(intake, &selection, &mut result).await;
        }

        if result.has_warning() {
            summary.with_warnings += 1;
        }
        if result.error.is_some() {
            summary.failed += 1;
        }

        progress.on_event(ProgressEvent::Completed {
            result: Box::new(result.clone()),
        });

        match args.format() {
            OutputFormat::Jsonl => output.write(&result)?,
            OutputFormat::Json => all_results.push(result),
        }

        summary.processed += 1;
    }

    if matches!(args.format(), OutputFormat::Json) {
        output.write_array(&all_results, args.pretty)?;
    }

    output.flush()?;

    progress.on_event(ProgressEvent::Finished {
        processed: summary.processed,
        skipped: summary.skipped,
    });
    debug!("Run finished: {summary:?}");

    Ok(summary)
}

/// Extract EXIF metadata from encoded image bytes.
fn extract_exif(bytes: &[u8]) -> Option<HashMap<String, String>> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;

    let map: HashMap<String, String> = exif
        .fields()
        .map(|field| {
            (
                field.tag.to_string(),
                field.display_value().with_unit(&exif).to_string(),
            )
        })
        .collect();

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}
