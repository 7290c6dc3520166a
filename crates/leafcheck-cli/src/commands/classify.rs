//! Classify command - quality check followed by leaf disease diagnosis.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use leafcheck_adapters::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use leafcheck_adapters::{build_classifier, ClassifierMode, ClassifierSettings, FsImageSource};
use leafcheck_core::demo::DEFAULT_DEMO_DELAY;
use leafcheck_core::{
    find_crop, AnalysisResult, Classifier, Crop, ImageDecoder, ImageSource, Language, Selection,
    SessionHistory, UploadIntake,
};
use tracing::{error, info};

use super::check::{self, CheckArgs, RunSummary};
use super::ExitCode;
use crate::config::AppConfig;
use crate::output::JsonOutput;

/// Crop used when neither the CLI nor the config names one.
const DEFAULT_CROP: &str = "other";

fn parse_crop(s: &str) -> Result<&'static Crop, String> {
    find_crop(s).ok_or_else(|| format!("unknown crop '{s}' (run `leafcheck crops` to list them)"))
}

fn parse_language(s: &str) -> Result<Language, String> {
    s.parse()
}

fn parse_mode(s: &str) -> Result<ClassifierMode, String> {
    s.parse()
}

/// Arguments for the classify command.
#[derive(Args, Clone)]
pub struct ClassifyArgs {
    /// Shared check arguments.
    #[command(flatten)]
    pub check: CheckArgs,

    /// Crop id, e.g. rice or tomato (default: other, auto-detect)
    #[arg(long, value_parser = parse_crop)]
    pub crop: Option<&'static Crop>,

    /// Response language: en or bn
    #[arg(long, value_parser = parse_language)]
    pub lang: Option<Language>,

    /// Classifier backend: auto, remote or demo
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<ClassifierMode>,

    /// Remote model name
    #[arg(long)]
    pub model: Option<String>,

    /// Simulated latency of the demo backend in milliseconds
    #[arg(long, value_name = "MS")]
    pub demo_delay_ms: Option<u64>,

    /// Seed for reproducible demo results
    #[arg(long)]
    pub seed: Option<u64>,

    /// Dismiss quality warnings (verdicts are still reported)
    #[arg(long)]
    pub dismiss_warnings: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl ClassifyArgs {
    /// Apply configuration file values, respecting CLI precedence.
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        args.check = CheckArgs::with_config(args.check, config);

        let classifier = &config.classifier;
        if args.crop.is_none() {
            args.crop = classifier.crop.as_deref().and_then(find_crop);
        }
        args.lang = args.lang.or(classifier.language);
        args.mode = args.mode.or(classifier.mode);
        if args.model.is_none() {
            args.model.clone_from(&classifier.model);
        }
        args.demo_delay_ms = args.demo_delay_ms.or(classifier.demo_delay_ms);

        args.config = Some(config.clone());
        args
    }

    fn crop(&self) -> &'static Crop {
        self.crop
            .or_else(|| find_crop(DEFAULT_CROP))
            .unwrap_or(&leafcheck_core::CROPS[0])
    }

    fn language(&self) -> Language {
        self.lang.unwrap_or_default()
    }

    /// Classifier settings from CLI, config and defaults.
    fn classifier_settings(&self) -> ClassifierSettings {
        let config = self.config.as_ref().map(|c| &c.classifier);
        ClassifierSettings {
            mode: self.mode.unwrap_or_default(),
            api_key: config.and_then(|c| c.api_key.clone()),
            model: self.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: config
                .and_then(|c| c.endpoint.clone())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            timeout: config
                .and_then(|c| c.timeout_secs)
                .map_or(DEFAULT_TIMEOUT, Duration::from_secs),
            demo_delay: self
                .demo_delay_ms
                .map_or(DEFAULT_DEMO_DELAY, Duration::from_millis),
            demo_seed: self.seed,
        }
    }
}

/// Diagnosis step appended to the quality check.
pub struct Diagnosis {
    classifier: Arc<dyn Classifier>,
    crop: &'static Crop,
    language: Language,
    /// Hide the quality advisory once it was raised.
    pub dismiss_warnings: bool,
    history: SessionHistory,
}

impl Diagnosis {
    /// Creates a diagnosis step with an empty history.
    pub fn new(
        classifier: Arc<dyn Classifier>,
        crop: &'static Crop,
        language: Language,
        dismiss_warnings: bool,
    ) -> Self {
        Self {
            classifier,
            crop,
            language,
            dismiss_warnings,
            history: SessionHistory::new(),
        }
    }

    /// Classifies the selected image and records the outcome on `result`.
    ///
    /// A quality advisory never blocks classification.
    pub async fn run<D: ImageDecoder>(
        &mut self,
        intake: &UploadIntake<D>,
        selection: &Selection,
        result: &mut AnalysisResult,
    ) {
        result.crop = Some(self.crop.id.to_string());
        result.advisory = result
            .advisory
            .take()
            .map(|advisory| advisory.in_language(self.language));
        if !intake.can_submit(Some(self.crop)) {
            return;
        }

        match self
            .classifier
            .classify(selection.image(), self.crop, self.language)
            .await
        {
            Ok(prediction) => {
                self.history
                    .record(self.crop, self.language, prediction.clone());
                result.prediction = Some(prediction);
            }
            Err(e) => {
                error!("Classification failed for {}: {e}", result.path);
                result.error = Some(e.user_message().to_string());
            }
        }
    }

    /// Session history, newest first.
    pub const fn history(&self) -> &SessionHistory {
        &self.history
    }
}

impl RunSummary {
    /// Exit code for a classify run; failures outrank warnings.
    pub const fn classify_exit_code(&self) -> ExitCode {
        if self.failed > 0 {
            ExitCode::Error
        } else {
            self.check_exit_code()
        }
    }
}

/// Run the classify command.
pub async fn run(args: &ClassifyArgs) -> Result<RunSummary> {
    let check = &args.check;
    if check.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let classifier = build_classifier(&args.classifier_settings())?;
    let crop = args.crop();
    info!(
        "Classifying {} paths as {} with the {} backend",
        check.paths.len(),
        crop.name,
        classifier.name()
    );

    let source = FsImageSource::new(check.paths.clone(), check.recursive)
        .with_max_bytes(check.max_upload_bytes());
    let progress = check.progress_bar(source.count_hint());
    let output = JsonOutput::stdout();
    let intake = check.intake();
    let mut diagnosis = Diagnosis::new(classifier, crop, args.language(), args.dismiss_warnings);

    let summary = check::process_images(
        &source,
        &intake,
        Some(&mut diagnosis),
        &output,
        &progress,
        check,
    )
    .await?;

    if !check.quiet {
        print_history(diagnosis.history());
    }

    Ok(summary)
}

fn print_history(history: &SessionHistory) {
    if history.is_empty() {
        return;
    }
    eprintln!("History ({}):", history.len());
    for item in history.items() {
        eprintln!(
            "  #{} {} {}: {} ({}%)",
            item.id,
            item.timestamp,
            item.crop_name,
            item.result.disease_name,
            item.result.confidence_percent()
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use leafcheck_core::{QualityAnalyzer, QualityConfig, Verdict};
    use leafcheck_test_support::{CountingDecoder, MockClassifier, SyntheticImageBuilder};

    fn empty_result() -> AnalysisResult {
        AnalysisResult {
            path: "leaf.png".into(),
            timestamp: String::new(),
            media_type: "image/png".into(),
            size_bytes: 0,
            sha256: String::new(),
            verdict: Verdict::TooDark,
            stats: None,
            sample: None,
            advisory: None,
            crop: None,
            prediction: None,
            error: None,
            exif: None,
        }
    }

    fn intake() -> UploadIntake<CountingDecoder> {
        UploadIntake::new(QualityAnalyzer::new(
            CountingDecoder::new(),
            QualityConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_warning_does_not_block_classification() {
        let intake = intake();
        let selection = intake.select(SyntheticImageBuilder::black(10, 10)).unwrap();
        intake.assess(&selection).await;
        assert!(intake.advisory().is_some());

        let classifier = Arc::new(MockClassifier::returning(
            MockClassifier::healthy_prediction(),
        ));
        let mut diagnosis = Diagnosis::new(
            classifier.clone(),
            find_crop("rice").unwrap(),
            Language::En,
            false,
        );

        let mut result = empty_result();
        diagnosis.run(&intake, &selection, &mut result).await;

        assert_eq!(classifier.calls().len(), 1);
        assert_eq!(result.crop.as_deref(), Some("rice"));
        assert!(result.prediction.is_some());
        assert_eq!(diagnosis.history().len(), 1);
    }

    #[tokio::test]
    async fn test_advisory_follows_response_language() {
        let intake = intake();
        let selection = intake.select(SyntheticImageBuilder::black(10, 10)).unwrap();
        intake.assess(&selection).await;

        let mut diagnosis = Diagnosis::new(
            Arc::new(MockClassifier::returning(
                MockClassifier::healthy_prediction(),
            )),
            find_crop("rice").unwrap(),
            Language::Bn,
            false,
        );

        let mut result = empty_result();
        result.advisory = intake.advisory();
        diagnosis.run(&intake, &selection, &mut result).await;

        let advisory = result.advisory.unwrap();
        assert_eq!(advisory.verdict, Verdict::TooDark);
        assert_eq!(
            advisory.reason,
            "ছবিটি খুব অন্ধকার। দয়া করে ভালো আলোতে ছবি তুলুন।"
        );
    }

    #[tokio::test]
    async fn test_failure_is_reported_not_recorded() {
        let intake = intake();
        let selection = intake.select(SyntheticImageBuilder::mid_gray(4, 4)).unwrap();

        let mut diagnosis = Diagnosis::new(
            Arc::new(MockClassifier::failing("offline")),
            find_crop("jute").unwrap(),
            Language::Bn,
            false,
        );

        let mut result = empty_result();
        diagnosis.run(&intake, &selection, &mut result).await;

        assert!(result.prediction.is_none());
        assert_eq!(
            result.error.as_deref(),
            Some("Analysis failed. Please check your internet connection and try again.")
        );
        assert!(diagnosis.history().is_empty());
    }

    #[test]
    fn test_failures_outrank_warnings() {
        let summary = RunSummary {
            processed: 2,
            with_warnings: 1,
            failed: 1,
            ..RunSummary::default()
        };
        assert_eq!(summary.classify_exit_code(), ExitCode::Error);
        assert_eq!(summary.check_exit_code(), ExitCode::IssuesFound);
    }

    #[test]
    fn test_parse_crop() {
        assert_eq!(parse_crop("Tomato").map(|c| c.id), Ok("tomato"));
        assert!(parse_crop("cactus").unwrap_err().contains("unknown crop"));
    }
}
