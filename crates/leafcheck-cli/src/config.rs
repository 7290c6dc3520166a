//! Configuration file support for leafcheck.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/leafcheck/config.toml` (lowest priority)
//! - Project-local: `.leafcheck.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use leafcheck_adapters::ClassifierMode;
use leafcheck_core::Language;
use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Image quality thresholds.
    pub quality: QualityConfig,
    /// Upload intake settings.
    pub intake: IntakeConfig,
    /// Classifier backend settings.
    pub classifier: ClassifierConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Image quality thresholds.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Mean brightness below which a photo is too dark (0-255).
    pub dark_threshold: Option<f64>,
    /// Mean brightness above which a photo is too bright (0-255).
    pub bright_threshold: Option<f64>,
    /// Edge score below which a photo is too blurry.
    pub blur_threshold: Option<f64>,
}

/// Upload intake configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Maximum upload size in MiB.
    pub max_upload_mb: Option<u64>,
}

/// Classifier configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Backend: "auto", "remote" or "demo".
    pub mode: Option<ClassifierMode>,
    /// API key for the remote backend.
    pub api_key: Option<String>,
    /// Remote model name.
    pub model: Option<String>,
    /// Remote API base URL.
    pub endpoint: Option<String>,
    /// Remote request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Simulated demo latency in milliseconds.
    pub demo_delay_ms: Option<u64>,
    /// Default crop id.
    pub crop: Option<String>,
    /// Default response language.
    pub language: Option<Language>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Include EXIF metadata.
    pub exif: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/leafcheck/config.toml`
    /// 2. Project-local: `.leafcheck.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        for problem in config.sanitize() {
            eprintln!("warning: {problem}; using the default");
        }

        config
    }

    /// Drops configuration values outside their acceptable ranges.
    ///
    /// Each rejected field falls back to its default and is reported in the
    /// returned list of problems.
    fn sanitize(&mut self) -> Vec<String> {
        let mut problems = Vec::new();

        for (name, value) in [
            ("quality.dark_threshold", &mut self.quality.dark_threshold),
            ("quality.bright_threshold", &mut self.quality.bright_threshold),
        ] {
            if let Some(t) = *value {
                if !(0.0..=255.0).contains(&t) {
                    problems.push(format!("{name} must be 0-255, got {t}"));
                    *value = None;
                }
            }
        }
        if let Some(t) = self.quality.blur_threshold {
            if t < 0.0 || !t.is_finite() {
                problems.push(format!("quality.blur_threshold must be >= 0, got {t}"));
                self.quality.blur_threshold = None;
            }
        }

        if self.intake.max_upload_mb == Some(0) {
            problems.push("intake.max_upload_mb must be at least 1".to_string());
            self.intake.max_upload_mb = None;
        }

        if let Some(crop) = &self.classifier.crop {
            if leafcheck_core::find_crop(crop).is_none() {
                problems.push(format!("classifier.crop '{crop}' is not a known crop"));
                self.classifier.crop = None;
            }
        }

        if let Some(f) = &self.output.format {
            if f != "json" && f != "jsonl" {
                problems.push(format!("output.format must be 'json' or 'jsonl', got '{f}'"));
                self.output.format = None;
            }
        }

        problems
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        self.quality.dark_threshold = other.quality.dark_threshold.or(self.quality.dark_threshold);
        self.quality.bright_threshold = other
            .quality
            .bright_threshold
            .or(self.quality.bright_threshold);
        self.quality.blur_threshold = other.quality.blur_threshold.or(self.quality.blur_threshold);

        self.intake.max_upload_mb = other.intake.max_upload_mb.or(self.intake.max_upload_mb);

        let classifier = other.classifier;
        self.classifier.mode = classifier.mode.or(self.classifier.mode);
        self.classifier.api_key = classifier.api_key.or_else(|| self.classifier.api_key.take());
        self.classifier.model = classifier.model.or_else(|| self.classifier.model.take());
        self.classifier.endpoint = classifier
            .endpoint
            .or_else(|| self.classifier.endpoint.take());
        self.classifier.timeout_secs = classifier.timeout_secs.or(self.classifier.timeout_secs);
        self.classifier.demo_delay_ms = classifier.demo_delay_ms.or(self.classifier.demo_delay_ms);
        self.classifier.crop = classifier.crop.or_else(|| self.classifier.crop.take());
        self.classifier.language = classifier.language.or(self.classifier.language);

        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.exif = other.output.exif.or(self.output.exif);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("leafcheck").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.leafcheck.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".leafcheck.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
