//! Startup selection of the classification backend.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use leafcheck_core::demo::DEFAULT_DEMO_DELAY;
use leafcheck_core::{Classifier, DemoClassifier};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::gemini::{GeminiClassifier, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT};

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["LEAFCHECK_API_KEY", "API_KEY"];

/// Which classifier backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    /// Remote when an API key is available, demo otherwise.
    #[default]
    Auto,
    /// Always remote; missing key is an error.
    Remote,
    /// Always the offline demo backend.
    Demo,
}

impl fmt::Display for ClassifierMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Remote => "remote",
            Self::Demo => "demo",
        })
    }
}

impl FromStr for ClassifierMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "remote" => Ok(Self::Remote),
            "demo" => Ok(Self::Demo),
            other => Err(format!(
                "unknown classifier mode '{other}' (expected auto, remote or demo)"
            )),
        }
    }
}

/// Everything needed to build a classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierSettings {
    /// Backend selection.
    pub mode: ClassifierMode,
    /// Explicit API key; environment variables are consulted when `None`.
    pub api_key: Option<String>,
    /// Remote model name.
    pub model: String,
    /// Remote API base URL.
    pub endpoint: String,
    /// Remote request timeout.
    pub timeout: Duration,
    /// Simulated latency of the demo backend.
    pub demo_delay: Duration,
    /// Seed for reproducible demo outcomes.
    pub demo_seed: Option<u64>,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            mode: ClassifierMode::Auto,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            demo_delay: DEFAULT_DEMO_DELAY,
            demo_seed: None,
        }
    }
}

/// Returns the first non-blank key from `explicit` or the environment.
#[must_use]
pub fn resolve_api_key(explicit: Option<&str>) -> Option<String> {
    non_blank(explicit.map(str::to_string)).or_else(|| {
        API_KEY_ENV_VARS
            .iter()
            .find_map(|var| non_blank(std::env::var(var).ok()))
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Builds the classifier once at startup.
///
/// # Errors
///
/// Returns an error if remote mode is requested without an API key, or if
/// the HTTP client cannot be built.
pub fn build_classifier(settings: &ClassifierSettings) -> anyhow::Result<Arc<dyn Classifier>> {
    let api_key = resolve_api_key(settings.api_key.as_deref());

    match (settings.mode, api_key) {
        (ClassifierMode::Demo, _) => Ok(demo(settings)),
        (ClassifierMode::Auto, None) => {
            warn!("No API key found. Running in demo mode.");
            Ok(demo(settings))
        }
        (ClassifierMode::Remote, None) => anyhow::bail!(
            "Remote classifier requires an API key (set classifier.api_key or {})",
            API_KEY_ENV_VARS.join(" / ")
        ),
        (ClassifierMode::Auto | ClassifierMode::Remote, Some(key)) => {
            info!("Using remote classifier {}", settings.model);
            let classifier = GeminiClassifier::new(
                key,
                settings.model.as_str(),
                settings.endpoint.as_str(),
                settings.timeout,
            )?;
            Ok(Arc::new(classifier))
        }
    }
}

fn demo(settings: &ClassifierSettings) -> Arc<dyn Classifier> {
    let classifier = match settings.demo_seed {
        Some(seed) => DemoClassifier::seeded(seed, settings.demo_delay),
        None => DemoClassifier::new(settings.demo_delay),
    };
    Arc::new(classifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("demo".parse::<ClassifierMode>(), Ok(ClassifierMode::Demo));
        assert_eq!(" Remote ".parse::<ClassifierMode>(), Ok(ClassifierMode::Remote));
        assert!("cloud".parse::<ClassifierMode>().is_err());
        assert_eq!(ClassifierMode::default().to_string(), "auto");
    }

    #[test]
    fn test_explicit_key_wins_and_blank_is_ignored() {
        assert_eq!(resolve_api_key(Some(" abc ")), Some("abc".to_string()));
        assert_eq!(non_blank(Some("   ".into())), None);
    }

    #[test]
    fn test_demo_mode_ignores_key() {
        let settings = ClassifierSettings {
            mode: ClassifierMode::Demo,
            api_key: Some("secret".into()),
            ..ClassifierSettings::default()
        };
        let classifier = build_classifier(&settings).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(classifier.name(), "demo");
    }

    #[test]
    fn test_explicit_key_selects_remote() {
        let settings = ClassifierSettings {
            api_key: Some("secret".into()),
            ..ClassifierSettings::default()
        };
        let classifier = build_classifier(&settings).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(classifier.name(), "gemini");
    }
}
