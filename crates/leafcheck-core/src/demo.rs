//! Demo classifier used when no remote backend is configured.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::domain::{Crop, EncodedImage, Language, PredictionResult};
use crate::error::ClassifyError;
use crate::ports::Classifier;

/// Simulated network latency of the demo backend.
pub const DEFAULT_DEMO_DELAY: Duration = Duration::from_secs(2);

/// Classifier that answers with canned predictions after a short delay.
///
/// Healthy and diseased answers are picked with equal probability. A seeded
/// instance is deterministic.
pub struct DemoClassifier {
    delay: Duration,
    rng: Mutex<StdRng>,
}

impl DemoClassifier {
    /// Creates a demo classifier seeded from the OS.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a deterministic demo classifier.
    #[must_use]
    pub fn seeded(seed: u64, delay: Duration) -> Self {
        Self {
            delay,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn pick_healthy(&self) -> bool {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .random_bool(0.5)
    }
}

impl Default for DemoClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_DEMO_DELAY)
    }
}

#[async_trait]
impl Classifier for DemoClassifier {
    fn name(&self) -> &'static str {
        "demo"
    }

    async fn classify(
        &self,
        image: &EncodedImage,
        crop: &Crop,
        language: Language,
    ) -> Result<PredictionResult, ClassifyError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let healthy = self.pick_healthy();
        debug!("Demo classification of {} (healthy={healthy})", image.name);
        Ok(demo_prediction(healthy, crop, language))
    }
}

/// Canned prediction, with the name adjusted for crop and language.
#[must_use]
pub fn demo_prediction(healthy: bool, crop: &Crop, language: Language) -> PredictionResult {
    if healthy {
        PredictionResult {
            disease_name: match language {
                Language::En => "Healthy".into(),
                Language::Bn => "সুস্থ".into(),
            },
            is_healthy: true,
            confidence: 96.0,
            description: "The leaf appears vibrant green with no visible lesions, spots, or \
                          discoloration. The plant structure looks robust."
                .into(),
            recommendations: vec![
                "Continue regular irrigation.".into(),
                "Monitor for pests routinely.".into(),
                "Maintain current fertilization schedule.".into(),
            ],
        }
    } else {
        PredictionResult {
            disease_name: format!("{} Leaf Spot (Demo)", crop.name),
            is_healthy: false,
            confidence: 88.0,
            description: "Water-soaked streaks are visible on leaf blades, turning yellow to \
                          white. This is common in high humidity."
                .into(),
            recommendations: vec![
                "Improve field drainage immediately.".into(),
                "Avoid nitrogen excess.".into(),
                "Use resistant varieties in future seasons.".into(),
                "Consult a local agriculture officer.".into(),
            ],
        }
    }
}
