//! Classification results as returned by a classifier backend.

use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;

/// Predictions below this confidence prompt the user to retake the photo.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 70.0;

/// Diagnosis for one leaf photo.
///
/// Field names follow the camelCase JSON schema requested from the remote
/// classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    /// Disease name, or "Healthy".
    pub disease_name: String,
    /// Whether the leaf looks healthy.
    pub is_healthy: bool,
    /// Certainty from 0 to 100.
    pub confidence: f64,
    /// Short non-technical description of the visible symptoms.
    pub description: String,
    /// General agronomic advice.
    pub recommendations: Vec<String>,
}

impl PredictionResult {
    /// Whether the confidence is low enough to suggest a retake.
    #[must_use]
    pub fn is_low_confidence(&self) -> bool {
        self.confidence < LOW_CONFIDENCE_THRESHOLD
    }

    /// Confidence rounded to a whole percent for display.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn confidence_percent(&self) -> i64 {
        self.confidence.round() as i64
    }

    /// Checks the invariants a backend response must satisfy.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Invalid`] for a blank disease name or a
    /// confidence outside `0..=100`.
    pub fn validate(&self) -> Result<(), ClassifyError> {
        if self.disease_name.trim().is_empty() {
            return Err(ClassifyError::Invalid("disease name is empty".into()));
        }
        if !(0.0..=100.0).contains(&self.confidence) {
            return Err(ClassifyError::Invalid(format!(
                "confidence {} is not in 0..=100",
                self.confidence
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(confidence: f64) -> PredictionResult {
        PredictionResult {
            disease_name: "Late Blight".into(),
            is_healthy: false,
            confidence,
            description: "Dark lesions.".into(),
            recommendations: vec!["Remove infected leaves.".into()],
        }
    }

    #[test]
    fn test_low_confidence_boundary() {
        assert!(sample(69.9).is_low_confidence());
        assert!(!sample(70.0).is_low_confidence());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(sample(101.0).validate().is_err());
        assert!(sample(-1.0).validate().is_err());
        assert!(sample(100.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let mut result = sample(50.0);
        result.disease_name = "  ".into();
        assert!(result.validate().is_err());
    }

    #[test]
    fn test_camel_case_schema() {
        let json = r#"{
            "diseaseName": "Healthy",
            "isHealthy": true,
            "confidence": 96,
            "description": "Vibrant green.",
            "recommendations": ["Keep watering."]
        }"#;
        let parsed: PredictionResult = match serde_json::from_str(json) {
            Ok(p) => p,
            Err(e) => panic!("schema should parse: {e}"),
        };
        assert!(parsed.is_healthy);
        assert_eq!(parsed.confidence_percent(), 96);
    }
}
