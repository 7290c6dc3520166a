//! Analysis result types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Advisory, PredictionResult, Verdict};
use crate::quality::PixelStats;

/// Complete result for a single submitted image.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// Path or name of the analyzed image.
    pub path: String,
    /// Timestamp of analysis (ISO 8601).
    pub timestamp: String,
    /// Declared media type of the payload.
    pub media_type: String,
    /// Payload size in bytes.
    pub size_bytes: u64,
    /// SHA-256 of the payload.
    pub sha256: String,
    /// Image quality verdict.
    pub verdict: Verdict,
    /// Pixel statistics behind the verdict; absent when decoding failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<PixelStats>,
    /// Dimensions of the sample buffer the statistics were computed on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<ImageDimensions>,
    /// Warning banner for a non-acceptable verdict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<Advisory>,
    /// Crop the user selected, when classification ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    /// Classifier diagnosis, when classification ran and succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<PredictionResult>,
    /// Classification failure message, if classification ran and failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Optional EXIF metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exif: Option<HashMap<String, String>>,
}

impl AnalysisResult {
    /// Whether the result carries a quality warning.
    #[must_use]
    pub const fn has_warning(&self) -> bool {
        !self.verdict.is_acceptable()
    }
}

/// Image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageDimensions {
    /// Creates a new dimensions value.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}
