//! Image quality analysis.
//!
//! Flags photos that are too dark, too bright or too blurry before they are
//! submitted for classification. The check is advisory: it never fails, and
//! anything it cannot compute degrades to [`Verdict::Acceptable`].
//!
//! The pipeline is decode, resample to a fixed width, compute
//! [`PixelStats`] in one pass, then compare against fixed thresholds in
//! precedence order (dark, bright, blurry).

mod decode;
mod stats;

pub use decode::{decode_and_resample, sample_height, RasterDecoder};
pub use stats::PixelStats;

use tracing::{debug, warn};

use crate::domain::{EncodedImage, ImageDimensions, Verdict};
use crate::error::DecodeError;
use crate::ports::ImageDecoder;

/// Width every image is resampled to before statistics are taken.
///
/// The thresholds below are calibrated against this width; changing one
/// without re-tuning the other invalidates the verdicts.
pub const SAMPLE_WIDTH: u32 = 300;

/// Largest sample buffer analyzed, in pixels.
///
/// Allows aspect ratios up to 1:10 at [`SAMPLE_WIDTH`]. Taller images fail
/// open instead of allocating an unbounded buffer.
pub const MAX_SAMPLE_PIXELS: u64 = 900_000;

/// Configuration for the quality check.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityConfig {
    /// Resample width in pixels.
    pub sample_width: u32,
    /// Sample budget in pixels; larger samples are not analyzed.
    pub max_sample_pixels: u64,
    /// Mean brightness strictly below this is too dark.
    pub dark_threshold: f64,
    /// Mean brightness strictly above this is too bright.
    pub bright_threshold: f64,
    /// Mean edge score strictly below this is too blurry.
    pub blur_threshold: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            sample_width: SAMPLE_WIDTH,
            max_sample_pixels: MAX_SAMPLE_PIXELS,
            dark_threshold: 40.0,
            bright_threshold: 220.0,
            blur_threshold: 5.0,
        }
    }
}

/// Maps statistics to a verdict; first matching rule wins.
#[must_use]
pub fn classify(stats: &PixelStats, config: &QualityConfig) -> Verdict {
    if stats.brightness < config.dark_threshold {
        Verdict::TooDark
    } else if stats.brightness > config.bright_threshold {
        Verdict::TooBright
    } else if stats.edge_score < config.blur_threshold {
        Verdict::TooBlurry
    } else {
        Verdict::Acceptable
    }
}

/// Verdict plus the numbers behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityReport {
    /// The verdict.
    pub verdict: Verdict,
    /// Statistics; `None` when the image could not be decoded.
    pub stats: Option<PixelStats>,
    /// Size of the sample buffer; `None` when the image could not be decoded.
    pub sample: Option<ImageDimensions>,
}

impl QualityReport {
    /// Fail-open report used when no statistics could be computed.
    #[must_use]
    pub const fn unassessed() -> Self {
        Self {
            verdict: Verdict::Acceptable,
            stats: None,
            sample: None,
        }
    }

    /// Whether statistics were actually computed.
    #[must_use]
    pub const fn is_assessed(&self) -> bool {
        self.stats.is_some()
    }
}

/// Stateless image quality analyzer over a pluggable decoder.
#[derive(Debug, Clone, Default)]
pub struct QualityAnalyzer<D = RasterDecoder> {
    decoder: D,
    config: QualityConfig,
}

impl<D: ImageDecoder> QualityAnalyzer<D> {
    /// Creates an analyzer with the given decoder and configuration.
    #[must_use]
    pub const fn new(decoder: D, config: QualityConfig) -> Self {
        Self { decoder, config }
    }

    /// Returns the analyzer configuration.
    #[must_use]
    pub const fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Returns the decoder.
    #[must_use]
    pub const fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Returns the verdict for an image. Never fails.
    pub async fn analyze(&self, image: &EncodedImage) -> Verdict {
        self.assess(image).await.verdict
    }

    /// Returns the verdict and the statistics behind it. Never fails.
    pub async fn assess(&self, image: &EncodedImage) -> QualityReport {
        let sample = match self.sample(image).await {
            Ok(sample) => sample,
            Err(DecodeError::Interrupted(reason)) => {
                warn!("Quality check interrupted for {}: {reason}", image.name);
                return QualityReport::unassessed();
            }
            Err(e) => {
                debug!("Quality check skipped for {}: {e}", image.name);
                return QualityReport::unassessed();
            }
        };

        let stats = PixelStats::from_rgb(&sample);
        if stats.is_empty() {
            return QualityReport::unassessed();
        }

        let verdict = classify(&stats, &self.config);
        debug!(
            "{}: brightness={:.2} edge_score={:.2} -> {verdict}",
            image.name, stats.brightness, stats.edge_score
        );

        QualityReport {
            verdict,
            stats: Some(stats),
            sample: Some(ImageDimensions::new(sample.width(), sample.height())),
        }
    }

    /// Decodes and resamples, releasing the decode handle on every path.
    async fn sample(&self, image: &EncodedImage) -> Result<image::RgbImage, DecodeError> {
        let lease = self.decoder.open(image)?;
        let sample = self
            .decoder
            .decode_scaled(
                &lease,
                self.config.sample_width,
                self.config.max_sample_pixels,
            )
            .await;
        drop(lease);
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(brightness: f64, edge_score: f64) -> PixelStats {
        PixelStats {
            brightness,
            edge_score,
            pixel_count: 1,
        }
    }

    #[test]
    fn test_default_config() {
        let config = QualityConfig::default();
        assert_eq!(config.sample_width, 300);
        assert_eq!(config.max_sample_pixels, 900_000);
        assert!((config.dark_threshold - 40.0).abs() < f64::EPSILON);
        assert!((config.bright_threshold - 220.0).abs() < f64::EPSILON);
        assert!((config.blur_threshold - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_classify_precedence() {
        let config = QualityConfig::default();
        // Dark wins even with no edges
        assert_eq!(classify(&stats(10.0, 0.0), &config), Verdict::TooDark);
        // Bright wins even with no edges
        assert_eq!(classify(&stats(250.0, 0.0), &config), Verdict::TooBright);
        assert_eq!(classify(&stats(128.0, 0.0), &config), Verdict::TooBlurry);
        assert_eq!(classify(&stats(128.0, 50.0), &config), Verdict::Acceptable);
    }

    #[test]
    fn test_classify_boundaries_are_strict() {
        let config = QualityConfig::default();
        assert_eq!(classify(&stats(40.0, 10.0), &config), Verdict::Acceptable);
        assert_eq!(classify(&stats(39.99, 10.0), &config), Verdict::TooDark);
        assert_eq!(classify(&stats(220.0, 10.0), &config), Verdict::Acceptable);
        assert_eq!(classify(&stats(220.01, 10.0), &config), Verdict::TooBright);
        assert_eq!(classify(&stats(128.0, 5.0), &config), Verdict::Acceptable);
        assert_eq!(classify(&stats(128.0, 4.99), &config), Verdict::TooBlurry);
    }

    #[test]
    fn test_classify_custom_thresholds() {
        let config = QualityConfig {
            dark_threshold: 10.0,
            blur_threshold: 0.0,
            ..QualityConfig::default()
        };
        assert_eq!(classify(&stats(20.0, 0.0), &config), Verdict::Acceptable);
    }

    #[test]
    fn test_unassessed_report_is_acceptable() {
        let report = QualityReport::unassessed();
        assert_eq!(report.verdict, Verdict::Acceptable);
        assert!(!report.is_assessed());
    }
}
