//! Upload intake workflow.
//!
//! Enforces the upload size limit, runs the quality check on each freshly
//! selected image and publishes at most one advisory for the image that is
//! currently selected. Every selection gets a generation token; a quality
//! result whose token is no longer current is discarded, so a slow analysis
//! of an old photo can never put a warning on a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::domain::{Advisory, Crop, EncodedImage};
use crate::error::IntakeError;
use crate::ports::ImageDecoder;
use crate::quality::{QualityAnalyzer, QualityReport};

/// Default upload limit: 5 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// An accepted image together with its generation token.
#[derive(Debug, Clone)]
pub struct Selection {
    token: u64,
    image: EncodedImage,
}

impl Selection {
    /// Generation token identifying this selection.
    #[must_use]
    pub const fn token(&self) -> u64 {
        self.token
    }

    /// The selected image.
    #[must_use]
    pub const fn image(&self) -> &EncodedImage {
        &self.image
    }
}

#[derive(Debug, Default)]
struct IntakeState {
    current: Option<u64>,
    advisory: Option<Advisory>,
}

/// Intake for user-selected images.
pub struct UploadIntake<D: ImageDecoder> {
    analyzer: QualityAnalyzer<D>,
    max_bytes: u64,
    generation: AtomicU64,
    state: Mutex<IntakeState>,
}

impl<D: ImageDecoder> UploadIntake<D> {
    /// Creates an intake with the default 5 MiB limit.
    #[must_use]
    pub fn new(analyzer: QualityAnalyzer<D>) -> Self {
        Self::with_limit(analyzer, DEFAULT_MAX_UPLOAD_BYTES)
    }

    /// Creates an intake with a custom byte limit.
    #[must_use]
    pub fn with_limit(analyzer: QualityAnalyzer<D>, max_bytes: u64) -> Self {
        Self {
            analyzer,
            max_bytes,
            generation: AtomicU64::new(0),
            state: Mutex::new(IntakeState::default()),
        }
    }

    /// Configured byte limit.
    #[must_use]
    pub const fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Accepts a newly selected image.
    ///
    /// Clears any advisory left from the previous image and invalidates
    /// quality checks still running for it.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::TooLarge`] if the image exceeds the limit; the
    /// quality check does not run and the previous selection is kept.
    pub fn select(&self, image: EncodedImage) -> Result<Selection, IntakeError> {
        let size = image.size();
        if size > self.max_bytes {
            info!("Rejected {}: {size} bytes exceeds {}", image.name, self.max_bytes);
            return Err(IntakeError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }

        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.lock();
        state.current = Some(token);
        state.advisory = None;
        drop(state);

        debug!("Selected {} as generation {token}", image.name);
        Ok(Selection { token, image })
    }

    /// Runs the quality check for a selection.
    ///
    /// Returns `None` if the selection was superseded or cleared while the
    /// check was running; the stale result is dropped without touching the
    /// current advisory.
    pub async fn assess(&self, selection: &Selection) -> Option<QualityReport> {
        let report = self.analyzer.assess(selection.image()).await;

        let mut state = self.lock();
        if state.current != Some(selection.token) {
            debug!(
                "Discarding stale quality result for {} (generation {})",
                selection.image.name, selection.token
            );
            return None;
        }
        state.advisory = Advisory::for_verdict(report.verdict);
        Some(report)
    }

    /// The advisory for the current selection, if any.
    #[must_use]
    pub fn advisory(&self) -> Option<Advisory> {
        self.lock().advisory.clone()
    }

    /// Dismisses the current advisory; the selection stays.
    pub fn dismiss(&self) {
        self.lock().advisory = None;
    }

    /// Drops the current selection and invalidates pending checks.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock();
        state.current = None;
        state.advisory = None;
    }

    /// Whether `selection` is still the current one.
    #[must_use]
    pub fn is_current(&self, selection: &Selection) -> bool {
        self.lock().current == Some(selection.token)
    }

    /// Whether classification may be submitted.
    ///
    /// Depends only on having a crop and an image; a quality advisory never
    /// blocks submission.
    #[must_use]
    pub fn can_submit(&self, crop: Option<&Crop>) -> bool {
        crop.is_some() && self.lock().current.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, IntakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::find_crop;
    use crate::quality::{QualityConfig, RasterDecoder};

    fn intake(limit: u64) -> UploadIntake<RasterDecoder> {
        UploadIntake::with_limit(
            QualityAnalyzer::new(RasterDecoder::new(), QualityConfig::default()),
            limit,
        )
    }

    #[test]
    fn test_rejects_oversized_without_changing_selection() {
        let intake = intake(4);
        let small = intake
            .select(EncodedImage::new("a", "image/png", vec![0u8; 4]))
            .ok();
        assert!(small.is_some());

        let err = intake.select(EncodedImage::new("b", "image/png", vec![0u8; 5]));
        assert_eq!(err.err(), Some(IntakeError::TooLarge { size: 5, limit: 4 }));

        let Some(small) = small else { return };
        assert!(intake.is_current(&small));
    }

    #[test]
    fn test_tokens_increase_and_supersede() {
        let intake = intake(DEFAULT_MAX_UPLOAD_BYTES);
        let (Ok(first), Ok(second)) = (
            intake.select(EncodedImage::new("a", "image/png", vec![1u8])),
            intake.select(EncodedImage::new("b", "image/png", vec![2u8])),
        ) else {
            panic!("small images are accepted");
        };

        assert!(second.token() > first.token());
        assert!(!intake.is_current(&first));
        assert!(intake.is_current(&second));
    }

    #[test]
    fn test_can_submit_requires_crop_and_selection() {
        let intake = intake(DEFAULT_MAX_UPLOAD_BYTES);
        let crop = find_crop("rice");
        assert!(!intake.can_submit(crop));

        let _ = intake.select(EncodedImage::new("a", "image/png", vec![1u8]));
        assert!(!intake.can_submit(None));
        assert!(intake.can_submit(crop));

        intake.clear();
        assert!(!intake.can_submit(crop));
    }

    #[tokio::test]
    async fn test_undecodable_selection_publishes_nothing() {
        let intake = intake(DEFAULT_MAX_UPLOAD_BYTES);
        let Ok(selection) = intake.select(EncodedImage::new("bad", "image/png", vec![7u8; 32]))
        else {
            panic!("small image is accepted");
        };

        let report = intake.assess(&selection).await;
        assert_eq!(report.map(|r| r.is_assessed()), Some(false));
        assert!(intake.advisory().is_none());
    }
}
