//! Mock implementations of core port traits.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use image::RgbImage;
use leafcheck_core::domain::{AnalysisResult, Crop, EncodedImage, Language, PredictionResult};
use leafcheck_core::error::{ClassifyError, DecodeError};
use leafcheck_core::ports::{
    Classifier, DecodeLease, ImageDecoder, ImageSource, ProgressEvent, ProgressSink, ResultOutput,
};
use leafcheck_core::RasterDecoder;
use tokio::sync::Notify;

/// Mock implementation of `ImageSource` for testing.
///
/// Yields pre-built images and tracks iteration for assertions.
pub struct MockImageSource {
    images: Vec<EncodedImage>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockImageSource {
    /// Creates a new mock source with the given images.
    #[must_use]
    pub fn new(images: Vec<EncodedImage>) -> Self {
        Self {
            images,
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageSource for MockImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<EncodedImage>> + Send + '_> {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        Box::new(self.images.iter().cloned().map(Ok))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.images.len())
    }
}

/// Decoder that counts opened and released decode handles.
///
/// Wraps [`RasterDecoder`] so the pixel path is the real one. Failures can
/// be injected at either stage, and an optional gate holds every decode
/// until the test releases it.
#[derive(Default)]
pub struct CountingDecoder {
    inner: RasterDecoder,
    opened: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
    fail_open: bool,
    fail_decode: bool,
    gate: Option<Arc<Notify>>,
}

impl CountingDecoder {
    /// Creates a decoder that behaves like [`RasterDecoder`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `open` fail.
    #[must_use]
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Makes `decode_scaled` fail after the handle was opened.
    #[must_use]
    pub fn failing_decode(mut self) -> Self {
        self.fail_decode = true;
        self
    }

    /// Holds every decode until `gate` is notified.
    #[must_use]
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Number of handles opened so far.
    #[must_use]
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of handles released so far.
    #[must_use]
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Handles opened but not yet released.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.opened().saturating_sub(self.released())
    }
}

#[async_trait]
impl ImageDecoder for CountingDecoder {
    fn open(&self, image: &EncodedImage) -> Result<DecodeLease, DecodeError> {
        if self.fail_open {
            return Err(DecodeError::EmptyPayload);
        }
        let lease = self.inner.open(image)?;
        self.opened.fetch_add(1, Ordering::SeqCst);
        let released = Arc::clone(&self.released);
        Ok(lease.on_release(move || {
            released.fetch_add(1, Ordering::SeqCst);
        }))
    }

    async fn decode_scaled(
        &self,
        lease: &DecodeLease,
        target_width: u32,
        max_pixels: u64,
    ) -> Result<RgbImage, DecodeError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail_decode {
            return Err(DecodeError::Interrupted("injected decode failure".into()));
        }
        self.inner
            .decode_scaled(lease, target_width, max_pixels)
            .await
    }
}

/// One recorded call to [`MockClassifier::classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyCall {
    /// Name of the submitted image.
    pub image: String,
    /// Crop id.
    pub crop: String,
    /// Requested language.
    pub language: Language,
}

/// Mock classifier returning a fixed prediction or a fixed failure.
pub struct MockClassifier {
    outcome: Result<PredictionResult, String>,
    calls: Arc<Mutex<Vec<ClassifyCall>>>,
}

impl MockClassifier {
    /// Classifier that always returns `prediction`.
    #[must_use]
    pub fn returning(prediction: PredictionResult) -> Self {
        Self {
            outcome: Ok(prediction),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Classifier that always fails with a request error.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Canned healthy prediction.
    #[must_use]
    pub fn healthy_prediction() -> PredictionResult {
        PredictionResult {
            disease_name: "Healthy".into(),
            is_healthy: true,
            confidence: 93.0,
            description: "No visible lesions.".into(),
            recommendations: vec!["Keep monitoring weekly.".into()],
        }
    }

    /// Returns all recorded calls.
    #[must_use]
    pub fn calls(&self) -> Vec<ClassifyCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn classify(
        &self,
        image: &EncodedImage,
        crop: &Crop,
        language: Language,
    ) -> Result<PredictionResult, ClassifyError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ClassifyCall {
                image: image.name.clone(),
                crop: crop.id.to_string(),
                language,
            });
        self.outcome.clone().map_err(ClassifyError::Request)
    }
}

/// Mock implementation of `ResultOutput` for testing.
///
/// Captures results for later assertions.
pub struct MockResultOutput {
    results: Arc<Mutex<Vec<AnalysisResult>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockResultOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            results: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns all captured results.
    #[must_use]
    pub fn results(&self) -> Vec<AnalysisResult> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockResultOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, result: &AnalysisResult) -> anyhow::Result<()> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Completed { .. }))
            .count()
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Skipped { .. }))
            .count()
    }

    /// Returns the final counts from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished { processed, skipped } => Some((*processed, *skipped)),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
