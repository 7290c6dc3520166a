//! Classification port.

use async_trait::async_trait;

use crate::domain::{Crop, EncodedImage, Language, PredictionResult};
use crate::error::ClassifyError;

/// Port for leaf disease classification backends.
///
/// Implementations are chosen once at startup (remote or demo) and shared
/// behind an `Arc<dyn Classifier>`.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short backend name for logs and output.
    fn name(&self) -> &'static str;

    /// Classifies a leaf photo.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or answers with an invalid
    /// prediction.
    async fn classify(
        &self,
        image: &EncodedImage,
        crop: &Crop,
        language: Language,
    ) -> Result<PredictionResult, ClassifyError>;
}
