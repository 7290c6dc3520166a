//! Core domain types for leaf photo analysis.

mod crop;
mod encoded;
mod prediction;
mod result;
mod verdict;

pub use crop::{find_crop, Crop, Language, CROPS};
pub use encoded::{sniff_media_type, EncodedImage};
pub use prediction::{PredictionResult, LOW_CONFIDENCE_THRESHOLD};
pub use result::{AnalysisResult, ImageDimensions};
pub use verdict::{Advisory, Verdict};
