//! Image source port for loading encoded images from various sources.

use crate::domain::EncodedImage;

/// Port for loading images from a source.
///
/// Sources only read bytes; decoding is left to the analyzer so that a
/// corrupt file still reaches the fail-open path.
pub trait ImageSource: Send + Sync {
    /// Returns an iterator over images from this source.
    ///
    /// # Errors
    ///
    /// Individual items may be errors if a file cannot be read.
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<EncodedImage>> + Send + '_>;

    /// Returns the total number of images, if known.
    fn count_hint(&self) -> Option<usize>;
}
