//! Decode/resample port.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use image::RgbImage;

use crate::domain::EncodedImage;
use crate::error::DecodeError;

type ReleaseHook = Box<dyn FnOnce() + Send + Sync>;

/// Transient handle to an image's encoded bytes for the duration of a decode.
///
/// The handle is released exactly once, when it is dropped. Decoders that
/// allocate something external per decode attach a release hook.
pub struct DecodeLease {
    bytes: Arc<[u8]>,
    media_type: String,
    on_release: Option<ReleaseHook>,
}

impl DecodeLease {
    /// Opens a lease over the image's bytes.
    #[must_use]
    pub fn new(image: &EncodedImage) -> Self {
        Self {
            bytes: image.shared_bytes(),
            media_type: image.media_type.clone(),
            on_release: None,
        }
    }

    /// Attaches a hook that runs when the lease is released.
    #[must_use]
    pub fn on_release(mut self, hook: impl FnOnce() + Send + Sync + 'static) -> Self {
        self.on_release = Some(Box::new(hook));
        self
    }

    /// Encoded bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the encoded bytes, for moving into a worker.
    #[must_use]
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    /// Declared media type.
    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }
}

impl Drop for DecodeLease {
    fn drop(&mut self) {
        if let Some(release) = self.on_release.take() {
            release();
        }
    }
}

impl fmt::Debug for DecodeLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeLease")
            .field("len", &self.bytes.len())
            .field("media_type", &self.media_type)
            .field("has_release_hook", &self.on_release.is_some())
            .finish()
    }
}

/// Port for decoding encoded bytes into an RGB sample buffer.
#[async_trait]
pub trait ImageDecoder: Send + Sync {
    /// Acquires a decode handle for the image.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be opened at all.
    fn open(&self, image: &EncodedImage) -> Result<DecodeLease, DecodeError>;

    /// Decodes the leased bytes and resamples them to `target_width`,
    /// preserving aspect ratio. Alpha is discarded.
    ///
    /// # Errors
    ///
    /// Returns an error for corrupt, unsupported or zero-sized images, and
    /// [`DecodeError::SampleTooLarge`] when the resampled buffer would hold
    /// more than `max_pixels` pixels.
    async fn decode_scaled(
        &self,
        lease: &DecodeLease,
        target_width: u32,
        max_pixels: u64,
    ) -> Result<RgbImage, DecodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_release_hook_runs_once_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);
        let image = EncodedImage::new("a", "image/png", vec![1u8, 2, 3]);

        let lease = DecodeLease::new(&image).on_release(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(lease.bytes(), &[1, 2, 3]);
        assert_eq!(released.load(Ordering::SeqCst), 0);

        drop(lease);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_lease_without_hook() {
        let image = EncodedImage::new("a", "image/jpeg", vec![0u8; 4]);
        let lease = DecodeLease::new(&image);
        assert_eq!(lease.media_type(), "image/jpeg");
        assert!(format!("{lease:?}").contains("has_release_hook: false"));
    }
}
