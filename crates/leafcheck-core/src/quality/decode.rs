//! Default decode/resample adapter backed by the `image` crate.

use async_trait::async_trait;
use image::imageops::{self, FilterType};
use image::{GenericImageView, RgbImage};
use tracing::trace;

use crate::domain::EncodedImage;
use crate::error::DecodeError;
use crate::ports::{DecodeLease, ImageDecoder};

/// Height of an aspect-preserving resample to `target_width`.
///
/// `round(native_height * target_width / native_width)`, never below 1.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn sample_height(native_width: u32, native_height: u32, target_width: u32) -> u32 {
    if native_width == 0 {
        return 1;
    }
    let scaled =
        f64::from(native_height) * f64::from(target_width) / f64::from(native_width);
    // Safe: scaled is non-negative and bounded by u32 range for realistic inputs
    (scaled.round() as u32).max(1)
}

/// Decodes bytes and resamples them to `target_width` (bilinear).
///
/// The sample never holds more than `max_pixels` pixels, so a very tall
/// image cannot inflate the buffer past the analysis budget.
///
/// # Errors
///
/// Returns an error for empty, corrupt, unsupported or zero-sized images,
/// and [`DecodeError::SampleTooLarge`] when the sample would exceed
/// `max_pixels`.
pub fn decode_and_resample(
    bytes: &[u8],
    target_width: u32,
    max_pixels: u64,
) -> Result<RgbImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }

    let decoded = image::load_from_memory(bytes)?;
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 || target_width == 0 {
        return Err(DecodeError::ZeroDimension { width, height });
    }

    let target_height = sample_height(width, height, target_width);
    if u64::from(target_width) * u64::from(target_height) > max_pixels {
        return Err(DecodeError::SampleTooLarge {
            width: target_width,
            height: target_height,
            max_pixels,
        });
    }
    trace!("Resampling {width}x{height} to {target_width}x{target_height}");

    let rgb = decoded.to_rgb8();
    Ok(imageops::resize(
        &rgb,
        target_width,
        target_height,
        FilterType::Triangle,
    ))
}

/// Decoder that runs `image` decoding on the blocking thread pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterDecoder;

impl RasterDecoder {
    /// Creates a new raster decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ImageDecoder for RasterDecoder {
    fn open(&self, image: &EncodedImage) -> Result<DecodeLease, DecodeError> {
        if image.bytes().is_empty() {
            return Err(DecodeError::EmptyPayload);
        }
        Ok(DecodeLease::new(image))
    }

    async fn decode_scaled(
        &self,
        lease: &DecodeLease,
        target_width: u32,
        max_pixels: u64,
    ) -> Result<RgbImage, DecodeError> {
        let bytes = lease.shared_bytes();
        tokio::task::spawn_blocking(move || decode_and_resample(&bytes, target_width, max_pixels))
            .await
            .map_err(|e| DecodeError::Interrupted(e.to_string()))?
    }
}
