//! Synthetic image builders for testing.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use leafcheck_core::EncodedImage;

/// Builder for synthetic encoded images.
///
/// Every builder returns a PNG-encoded [`EncodedImage`] so tests exercise
/// the same decode path as real uploads.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    /// Encodes a bitmap as PNG.
    ///
    /// # Panics
    ///
    /// Panics if PNG encoding into memory fails, which does not happen for
    /// valid buffers.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn encode(name: &str, image: &DynamicImage) -> EncodedImage {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("PNG encoding into memory");
        EncodedImage::new(name, "image/png", bytes)
    }

    // === Uniform Images ===

    /// Uniformly coloured image.
    #[must_use]
    pub fn uniform(width: u32, height: u32, rgb: [u8; 3]) -> EncodedImage {
        let img = RgbImage::from_fn(width, height, |_, _| Rgb(rgb));
        Self::encode("synthetic://uniform", &DynamicImage::ImageRgb8(img))
    }

    /// All-black image (brightness 0).
    #[must_use]
    pub fn black(width: u32, height: u32) -> EncodedImage {
        Self::uniform(width, height, [0, 0, 0])
    }

    /// All-white image (brightness 255).
    #[must_use]
    pub fn white(width: u32, height: u32) -> EncodedImage {
        Self::uniform(width, height, [255, 255, 255])
    }

    /// Flat mid-gray (128, 128, 128): well exposed but without edges.
    #[must_use]
    pub fn mid_gray(width: u32, height: u32) -> EncodedImage {
        Self::uniform(width, height, [128, 128, 128])
    }

    // === Sharp Images ===

    /// Pure black and white columns, one pixel wide, starting with black.
    #[must_use]
    pub fn alternating_columns(width: u32, height: u32) -> EncodedImage {
        Self::vertical_bars(width, height, 1)
    }

    /// Black and white vertical bars of the given width.
    #[must_use]
    pub fn vertical_bars(width: u32, height: u32, bar_width: u32) -> EncodedImage {
        let bar_width = bar_width.max(1);
        let img = RgbImage::from_fn(width, height, |x, _| {
            if (x / bar_width) % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        Self::encode("synthetic://vertical_bars", &DynamicImage::ImageRgb8(img))
    }

    /// Checkerboard of near-white and near-black cells.
    #[must_use]
    pub fn checkerboard(width: u32, height: u32, cell_size: u32) -> EncodedImage {
        let cell_size = cell_size.max(1);
        let img = RgbImage::from_fn(width, height, |x, y| {
            if (x / cell_size + y / cell_size) % 2 == 0 {
                Rgb([250, 250, 250])
            } else {
                Rgb([5, 5, 5])
            }
        });
        Self::encode("synthetic://checkerboard", &DynamicImage::ImageRgb8(img))
    }

    // === Soft Images ===

    /// Smooth horizontal gradient from black to white.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn horizontal_gradient(width: u32, height: u32) -> EncodedImage {
        let img = RgbImage::from_fn(width, height, |x, _| {
            let v = ((u32::from(u8::MAX) * x) / width.max(1)) as u8;
            Rgb([v, v, v])
        });
        Self::encode("synthetic://horizontal_gradient", &DynamicImage::ImageRgb8(img))
    }

    /// Leaf-like green with mild texture in the mid tones.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn textured_leaf(width: u32, height: u32) -> EncodedImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            let vein = ((x * 7 + y * 13) % 23) as u8;
            Rgb([40 + vein, 110 + vein * 3, 30 + vein])
        });
        Self::encode("synthetic://textured_leaf", &DynamicImage::ImageRgb8(img))
    }

    /// Image whose colour channels are hidden behind full transparency.
    #[must_use]
    pub fn transparent(width: u32, height: u32, rgb: [u8; 3]) -> EncodedImage {
        let [r, g, b] = rgb;
        let img = RgbaImage::from_fn(width, height, |_, _| Rgba([r, g, b, 0]));
        Self::encode("synthetic://transparent", &DynamicImage::ImageRgba8(img))
    }

    // === Broken Payloads ===

    /// Bytes that are not any known image format.
    #[must_use]
    pub fn corrupt() -> EncodedImage {
        EncodedImage::new(
            "synthetic://corrupt",
            "image/jpeg",
            b"\xff\xd8\xff\xe0 truncated jpeg header".to_vec(),
        )
    }

    /// Empty payload.
    #[must_use]
    pub fn empty() -> EncodedImage {
        EncodedImage::new("synthetic://empty", "image/png", Vec::<u8>::new())
    }

    /// Payload of exactly `size` bytes; only its size matters to intake.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn sized_payload(size: u64) -> EncodedImage {
        EncodedImage::new("synthetic://sized", "image/jpeg", vec![0u8; size as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(image: &EncodedImage) -> RgbImage {
        match image::load_from_memory(image.bytes()) {
            Ok(img) => img.to_rgb8(),
            Err(e) => panic!("synthetic image should decode: {e}"),
        }
    }

    #[test]
    fn test_uniform_is_png() {
        let img = SyntheticImageBuilder::uniform(4, 3, [1, 2, 3]);
        assert_eq!(img.media_type, "image/png");
        let decoded = decode(&img);
        assert_eq!(decoded.dimensions(), (4, 3));
        assert!(decoded.pixels().all(|p| p.0 == [1, 2, 3]));
    }

    #[test]
    fn test_alternating_columns_pattern() {
        let decoded = decode(&SyntheticImageBuilder::alternating_columns(10, 10));
        assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(decoded.get_pixel(1, 0).0, [255, 255, 255]);
        assert_eq!(decoded.get_pixel(9, 9).0, [255, 255, 255]);
    }

    #[test]
    fn test_checkerboard_cells() {
        let decoded = decode(&SyntheticImageBuilder::checkerboard(16, 16, 8));
        assert_eq!(decoded.get_pixel(0, 0).0, [250, 250, 250]);
        assert_eq!(decoded.get_pixel(8, 0).0, [5, 5, 5]);
        assert_eq!(decoded.get_pixel(8, 8).0, [250, 250, 250]);
    }

    #[test]
    fn test_broken_payloads_do_not_decode() {
        assert!(image::load_from_memory(SyntheticImageBuilder::corrupt().bytes()).is_err());
        assert_eq!(SyntheticImageBuilder::empty().size(), 0);
        assert_eq!(SyntheticImageBuilder::sized_payload(1234).size(), 1234);
    }
}
