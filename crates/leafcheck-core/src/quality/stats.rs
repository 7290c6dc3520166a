//! Single-pass pixel statistics over a sample buffer.

use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Aggregate statistics the quality verdict is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelStats {
    /// Mean of `(R + G + B) / 3` over all pixels (0-255).
    pub brightness: f64,
    /// Sum of neighbour channel distances divided by the pixel count.
    pub edge_score: f64,
    /// Number of pixels sampled.
    pub pixel_count: u64,
}

impl PixelStats {
    /// Computes brightness and edge score in one raster-order pass.
    ///
    /// Each pixel is compared with the next pixel in scan order, so the last
    /// pixel of a row is compared with the first pixel of the following row.
    /// The blur threshold is calibrated against this, row wrap included.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_rgb(buffer: &RgbImage) -> Self {
        let mut channel_sum = 0u64;
        let mut edge_sum = 0u64;
        let mut pixel_count = 0u64;
        let mut previous: Option<[u8; 3]> = None;

        for pixel in buffer.pixels() {
            let rgb = pixel.0;
            channel_sum += rgb.iter().map(|&c| u64::from(c)).sum::<u64>();
            if let Some(prev) = previous {
                edge_sum += channel_distance(prev, rgb);
            }
            previous = Some(rgb);
            pixel_count += 1;
        }

        if pixel_count == 0 {
            return Self::empty();
        }

        // Precision loss is irrelevant at these magnitudes
        let n = pixel_count as f64;
        Self {
            brightness: channel_sum as f64 / (3.0 * n),
            edge_score: edge_sum as f64 / n,
            pixel_count,
        }
    }

    /// Statistics of a buffer with no pixels.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            brightness: 0.0,
            edge_score: 0.0,
            pixel_count: 0,
        }
    }

    /// Returns true if no pixels were sampled.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pixel_count == 0
    }
}

/// Sum of absolute per-channel differences (0-765).
fn channel_distance(a: [u8; 3], b: [u8; 3]) -> u64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| u64::from(x.abs_diff(y)))
        .sum()
}
