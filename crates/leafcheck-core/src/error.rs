//! Typed errors raised inside the core.
//!
//! None of these reach the user as a hard failure from the quality check:
//! the analyzer folds [`DecodeError`] into an `Acceptable` verdict.

use thiserror::Error;

/// Failure to turn encoded bytes into a pixel sample buffer.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload carried no bytes at all.
    #[error("image payload is empty")]
    EmptyPayload,

    /// The bytes could not be decoded (corrupt or unsupported format).
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    /// The decoded bitmap has no pixels.
    #[error("image has a zero dimension ({width}x{height})")]
    ZeroDimension {
        /// Decoded width.
        width: u32,
        /// Decoded height.
        height: u32,
    },

    /// The resample target exceeds the sample pixel budget.
    #[error("sample of {width}x{height} exceeds the budget of {max_pixels} pixels")]
    SampleTooLarge {
        /// Requested sample width.
        width: u32,
        /// Requested sample height.
        height: u32,
        /// Largest allowed sample in pixels.
        max_pixels: u64,
    },

    /// The blocking decode task panicked or was cancelled.
    #[error("decode task did not complete: {0}")]
    Interrupted(String),
}

/// Rejection raised by the upload intake before any analysis runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    /// The file exceeds the intake size limit.
    #[error("File is too large. Max {}MB.", .limit / (1024 * 1024))]
    TooLarge {
        /// Size of the rejected file in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },
}

/// Failure of a classification backend.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The request never produced a usable HTTP response.
    #[error("classifier request failed: {0}")]
    Request(String),

    /// The backend answered without any text content.
    #[error("no response from classifier")]
    EmptyResponse,

    /// The backend answered with content that does not match the prediction schema.
    #[error("malformed classifier response: {0}")]
    Malformed(String),

    /// The prediction parsed but violates its invariants.
    #[error("invalid prediction: {0}")]
    Invalid(String),
}

impl ClassifyError {
    /// Message shown to the user for any classification failure.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        "Analysis failed. Please check your internet connection and try again."
    }
}
