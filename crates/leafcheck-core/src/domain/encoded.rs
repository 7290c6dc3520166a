//! Encoded image payloads as handed over by the caller.

use std::sync::Arc;

use sha2::{Digest, Sha256};

/// Media type used when the payload cannot be sniffed.
const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// An encoded image: opaque bytes plus a declared media type.
///
/// The bytes are shared, so cloning is cheap and a decode task can hold
/// its own reference without copying the payload.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// Display name (usually the source path).
    pub name: String,
    /// Declared media type, e.g. `image/jpeg`.
    pub media_type: String,
    bytes: Arc<[u8]>,
    size: u64,
}

impl EncodedImage {
    /// Creates an image with an explicit media type.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        let bytes: Arc<[u8]> = bytes.into();
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// Creates an image whose payload was never read.
    ///
    /// Only the declared `size` is known, which is enough for the intake to
    /// reject an oversized file without loading it.
    #[must_use]
    pub fn unread(name: impl Into<String>, media_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: Arc::from(Vec::<u8>::new()),
            size,
        }
    }

    /// Whether the payload bytes are present.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.bytes.len() as u64 == self.size
    }

    /// Creates an image, sniffing the media type from the magic bytes.
    #[must_use]
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let media_type = sniff_media_type(&bytes);
        Self::new(name, media_type, bytes)
    }

    /// Raw encoded bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the encoded bytes.
    #[must_use]
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    /// Declared payload size in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Lowercase hex SHA-256 of the payload.
    #[must_use]
    pub fn sha256(&self) -> String {
        let digest = Sha256::digest(self.bytes.as_ref());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Guess a media type from the leading bytes of a payload.
#[must_use]
pub fn sniff_media_type(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes).map_or(UNKNOWN_MEDIA_TYPE, |format| format.to_mime_type())
}
