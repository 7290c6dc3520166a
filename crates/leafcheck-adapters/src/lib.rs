//! Leafcheck Adapters - External adapters for leafcheck.
//!
//! This crate provides adapters for:
//! - Filesystem image source
//! - Remote (Gemini) leaf disease classifier
//! - Startup selection between the remote and demo classifiers

pub mod classifier;
pub mod fs;
pub mod gemini;

pub use classifier::{build_classifier, resolve_api_key, ClassifierMode, ClassifierSettings};
pub use fs::FsImageSource;
pub use gemini::GeminiClassifier;
