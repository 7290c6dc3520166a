//! Leafcheck Core - Domain logic for crop leaf photo checks
//!
//! This crate contains the domain types, the advisory image quality
//! analyzer, the upload intake workflow, session history, and the port
//! traits adapters plug into (decoding, image sources, classifiers, output).

pub mod demo;
pub mod domain;
pub mod error;
pub mod history;
pub mod intake;
pub mod ports;
pub mod quality;

pub use demo::DemoClassifier;
pub use domain::{
    find_crop, Advisory, AnalysisResult, Crop, EncodedImage, ImageDimensions, Language,
    PredictionResult, Verdict, CROPS,
};
pub use error::{ClassifyError, DecodeError, IntakeError};
pub use history::{iso_timestamp, HistoryItem, SessionHistory};
pub use intake::{Selection, UploadIntake, DEFAULT_MAX_UPLOAD_BYTES};
pub use ports::{
    Classifier, DecodeLease, ImageDecoder, ImageSource, ProgressEvent, ProgressSink, ResultOutput,
};
pub use quality::{
    PixelStats, QualityAnalyzer, QualityConfig, QualityReport, RasterDecoder, MAX_SAMPLE_PIXELS,
};
