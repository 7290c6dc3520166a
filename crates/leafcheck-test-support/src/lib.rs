//! Test support utilities for leafcheck.
//!
//! Provides synthetic encoded images, instrumented decoders and mock ports
//! for testing the quality check, intake and classification flow.
//!
//! # Example
//!
//! ```
//! use leafcheck_test_support::{MockImageSource, SyntheticImageBuilder};
//!
//! let sharp = SyntheticImageBuilder::alternating_columns(10, 10);
//! let dark = SyntheticImageBuilder::black(10, 10);
//!
//! let source = MockImageSource::new(vec![sharp, dark]);
//! ```

mod builders;
mod mocks;

pub use builders::SyntheticImageBuilder;
pub use mocks::{
    ClassifyCall, CountingDecoder, MockClassifier, MockImageSource, MockProgressSink, MockResultOutput,
};
