//! Result output port.

use crate::domain::AnalysisResult;

/// Port for emitting per-image results (quality verdict, optional diagnosis).
pub trait ResultOutput: Send + Sync {
    /// Emits one result as soon as it is available.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the write.
    fn write(&self, result: &AnalysisResult) -> anyhow::Result<()>;

    /// Flushes anything the sink buffered.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
