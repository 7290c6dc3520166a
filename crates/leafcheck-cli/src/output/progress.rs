//! Progress bar adapter using indicatif.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};
use leafcheck_core::{AnalysisResult, ProgressEvent, ProgressSink};

/// Progress bar adapter for CLI output.
///
/// Without a bar, each completed image prints its advisory and diagnosis
/// to stderr instead.
pub struct ProgressBar {
    bar: Option<IndicatifBar>,
    quiet: bool,
}

impl ProgressBar {
    /// Creates a new progress bar.
    ///
    /// # Arguments
    ///
    /// * `total` - Total number of items, if known
    /// * `quiet` - If true, suppress all output
    /// * `show_bar` - If true, show progress bar; otherwise show per-item status
    #[must_use]
    pub fn new(total: Option<u64>, quiet: bool, show_bar: bool) -> Self {
        if quiet {
            return Self {
                bar: None,
                quiet: true,
            };
        }

        let bar = if show_bar {
            let bar = total.map_or_else(IndicatifBar::new_spinner, IndicatifBar::new);

            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            ) {
                bar.set_style(style.progress_chars("#>-"));
            }

            Some(bar)
        } else {
            None
        };

        Self { bar, quiet }
    }

    /// Prints a line without tearing the bar.
    fn println(&self, line: &str) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }
}

/// Human-readable summary lines for one result.
fn describe(result: &AnalysisResult) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(advisory) = &result.advisory {
        lines.push(format!("{}: {advisory}", result.path));
    }
    if let Some(prediction) = &result.prediction {
        let mut line = format!(
            "{}: {} ({}% confidence)",
            result.path,
            prediction.disease_name,
            prediction.confidence_percent()
        );
        if prediction.is_low_confidence() {
            line.push_str(" - low confidence, consider retaking the photo");
        }
        lines.push(line);
    }
    if let Some(error) = &result.error {
        lines.push(format!("{}: {error}", result.path));
    }
    lines
}

impl ProgressSink for ProgressBar {
    fn on_event(&self, event: ProgressEvent) {
        if self.quiet {
            return;
        }

        match event {
            ProgressEvent::Started { path, index, total } => {
                if let Some(bar) = &self.bar {
                    if let Some(t) = total {
                        bar.set_length(t as u64);
                    }
                    bar.set_position(index as u64);
                    bar.set_message(path);
                }
            }
            ProgressEvent::Completed { result } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
                for line in describe(&result) {
                    self.println(&line);
                }
            }
            ProgressEvent::Skipped { path, reason } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
                self.println(&format!("WARN: Skipping {path}: {reason}"));
            }
            ProgressEvent::Finished { processed, skipped } => {
                if let Some(bar) = &self.bar {
                    bar.finish_with_message(format!(
                        "Done: {processed} processed, {skipped} skipped"
                    ));
                }
            }
        }
    }
}
