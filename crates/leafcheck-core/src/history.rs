//! In-session history of classifications, newest first.

use std::collections::VecDeque;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;

use crate::domain::{Crop, Language, PredictionResult};

/// One finished classification.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryItem {
    /// Session-unique id, increasing with each entry.
    pub id: u64,
    /// When the classification finished (RFC 3339, UTC).
    pub timestamp: String,
    /// Crop name in the language the classification was requested in.
    pub crop_name: String,
    /// The diagnosis.
    pub result: PredictionResult,
}

/// History of the current session. Nothing is persisted.
#[derive(Debug, Default)]
pub struct SessionHistory {
    items: VecDeque<HistoryItem>,
    next_id: u64,
}

impl SessionHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a classification and returns the new entry.
    pub fn record(
        &mut self,
        crop: &Crop,
        language: Language,
        result: PredictionResult,
    ) -> &HistoryItem {
        self.next_id += 1;
        let item = HistoryItem {
            id: self.next_id,
            timestamp: iso_timestamp(),
            crop_name: crop.display_name(language).to_string(),
            result,
        };
        debug!("History entry {} for {}", item.id, item.crop_name);
        self.items.push_front(item);
        &self.items[0]
    }

    /// Entries, newest first.
    pub fn items(&self) -> impl Iterator<Item = &HistoryItem> {
        self.items.iter()
    }

    /// Most recent entry.
    #[must_use]
    pub fn latest(&self) -> Option<&HistoryItem> {
        self.items.front()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Current UTC time as RFC 3339.
#[must_use]
pub fn iso_timestamp() -> String {
    match OffsetDateTime::now_utc().format(&Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
