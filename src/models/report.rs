//! Summary of a single import run.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::CatalogKind;

/// Outcome of driving one catalog adapter to completion.
///
/// A failed run is reported, never raised: `failure` carries the message
/// and the counters show how far the run got.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub source: CatalogKind,
    pub queries: usize,
    pub pages_fetched: usize,
    pub records_emitted: usize,
    pub failure: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ImportReport {
    /// Start an empty report for `source`.
    pub fn begin(source: CatalogKind) -> Self {
        let now = Utc::now();
        Self {
            source,
            queries: 0,
            pages_fetched: 0,
            records_emitted: 0,
            failure: None,
            started_at: now,
            finished_at: now,
        }
    }

    /// Stamp the end time.
    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}
