//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::BookRecord;
use crate::sources::RecordSink;
use crate::utils::http::{CatalogRequest, CatalogTransport};

enum Scripted {
    Body(String),
    Failure,
}

/// Transport answering from a URL → body table and recording every call.
///
/// Unknown URLs fail with a 404 status error.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: HashMap<String, Scripted>,
    calls: Mutex<Vec<CatalogRequest>>,
    gate: Option<tokio::sync::Semaphore>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), Scripted::Body(body.to_string()));
        self
    }

    pub fn fail(mut self, url: &str) -> Self {
        self.responses.insert(url.to_string(), Scripted::Failure);
        self
    }

    /// Hold every request until [`ScriptedTransport::release`] adds permits.
    pub fn gated(mut self) -> Self {
        self.gate = Some(tokio::sync::Semaphore::new(0));
        self
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| r.url.to_string())
            .collect()
    }

    pub fn requests(&self) -> Vec<CatalogRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of requests that were ever in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogTransport for ScriptedTransport {
    async fn get(&self, request: &CatalogRequest) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(request.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        let result = match self.responses.get(request.url.as_str()) {
            Some(Scripted::Body(body)) => Ok(body.clone().into_bytes()),
            Some(Scripted::Failure) => Err(AppError::status(500, request.url.as_str())),
            None => Err(AppError::status(404, request.url.as_str())),
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Sink keeping every record it receives.
#[derive(Default)]
pub struct CollectingSink {
    records: Mutex<Vec<BookRecord>>,
}

impl CollectingSink {
    pub fn records(&self) -> Vec<BookRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.title).collect()
    }
}

impl RecordSink for CollectingSink {
    fn emit(&self, record: BookRecord) {
        self.records.lock().unwrap().push(record);
    }
}

/// Assert the canonical shape: every text field present, none null.
pub fn assert_canonical(record: &BookRecord) {
    let value = serde_json::to_value(record).unwrap();
    for field in ["id", "title", "description", "url", "cover"] {
        assert!(
            value[field].is_string(),
            "{field} is not a string in {value}"
        );
    }
    assert!(!record.id.is_empty());
}
