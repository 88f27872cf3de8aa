//! Catalog adapters.
//!
//! Each adapter knows one external catalog's request shape, pagination
//! protocol and response schema:
//! - `GoogleBooks`: single keyword search page
//! - `OpenLibrary`: author works, paged until the `next` link disappears
//! - `PenguinRandomHouse`: author titles, paged by row offset until no
//!   `rel: "next"` link remains
//! - `Amazon`: keyword search, paged by page number until an empty page or
//!   the configured cap
//!
//! All of them are driven by the same loop in [`drive`].

mod amazon;
mod google;
mod lenient;
mod open_library;
mod penguin;

pub use amazon::Amazon;
pub use google::GoogleBooks;
pub use open_library::OpenLibrary;
pub use penguin::PenguinRandomHouse;

use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::{BookRecord, CatalogKind, ImportReport};
use crate::utils::http::{CatalogRequest, CatalogTransport};

/// Receives normalized records as they are produced.
///
/// Called once per record in a tight loop with no batching, so
/// implementations should return quickly.
pub trait RecordSink: Send + Sync {
    fn emit(&self, record: BookRecord);
}

impl<F> RecordSink for F
where
    F: Fn(BookRecord) + Send + Sync,
{
    fn emit(&self, record: BookRecord) {
        self(record)
    }
}

/// One catalog's paging and normalization rules.
pub trait CatalogSource: Send + Sync {
    /// Raw page payload as the catalog returns it.
    type Page: DeserializeOwned + Send;

    fn kind(&self) -> CatalogKind;

    /// Request for page `page_index` (0-based) of `query`.
    fn request(&self, query: &str, page_index: usize) -> Result<CatalogRequest>;

    /// Whether another page follows `page`.
    fn has_more(&self, page: &Self::Page, page_index: usize) -> bool;

    /// Normalize every item on the page.
    fn records(&self, page: Self::Page) -> Vec<BookRecord>;
}

/// Run `source` over every query, emitting records to `sink`.
///
/// Queries are processed in order and each is paged to exhaustion before
/// the next begins. The first failure is logged and ends the run; records
/// emitted before it stay emitted.
pub async fn drive<S>(
    source: &S,
    transport: &dyn CatalogTransport,
    queries: &[String],
    sink: &dyn RecordSink,
) -> ImportReport
where
    S: CatalogSource + ?Sized,
{
    let mut report = ImportReport::begin(source.kind());
    log::info!("Importing from {} ({} queries)", source.kind(), queries.len());

    if let Err(e) = drive_queries(source, transport, queries, sink, &mut report).await {
        log::error!("Import from {} failed: {}", source.kind(), e);
        report.failure = Some(e.to_string());
    }

    let report = report.finish();
    log::info!(
        "Import from {} finished: {} records from {} pages",
        report.source,
        report.records_emitted,
        report.pages_fetched
    );
    report
}

async fn drive_queries<S>(
    source: &S,
    transport: &dyn CatalogTransport,
    queries: &[String],
    sink: &dyn RecordSink,
    report: &mut ImportReport,
) -> Result<()>
where
    S: CatalogSource + ?Sized,
{
    for query in queries {
        report.queries += 1;
        let mut page_index = 0;
        loop {
            let page = fetch_page(source, transport, query, page_index).await?;
            report.pages_fetched += 1;

            let more = source.has_more(&page, page_index);
            for record in source.records(page) {
                sink.emit(record);
                report.records_emitted += 1;
            }

            if !more {
                break;
            }
            page_index += 1;
        }
    }
    Ok(())
}

async fn fetch_page<S>(
    source: &S,
    transport: &dyn CatalogTransport,
    query: &str,
    page_index: usize,
) -> Result<S::Page>
where
    S: CatalogSource + ?Sized,
{
    let request = source.request(query, page_index)?;
    log::debug!("{} page {}: GET {}", source.kind(), page_index, request.url);

    let context = || format!("{} '{}' page {}", source.kind(), query, page_index);
    let body = transport
        .get(&request)
        .await
        .map_err(|e| AppError::fetch(context(), e))?;
    serde_json::from_slice(&body).map_err(|e| AppError::fetch(context(), e))
}
