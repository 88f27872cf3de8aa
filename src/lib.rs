// src/lib.rs

//! Shelf Import Library
//!
//! Pulls an author's bibliography from one of several external catalogs,
//! normalizes every item into a [`models::BookRecord`], and streams the
//! records to a caller-supplied sink one job at a time.

pub mod error;
pub mod importer;
pub mod models;
pub mod sources;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use importer::{Importer, ImporterInputs};
pub use models::{BookRecord, CatalogKind, Config, ImportReport};
