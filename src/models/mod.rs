// src/models/mod.rs

//! Domain models for the importer.
//!
//! This module contains the data structures shared by the catalog adapters,
//! the job state machine, and the CLI host.

mod catalog;
mod config;
mod record;
mod report;

// Re-export all public types
pub use catalog::CatalogKind;
pub use config::{
    AmazonConfig, Config, GoogleConfig, HttpConfig, OpenLibraryConfig, PenguinConfig,
};
pub use record::BookRecord;
pub use report::ImportReport;
