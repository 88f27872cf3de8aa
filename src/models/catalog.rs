//! External catalog identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The external catalogs an import can pull from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    /// Keyword search, single page
    Google,
    /// Author works paged until the `next` link disappears
    OpenLibrary,
    /// Author titles paged by row offset until no `rel: next` link remains
    Penguin,
    /// Keyword search paged by page number up to a hard cap
    Amazon,
}

impl CatalogKind {
    /// All catalogs in display order.
    pub const ALL: [CatalogKind; 4] = [
        CatalogKind::Google,
        CatalogKind::OpenLibrary,
        CatalogKind::Penguin,
        CatalogKind::Amazon,
    ];

    /// Stable identifier used in logs and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Google => "google",
            CatalogKind::OpenLibrary => "open_library",
            CatalogKind::Penguin => "penguin",
            CatalogKind::Amazon => "amazon",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        CatalogKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| AppError::validation(format!("Unknown catalog: {}", s)))
    }
}
