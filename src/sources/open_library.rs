//! Open Library author works.
//!
//! Pages are requested at increasing offsets until the response's `links`
//! block stops advertising a `next` page.

use serde::Deserialize;

use crate::error::Result;
use crate::models::{BookRecord, CatalogKind, OpenLibraryConfig};
use crate::sources::{CatalogSource, lenient};
use crate::utils::http::CatalogRequest;
use crate::utils::{build_url, concat_url};

/// Link-cursor adapter over `/authors/{key}/works.json`.
pub struct OpenLibrary {
    base_url: String,
    covers_url: String,
    page_size: usize,
}

impl OpenLibrary {
    pub fn new(config: &OpenLibraryConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            covers_url: config.covers_url.clone(),
            page_size: config.page_size.max(1),
        }
    }

    fn cover_url(&self, cover_id: i64) -> String {
        format!(
            "{}/b/id/{}-M.jpg",
            self.covers_url.trim_end_matches('/'),
            cover_id
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct WorksPage {
    #[serde(default, deserialize_with = "lenient::value")]
    links: Option<WorksLinks>,
    #[serde(default, deserialize_with = "lenient::list")]
    entries: Option<Vec<Work>>,
}

#[derive(Debug, Deserialize)]
struct WorksLinks {
    #[serde(default, deserialize_with = "lenient::value")]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Work {
    #[serde(default, deserialize_with = "lenient::value")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient::value")]
    key: Option<String>,
    #[serde(default)]
    description: Option<Description>,
    #[serde(default, deserialize_with = "lenient::list")]
    covers: Option<Vec<i64>>,
}

/// A work's description comes either as a bare string or as a typed
/// text value (`{"type": "/type/text", "value": "..."}`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Description {
    Text(String),
    Typed {
        #[serde(default)]
        value: Option<String>,
    },
    Unrecognized(serde_json::Value),
}

impl Description {
    fn into_text(self) -> String {
        match self {
            Description::Text(text) => text,
            Description::Typed { value } => value.unwrap_or_default(),
            Description::Unrecognized(_) => String::new(),
        }
    }
}

impl CatalogSource for OpenLibrary {
    type Page = WorksPage;

    fn kind(&self) -> CatalogKind {
        CatalogKind::OpenLibrary
    }

    fn request(&self, query: &str, page_index: usize) -> Result<CatalogRequest> {
        let limit = self.page_size.to_string();
        let offset = (page_index * self.page_size).to_string();
        let url = build_url(
            &self.base_url,
            &["authors", query.trim(), "works.json"],
            &[("limit", limit.as_str()), ("offset", offset.as_str())],
        )?;
        Ok(CatalogRequest::new(url))
    }

    fn has_more(&self, page: &WorksPage, _page_index: usize) -> bool {
        page.links
            .as_ref()
            .and_then(|links| links.next.as_deref())
            .is_some_and(|next| !next.is_empty())
    }

    fn records(&self, page: WorksPage) -> Vec<BookRecord> {
        page.entries
            .unwrap_or_default()
            .into_iter()
            .map(|work| {
                let url = work.key.map(|key| concat_url(&self.base_url, &key));
                // Open Library uses -1 as a "no cover" placeholder id.
                let cover = work
                    .covers
                    .and_then(|ids| ids.first().copied())
                    .filter(|id| *id > 0)
                    .map(|id| self.cover_url(id));
                let description = work.description.map(Description::into_text);
                BookRecord::new(work.title, description, url, cover)
            })
            .collect()
    }
}
