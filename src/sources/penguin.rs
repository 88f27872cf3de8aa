//! Penguin Random House titles by author.
//!
//! Paged by row offset (`start`/`rows`). Continuation is signalled through
//! the page's link collection: the run stops on the first page with no
//! `rel: "next"` entry.

use serde::Deserialize;

use crate::error::Result;
use crate::models::{BookRecord, CatalogKind, PenguinConfig};
use crate::sources::{CatalogSource, lenient};
use crate::utils::http::CatalogRequest;
use crate::utils::{build_url, concat_url};

const REL_NEXT: &str = "next";
const REL_ICON: &str = "icon";

/// Row-offset adapter over the titles-by-author resource.
pub struct PenguinRandomHouse {
    api_base: String,
    domain: String,
    site_base_url: String,
    rows: usize,
    bearer: Option<String>,
}

impl PenguinRandomHouse {
    pub fn new(config: &PenguinConfig) -> Self {
        Self {
            api_base: config.api_base.clone(),
            domain: config.domain.clone(),
            site_base_url: config.site_base_url.clone(),
            rows: config.rows.max(1),
            bearer: config.bearer.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TitlesPage {
    #[serde(default, deserialize_with = "lenient::value")]
    data: Option<TitlesData>,
    #[serde(rename = "_links", default, deserialize_with = "lenient::list")]
    links: Option<Vec<Link>>,
}

#[derive(Debug, Deserialize)]
struct TitlesData {
    #[serde(default, deserialize_with = "lenient::list")]
    titles: Option<Vec<Title>>,
    #[serde(rename = "_links", default, deserialize_with = "lenient::list")]
    links: Option<Vec<Link>>,
}

#[derive(Debug, Deserialize)]
struct Title {
    #[serde(default, deserialize_with = "lenient::value")]
    title: Option<String>,
    #[serde(rename = "seoFriendlyUrl", default, deserialize_with = "lenient::value")]
    seo_friendly_url: Option<String>,
    #[serde(rename = "_links", default, deserialize_with = "lenient::list")]
    links: Option<Vec<Link>>,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(default, deserialize_with = "lenient::value")]
    rel: Option<String>,
    #[serde(default, deserialize_with = "lenient::value")]
    href: Option<String>,
}

fn find_rel<'a>(links: Option<&'a [Link]>, rel: &str) -> Option<&'a Link> {
    links?
        .iter()
        .find(|link| link.rel.as_deref() == Some(rel))
}

impl TitlesPage {
    /// The page-level link collection sits at the top level; some responses
    /// nest it next to the titles instead.
    fn has_rel(&self, rel: &str) -> bool {
        find_rel(self.links.as_deref(), rel).is_some()
            || find_rel(
                self.data.as_ref().and_then(|d| d.links.as_deref()),
                rel,
            )
            .is_some()
    }
}

impl CatalogSource for PenguinRandomHouse {
    type Page = TitlesPage;

    fn kind(&self) -> CatalogKind {
        CatalogKind::Penguin
    }

    fn request(&self, query: &str, page_index: usize) -> Result<CatalogRequest> {
        let rows = self.rows.to_string();
        let start = (page_index * self.rows).to_string();
        let url = build_url(
            &self.api_base,
            &[
                "resources",
                "v2",
                "title",
                "domains",
                self.domain.as_str(),
                "authors",
                query.trim(),
                "titles",
            ],
            &[("rows", rows.as_str()), ("start", start.as_str())],
        )?;
        Ok(CatalogRequest::new(url).with_bearer(self.bearer.as_deref()))
    }

    fn has_more(&self, page: &TitlesPage, _page_index: usize) -> bool {
        page.has_rel(REL_NEXT)
    }

    fn records(&self, page: TitlesPage) -> Vec<BookRecord> {
        page.data
            .and_then(|data| data.titles)
            .unwrap_or_default()
            .into_iter()
            .map(|title| {
                let cover = find_rel(title.links.as_deref(), REL_ICON)
                    .and_then(|link| link.href.clone());
                let url = title
                    .seo_friendly_url
                    .map(|path| concat_url(&self.site_base_url, &path));
                BookRecord::new(title.title, None, url, cover)
            })
            .collect()
    }
}
