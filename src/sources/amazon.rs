//! Amazon product search.
//!
//! Paged by page number starting at 1. The run ends on the first empty page
//! or once `max_pages` pages have been fetched, whichever comes first.

use serde::Deserialize;

use crate::error::Result;
use crate::models::{AmazonConfig, BookRecord, CatalogKind};
use crate::sources::{CatalogSource, lenient};
use crate::utils::build_url;
use crate::utils::http::CatalogRequest;

/// Page-counter adapter with a hard page cap.
pub struct Amazon {
    endpoint: String,
    page_size: usize,
    max_pages: usize,
    bearer: Option<String>,
}

impl Amazon {
    pub fn new(config: &AmazonConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            page_size: config.page_size.max(1),
            max_pages: config.max_pages.max(1),
            bearer: config.bearer.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchItemsPage {
    #[serde(default, deserialize_with = "lenient::value")]
    search_result: Option<SearchResult>,
}

impl SearchItemsPage {
    fn is_empty(&self) -> bool {
        self.search_result
            .as_ref()
            .and_then(|result| result.items.as_ref())
            .is_none_or(|items| items.is_empty())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchResult {
    #[serde(default, deserialize_with = "lenient::list")]
    items: Option<Vec<Item>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Item {
    #[serde(rename = "DetailPageURL", default, deserialize_with = "lenient::value")]
    detail_page_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::value")]
    item_info: Option<ItemInfo>,
    #[serde(default, deserialize_with = "lenient::value")]
    images: Option<Images>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ItemInfo {
    #[serde(default, deserialize_with = "lenient::value")]
    title: Option<DisplayValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DisplayValue {
    #[serde(default, deserialize_with = "lenient::value")]
    display_value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Images {
    #[serde(default, deserialize_with = "lenient::value")]
    primary: Option<ImageSet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ImageSet {
    #[serde(default, deserialize_with = "lenient::value")]
    medium: Option<Image>,
}

#[derive(Debug, Deserialize)]
struct Image {
    #[serde(rename = "URL", default, deserialize_with = "lenient::value")]
    url: Option<String>,
}

impl Item {
    fn into_record(self) -> BookRecord {
        let title = self
            .item_info
            .and_then(|info| info.title)
            .and_then(|title| title.display_value);
        let cover = self
            .images
            .and_then(|images| images.primary)
            .and_then(|primary| primary.medium)
            .and_then(|medium| medium.url);
        BookRecord::new(title, None, self.detail_page_url, cover)
    }
}

impl CatalogSource for Amazon {
    type Page = SearchItemsPage;

    fn kind(&self) -> CatalogKind {
        CatalogKind::Amazon
    }

    fn request(&self, query: &str, page_index: usize) -> Result<CatalogRequest> {
        let item_page = (page_index + 1).to_string();
        let item_count = self.page_size.to_string();
        let url = build_url(
            &self.endpoint,
            &[],
            &[
                ("keywords", query.trim()),
                ("itemPage", item_page.as_str()),
                ("itemCount", item_count.as_str()),
            ],
        )?;
        Ok(CatalogRequest::new(url).with_bearer(self.bearer.as_deref()))
    }

    fn has_more(&self, page: &SearchItemsPage, page_index: usize) -> bool {
        !page.is_empty() && page_index + 1 < self.max_pages
    }

    fn records(&self, page: SearchItemsPage) -> Vec<BookRecord> {
        page.search_result
            .and_then(|result| result.items)
            .unwrap_or_default()
            .into_iter()
            .map(Item::into_record)
            .collect()
    }
}
