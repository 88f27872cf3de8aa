//! Google Books volumes search.
//!
//! One request per import; there is no cursor.

use serde::Deserialize;

use crate::error::Result;
use crate::models::{BookRecord, CatalogKind, GoogleConfig};
use crate::sources::{CatalogSource, lenient};
use crate::utils::build_url;
use crate::utils::http::CatalogRequest;

/// Simple-search adapter over the volumes endpoint.
pub struct GoogleBooks {
    endpoint: String,
}

impl GoogleBooks {
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VolumesPage {
    #[serde(default, deserialize_with = "lenient::list")]
    items: Option<Vec<Volume>>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo", default, deserialize_with = "lenient::value")]
    volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    #[serde(default, deserialize_with = "lenient::value")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient::value")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient::value")]
    info_link: Option<String>,
    #[serde(default, deserialize_with = "lenient::value")]
    canonical_volume_link: Option<String>,
    #[serde(default, deserialize_with = "lenient::value")]
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    #[serde(default, deserialize_with = "lenient::value")]
    thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient::value")]
    small_thumbnail: Option<String>,
}

impl VolumeInfo {
    fn into_record(self) -> BookRecord {
        let url = self.info_link.or(self.canonical_volume_link);
        // Prefer the larger image.
        let cover = self
            .image_links
            .and_then(|links| links.thumbnail.or(links.small_thumbnail));
        BookRecord::new(self.title, self.description, url, cover)
    }
}

impl CatalogSource for GoogleBooks {
    type Page = VolumesPage;

    fn kind(&self) -> CatalogKind {
        CatalogKind::Google
    }

    fn request(&self, query: &str, _page_index: usize) -> Result<CatalogRequest> {
        let q = format!("inauthor:\"{}\"", query.trim());
        let url = build_url(&self.endpoint, &[], &[("q", q.as_str())])?;
        Ok(CatalogRequest::new(url))
    }

    fn has_more(&self, _page: &VolumesPage, _page_index: usize) -> bool {
        false
    }

    fn records(&self, page: VolumesPage) -> Vec<BookRecord> {
        page.items
            .unwrap_or_default()
            .into_iter()
            .map(|volume| volume.volume_info.unwrap_or_default().into_record())
            .collect()
    }
}
