//! Utility functions and helpers.

pub mod http;

use url::Url;

use crate::error::{AppError, Result};

/// Build a request URL from a base, extra path segments and query pairs.
///
/// Segments are percent-encoded individually, so catalog keys containing
/// reserved characters stay inside their own segment.
pub fn build_url(base: &str, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(base)?;
    if !segments.is_empty() {
        url.path_segments_mut()
            .map_err(|_| AppError::config(format!("{base} cannot take path segments")))?
            .pop_if_empty()
            .extend(segments);
    }
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

/// Join a site root and a site-relative path with exactly one slash.
///
/// Returns an empty string when the path is empty.
pub fn concat_url(base: &str, path: &str) -> String {
    let path = path.trim();
    if path.is_empty() {
        return String::new();
    }
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
