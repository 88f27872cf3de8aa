//! Field decoders that tolerate mistyped catalog data.
//!
//! A field holding the wrong JSON type decodes as absent instead of failing
//! the whole page, and array elements that do not decode are skipped.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode `T`, or `None` when the value has another shape.
pub fn value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).ok())
}

/// Decode the elements of an array that fit `T`, dropping the rest.
///
/// Anything other than an array decodes as `None`.
pub fn list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    let decoded = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                log::debug!("Skipping undecodable element: {}", e);
                None
            }
        })
        .collect();
    Ok(Some(decoded))
}
