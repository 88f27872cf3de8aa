//! Canonical bibliographic record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A normalized book, the only shape the importer ever hands to a sink.
///
/// Every field is a plain string; an empty string is the single "missing"
/// sentinel regardless of which catalog produced the record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookRecord {
    /// Identifier generated when the record is normalized
    pub id: String,

    /// Book title
    pub title: String,

    /// Synopsis or description
    pub description: String,

    /// Fully-qualified link to the item on the catalog's site
    pub url: String,

    /// Fully-qualified cover image URL
    pub cover: String,
}

impl BookRecord {
    /// Build a record with a freshly generated id.
    ///
    /// Absent fields collapse to empty strings.
    pub fn new(
        title: Option<String>,
        description: Option<String>,
        url: Option<String>,
        cover: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.unwrap_or_default(),
            description: description.unwrap_or_default(),
            url: url.unwrap_or_default(),
            cover: cover.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_become_empty() {
        let record = BookRecord::new(Some("Book A".to_string()), None, None, None);
        assert_eq!(record.title, "Book A");
        assert_eq!(record.description, "");
        assert_eq!(record.url, "");
        assert_eq!(record.cover, "");
        assert!(!record.id.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = BookRecord::new(None, None, None, None);
        let b = BookRecord::new(None, None, None, None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_serializes_all_fields_as_strings() {
        let record = BookRecord::new(None, None, None, None);
        let value = serde_json::to_value(&record).unwrap();
        for field in ["id", "title", "description", "url", "cover"] {
            assert!(value[field].is_string(), "{field} should be a string");
        }
    }
}
