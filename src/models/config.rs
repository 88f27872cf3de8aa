//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings shared by every catalog
    #[serde(default)]
    pub http: HttpConfig,

    /// Google Books search
    #[serde(default)]
    pub google: GoogleConfig,

    /// Open Library author works
    #[serde(default)]
    pub open_library: OpenLibraryConfig,

    /// Penguin Random House author titles
    #[serde(default)]
    pub penguin: PenguinConfig,

    /// Amazon product search
    #[serde(default)]
    pub amazon: AmazonConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.open_library.page_size == 0 {
            return Err(AppError::validation("open_library.page_size must be > 0"));
        }
        if self.penguin.rows == 0 {
            return Err(AppError::validation("penguin.rows must be > 0"));
        }
        if self.penguin.domain.trim().is_empty() {
            return Err(AppError::validation("penguin.domain is empty"));
        }
        if self.amazon.page_size == 0 {
            return Err(AppError::validation("amazon.page_size must be > 0"));
        }
        if self.amazon.max_pages == 0 {
            return Err(AppError::validation("amazon.max_pages must be > 0"));
        }

        for (name, value) in [
            ("google.endpoint", &self.google.endpoint),
            ("open_library.base_url", &self.open_library.base_url),
            ("open_library.covers_url", &self.open_library.covers_url),
            ("penguin.api_base", &self.penguin.api_base),
            ("penguin.site_base_url", &self.penguin.site_base_url),
            ("amazon.endpoint", &self.amazon.endpoint),
        ] {
            url::Url::parse(value)
                .map_err(|e| AppError::validation(format!("{name} is not a valid URL: {e}")))?;
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Google Books volumes search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default = "defaults::google_endpoint")]
    pub endpoint: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::google_endpoint(),
        }
    }
}

/// Open Library author works listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenLibraryConfig {
    /// Site root; work keys are appended to it to form item links
    #[serde(default = "defaults::open_library_base")]
    pub base_url: String,

    /// Cover CDN root
    #[serde(default = "defaults::open_library_covers")]
    pub covers_url: String,

    /// Entries per page
    #[serde(default = "defaults::open_library_page_size")]
    pub page_size: usize,
}

impl Default for OpenLibraryConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::open_library_base(),
            covers_url: defaults::open_library_covers(),
            page_size: defaults::open_library_page_size(),
        }
    }
}

/// Penguin Random House titles by author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenguinConfig {
    /// REST API root
    #[serde(default = "defaults::penguin_api_base")]
    pub api_base: String,

    /// Catalog domain, e.g. `PRH.US`
    #[serde(default = "defaults::penguin_domain")]
    pub domain: String,

    /// Public site root; each title's SEO path is appended to it
    #[serde(default = "defaults::penguin_site_base")]
    pub site_base_url: String,

    /// Titles per page
    #[serde(default = "defaults::penguin_rows")]
    pub rows: usize,

    /// Optional bearer credential
    #[serde(default)]
    pub bearer: Option<String>,
}

impl Default for PenguinConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::penguin_api_base(),
            domain: defaults::penguin_domain(),
            site_base_url: defaults::penguin_site_base(),
            rows: defaults::penguin_rows(),
            bearer: None,
        }
    }
}

/// Amazon product search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmazonConfig {
    #[serde(default = "defaults::amazon_endpoint")]
    pub endpoint: String,

    /// Items per page
    #[serde(default = "defaults::amazon_page_size")]
    pub page_size: usize,

    /// Hard page cap. `max_pages * page_size` should cover the catalog's
    /// maximum total result count (100 upstream).
    #[serde(default = "defaults::amazon_max_pages")]
    pub max_pages: usize,

    /// Optional bearer credential
    #[serde(default)]
    pub bearer: Option<String>,
}

impl Default for AmazonConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::amazon_endpoint(),
            page_size: defaults::amazon_page_size(),
            max_pages: defaults::amazon_max_pages(),
            bearer: None,
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; shelf-import/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Google Books
    pub fn google_endpoint() -> String {
        "https://www.googleapis.com/books/v1/volumes".into()
    }

    // Open Library
    pub fn open_library_base() -> String {
        "https://openlibrary.org".into()
    }
    pub fn open_library_covers() -> String {
        "https://covers.openlibrary.org".into()
    }
    pub fn open_library_page_size() -> usize {
        100
    }

    // Penguin Random House
    pub fn penguin_api_base() -> String {
        "https://api.penguinrandomhouse.com".into()
    }
    pub fn penguin_domain() -> String {
        "PRH.US".into()
    }
    pub fn penguin_site_base() -> String {
        "https://www.penguinrandomhouse.com".into()
    }
    pub fn penguin_rows() -> usize {
        10
    }

    // Amazon
    pub fn amazon_endpoint() -> String {
        "https://webservices.amazon.com/paapi5/searchitems".into()
    }
    pub fn amazon_page_size() -> usize {
        10
    }
    pub fn amazon_max_pages() -> usize {
        10
    }
}
