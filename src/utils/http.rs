// src/utils/http.rs

//! HTTP transport for catalog page fetches.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// One page request against a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRequest {
    pub url: Url,
    pub bearer: Option<String>,
}

impl CatalogRequest {
    pub fn new(url: Url) -> Self {
        Self { url, bearer: None }
    }

    /// Attach a bearer credential; blank credentials are dropped.
    pub fn with_bearer(mut self, bearer: Option<&str>) -> Self {
        self.bearer = bearer
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string);
        self
    }
}

/// Fetches raw catalog pages.
///
/// Implementations return the response body or fail on transport errors
/// and non-success statuses. Timeouts are the implementation's concern.
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    async fn get(&self, request: &CatalogRequest) -> Result<Vec<u8>>;
}

/// reqwest-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with a configured client.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl CatalogTransport for HttpTransport {
    async fn get(&self, request: &CatalogRequest) -> Result<Vec<u8>> {
        let mut builder = self
            .client
            .get(request.url.clone())
            .header(ACCEPT, "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::status(status.as_u16(), request.url.as_str()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &HttpConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}
