//! Catalog lookup: turns a query into an ordered list of illustrations.
//!
//! An empty query asks for the current top illustrations; anything else is a
//! keyword search. Both go through the site's AJAX endpoints, which expect a
//! browser-like user agent and a referer pointing back at the site.

mod response;

use async_trait::async_trait;

use crate::config::CatalogConfig;
use crate::error::{CatalogError, Error, Result};
use crate::types::Illustration;

/// Source of illustration listings
///
/// The session only depends on this trait so tests can substitute canned
/// listings for the real endpoints.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Return the illustrations for `query` in listing order
    ///
    /// An empty `query` means "top illustrations right now".
    async fn lookup(&self, query: &str) -> std::result::Result<Vec<Illustration>, CatalogError>;
}

/// [`CatalogLookup`] backed by the pixiv AJAX endpoints
pub struct PixivCatalog {
    /// HTTP client shared by all lookups
    http_client: reqwest::Client,

    /// Site root without trailing slash
    base_url: String,

    /// Value for the `lang` query parameter
    language: String,
}

impl PixivCatalog {
    /// Create a catalog client from configuration
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let mut headers = reqwest::header::HeaderMap::new();
        let referer = reqwest::header::HeaderValue::from_str(&format!("{}/", base_url))
            .map_err(|e| Error::config(format!("invalid referer: {}", e), "catalog.base_url"))?;
        headers.insert(reqwest::header::REFERER, referer);

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
            language: config.language.clone(),
        })
    }

    fn top_url(&self) -> String {
        format!(
            "{}/ajax/top/illust?mode=all&lang={}",
            self.base_url,
            urlencoding::encode(&self.language)
        )
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/ajax/search/artworks/{}?lang={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(&self.language)
        )
    }

    async fn fetch_text(&self, url: &str) -> std::result::Result<String, CatalogError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|e| CatalogError::Request {
            url: url.to_string(),
            reason: format!("failed to read body: {}", e),
        })
    }
}

#[async_trait]
impl CatalogLookup for PixivCatalog {
    async fn lookup(&self, query: &str) -> std::result::Result<Vec<Illustration>, CatalogError> {
        if query.is_empty() {
            let url = self.top_url();
            tracing::debug!(%url, "Requesting top illustrations");
            response::decode_top(&self.fetch_text(&url).await?)
        } else {
            let url = self.search_url(query);
            tracing::debug!(%url, query, "Searching illustrations");
            response::decode_search(&self.fetch_text(&url).await?)
        }
    }
}
