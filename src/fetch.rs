//! Item fetch: downloads one illustration's image to a file.
//!
//! The image host serves a 1200px JPEG rendition of every illustration under a
//! path built from the illustration's last update time. Requests without a
//! referer from the main site are refused, so the fetcher always sends one.

use async_trait::async_trait;
use chrono::DateTime;
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::config::DownloadConfig;
use crate::error::{Error, ItemError, Result};
use crate::types::Illustration;

/// Writes one illustration to disk
#[async_trait]
pub trait ItemFetcher: Send + Sync {
    /// Fetch `item` and write it to `destination`, returning the bytes written
    ///
    /// An existing file at `destination` is overwritten.
    async fn fetch(
        &self,
        item: &Illustration,
        destination: &Path,
    ) -> std::result::Result<u64, ItemError>;
}

/// Build the image URL for an illustration
///
/// `updateDate` is RFC 3339 (`2024-05-19T00:00:13+09:00`); its date and time
/// components become path segments as written, without converting the offset.
///
/// # Errors
/// Returns [`ItemError::InvalidTimestamp`] when the timestamp cannot be parsed
pub fn illustration_url(
    image_base_url: &str,
    item: &Illustration,
) -> std::result::Result<String, ItemError> {
    let updated = DateTime::parse_from_rfc3339(&item.update_date).map_err(|_| {
        ItemError::InvalidTimestamp {
            id: item.id.to_string(),
            timestamp: item.update_date.clone(),
        }
    })?;

    Ok(format!(
        "{}/img-master/img/{}/{}_p0_master1200.jpg",
        image_base_url.trim_end_matches('/'),
        updated.format("%Y/%m/%d/%H/%M/%S"),
        item.id
    ))
}

/// [`ItemFetcher`] that streams images from the pixiv image host
pub struct HttpFetcher {
    http_client: reqwest::Client,
    image_base_url: String,
}

impl HttpFetcher {
    /// Create a fetcher from configuration
    ///
    /// # Errors
    /// Returns error if the referer is not a valid header value or the HTTP
    /// client cannot be created
    pub fn new(config: &DownloadConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        let referer = reqwest::header::HeaderValue::from_str(&config.referer)
            .map_err(|e| Error::config(format!("invalid referer: {}", e), "download.referer"))?;
        headers.insert(reqwest::header::REFERER, referer);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            image_base_url: config.image_base_url.clone(),
        })
    }
}

#[async_trait]
impl ItemFetcher for HttpFetcher {
    async fn fetch(
        &self,
        item: &Illustration,
        destination: &Path,
    ) -> std::result::Result<u64, ItemError> {
        let url = illustration_url(&self.image_base_url, item)?;

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            if e.is_connect() {
                ItemError::Request(format!("connection failed for {}: {}", url, e))
            } else {
                ItemError::Request(format!("request to {} failed: {}", url, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ItemError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let io_error = |e: std::io::Error| ItemError::Io {
            path: destination.to_path_buf(),
            message: e.to_string(),
        };

        let mut file = tokio::fs::File::create(destination)
            .await
            .map_err(io_error)?;

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| ItemError::Request(format!("failed to read {}: {}", url, e)))?;
            file.write_all(&chunk).await.map_err(io_error)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(io_error)?;

        tracing::debug!(id = %item.id, bytes = written, path = %destination.display(), "Illustration saved");
        Ok(written)
    }
}
