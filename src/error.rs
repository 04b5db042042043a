//! Error types for pixiv-dl
//!
//! The taxonomy follows how far a failure reaches:
//! - [`ItemError`] - one illustration could not be fetched; recorded in the recent-result
//!   log and never fatal to the batch
//! - [`CatalogError`] - the search/top lookup failed; the batch never starts
//! - [`Error::Config`] - invalid settings or an uncreatable destination directory;
//!   fatal to the batch before the first fetch
//!
//! Everything else ([`Error::Terminal`], [`Error::Io`], ...) belongs to the session
//! and the binary entry point.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pixiv-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pixiv-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download_dir")
        key: Option<String>,
    },

    /// Catalog lookup failed
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A single illustration could not be fetched
    #[error("item error: {0}")]
    Item(#[from] ItemError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal setup, input or rendering failed
    #[error("terminal error: {0}")]
    Terminal(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Catalog lookup errors (top illustrations or keyword search)
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request could not be sent or the body could not be read
    #[error("request to {url} failed: {reason}")]
    Request {
        /// The endpoint that was queried
        url: String,
        /// Transport-level reason
        reason: String,
    },

    /// The endpoint answered with a non-success HTTP status
    #[error("{url} returned HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// The endpoint that was queried
        url: String,
    },

    /// The response body was not the expected JSON shape
    #[error("could not decode response: {0}")]
    Decode(String),

    /// The site reported an error inside a successful response
    #[error("site rejected the query: {message}")]
    Api {
        /// Message returned by the site
        message: String,
    },
}

/// Per-illustration fetch errors
#[derive(Debug, Error)]
pub enum ItemError {
    /// The update timestamp cannot be turned into an image URL
    #[error("illustration {id} has an unusable timestamp {timestamp:?}")]
    InvalidTimestamp {
        /// Illustration identifier
        id: String,
        /// The offending timestamp
        timestamp: String,
    },

    /// The image request failed at the transport level
    #[error("{0}")]
    Request(String),

    /// The image host answered with a non-success HTTP status
    #[error("{url} returned HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// The image URL
        url: String,
    },

    /// Writing the image to disk failed
    #[error("failed to write {path}: {message}")]
    Io {
        /// Destination file
        path: PathBuf,
        /// Underlying I/O error message
        message: String,
    },

    /// The fetch exceeded the configured per-item timeout
    #[error("timed out after {seconds}s")]
    TimedOut {
        /// The timeout that elapsed
        seconds: u64,
    },
}

impl Error {
    /// Create a configuration error tied to a settings key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Machine-readable error code, used as a structured logging field
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Catalog(e) => match e {
                CatalogError::Request { .. } => "catalog_request_failed",
                CatalogError::Status { .. } => "catalog_http_status",
                CatalogError::Decode(_) => "catalog_decode_failed",
                CatalogError::Api { .. } => "catalog_rejected",
            },
            Error::Item(e) => match e {
                ItemError::InvalidTimestamp { .. } => "invalid_timestamp",
                ItemError::Request(_) => "item_request_failed",
                ItemError::Status { .. } => "item_http_status",
                ItemError::Io { .. } => "item_write_failed",
                ItemError::TimedOut { .. } => "item_timed_out",
            },
            Error::Io(_) => "io_error",
            Error::Terminal(_) => "terminal_error",
            Error::Other(_) => "internal_error",
        }
    }
}
