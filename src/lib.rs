//! # pixiv-dl
//!
//! Batch downloader for pixiv illustrations with an inline terminal UI.
//!
//! ## Design
//!
//! - **Pure core** - [`Orchestrator`] sequences one batch, one item at a time, and
//!   never performs I/O; it returns [`Effect`]s instead
//! - **Pluggable collaborators** - catalog lookups and image fetches sit behind the
//!   [`CatalogLookup`] and [`ItemFetcher`] traits
//! - **Single event loop** - [`Session`] applies one [`SessionEvent`] at a time;
//!   background results arrive as events, never as shared mutable state
//! - **Best-effort batches** - a failed item is logged and skipped, never retried
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use pixiv_dl::{Config, EffectExecutor, HttpFetcher, PixivCatalog, Session, Theme};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let catalog = Arc::new(PixivCatalog::new(&config.catalog)?);
//!     let fetcher = Arc::new(HttpFetcher::new(&config.download)?);
//!
//!     let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//!     let executor = EffectExecutor::new(catalog, fetcher, tx, config.download.item_timeout);
//!     let mut session = Session::new(&config, Theme::plain());
//!
//!     let mut stdout = std::io::stdout();
//!     pixiv_dl::run_headless(&mut session, &executor, &mut rx, "landscape", &mut stdout).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Catalog lookup (top listing and keyword search)
pub mod catalog;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Image fetching
pub mod fetch;
/// Download orchestration state machine
pub mod orchestrator;
/// Session controller and drivers
pub mod session;
/// Core types
pub mod types;
/// Terminal presentation
pub mod ui;

// Re-export commonly used types
pub use catalog::{CatalogLookup, PixivCatalog};
pub use config::{CatalogConfig, Config, DownloadConfig, UiConfig};
pub use error::{CatalogError, Error, ItemError, Result};
pub use fetch::{HttpFetcher, ItemFetcher, illustration_url};
pub use orchestrator::{
    Batch, BatchId, Effect, FetchCompletion, FinishReason, Orchestrator, Phase, RecentLog,
    destination_for, display_name,
};
pub use session::{
    Command, EffectExecutor, Session, SessionEvent, run_headless, run_terminal,
};
pub use types::{Illustration, IllustrationId, Outcome};
pub use ui::Theme;
