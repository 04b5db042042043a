//! Runs orchestrator effects on background tasks.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::SessionEvent;
use crate::catalog::CatalogLookup;
use crate::error::{Error, ItemError, Result};
use crate::fetch::ItemFetcher;
use crate::orchestrator::{Effect, FetchCompletion};
use crate::types::Illustration;

/// Spawns one task per effect and sends its result back as a [`SessionEvent`]
///
/// Dropping or abandoning the executor does not wait for running tasks; their
/// results are discarded.
pub struct EffectExecutor {
    catalog: Arc<dyn CatalogLookup>,
    fetcher: Arc<dyn ItemFetcher>,
    events: mpsc::UnboundedSender<SessionEvent>,
    cancel_token: CancellationToken,
    item_timeout: Option<Duration>,
}

impl EffectExecutor {
    /// Create an executor reporting into `events`
    ///
    /// `item_timeout` bounds each fetch; `None` lets a fetch run forever.
    pub fn new(
        catalog: Arc<dyn CatalogLookup>,
        fetcher: Arc<dyn ItemFetcher>,
        events: mpsc::UnboundedSender<SessionEvent>,
        item_timeout: Option<Duration>,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            events,
            cancel_token: CancellationToken::new(),
            item_timeout,
        }
    }

    /// Start `effect` in the background
    ///
    /// Must be called from within a tokio runtime.
    pub fn execute(&self, effect: Effect) {
        let catalog = Arc::clone(&self.catalog);
        let fetcher = Arc::clone(&self.fetcher);
        let events = self.events.clone();
        let cancel_token = self.cancel_token.clone();
        let item_timeout = self.item_timeout;

        tokio::spawn(async move {
            let work = async move {
                match effect {
                    Effect::LookupCatalog {
                        batch,
                        query,
                        destination,
                    } => SessionEvent::CatalogReady {
                        batch,
                        result: lookup(catalog.as_ref(), &query, &destination).await,
                    },
                    Effect::FetchItem {
                        batch,
                        index,
                        item,
                        destination,
                    } => {
                        tracing::debug!(%batch, index, id = %item.id, "Fetching illustration");
                        let result =
                            fetch(fetcher.as_ref(), &item, &destination, item_timeout).await;
                        SessionEvent::FetchCompleted(FetchCompletion {
                            batch,
                            index,
                            result,
                        })
                    }
                }
            };

            tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    tracing::debug!("Abandoned background task");
                }
                event = work => {
                    if events.send(event).is_err() {
                        tracing::debug!("Session gone, dropping result");
                    }
                }
            }
        });
    }

    /// Stop every running task without waiting for it; later results are never delivered
    pub fn abandon(&self) {
        self.cancel_token.cancel();
    }

    /// Whether [`abandon`](Self::abandon) was called
    pub fn is_abandoned(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// Create the batch directory, then query the catalog
async fn lookup(
    catalog: &dyn CatalogLookup,
    query: &str,
    destination: &Path,
) -> Result<Vec<Illustration>> {
    tokio::fs::create_dir_all(destination).await.map_err(|e| {
        Error::config(
            format!("cannot create {}: {}", destination.display(), e),
            "download.download_dir",
        )
    })?;

    Ok(catalog.lookup(query).await?)
}

async fn fetch(
    fetcher: &dyn ItemFetcher,
    item: &Illustration,
    destination: &Path,
    item_timeout: Option<Duration>,
) -> std::result::Result<u64, ItemError> {
    let Some(limit) = item_timeout else {
        return fetcher.fetch(item, destination).await;
    };

    match tokio::time::timeout(limit, fetcher.fetch(item, destination)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(id = %item.id, timeout_secs = limit.as_secs(), "Fetch timed out");
            Err(ItemError::TimedOut {
                seconds: limit.as_secs(),
            })
        }
    }
}
