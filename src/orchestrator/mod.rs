//! Download orchestration state machine.
//!
//! One [`Orchestrator`] owns everything a batch needs: the filtered item list,
//! the cursor, the progress fraction, and the [`RecentLog`]. It never performs
//! I/O. Each input (a submitted query, a resolved lookup, a finished fetch)
//! mutates state and returns the [`Effect`]s the caller must run; their results
//! come back as further inputs.
//!
//! ```text
//! Idle ──submit──▶ AwaitingCatalog ──items──▶ Downloading ──last item──▶ Finished
//!                       │  └──no items / error──────────────────────────▶   │
//!                       ▲                                                   │
//!                       └──────────────────────submit──────────────────────┘
//! ```
//!
//! At most one effect is outstanding at any time: a lookup while awaiting the
//! catalog, or the fetch for the item under the cursor while downloading.

mod recent_log;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use recent_log::{DEFAULT_CAPACITY, RecentLog};

use chrono::NaiveDateTime;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, ItemError};
use crate::types::{Illustration, Outcome};

/// Separator between tags in a file name
pub const TAG_SEPARATOR: &str = "+";

/// Extension of every saved image
pub const IMAGE_EXTENSION: &str = ".jpg";

/// File name for an illustration: its tags joined with `+`, plus `.jpg`
///
/// Illustrations with identical tag lists map to the same name; the later
/// download overwrites the earlier one.
pub fn display_name(item: &Illustration) -> String {
    let mut name = item.tags.join(TAG_SEPARATOR);
    name.push_str(IMAGE_EXTENSION);
    name
}

/// Directory a query's images are written to
///
/// The query text names the directory; the top listing (empty query) gets a
/// directory named after the local time it was requested. Root, `.` and `..`
/// components of the query are dropped so the result stays under `base`.
pub fn destination_for(base: &Path, query: &str, now: NaiveDateTime) -> PathBuf {
    if query.is_empty() {
        return base.join(now.format("%Y-%m-%d %H:%M:%S").to_string());
    }

    let mut destination = base.to_path_buf();
    destination.extend(
        Path::new(query)
            .components()
            .filter(|c| matches!(c, Component::Normal(_))),
    );
    destination
}

/// Identifies one submitted query and the batch it produces
///
/// Completions carrying another id are stale and ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BatchId(pub u64);

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse state, for callers that only need to branch on it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No query submitted yet
    Idle,
    /// A catalog lookup is outstanding
    AwaitingCatalog,
    /// Exactly one fetch is outstanding
    Downloading,
    /// The last batch ended; a new query may be submitted
    Finished,
}

/// Why the last batch ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FinishReason {
    /// Every item was attempted
    Completed,
    /// The lookup succeeded but left nothing to download
    NoResults,
    /// The lookup or destination setup failed; nothing was attempted
    Failed(String),
}

/// I/O the caller must perform on the orchestrator's behalf
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Create `destination`, then look up `query`; report through
    /// [`Orchestrator::catalog_resolved`]
    LookupCatalog {
        /// Batch the lookup belongs to
        batch: BatchId,
        /// Query text; empty means the top listing
        query: String,
        /// Directory the batch writes into
        destination: PathBuf,
    },
    /// Fetch `item` into `destination`; report through
    /// [`Orchestrator::fetch_completed`]
    FetchItem {
        /// Batch the fetch belongs to
        batch: BatchId,
        /// Position of `item` in the batch
        index: usize,
        /// The illustration to fetch
        item: Illustration,
        /// Full path of the file to write
        destination: PathBuf,
    },
}

/// Result of a [`Effect::FetchItem`]
#[derive(Debug)]
pub struct FetchCompletion {
    /// Batch the fetch belonged to
    pub batch: BatchId,
    /// Position of the fetched item
    pub index: usize,
    /// Bytes written, or why the fetch failed
    pub result: std::result::Result<u64, ItemError>,
}

/// One query's worth of illustrations and the progress through them
#[derive(Clone, Debug)]
pub struct Batch {
    id: BatchId,
    items: Vec<Illustration>,
    cursor: usize,
    progress: f64,
    destination: PathBuf,
    saved: usize,
    failed: usize,
}

impl Batch {
    fn new(id: BatchId, items: Vec<Illustration>, destination: PathBuf) -> Self {
        Self {
            id,
            items,
            cursor: 0,
            progress: 0.0,
            destination,
            saved: 0,
            failed: 0,
        }
    }

    /// Batch identifier
    pub fn id(&self) -> BatchId {
        self.id
    }

    /// Items in download order
    pub fn items(&self) -> &[Illustration] {
        &self.items
    }

    /// Number of items in the batch
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Index of the next item to fetch
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Completed fraction in `[0.0, 1.0]`
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Directory the batch writes into
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Items written successfully
    pub fn saved(&self) -> usize {
        self.saved
    }

    /// Items that failed
    pub fn failed(&self) -> usize {
        self.failed
    }

    fn is_done(&self) -> bool {
        self.progress >= 1.0 || self.cursor >= self.items.len()
    }

    fn fetch_effect(&self) -> Option<Effect> {
        let item = self.items.get(self.cursor)?;
        Some(Effect::FetchItem {
            batch: self.id,
            index: self.cursor,
            item: item.clone(),
            destination: self.destination.join(display_name(item)),
        })
    }
}

#[derive(Debug)]
enum State {
    Idle,
    AwaitingCatalog {
        batch: BatchId,
        query: String,
        destination: PathBuf,
    },
    Downloading(Batch),
    Finished {
        batch: Option<Batch>,
        reason: FinishReason,
    },
}

/// Owner of all batch state
#[derive(Debug)]
pub struct Orchestrator {
    state: State,
    log: RecentLog,
    next_batch: u64,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Orchestrator {
    /// Create an idle orchestrator whose recent-result log keeps `log_capacity` entries
    pub fn new(log_capacity: usize) -> Self {
        Self {
            state: State::Idle,
            log: RecentLog::new(log_capacity),
            next_batch: 0,
        }
    }

    /// Current coarse state
    pub fn phase(&self) -> Phase {
        match self.state {
            State::Idle => Phase::Idle,
            State::AwaitingCatalog { .. } => Phase::AwaitingCatalog,
            State::Downloading(_) => Phase::Downloading,
            State::Finished { .. } => Phase::Finished,
        }
    }

    /// Whether a query would be accepted right now
    pub fn accepts_query(&self) -> bool {
        matches!(self.state, State::Idle | State::Finished { .. })
    }

    /// Whether the last batch has ended
    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished { .. })
    }

    /// The active or most recently finished batch
    pub fn batch(&self) -> Option<&Batch> {
        match &self.state {
            State::Downloading(batch) => Some(batch),
            State::Finished { batch, .. } => batch.as_ref(),
            State::Idle | State::AwaitingCatalog { .. } => None,
        }
    }

    /// Query whose lookup is outstanding
    pub fn pending_query(&self) -> Option<&str> {
        match &self.state {
            State::AwaitingCatalog { query, .. } => Some(query),
            _ => None,
        }
    }

    /// Why the last batch ended, once it has
    pub fn finish_reason(&self) -> Option<&FinishReason> {
        match &self.state {
            State::Finished { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Index of the next item to fetch (0 without a batch)
    pub fn cursor(&self) -> usize {
        self.batch().map_or(0, Batch::cursor)
    }

    /// Completed fraction of the batch (0.0 without a batch)
    pub fn progress(&self) -> f64 {
        self.batch().map_or(0.0, Batch::progress)
    }

    /// Recent results, oldest first
    pub fn log(&self) -> &RecentLog {
        &self.log
    }

    /// File name of the item being fetched right now
    pub fn current_name(&self) -> Option<String> {
        match &self.state {
            State::Downloading(batch) => batch.items.get(batch.cursor).map(display_name),
            _ => None,
        }
    }

    /// Start a new batch for `query`, writing into `destination`
    ///
    /// Ignored unless idle or finished. The returned effect asks for the
    /// destination to be created and the catalog to be queried.
    pub fn submit(&mut self, query: impl Into<String>, destination: PathBuf) -> Vec<Effect> {
        let query = query.into();
        if !self.accepts_query() {
            tracing::debug!(phase = ?self.phase(), query, "Ignoring query while a batch is active");
            return Vec::new();
        }

        self.next_batch += 1;
        let batch = BatchId(self.next_batch);
        tracing::info!(%batch, query, destination = %destination.display(), "Query submitted");

        self.log.clear();
        self.state = State::AwaitingCatalog {
            batch,
            query: query.clone(),
            destination: destination.clone(),
        };
        vec![Effect::LookupCatalog {
            batch,
            query,
            destination,
        }]
    }

    /// Fold in the result of [`Effect::LookupCatalog`]
    ///
    /// Records without an update timestamp are dropped before the batch is
    /// built. A non-empty remainder starts downloading at item 0; an empty one
    /// or an error finishes immediately.
    pub fn catalog_resolved(
        &mut self,
        batch: BatchId,
        result: std::result::Result<Vec<Illustration>, Error>,
    ) -> Vec<Effect> {
        let destination = match &self.state {
            State::AwaitingCatalog {
                batch: pending,
                destination,
                ..
            } if *pending == batch => destination.clone(),
            _ => {
                tracing::debug!(%batch, phase = ?self.phase(), "Ignoring stale catalog result");
                return Vec::new();
            }
        };

        let items = match result {
            Ok(items) => items,
            Err(e) => {
                tracing::error!(%batch, error = %e, code = e.error_code(), "Catalog lookup failed");
                self.state = State::Finished {
                    batch: None,
                    reason: FinishReason::Failed(e.to_string()),
                };
                return Vec::new();
            }
        };

        let received = items.len();
        let items: Vec<_> = items
            .into_iter()
            .filter(Illustration::has_update_date)
            .collect();
        tracing::info!(
            %batch,
            received,
            kept = items.len(),
            "Catalog resolved"
        );

        if items.is_empty() {
            self.state = State::Finished {
                batch: None,
                reason: FinishReason::NoResults,
            };
            return Vec::new();
        }

        let batch = Batch::new(batch, items, destination);
        let effects = batch.fetch_effect().into_iter().collect();
        self.state = State::Downloading(batch);
        effects
    }

    /// Fold in the result of [`Effect::FetchItem`]
    ///
    /// Success and failure advance the batch identically; a failure is only
    /// recorded in the recent-result log.
    pub fn fetch_completed(&mut self, completion: FetchCompletion) -> Vec<Effect> {
        let State::Downloading(batch) = &mut self.state else {
            tracing::debug!(batch = %completion.batch, "Ignoring fetch result outside a batch");
            return Vec::new();
        };
        if batch.id != completion.batch || batch.cursor != completion.index {
            tracing::debug!(
                batch = %completion.batch,
                index = completion.index,
                "Ignoring stale fetch result"
            );
            return Vec::new();
        }
        let Some(item) = batch.items.get(batch.cursor) else {
            return Vec::new();
        };

        let name = display_name(item);
        let outcome = match completion.result {
            Ok(bytes) => {
                batch.saved += 1;
                Outcome::Saved { bytes }
            }
            Err(e) => {
                tracing::warn!(batch = %batch.id, index = batch.cursor, name, error = %e, "Fetch failed");
                batch.failed += 1;
                Outcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        self.log.push(name, outcome);

        let total = batch.items.len();
        batch.cursor += 1;
        batch.progress = if batch.cursor >= total {
            1.0
        } else {
            (batch.progress + 1.0 / total as f64).min(1.0)
        };

        if batch.is_done() {
            tracing::info!(
                batch = %batch.id,
                saved = batch.saved,
                failed = batch.failed,
                total,
                "Batch finished"
            );
            let State::Downloading(batch) =
                std::mem::replace(&mut self.state, State::Idle)
            else {
                return Vec::new();
            };
            self.state = State::Finished {
                batch: Some(batch),
                reason: FinishReason::Completed,
            };
            return Vec::new();
        }

        batch.fetch_effect().into_iter().collect()
    }
}
