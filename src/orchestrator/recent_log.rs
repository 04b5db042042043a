//! Bounded log of the most recent fetch results.

use std::collections::{HashMap, VecDeque};

use crate::types::Outcome;

/// Default number of results kept
pub const DEFAULT_CAPACITY: usize = 5;

/// The last `capacity` attempted file names, oldest first, with their outcomes
///
/// Outcomes are keyed by name, so two attempts producing the same name share
/// the newer outcome. An outcome is dropped only once no entry with its name
/// remains in the window.
#[derive(Debug, Clone)]
pub struct RecentLog {
    capacity: usize,
    order: VecDeque<String>,
    outcomes: HashMap<String, Outcome>,
}

impl RecentLog {
    /// Create an empty log holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity + 1),
            outcomes: HashMap::with_capacity(capacity + 1),
        }
    }

    /// Record an attempt, evicting the oldest entries past capacity
    pub fn push(&mut self, name: impl Into<String>, outcome: Outcome) {
        let name = name.into();
        self.order.push_back(name.clone());
        self.outcomes.insert(name, outcome);

        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front()
                && !self.order.contains(&evicted)
            {
                self.outcomes.remove(&evicted);
            }
        }
    }

    /// Entries in attempt order, oldest first
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Outcome)> + '_ {
        self.order.iter().filter_map(|name| {
            self.outcomes
                .get(name)
                .map(|outcome| (name.as_str(), outcome))
        })
    }

    /// Outcome recorded for `name`, if it is still in the window
    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.outcomes.get(name)
    }

    /// Number of entries in the window
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Maximum number of entries kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of distinct names with an outcome
    pub(crate) fn outcome_count(&self) -> usize {
        self.outcomes.len()
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.order.clear();
        self.outcomes.clear();
    }
}

impl Default for RecentLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
