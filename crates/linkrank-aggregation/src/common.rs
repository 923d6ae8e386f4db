use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Largest item universe whose permutation count fits in a `u64`
pub const MAX_SEARCHABLE_ITEMS: usize = 20;

/// One source ranking: identifiers in rank order (position = index + 1).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking {
    pub name: String,
    pub items: Vec<String>,
}

impl Ranking {
    pub fn new(name: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }

    /// Build an unnamed ranking from anything string-like
    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new("", items.into_iter().map(Into::into).collect())
    }

    /// Number of entries, duplicates included
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 1-based position of `item`, or 0 when this source does not rank it
    pub fn position_of(&self, item: &str) -> usize {
        self.items
            .iter()
            .position(|candidate| candidate == item)
            .map_or(0, |idx| idx + 1)
    }
}

/// Deduplicated union of all ranked items, in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct UnionSet {
    items: Vec<String>,
    index: FxHashMap<String, usize>,
}

impl UnionSet {
    pub fn from_rankings(rankings: &[Ranking]) -> Self {
        let mut set = Self::default();
        for item in rankings.iter().flat_map(|r| r.items.iter()) {
            set.insert(item);
        }
        set
    }

    /// Insert `item` if unseen; returns its 1-based position either way
    pub fn insert(&mut self, item: &str) -> usize {
        if let Some(&idx) = self.index.get(item) {
            return idx + 1;
        }
        self.items.push(item.to_string());
        self.index.insert(item.to_string(), self.items.len() - 1);
        self.items.len()
    }

    /// 1-based insertion position of `item`
    pub fn position(&self, item: &str) -> Option<usize> {
        self.index.get(item).map(|idx| idx + 1)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cooperative cancellation flag shared between a caller and a running search.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Defines a minimisation problem over permutations of final positions.
pub trait PermutationProblem: Send + Sync {
    /// Number of items being placed.
    fn size(&self) -> usize;

    /// Cost of assigning item `i` to final position `positions[i]` (1-based).
    fn cost(&self, positions: &[usize]) -> f64;
}

/// Configuration for the exhaustive search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Refuse to search item universes larger than this.
    pub max_items: usize,
    /// Split the search across rayon worker threads.
    pub parallel: bool,
    /// Abort the search after this many milliseconds.
    pub timeout_ms: Option<u64>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            max_items: 10,
            parallel: false,
            timeout_ms: None,
        }
    }
}

impl AggregationConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Best permutation found by a search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub best_positions: Vec<usize>,
    pub best_cost: f64,
    pub evaluated: u64,
}

/// The consensus ranking produced by an aggregation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    /// Final position of each union item, in union order
    pub positions: Vec<usize>,
    /// Union items in final-rank order
    pub ordering: Vec<String>,
    pub distance: f64,
    pub candidates_evaluated: u64,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
    #[error("no rankings to aggregate")]
    EmptyInput,

    #[error("{items} distinct items exceed the search limit of {limit}")]
    ItemUniverseTooLarge { items: usize, limit: usize },

    #[error("search cancelled after {evaluated} candidates")]
    Cancelled { evaluated: u64 },

    #[error("search deadline exceeded after {evaluated} candidates")]
    DeadlineExceeded { evaluated: u64 },

    #[error("cannot allocate cost table for {items} items")]
    AllocationFailure { items: usize },
}

pub type AggregationOutcome<T> = Result<T, AggregationError>;
