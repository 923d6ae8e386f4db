//! Ranked item set
//!
//! Ordered mapping from page identifier to its score and out-degree. The
//! insertion order is the vertex order of the link graph, so a vertex index
//! doubles as the position of its entry.

use indexmap::IndexMap;
use linkrank_graph_algorithms::{NodeId, ScoreSink};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RankingError {
    #[error("unknown identifier: {0}")]
    UnknownIdentifier(String),

    #[error("duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("index {index} out of range ({len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// One ranked page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub identifier: String,
    pub out_degree: usize,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RankedItemSet {
    entries: IndexMap<String, RankedEntry>,
}

impl RankedItemSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries with zero score and out-degree, in the given order. Repeated
    /// identifiers keep their first position.
    pub fn from_identifiers<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = IndexMap::new();
        for identifier in identifiers {
            let identifier = identifier.into();
            entries
                .entry(identifier.clone())
                .or_insert_with(|| RankedEntry {
                    identifier,
                    out_degree: 0,
                    score: 0.0,
                });
        }
        Self { entries }
    }

    /// Append a fully described entry
    pub fn insert_entry(
        &mut self,
        identifier: impl Into<String>,
        out_degree: usize,
        score: f64,
    ) -> Result<usize, RankingError> {
        let identifier = identifier.into();
        if self.entries.contains_key(&identifier) {
            return Err(RankingError::DuplicateIdentifier(identifier));
        }
        let (index, _) = self.entries.insert_full(
            identifier.clone(),
            RankedEntry {
                identifier,
                out_degree,
                score,
            },
        );
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, identifier: &str) -> Option<&RankedEntry> {
        self.entries.get(identifier)
    }

    fn get_mut(&mut self, identifier: &str) -> Result<&mut RankedEntry, RankingError> {
        self.entries
            .get_mut(identifier)
            .ok_or_else(|| RankingError::UnknownIdentifier(identifier.to_string()))
    }

    /// Overwrite the score of a known identifier
    pub fn upsert_score(&mut self, identifier: &str, score: f64) -> Result<(), RankingError> {
        self.get_mut(identifier)?.score = score;
        Ok(())
    }

    pub fn set_out_degree(&mut self, identifier: &str, out_degree: usize) -> Result<(), RankingError> {
        self.get_mut(identifier)?.out_degree = out_degree;
        Ok(())
    }

    /// Position of `identifier` (its vertex index)
    pub fn index_of(&self, identifier: &str) -> Result<usize, RankingError> {
        self.entries
            .get_index_of(identifier)
            .ok_or_else(|| RankingError::UnknownIdentifier(identifier.to_string()))
    }

    pub fn identifier_at(&self, index: usize) -> Result<&str, RankingError> {
        self.entries
            .get_index(index)
            .map(|(identifier, _)| identifier.as_str())
            .ok_or(RankingError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &RankedEntry> {
        self.entries.values()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Copy of the entries, highest score first, ties by ascending identifier
    pub fn sorted_descending(&self) -> Vec<RankedEntry> {
        let mut sorted: Vec<RankedEntry> = self.entries.values().cloned().collect();
        sorted.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        sorted
    }
}

impl ScoreSink for RankedItemSet {
    fn publish(&mut self, vertex: NodeId, score: f64) -> Result<(), Box<dyn StdError + Send + Sync>> {
        let len = self.entries.len();
        let (_, entry) = self
            .entries
            .get_index_mut(vertex)
            .ok_or(RankingError::IndexOutOfRange { index: vertex, len })?;
        entry.score = score;
        Ok(())
    }
}
