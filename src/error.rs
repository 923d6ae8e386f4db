//! Error umbrella for loaders and the adapter layer

use crate::ranking::RankingError;
use linkrank_aggregation::AggregationError;
use linkrank_graph_algorithms::{GraphError, PageRankError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkRankError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{origin}:{line}: {message}")]
    Parse {
        origin: String,
        line: usize,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ranking error: {0}")]
    Ranking(#[from] RankingError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("PageRank error: {0}")]
    PageRank(#[from] PageRankError),

    #[error("Aggregation error: {0}")]
    Aggregation(#[from] AggregationError),
}

pub type LinkRankResult<T> = Result<T, LinkRankError>;

impl LinkRankError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Read a whole file, keeping its path in the error
pub(crate) fn read_to_string(path: &std::path::Path) -> LinkRankResult<String> {
    std::fs::read_to_string(path).map_err(|e| LinkRankError::io(path, e))
}
