//! Linkrank
//!
//! Relevance rankings over a small, fixed corpus of hyperlinked text pages.
//!
//! # Components
//!
//! - Weighted PageRank over the corpus link graph
//!   (`linkrank-graph-algorithms`), published into a [`RankedItemSet`]
//! - Scaled-footrule rank aggregation of several rankings of the same items
//!   (`linkrank-aggregation`)
//! - Search ranking that combines keyword matches from an inverted index
//!   with previously computed PageRank scores
//!
//! The engines never touch the filesystem; the [`corpus`] and [`search`]
//! loaders read the inputs and [`algo`] wires everything together.
//!
//! ## Example Usage
//!
//! ```rust
//! use linkrank::{DirectedLinkGraph, PageRankConfig, RankedItemSet, weighted_page_rank};
//!
//! let mut graph = DirectedLinkGraph::new(3);
//! graph.insert_edge(0, 1).unwrap();
//! graph.insert_edge(1, 2).unwrap();
//! graph.insert_edge(2, 0).unwrap();
//!
//! let mut ranked = RankedItemSet::from_identifiers(["url1", "url2", "url3"]);
//! let result = weighted_page_rank(&graph, &PageRankConfig::default(), &mut ranked).unwrap();
//! assert!(result.converged);
//!
//! let sorted = ranked.sorted_descending();
//! assert_eq!(sorted.len(), 3);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod corpus;
pub mod error;
pub mod ranking;
pub mod search;

// Re-export main types for convenience
pub use config::{CorpusConfig, LinkRankConfig, SearchConfig};
pub use error::{LinkRankError, LinkRankResult};
pub use ranking::{RankedEntry, RankedItemSet, RankingError};
pub use search::{InvertedIndex, SearchHit};

pub use linkrank_graph_algorithms::{
    weighted_page_rank, DirectedLinkGraph, GraphError, NodeId, NoopSink, PageRankConfig,
    PageRankError, PageRankResult, ScoreSink,
};

pub use linkrank_aggregation::{
    AggregationConfig, AggregationError, AggregationResult, CancellationToken, Ranking,
    ScaledFootruleAggregator, UnionSet,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
