pub mod common;
pub mod pagerank;
pub mod topology;

pub use common::{DirectedLinkGraph, GraphError, GraphResult, NodeId};
pub use pagerank::{
    weighted_page_rank, NoopSink, PageRankConfig, PageRankError, PageRankResult, ScoreSink,
};
pub use topology::{dangling_vertices, effective_out_degree, inlink_count, inlinks};
