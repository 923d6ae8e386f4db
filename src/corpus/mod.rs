//! Corpus loaders
//!
//! Read the page collection, the per-page link files and the ranking files
//! consumed by the aggregator. Nothing here ranks anything.

pub mod collection;
pub mod rankings;

pub use collection::{build_link_graph, build_link_graph_with, parse_link_file, Collection};
pub use rankings::{load_ranking, load_rankings, parse_ranking};
