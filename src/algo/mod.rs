//! Ranking pipelines
//!
//! Wires the loaders to the engines. Paths come from [`LinkRankConfig`];
//! the engines only ever see in-memory graphs and rankings.

use crate::config::LinkRankConfig;
use crate::corpus::{build_link_graph, load_rankings, Collection};
use crate::error::{read_to_string, LinkRankResult};
use crate::ranking::{RankedEntry, RankedItemSet};
use crate::search::{parse_page_rank_list, rank_search_results, InvertedIndex, SearchHit};
use linkrank_aggregation::{
    AggregationConfig, AggregationResult, CancellationToken, ScaledFootruleAggregator,
};
use linkrank_graph_algorithms::{
    dangling_vertices, weighted_page_rank, DirectedLinkGraph, PageRankConfig,
};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Outcome of a PageRank run over a collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRankReport {
    /// Highest score first
    pub entries: Vec<RankedEntry>,
    /// Pages without out-links, in collection order
    pub dangling: Vec<String>,
    pub iterations: usize,
    pub converged: bool,
    pub delta: f64,
}

/// Load the collection and its link files, then rank every page
pub fn page_rank_collection(config: &LinkRankConfig) -> LinkRankResult<PageRankReport> {
    let corpus = &config.corpus;
    let collection = Collection::load(&corpus.collection_path)?;
    let graph = build_link_graph(&collection, &corpus.pages_dir, &corpus.link_extension)?;
    page_rank_graph(&collection, &graph, &config.pagerank)
}

/// Rank the pages of an already built link graph
pub fn page_rank_graph(
    collection: &Collection,
    graph: &DirectedLinkGraph,
    config: &PageRankConfig,
) -> LinkRankResult<PageRankReport> {
    let mut ranked = RankedItemSet::from_identifiers(collection.urls());
    for (vertex, url) in collection.urls().enumerate() {
        ranked.set_out_degree(url, graph.out_degree(vertex)?)?;
    }

    let dangling: Vec<String> = dangling_vertices(graph)
        .into_iter()
        .filter_map(|vertex| collection.url(vertex).map(str::to_string))
        .collect();
    debug!(pages = ?dangling, "pages without out-links");

    let result = weighted_page_rank(graph, config, &mut ranked)?;
    info!(
        pages = ranked.len(),
        iterations = result.iterations,
        converged = result.converged,
        "page rank finished"
    );

    Ok(PageRankReport {
        entries: ranked.sorted_descending(),
        dangling,
        iterations: result.iterations,
        converged: result.converged,
        delta: result.delta,
    })
}

/// Aggregate the rankings stored in `paths`
pub fn aggregate_files<P: AsRef<Path>>(
    paths: &[P],
    config: &AggregationConfig,
    cancellation: Option<CancellationToken>,
) -> LinkRankResult<AggregationResult> {
    let rankings = load_rankings(paths)?;

    let mut aggregator = ScaledFootruleAggregator::new(config.clone());
    if let Some(token) = cancellation {
        aggregator = aggregator.with_cancellation(token);
    }

    let result = aggregator.aggregate(&rankings)?;
    info!(
        rankings = rankings.len(),
        items = result.ordering.len(),
        distance = result.distance,
        "aggregation finished"
    );
    Ok(result)
}

/// Rank the pages matching `terms`, using the stored PageRank list and
/// inverted index
pub fn search_collection<S: AsRef<str>>(
    terms: &[S],
    config: &LinkRankConfig,
) -> LinkRankResult<Vec<SearchHit>> {
    let list_path = &config.corpus.page_rank_list_path;
    let pages = parse_page_rank_list(
        &list_path.display().to_string(),
        &read_to_string(list_path)?,
    )?;
    let index = InvertedIndex::parse(&read_to_string(&config.corpus.inverted_index_path)?);

    let hits = rank_search_results(&pages, &index, terms, config.search.max_results);
    info!(terms = terms.len(), hits = hits.len(), "search finished");
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::build_link_graph_with;

    #[test]
    fn test_page_rank_graph_sets_out_degrees() {
        let collection = Collection::parse("url1 url2 url3");
        let links = ["url2 url3", "url3", ""];
        let graph = build_link_graph_with(&collection, |url| {
            let index = collection.index_of(url).unwrap();
            Ok(links[index].to_string())
        })
        .unwrap();

        let report = page_rank_graph(&collection, &graph, &PageRankConfig::default()).unwrap();
        assert_eq!(report.entries.len(), 3);

        let url1 = report.entries.iter().find(|e| e.identifier == "url1").unwrap();
        assert_eq!(url1.out_degree, 2);
        assert!(report
            .entries
            .windows(2)
            .all(|pair| pair[0].score >= pair[1].score));
        // url3 collects links from both other pages
        assert_eq!(report.entries[0].identifier, "url3");
        assert_eq!(report.dangling, vec!["url3"]);
    }

    #[test]
    fn test_page_rank_graph_with_huge_iteration_budget() {
        let collection = Collection::parse("url1 url2 url3");
        let links = ["url2", "url3", "url1"];
        let graph = build_link_graph_with(&collection, |url| {
            let index = collection.index_of(url).unwrap();
            Ok(links[index].to_string())
        })
        .unwrap();

        let config = PageRankConfig {
            max_iterations: 1_000_000_000,
            ..PageRankConfig::default()
        };
        let report = page_rank_graph(&collection, &graph, &config).unwrap();
        assert!(report.converged);
        assert!(report.iterations <= 2);
        assert!(report.dangling.is_empty());
        for entry in &report.entries {
            assert!((entry.score - 1.0 / 3.0).abs() < 1e-9);
        }
    }
}
