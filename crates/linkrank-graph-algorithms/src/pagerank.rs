//! Weighted PageRank
//!
//! Power iteration where a page's authority is split across its out-links in
//! proportion to the in-link and out-link counts of each destination, rather
//! than evenly as in plain PageRank:
//!
//! ```text
//! rank[i][t] = (1-d)/N + d * Σ_{j ∈ inlinks(i)} rank[j][t-1] * W_in(j,i) * W_out(j,i)
//! W_in(j,i)  = inlinks(i) / Σ_{k: j→k} inlinks(k)
//! W_out(j,i) = out(i)     / Σ_{k: j→k} out(k)
//! ```
//!
//! `out(v)` is replaced by 0.5 for pages with no out-links, in both the
//! numerator and the denominator. The weights are not row-stochastic, so the
//! scores do not sum to one.

use super::common::{DirectedLinkGraph, GraphError, GraphResult, NodeId};
use super::topology::{effective_out_degree, inlink_count, inlinks};
use ndarray::{Array2, ShapeBuilder};
use std::error::Error as StdError;
use thiserror::Error;
use tracing::{debug, info};

/// Weighted PageRank configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PageRankConfig {
    /// Damping factor, strictly between 0 and 1
    pub damping_factor: f64,
    /// Stop once the summed absolute change of one iteration drops below this
    pub tolerance: f64,
    /// Size of the iteration budget, counting the initial ranks; at most
    /// `max_iterations - 1` updates are performed
    pub max_iterations: usize,
    /// Keep every iteration's ranks in [`PageRankResult::history`]. The
    /// history grows by one column per performed update.
    pub retain_history: bool,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            tolerance: 0.00001,
            max_iterations: 1000,
            retain_history: false,
        }
    }
}

/// Errors raised by the PageRank engine
#[derive(Error, Debug)]
pub enum PageRankError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("cannot allocate rank history for {vertices} vertices x {iterations} iterations")]
    AllocationFailure { vertices: usize, iterations: usize },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("failed to publish score of vertex {vertex}: {source}")]
    Publish {
        vertex: NodeId,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

/// Receives every freshly computed score while the engine runs.
///
/// The engine does not own the structure that displays the ranking; whoever
/// does implements this trait and maps the vertex back to its identifier.
pub trait ScoreSink {
    fn publish(
        &mut self,
        vertex: NodeId,
        score: f64,
    ) -> Result<(), Box<dyn StdError + Send + Sync>>;
}

/// Sink that discards all scores
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ScoreSink for NoopSink {
    fn publish(&mut self, _: NodeId, _: f64) -> Result<(), Box<dyn StdError + Send + Sync>> {
        Ok(())
    }
}

/// Result of a weighted PageRank computation
#[derive(Debug, Clone)]
pub struct PageRankResult {
    /// Final score of each vertex (indexed by vertex id)
    pub scores: Vec<f64>,
    /// Number of updates performed after the initial ranks
    pub iterations: usize,
    /// Summed absolute change of the last update (infinite if none ran)
    pub delta: f64,
    /// Whether the run stopped because `delta` fell below the tolerance
    pub converged: bool,
    /// `rank[v][t]`, shape `(vertices, iterations + 1)`, when retained
    pub history: Option<Array2<f64>>,
}

impl PageRankResult {
    /// Get the score for a specific vertex
    pub fn score(&self, vertex: NodeId) -> f64 {
        self.scores.get(vertex).copied().unwrap_or(0.0)
    }

    /// Rank of `vertex` at iteration `t`, if the history was retained
    pub fn rank_at(&self, vertex: NodeId, t: usize) -> Option<f64> {
        self.history.as_ref()?.get([vertex, t]).copied()
    }
}

/// One in-link of a vertex with its precomputed weights
#[derive(Debug, Clone, Copy)]
struct Contribution {
    source: NodeId,
    w_in: f64,
    w_out: f64,
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn validate(graph: &DirectedLinkGraph, config: &PageRankConfig) -> Result<(), PageRankError> {
    let d = config.damping_factor;
    if !(d > 0.0 && d < 1.0) {
        return Err(PageRankError::InvalidConfiguration(format!(
            "damping factor {} is outside (0, 1)",
            d
        )));
    }
    if !(config.tolerance.is_finite() && config.tolerance > 0.0) {
        return Err(PageRankError::InvalidConfiguration(format!(
            "tolerance {} must be positive",
            config.tolerance
        )));
    }
    if config.max_iterations < 1 {
        return Err(PageRankError::InvalidConfiguration(
            "max iterations must be at least 1".to_string(),
        ));
    }
    if graph.is_empty() {
        return Err(PageRankError::InvalidConfiguration(
            "graph has no vertices".to_string(),
        ));
    }
    Ok(())
}

/// Link weights only depend on the topology, which is fixed for the run
fn contributions(graph: &DirectedLinkGraph) -> GraphResult<Vec<Vec<Contribution>>> {
    let n = graph.vertex_count();

    let mut in_counts = Vec::with_capacity(n);
    let mut eff_out = Vec::with_capacity(n);
    for v in 0..n {
        in_counts.push(inlink_count(graph, v)? as f64);
        eff_out.push(effective_out_degree(graph, v)?);
    }

    let mut in_totals = vec![0.0; n];
    let mut out_totals = vec![0.0; n];
    for j in 0..n {
        for k in graph.successors(j)? {
            in_totals[j] += in_counts[k];
            out_totals[j] += eff_out[k];
        }
    }

    (0..n)
        .map(|i| -> GraphResult<Vec<Contribution>> {
            Ok(inlinks(graph, i)?
                .into_iter()
                .map(|j| Contribution {
                    source: j,
                    w_in: ratio(in_counts[i], in_totals[j]),
                    w_out: ratio(eff_out[i], out_totals[j]),
                })
                .collect())
        })
        .collect()
}

/// Append one iteration's scores to the iteration-major history buffer
fn record_history(history: &mut Vec<f64>, scores: &[f64]) -> Result<(), PageRankError> {
    history
        .try_reserve(scores.len())
        .map_err(|_| PageRankError::AllocationFailure {
            vertices: scores.len(),
            iterations: history.len() / scores.len().max(1) + 1,
        })?;
    history.extend_from_slice(scores);
    Ok(())
}

/// Run the weighted PageRank over `graph`.
///
/// Every computed score (including the initial `1/N`) is handed to `sink`
/// as soon as it exists.
pub fn weighted_page_rank<S: ScoreSink + ?Sized>(
    graph: &DirectedLinkGraph,
    config: &PageRankConfig,
    sink: &mut S,
) -> Result<PageRankResult, PageRankError> {
    validate(graph, config)?;

    let n = graph.vertex_count();
    let m = config.max_iterations;
    let d = config.damping_factor;
    let random_jump = (1.0 - d) / n as f64;

    let links = contributions(graph)?;

    let mut history: Option<Vec<f64>> = config.retain_history.then(Vec::new);

    let initial = 1.0 / n as f64;
    let mut previous = vec![initial; n];
    let mut current = vec![0.0; n];

    for (vertex, &score) in previous.iter().enumerate() {
        sink.publish(vertex, score)
            .map_err(|source| PageRankError::Publish { vertex, source })?;
    }
    if let Some(h) = history.as_mut() {
        record_history(h, &previous)?;
    }

    let mut delta = f64::INFINITY;
    let mut t = 0;

    while t + 1 < m && delta >= config.tolerance {
        for (i, incoming) in links.iter().enumerate() {
            let sum: f64 = incoming
                .iter()
                .map(|c| previous[c.source] * c.w_in * c.w_out)
                .sum();
            current[i] = random_jump + d * sum;

            sink.publish(i, current[i])
                .map_err(|source| PageRankError::Publish { vertex: i, source })?;
        }

        delta = current
            .iter()
            .zip(previous.iter())
            .map(|(c, p)| (c - p).abs())
            .sum();
        t += 1;

        if let Some(h) = history.as_mut() {
            record_history(h, &current)?;
        }

        debug!(iteration = t, delta, "weighted pagerank iteration");
        std::mem::swap(&mut previous, &mut current);
    }

    let converged = delta < config.tolerance;
    info!(
        vertices = n,
        iterations = t,
        converged,
        "weighted pagerank finished"
    );

    // Column t of the buffer holds iteration t
    let history = history
        .map(|h| Array2::from_shape_vec((n, t + 1).f(), h))
        .transpose()
        .map_err(|_| PageRankError::AllocationFailure {
            vertices: n,
            iterations: t + 1,
        })?;

    Ok(PageRankResult {
        scores: previous,
        iterations: t,
        delta,
        converged,
        history,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(damping_factor: f64, tolerance: f64, max_iterations: usize) -> PageRankConfig {
        PageRankConfig {
            damping_factor,
            tolerance,
            max_iterations,
            retain_history: true,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    /// 0 -> 1, 0 -> 2, 1 -> 2, 2 -> 0
    fn triangle() -> DirectedLinkGraph {
        let mut graph = DirectedLinkGraph::new(3);
        graph.insert_edge(0, 1).unwrap();
        graph.insert_edge(0, 2).unwrap();
        graph.insert_edge(1, 2).unwrap();
        graph.insert_edge(2, 0).unwrap();
        graph
    }

    #[derive(Default)]
    struct RecordingSink {
        published: Vec<(NodeId, f64)>,
    }

    impl ScoreSink for RecordingSink {
        fn publish(
            &mut self,
            vertex: NodeId,
            score: f64,
        ) -> Result<(), Box<dyn StdError + Send + Sync>> {
            self.published.push((vertex, score));
            Ok(())
        }
    }

    struct FailingSink;

    impl ScoreSink for FailingSink {
        fn publish(&mut self, _: NodeId, _: f64) -> Result<(), Box<dyn StdError + Send + Sync>> {
            Err("sink closed".into())
        }
    }

    #[test]
    fn test_initial_ranks() {
        let graph = triangle();
        let result = weighted_page_rank(&graph, &config(0.85, 1e-6, 50), &mut NoopSink).unwrap();
        for v in 0..3 {
            assert_close(result.rank_at(v, 0).unwrap(), 1.0 / 3.0);
        }
    }

    #[test]
    fn test_hand_computed_iterations() {
        let graph = triangle();
        let result = weighted_page_rank(&graph, &config(0.85, 1e-6, 3), &mut NoopSink).unwrap();
        assert_eq!(result.iterations, 2);

        assert_close(result.rank_at(0, 1).unwrap(), 0.05 + 0.85 / 3.0);
        assert_close(result.rank_at(1, 1).unwrap(), 0.05 + 0.85 / 18.0);
        assert_close(result.rank_at(2, 1).unwrap(), 0.42777777777777776);

        assert_close(result.score(0), 0.4136111111111111);
        assert_close(result.score(1), 0.09722222222222224);
        assert_close(result.score(2), 0.22708333333333336);
        assert_close(result.delta, 0.2809722222222222);
        assert!(!result.converged);
    }

    #[test]
    fn test_dangling_page_uses_half_out_degree() {
        // 0 -> 1, 0 -> 2, 1 -> 2; vertex 2 has no out-links
        let mut graph = DirectedLinkGraph::new(3);
        graph.insert_edge(0, 1).unwrap();
        graph.insert_edge(0, 2).unwrap();
        graph.insert_edge(1, 2).unwrap();

        let result = weighted_page_rank(&graph, &config(0.85, 1e-9, 3), &mut NoopSink).unwrap();
        assert_eq!(result.iterations, 2);

        // W_out(0, 2) = 0.5 / (1 + 0.5), W_out(1, 2) = 0.5 / 0.5
        let third = 1.0 / 3.0;
        let r1 = 0.05 + 0.85 * (third * (1.0 / 3.0) * (2.0 / 3.0));
        let r2 = 0.05 + 0.85 * (third * (2.0 / 3.0) * (0.5 / 1.5) + third);
        assert_close(result.rank_at(0, 1).unwrap(), 0.05);
        assert_close(result.rank_at(1, 1).unwrap(), 0.05 + 0.85 * 2.0 / 27.0);
        assert_close(result.rank_at(1, 1).unwrap(), r1);
        assert_close(result.rank_at(2, 1).unwrap(), 0.05 + 0.85 * 11.0 / 27.0);
        assert_close(result.rank_at(2, 1).unwrap(), r2);

        assert_close(result.score(2), 0.05 + 0.85 * (0.05 * 2.0 / 9.0 + r1));
    }

    #[test]
    fn test_huge_iteration_budget_converges() {
        // 0 -> 1 -> 2 -> 0 is already stationary at 1/N
        let mut graph = DirectedLinkGraph::new(3);
        graph.insert_edge(0, 1).unwrap();
        graph.insert_edge(1, 2).unwrap();
        graph.insert_edge(2, 0).unwrap();

        for retain_history in [false, true] {
            let cfg = PageRankConfig {
                max_iterations: 1_000_000_000,
                retain_history,
                ..PageRankConfig::default()
            };
            let result = weighted_page_rank(&graph, &cfg, &mut NoopSink).unwrap();
            assert!(result.converged);
            assert!(result.iterations <= 2);
            assert_eq!(result.history.is_some(), retain_history);
            if let Some(history) = &result.history {
                assert_eq!(history.dim(), (3, result.iterations + 1));
            }
        }

        let cfg = PageRankConfig {
            max_iterations: usize::MAX / 2,
            ..PageRankConfig::default()
        };
        assert!(weighted_page_rank(&graph, &cfg, &mut NoopSink).unwrap().converged);
    }

    #[test]
    fn test_history_is_off_by_default() {
        assert!(!PageRankConfig::default().retain_history);
    }

    #[test]
    fn test_stops_at_iteration_budget() {
        let graph = triangle();
        for m in 1..6 {
            let result =
                weighted_page_rank(&graph, &config(0.85, 1e-12, m), &mut NoopSink).unwrap();
            assert!(result.iterations <= m - 1);
            assert_eq!(result.history.as_ref().unwrap().ncols(), result.iterations + 1);
        }
    }

    #[test]
    fn test_single_iteration_budget_keeps_initial_ranks() {
        let graph = triangle();
        let result = weighted_page_rank(&graph, &config(0.85, 1e-6, 1), &mut NoopSink).unwrap();
        assert_eq!(result.iterations, 0);
        assert!(!result.converged);
        for v in 0..3 {
            assert_close(result.score(v), 1.0 / 3.0);
        }
    }

    #[test]
    fn test_edgeless_graph_converges_on_second_update() {
        let graph = DirectedLinkGraph::new(3);
        for m in [3, 10, 1000] {
            let result =
                weighted_page_rank(&graph, &config(0.85, 1e-9, m), &mut NoopSink).unwrap();
            assert_eq!(result.iterations, 2);
            assert!(result.converged);
            assert_eq!(result.delta, 0.0);
            for v in 0..3 {
                assert_close(result.score(v), 0.15 / 3.0);
            }
        }
    }

    #[test]
    fn test_single_vertex_stops_after_one_update() {
        let graph = DirectedLinkGraph::new(1);
        for m in [2, 50] {
            let result =
                weighted_page_rank(&graph, &config(0.85, 0.9, m), &mut NoopSink).unwrap();
            assert_eq!(result.iterations, 1);
            assert!(result.converged);
            assert_close(result.score(0), 0.15);
        }
    }

    #[test]
    fn test_vertex_without_inlinks_keeps_random_jump() {
        // 0 -> 1 -> 2 -> 1: nothing points at 0
        let mut graph = DirectedLinkGraph::new(3);
        graph.insert_edge(0, 1).unwrap();
        graph.insert_edge(1, 2).unwrap();
        graph.insert_edge(2, 1).unwrap();

        let result = weighted_page_rank(&graph, &config(0.8, 1e-10, 40), &mut NoopSink).unwrap();
        let history = result.history.as_ref().unwrap();
        for t in 1..=result.iterations {
            assert_close(history[[0, t]], 0.2 / 3.0);
        }
        assert!(result.scores.iter().all(|s| s.is_finite() && *s >= 0.0));
    }

    #[test]
    fn test_self_loops_do_not_contribute() {
        let mut looped = triangle();
        looped.insert_edge(1, 1).unwrap();

        let cfg = config(0.85, 1e-6, 2);
        let result = weighted_page_rank(&looped, &cfg, &mut NoopSink).unwrap();
        // Vertex 1 still only receives from 0, but its own out-degree grew
        // and 0's weight denominators changed with it.
        assert!(result.scores.iter().all(|s| s.is_finite()));
        assert_close(result.score(0), 0.05 + 0.85 / 3.0);
    }

    #[test]
    fn test_sink_receives_every_score() {
        let graph = triangle();
        let mut sink = RecordingSink::default();
        let result = weighted_page_rank(&graph, &config(0.85, 1e-6, 3), &mut sink).unwrap();

        // initial ranks + two updates of three vertices
        assert_eq!(sink.published.len(), 9);
        let last: Vec<f64> = sink.published[6..].iter().map(|&(_, s)| s).collect();
        assert_eq!(last, result.scores);
    }

    #[test]
    fn test_sink_failure_aborts() {
        let graph = triangle();
        let err = weighted_page_rank(&graph, &config(0.85, 1e-6, 3), &mut FailingSink).unwrap_err();
        assert!(matches!(err, PageRankError::Publish { vertex: 0, .. }));
    }

    #[test]
    fn test_history_can_be_dropped() {
        let graph = triangle();
        let mut cfg = config(0.85, 1e-6, 3);
        cfg.retain_history = false;
        let result = weighted_page_rank(&graph, &cfg, &mut NoopSink).unwrap();
        assert!(result.history.is_none());
        assert_eq!(result.rank_at(0, 0), None);
        assert_close(result.score(0), 0.4136111111111111);
    }

    #[test]
    fn test_invalid_configuration() {
        let graph = triangle();
        for bad in [
            config(0.0, 1e-6, 10),
            config(1.0, 1e-6, 10),
            config(f64::NAN, 1e-6, 10),
            config(0.85, 0.0, 10),
            config(0.85, 1e-6, 0),
        ] {
            let err = weighted_page_rank(&graph, &bad, &mut NoopSink).unwrap_err();
            assert!(matches!(err, PageRankError::InvalidConfiguration(_)));
        }

        let empty = DirectedLinkGraph::new(0);
        let err = weighted_page_rank(&empty, &config(0.85, 1e-6, 10), &mut NoopSink).unwrap_err();
        assert!(matches!(err, PageRankError::InvalidConfiguration(_)));
    }
}
