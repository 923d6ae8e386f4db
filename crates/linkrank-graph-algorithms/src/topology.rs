//! Link topology helpers used by the weighted PageRank
//!
//! In-link counts here ignore self-loops; out-degrees count every edge in the
//! row. Both follow the weighting rules of the ranking formula.

use super::common::{DirectedLinkGraph, GraphResult, NodeId};

/// Out-degree substituted for pages without out-links
pub const DANGLING_OUT_DEGREE: f64 = 0.5;

/// Distinct predecessors of `vertex`, excluding `vertex` itself
pub fn inlinks(graph: &DirectedLinkGraph, vertex: NodeId) -> GraphResult<Vec<NodeId>> {
    Ok(graph
        .predecessors(vertex)?
        .into_iter()
        .filter(|&src| src != vertex)
        .collect())
}

/// Number of distinct predecessors of `vertex`, excluding `vertex` itself
pub fn inlink_count(graph: &DirectedLinkGraph, vertex: NodeId) -> GraphResult<usize> {
    let with_self = graph.in_degree(vertex)?;
    Ok(if graph.has_edge(vertex, vertex) {
        with_self - 1
    } else {
        with_self
    })
}

/// Out-degree of `vertex`, or [`DANGLING_OUT_DEGREE`] when it has none
pub fn effective_out_degree(graph: &DirectedLinkGraph, vertex: NodeId) -> GraphResult<f64> {
    let out = graph.out_degree(vertex)?;
    Ok(if out == 0 {
        DANGLING_OUT_DEGREE
    } else {
        out as f64
    })
}

/// Vertices with no out-links
pub fn dangling_vertices(graph: &DirectedLinkGraph) -> Vec<NodeId> {
    (0..graph.vertex_count())
        .filter(|&v| (0..graph.vertex_count()).all(|dst| !graph.has_edge(v, dst)))
        .collect()
}
