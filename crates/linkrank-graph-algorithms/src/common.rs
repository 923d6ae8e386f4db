//! Shared graph structure for the ranking algorithms
//!
//! Provides a dense, integer-indexed directed graph over a fixed vertex set,
//! stored as an adjacency matrix. Degree queries are O(V) row or column scans.

use ndarray::Array2;
use std::fmt;
use thiserror::Error;

/// Vertex identifier (dense index, assigned in first-seen order by the loader)
pub type NodeId = usize;

/// Errors raised by graph operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("vertex {vertex} out of range (graph has {vertex_count} vertices)")]
    VertexOutOfRange { vertex: NodeId, vertex_count: usize },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Directed graph backed by an adjacency matrix.
///
/// Row = source, column = destination. An entry is either 0 or 1, so parallel
/// edges cannot exist. Self-loops are representable; keeping them out is the
/// loader's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectedLinkGraph {
    edges: Array2<u8>,
    edge_count: usize,
}

impl DirectedLinkGraph {
    /// Create a graph with `vertex_count` vertices and no edges
    pub fn new(vertex_count: usize) -> Self {
        Self {
            edges: Array2::zeros((vertex_count, vertex_count)),
            edge_count: 0,
        }
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.edges.nrows()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }

    fn check(&self, vertex: NodeId) -> GraphResult<()> {
        if vertex < self.vertex_count() {
            Ok(())
        } else {
            Err(GraphError::VertexOutOfRange {
                vertex,
                vertex_count: self.vertex_count(),
            })
        }
    }

    /// Insert the edge `src -> dst`.
    ///
    /// Returns `Ok(false)` and leaves the graph untouched when the edge is
    /// already present.
    pub fn insert_edge(&mut self, src: NodeId, dst: NodeId) -> GraphResult<bool> {
        self.check(src)?;
        self.check(dst)?;

        let cell = &mut self.edges[[src, dst]];
        if *cell != 0 {
            return Ok(false);
        }
        *cell = 1;
        self.edge_count += 1;
        Ok(true)
    }

    /// Remove the edge `src -> dst`. Returns `Ok(false)` if it was absent.
    pub fn remove_edge(&mut self, src: NodeId, dst: NodeId) -> GraphResult<bool> {
        self.check(src)?;
        self.check(dst)?;

        let cell = &mut self.edges[[src, dst]];
        if *cell == 0 {
            return Ok(false);
        }
        *cell = 0;
        self.edge_count -= 1;
        Ok(true)
    }

    /// Whether the edge `src -> dst` exists
    pub fn is_adjacent(&self, src: NodeId, dst: NodeId) -> GraphResult<bool> {
        self.check(src)?;
        self.check(dst)?;
        Ok(self.has_edge(src, dst))
    }

    /// Unchecked edge test for algorithm inner loops. Panics on out-of-range
    /// indices, like slice indexing.
    #[inline]
    pub fn has_edge(&self, src: NodeId, dst: NodeId) -> bool {
        self.edges[[src, dst]] != 0
    }

    /// Number of outgoing edges of `vertex` (row scan)
    pub fn out_degree(&self, vertex: NodeId) -> GraphResult<usize> {
        self.check(vertex)?;
        Ok(self.edges.row(vertex).iter().filter(|&&e| e != 0).count())
    }

    /// Number of incoming edges of `vertex` (column scan), self-loop included
    pub fn in_degree(&self, vertex: NodeId) -> GraphResult<usize> {
        self.check(vertex)?;
        Ok(self.edges.column(vertex).iter().filter(|&&e| e != 0).count())
    }

    /// Destinations of edges leaving `vertex`, ascending
    pub fn successors(&self, vertex: NodeId) -> GraphResult<Vec<NodeId>> {
        self.check(vertex)?;
        Ok(self
            .edges
            .row(vertex)
            .iter()
            .enumerate()
            .filter(|(_, &e)| e != 0)
            .map(|(dst, _)| dst)
            .collect())
    }

    /// Sources of edges entering `vertex`, ascending
    pub fn predecessors(&self, vertex: NodeId) -> GraphResult<Vec<NodeId>> {
        self.check(vertex)?;
        Ok(self
            .edges
            .column(vertex)
            .iter()
            .enumerate()
            .filter(|(_, &e)| e != 0)
            .map(|(src, _)| src)
            .collect())
    }
}

impl fmt::Display for DirectedLinkGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of vertices: {}", self.vertex_count())?;
        writeln!(f, "Number of edges: {}", self.edge_count)?;
        write!(f, "   |")?;
        for col in 0..self.vertex_count() {
            write!(f, "{} | ", col)?;
        }
        writeln!(f)?;
        for (src, row) in self.edges.outer_iter().enumerate() {
            write!(f, "{} | ", src)?;
            for &cell in row.iter() {
                if cell != 0 {
                    write!(f, "{} | ", cell)?;
                } else {
                    write!(f, "  | ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
