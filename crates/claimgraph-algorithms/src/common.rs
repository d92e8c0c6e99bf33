//! Shared utilities for graph algorithms
//!
//! Provides a read-only, dense view of the graph topology for algorithm execution.

use std::collections::HashMap;

/// Node Identifier type (u64)
///
/// Callers map their own identifiers onto these before projecting a view.
pub type NodeId = u64;

/// A dense, integer-indexed view of the graph topology using Compressed Sparse Row (CSR) format.
///
/// Every edge is stored twice: once in the outgoing rows of its source and once
/// in the incoming rows of its target, each copy carrying the edge weight.
#[derive(Debug, Clone)]
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,
    /// Mapping from dense index (0..N) back to NodeId
    pub index_to_node: Vec<NodeId>,
    /// Mapping from NodeId to dense index
    pub node_to_index: HashMap<NodeId, usize>,

    /// Offsets into `out_targets`. Size = node_count + 1
    pub out_offsets: Vec<usize>,
    /// Contiguous array of target node indices
    pub out_targets: Vec<usize>,
    /// Edge weights, aligned with `out_targets`
    pub out_weights: Vec<f64>,

    /// Offsets into `in_sources`. Size = node_count + 1
    pub in_offsets: Vec<usize>,
    /// Contiguous array of source node indices
    pub in_sources: Vec<usize>,
    /// Edge weights, aligned with `in_sources`
    pub in_weights: Vec<f64>,
}

impl GraphView {
    /// Build a view from a node list and `(source_index, target_index, weight)` triples.
    ///
    /// Edges referring to an index outside `0..nodes.len()` are skipped.
    pub fn from_edges(nodes: Vec<NodeId>, edges: &[(usize, usize, f64)]) -> Self {
        let node_count = nodes.len();
        let node_to_index: HashMap<NodeId, usize> =
            nodes.iter().enumerate().map(|(idx, &id)| (id, idx)).collect();

        let mut outgoing: Vec<Vec<(usize, f64)>> = vec![Vec::new(); node_count];
        let mut incoming: Vec<Vec<(usize, f64)>> = vec![Vec::new(); node_count];

        for &(u, v, w) in edges {
            if u >= node_count || v >= node_count {
                continue;
            }
            outgoing[u].push((v, w));
            incoming[v].push((u, w));
        }

        let (out_offsets, out_targets, out_weights) = flatten(outgoing);
        let (in_offsets, in_sources, in_weights) = flatten(incoming);

        GraphView {
            node_count,
            index_to_node: nodes,
            node_to_index,
            out_offsets,
            out_targets,
            out_weights,
            in_offsets,
            in_sources,
            in_weights,
        }
    }

    /// Get the out-degree of a node (by index)
    pub fn out_degree(&self, idx: usize) -> usize {
        self.out_offsets[idx + 1] - self.out_offsets[idx]
    }

    /// Get the in-degree of a node (by index)
    pub fn in_degree(&self, idx: usize) -> usize {
        self.in_offsets[idx + 1] - self.in_offsets[idx]
    }

    /// Get outgoing neighbors (successors) of a node
    pub fn successors(&self, idx: usize) -> &[usize] {
        &self.out_targets[self.out_offsets[idx]..self.out_offsets[idx + 1]]
    }

    /// Get incoming neighbors (predecessors) of a node
    pub fn predecessors(&self, idx: usize) -> &[usize] {
        &self.in_sources[self.in_offsets[idx]..self.in_offsets[idx + 1]]
    }

    /// Weights of the outgoing edges of a node
    pub fn out_edge_weights(&self, idx: usize) -> &[f64] {
        &self.out_weights[self.out_offsets[idx]..self.out_offsets[idx + 1]]
    }

    /// Weights of the incoming edges of a node
    pub fn in_edge_weights(&self, idx: usize) -> &[f64] {
        &self.in_weights[self.in_offsets[idx]..self.in_offsets[idx + 1]]
    }

    /// Total number of edges in the view
    pub fn edge_count(&self) -> usize {
        self.out_targets.len()
    }
}

fn flatten(rows: Vec<Vec<(usize, f64)>>) -> (Vec<usize>, Vec<usize>, Vec<f64>) {
    let mut offsets = Vec::with_capacity(rows.len() + 1);
    let mut targets = Vec::new();
    let mut weights = Vec::new();

    offsets.push(0);
    for row in rows {
        for (target, weight) in row {
            targets.push(target);
            weights.push(weight);
        }
        offsets.push(targets.len());
    }

    (offsets, targets, weights)
}
