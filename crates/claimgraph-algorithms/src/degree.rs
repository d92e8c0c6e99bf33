//! Degree counting over weighted views

use super::common::GraphView;

/// Incident edge counts for one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DegreeCount {
    /// Edges where the node is source or target
    pub total: usize,
    /// Subset of `total` whose weight is strictly above the threshold
    pub heavy: usize,
}

/// Count incident edges per node, aligned with the view's dense indices.
///
/// Direction is ignored. A self-loop contributes twice, once per endpoint.
pub fn degree_counts(view: &GraphView, heavy_threshold: f64) -> Vec<DegreeCount> {
    (0..view.node_count)
        .map(|idx| {
            let heavy = view
                .out_edge_weights(idx)
                .iter()
                .chain(view.in_edge_weights(idx))
                .filter(|&&w| w > heavy_threshold)
                .count();

            DegreeCount {
                total: view.out_degree(idx) + view.in_degree(idx),
                heavy,
            }
        })
        .collect()
}
