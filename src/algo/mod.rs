//! Graph algorithms module
//!
//! Kernels live in the `claimgraph-algorithms` crate, which knows nothing about
//! fraud entities. This module projects a [`FraudGraph`] onto its dense
//! `GraphView` and maps results back to node ids.

use crate::graph::{Edge, FraudGraph, NodeId};
use claimgraph_algorithms::{GraphView, NodeId as AlgoNodeId};

// Re-export algorithms
pub use claimgraph_algorithms::{
    degree_counts, population_summary, weakly_connected_components, DegreeCount, Summary,
    WccResult,
};

/// Build a GraphView over every node of the graph, keeping the edges accepted
/// by `edge_filter`.
///
/// Dense index `i` (and algorithm node id `i`) is the node's insertion position,
/// so results translate back through [`node_id_at`].
pub fn build_view<F>(graph: &FraudGraph, edge_filter: F) -> GraphView
where
    F: Fn(&Edge) -> bool,
{
    let nodes: Vec<AlgoNodeId> = (0..graph.node_count() as AlgoNodeId).collect();

    let edges: Vec<(usize, usize, f64)> = graph
        .edges()
        .iter()
        .filter(|e| edge_filter(e))
        .filter_map(|e| {
            let u = graph.node_index(&e.source)?;
            let v = graph.node_index(&e.target)?;
            Some((u, v, e.weight))
        })
        .collect();

    GraphView::from_edges(nodes, &edges)
}

/// Translate an algorithm node id produced by [`build_view`] back to a graph node id
pub fn node_id_at(graph: &FraudGraph, algo_id: AlgoNodeId) -> Option<&NodeId> {
    graph.node_at(algo_id as usize).map(|n| &n.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AgentAttributes, Node, NodeAttributes, Relationship};
    use chrono::{TimeZone, Utc};

    fn agent(id: &str) -> Node {
        Node::new(
            id,
            1.0,
            NodeAttributes::Agent(AgentAttributes {
                commission_rate: 0.1,
                total_policies: 0,
                specialty: "auto".to_string(),
                location: None,
            }),
        )
    }

    #[test]
    fn test_graph_view_projection() {
        let mut graph = FraudGraph::new();
        for id in ["A", "B", "C"] {
            graph.insert_node(agent(id)).unwrap();
        }
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        graph
            .insert_edge(Edge::new("A", "B", Relationship::FrequentCollaboration, ts).with_weight(4.0))
            .unwrap();
        graph
            .insert_edge(Edge::new("B", "C", Relationship::Manages, ts))
            .unwrap();

        let view = build_view(&graph, |_| true);
        assert_eq!(view.node_count, 3);
        assert_eq!(view.edge_count(), 2);
        assert_eq!(view.successors(0), &[1]);
        assert_eq!(view.out_edge_weights(0), &[4.0]);

        let collab = build_view(&graph, |e| e.relationship == Relationship::FrequentCollaboration);
        assert_eq!(collab.node_count, 3);
        assert_eq!(collab.edge_count(), 1);

        assert_eq!(node_id_at(&graph, 2).map(|id| id.as_str()), Some("C"));
        assert_eq!(node_id_at(&graph, 3), None);
    }
}
