use super::{descending, PatternThresholds};
use crate::algo::{self, weakly_connected_components};
use crate::graph::{NodeId, NodeKind, Relationship};
use crate::scoring::ScoredGraph;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Agents and third parties tied together by frequent collaboration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudRing {
    /// Members in graph order
    pub members: Vec<NodeId>,
    pub agents: Vec<NodeId>,
    pub third_parties: Vec<NodeId>,
    pub edge_count: usize,
    pub total_weight: f64,
    pub average_weight: f64,
    pub average_risk: f64,
}

/// Weakly connected components of the collaboration subgraph with at least
/// `min_ring_size` members, heaviest ring first
pub fn fraud_rings(scored: &ScoredGraph, thresholds: &PatternThresholds) -> Vec<FraudRing> {
    let graph = scored.graph();
    let view = algo::build_view(graph, |e| {
        e.relationship == Relationship::FrequentCollaboration
    });
    if view.edge_count() == 0 {
        return Vec::new();
    }
    let components = weakly_connected_components(&view);

    let mut rings: Vec<FraudRing> = components
        .components_of_size(thresholds.min_ring_size)
        .map(|component| {
            let members: Vec<NodeId> = component
                .iter()
                .filter_map(|&idx| algo::node_id_at(graph, idx))
                .cloned()
                .collect();
            let member_set: FxHashSet<&NodeId> = members.iter().collect();

            let weights: Vec<f64> = graph
                .edges()
                .iter()
                .filter(|e| {
                    e.relationship == Relationship::FrequentCollaboration
                        && member_set.contains(&e.source)
                })
                .map(|e| e.weight)
                .collect();
            let total_weight: f64 = weights.iter().sum();

            let of_kind = |kind: NodeKind| -> Vec<NodeId> {
                members
                    .iter()
                    .filter(|id| graph.get_node(id).is_some_and(|n| n.kind() == kind))
                    .cloned()
                    .collect()
            };
            let total_risk: f64 = members.iter().map(|id| scored.risk_score(id)).sum();

            FraudRing {
                agents: of_kind(NodeKind::Agent),
                third_parties: of_kind(NodeKind::ThirdParty),
                edge_count: weights.len(),
                total_weight,
                average_weight: total_weight / weights.len().max(1) as f64,
                average_risk: total_risk / members.len().max(1) as f64,
                members,
            }
        })
        .collect();

    rings.sort_by(|a, b| descending(a.total_weight, b.total_weight));
    rings
}
