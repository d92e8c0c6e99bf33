use super::{descending, PatternThresholds};
use crate::graph::{NodeId, NodeKind, Relationship};
use crate::scoring::ScoredGraph;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// An agent managing many policies or carrying a high score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCluster {
    pub agent_id: NodeId,
    pub policy_count: usize,
    pub claim_count: usize,
    /// Mean amount over the claims of every managed policy, rounded; 0 without claims
    pub average_claim_amount: f64,
    pub risk_score: f64,
    pub location: Option<String>,
    pub specialty: String,
}

pub fn agent_clusters(scored: &ScoredGraph, thresholds: &PatternThresholds) -> Vec<AgentCluster> {
    let graph = scored.graph();
    let mut findings = Vec::new();

    for node in graph.nodes_by_kind(NodeKind::Agent) {
        let Some(attributes) = node.as_agent() else {
            continue;
        };

        let policies: IndexSet<&NodeId> = graph
            .outgoing_edges(&node.id)
            .filter(|e| e.relationship == Relationship::Manages)
            .map(|e| &e.target)
            .filter(|id| graph.get_node(id).is_some_and(|n| n.kind() == NodeKind::Policy))
            .collect();

        let risk_score = scored.risk_score(&node.id);
        if policies.len() <= thresholds.agent_policy_count && risk_score <= thresholds.agent_risk {
            continue;
        }

        let claims: IndexSet<&NodeId> = policies
            .iter()
            .flat_map(|policy| graph.outgoing_edges(policy))
            .filter(|e| e.relationship == Relationship::HasClaim)
            .map(|e| &e.target)
            .collect();
        let total: f64 = claims
            .iter()
            .filter_map(|id| graph.get_node(id))
            .filter_map(|n| n.claim_amount())
            .sum();
        let average_claim_amount = if claims.is_empty() {
            0.0
        } else {
            (total / claims.len() as f64).round()
        };

        findings.push(AgentCluster {
            agent_id: node.id.clone(),
            policy_count: policies.len(),
            claim_count: claims.len(),
            average_claim_amount,
            risk_score,
            location: node.location().map(str::to_string),
            specialty: attributes.specialty.clone(),
        });
    }

    findings.sort_by(|a, b| descending(a.risk_score, b.risk_score));
    findings
}
