//! Risk scoring
//!
//! Every node's score is `min(5, base_risk × multiplier)` where the multiplier
//! starts at 1 and grows with topological and attribute signals:
//! - agents with more than 15 connections: +1
//! - third parties with more than 5 high-weight connections: +2
//! - claims above 20 000: +0.5
//!
//! Scores are a pure function of base risks and the edge set. They live in a
//! [`RiskScores`] table next to the graph instead of on the nodes.

mod scored;

pub use scored::{NodeRisk, RiskScores, ScoredGraph};

use crate::algo;
use crate::graph::{FraudGraph, Node, NodeAttributes};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Thresholds and bonuses of the multiplier rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskRules {
    /// Edges heavier than this count as high-risk connections
    pub heavy_edge_weight: f64,
    pub agent_connection_threshold: usize,
    pub agent_bonus: f64,
    pub third_party_heavy_threshold: usize,
    pub third_party_bonus: f64,
    pub claim_amount_threshold: f64,
    pub claim_bonus: f64,
    /// Upper bound of every score
    pub max_score: f64,
}

impl Default for RiskRules {
    fn default() -> Self {
        Self {
            heavy_edge_weight: 3.0,
            agent_connection_threshold: 15,
            agent_bonus: 1.0,
            third_party_heavy_threshold: 5,
            third_party_bonus: 2.0,
            claim_amount_threshold: 20_000.0,
            claim_bonus: 0.5,
            max_score: 5.0,
        }
    }
}

impl RiskRules {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.max_score > 0.0) {
            return Err(format!("max_score must be positive, got {}", self.max_score));
        }
        let bonuses = [
            ("agent_bonus", self.agent_bonus),
            ("third_party_bonus", self.third_party_bonus),
            ("claim_bonus", self.claim_bonus),
        ];
        for (name, bonus) in bonuses {
            if !(bonus >= 0.0) {
                return Err(format!("{} must not be negative, got {}", name, bonus));
            }
        }
        Ok(())
    }
}

/// Computes the score table of a graph
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    rules: RiskRules,
}

impl RiskScorer {
    pub fn new(rules: RiskRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RiskRules {
        &self.rules
    }

    /// Score every node of the graph. Pure: the same graph always yields the same table.
    pub fn compute(&self, graph: &FraudGraph) -> RiskScores {
        let view = algo::build_view(graph, |_| true);
        let degrees = algo::degree_counts(&view, self.rules.heavy_edge_weight);

        let mut entries = IndexMap::with_capacity(graph.node_count());
        for (node, degree) in graph.nodes().zip(degrees) {
            let multiplier = self.multiplier(node, degree.total, degree.heavy);
            let risk_score = (node.base_risk * multiplier).clamp(0.0, self.rules.max_score);
            entries.insert(
                node.id.clone(),
                NodeRisk {
                    connection_count: degree.total,
                    high_risk_connection_count: degree.heavy,
                    multiplier,
                    risk_score,
                },
            );
        }

        debug!("Scored {} nodes over {} edges", entries.len(), graph.edge_count());
        RiskScores::from_entries(entries)
    }

    /// Score a graph and freeze the pair into a snapshot
    pub fn score(&self, graph: FraudGraph) -> ScoredGraph {
        let scores = self.compute(&graph);
        ScoredGraph::new(graph, scores, self.clone())
    }

    fn multiplier(&self, node: &Node, connections: usize, heavy: usize) -> f64 {
        let rules = &self.rules;
        let bonus = match &node.attributes {
            NodeAttributes::Agent(_) if connections > rules.agent_connection_threshold => {
                rules.agent_bonus
            }
            NodeAttributes::ThirdParty(_) if heavy > rules.third_party_heavy_threshold => {
                rules.third_party_bonus
            }
            NodeAttributes::Claim(claim) if claim.amount > rules.claim_amount_threshold => {
                rules.claim_bonus
            }
            NodeAttributes::Policy(_)
            | NodeAttributes::Agent(_)
            | NodeAttributes::ThirdParty(_)
            | NodeAttributes::Claim(_) => 0.0,
        };
        1.0 + bonus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        AgentAttributes, ClaimAttributes, ClaimStatus, Edge, NodeId, PolicyAttributes,
        Relationship, ThirdPartyAttributes,
    };
    use chrono::{NaiveDate, TimeZone, Utc};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()
    }

    fn agent(id: &str, base: f64) -> Node {
        Node::new(
            id,
            base,
            NodeAttributes::Agent(AgentAttributes {
                commission_rate: 0.12,
                total_policies: 0,
                specialty: "auto".to_string(),
                location: None,
            }),
        )
    }

    fn policy(id: &str, base: f64) -> Node {
        Node::new(
            id,
            base,
            NodeAttributes::Policy(PolicyAttributes {
                premium: 1000.0,
                coverage_type: "auto".to_string(),
                start_date: date(),
                holder_age: 30,
                location: None,
            }),
        )
    }

    fn claim(id: &str, base: f64, amount: f64) -> Node {
        Node::new(
            id,
            base,
            NodeAttributes::Claim(ClaimAttributes {
                amount,
                claim_type: "fire".to_string(),
                date: date(),
                status: ClaimStatus::Approved,
                policy_id: NodeId::new("POL-0"),
                location: None,
            }),
        )
    }

    fn third_party(id: &str, base: f64) -> Node {
        Node::new(
            id,
            base,
            NodeAttributes::ThirdParty(ThirdPartyAttributes {
                subtype: "repair_shop".to_string(),
                years_in_business: 2,
                location: None,
            }),
        )
    }

    fn edge(from: &str, to: &str, rel: Relationship, weight: f64) -> Edge {
        Edge::new(from, to, rel, Utc.with_ymd_and_hms(2024, 4, 2, 0, 0, 0).unwrap()).with_weight(weight)
    }

    #[test]
    fn test_agent_with_sixteen_policies_doubles() {
        let mut graph = FraudGraph::new();
        graph.insert_node(agent("AGT-1", 2.0)).unwrap();
        for i in 0..16 {
            let id = format!("POL-{}", i);
            graph.insert_node(policy(&id, 1.0)).unwrap();
            graph.insert_edge(edge("AGT-1", &id, Relationship::Manages, 1.0)).unwrap();
        }

        let scores = RiskScorer::default().compute(&graph);
        let risk = scores.get(&NodeId::new("AGT-1")).unwrap();
        assert_eq!(risk.connection_count, 16);
        assert_eq!(risk.high_risk_connection_count, 0);
        assert_eq!(risk.multiplier, 2.0);
        assert_eq!(risk.risk_score, 4.0);

        // policies have one connection each and keep their base risk
        assert_eq!(scores.risk_score(&NodeId::new("POL-3")), 1.0);
    }

    #[test]
    fn test_agent_at_threshold_is_unchanged() {
        let mut graph = FraudGraph::new();
        graph.insert_node(agent("AGT-1", 2.0)).unwrap();
        for i in 0..15 {
            let id = format!("POL-{}", i);
            graph.insert_node(policy(&id, 1.0)).unwrap();
            graph.insert_edge(edge("AGT-1", &id, Relationship::Manages, 1.0)).unwrap();
        }
        let scores = RiskScorer::default().compute(&graph);
        assert_eq!(scores.risk_score(&NodeId::new("AGT-1")), 2.0);
    }

    #[test]
    fn test_third_party_with_heavy_connections_triples_and_caps() {
        let mut graph = FraudGraph::new();
        graph.insert_node(third_party("TP-1", 1.5)).unwrap();
        graph.insert_node(third_party("TP-2", 1.5)).unwrap();
        for i in 0..6 {
            let id = format!("CLM-{}", i);
            graph.insert_node(claim(&id, 0.5, 100.0)).unwrap();
            graph.insert_edge(edge(&id, "TP-1", Relationship::Involves, 4.0)).unwrap();
            // weight exactly 3 is not heavy
            graph.insert_edge(edge(&id, "TP-2", Relationship::Involves, 3.0)).unwrap();
        }

        let scores = RiskScorer::default().compute(&graph);
        let tp1 = scores.get(&NodeId::new("TP-1")).unwrap();
        assert_eq!(tp1.high_risk_connection_count, 6);
        assert_eq!(tp1.multiplier, 3.0);
        assert_eq!(tp1.risk_score, 4.5);

        let tp2 = scores.get(&NodeId::new("TP-2")).unwrap();
        assert_eq!(tp2.high_risk_connection_count, 0);
        assert_eq!(tp2.risk_score, 1.5);

        let mut capped = graph.clone();
        capped.insert_node(third_party("TP-3", 4.0)).unwrap();
        for i in 0..6 {
            capped
                .insert_edge(edge(&format!("CLM-{}", i), "TP-3", Relationship::Involves, 4.0))
                .unwrap();
        }
        let scores = RiskScorer::default().compute(&capped);
        assert_eq!(scores.risk_score(&NodeId::new("TP-3")), 5.0);
    }

    #[test]
    fn test_large_claim_bonus() {
        let mut graph = FraudGraph::new();
        graph.insert_node(claim("CLM-big", 2.0, 20_000.01)).unwrap();
        graph.insert_node(claim("CLM-edge", 2.0, 20_000.0)).unwrap();

        let scores = RiskScorer::default().compute(&graph);
        assert_eq!(scores.risk_score(&NodeId::new("CLM-big")), 3.0);
        assert_eq!(scores.risk_score(&NodeId::new("CLM-edge")), 2.0);
    }

    #[test]
    fn test_isolated_node_keeps_base_risk() {
        let mut graph = FraudGraph::new();
        graph.insert_node(agent("AGT-1", 3.3)).unwrap();

        let scores = RiskScorer::default().compute(&graph);
        let risk = scores.get(&NodeId::new("AGT-1")).unwrap();
        assert_eq!(risk.connection_count, 0);
        assert_eq!(risk.multiplier, 1.0);
        assert_eq!(risk.risk_score, 3.3);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let mut graph = FraudGraph::new();
        graph.insert_node(agent("AGT-1", 4.9)).unwrap();
        graph.insert_node(third_party("TP-1", 4.9)).unwrap();
        graph
            .insert_edge(edge("AGT-1", "TP-1", Relationship::FrequentCollaboration, 4.5))
            .unwrap();

        let scorer = RiskScorer::default();
        assert_eq!(scorer.compute(&graph), scorer.compute(&graph));
    }

    #[test]
    fn test_empty_graph() {
        let scores = RiskScorer::default().compute(&FraudGraph::new());
        assert!(scores.is_empty());
    }

    #[test]
    fn test_rules_validation() {
        assert!(RiskRules::default().validate().is_ok());
        let rules = RiskRules {
            max_score: 0.0,
            ..RiskRules::default()
        };
        assert!(rules.validate().is_err());
    }
}
