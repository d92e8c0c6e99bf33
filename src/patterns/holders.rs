use super::PatternThresholds;
use crate::graph::{NodeId, NodeKind, Relationship};
use crate::scoring::ScoredGraph;
use serde::{Deserialize, Serialize};

/// A policy that has accumulated an unusual number of claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyClaimPattern {
    pub policy_id: NodeId,
    pub claim_count: usize,
    pub total_claimed: f64,
    pub risk_score: f64,
    pub location: Option<String>,
}

/// Policies with more than `policy_claim_count` claims, most claims first
pub fn policy_claim_patterns(
    scored: &ScoredGraph,
    thresholds: &PatternThresholds,
) -> Vec<PolicyClaimPattern> {
    let graph = scored.graph();
    let mut findings: Vec<PolicyClaimPattern> = graph
        .nodes_by_kind(NodeKind::Policy)
        .filter_map(|node| {
            let claims: Vec<f64> = graph
                .neighbors(&node.id, Relationship::HasClaim)
                .filter_map(|claim| claim.claim_amount())
                .collect();
            (claims.len() > thresholds.policy_claim_count).then(|| PolicyClaimPattern {
                policy_id: node.id.clone(),
                claim_count: claims.len(),
                total_claimed: claims.iter().sum(),
                risk_score: scored.risk_score(&node.id),
                location: node.location().map(str::to_string),
            })
        })
        .collect();

    findings.sort_by(|a, b| b.claim_count.cmp(&a.claim_count));
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        ClaimAttributes, ClaimStatus, Edge, FraudGraph, Node, NodeAttributes, PolicyAttributes,
    };
    use crate::scoring::RiskScorer;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn policy(id: &str) -> Node {
        Node::new(
            id,
            1.0,
            NodeAttributes::Policy(PolicyAttributes {
                premium: 750.0,
                coverage_type: "auto".to_string(),
                start_date: NaiveDate::from_ymd_opt(2022, 5, 5).unwrap(),
                holder_age: 33,
                location: Some("Phoenix".to_string()),
            }),
        )
    }

    fn add_claims(graph: &mut FraudGraph, policy: &str, count: usize) {
        let ts = Utc.with_ymd_and_hms(2023, 5, 5, 0, 0, 0).unwrap();
        for i in 0..count {
            let id = format!("{}-CLM-{}", policy, i);
            graph
                .insert_node(Node::new(
                    id.as_str(),
                    1.0,
                    NodeAttributes::Claim(ClaimAttributes {
                        amount: 1000.0,
                        claim_type: "collision".to_string(),
                        date: NaiveDate::from_ymd_opt(2023, 5, 5).unwrap(),
                        status: ClaimStatus::Rejected,
                        policy_id: NodeId::new(policy),
                        location: None,
                    }),
                ))
                .unwrap();
            graph
                .insert_edge(Edge::new(policy, id.as_str(), Relationship::HasClaim, ts))
                .unwrap();
        }
    }

    #[test]
    fn test_more_than_three_claims() {
        let mut graph = FraudGraph::new();
        for id in ["POL-A", "POL-B", "POL-C"] {
            graph.insert_node(policy(id)).unwrap();
        }
        add_claims(&mut graph, "POL-A", 4);
        add_claims(&mut graph, "POL-B", 3);
        add_claims(&mut graph, "POL-C", 6);

        let scored = RiskScorer::default().score(graph);
        let patterns = policy_claim_patterns(&scored, &PatternThresholds::default());
        let ids: Vec<&str> = patterns.iter().map(|p| p.policy_id.as_str()).collect();

        assert_eq!(ids, vec!["POL-C", "POL-A"]);
        assert_eq!(patterns[0].claim_count, 6);
        assert_eq!(patterns[0].total_claimed, 6000.0);
        assert_eq!(patterns[1].location.as_deref(), Some("Phoenix"));
    }
}
