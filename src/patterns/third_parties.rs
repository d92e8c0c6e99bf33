use super::{descending, PatternThresholds};
use crate::graph::{NodeId, NodeKind};
use crate::scoring::ScoredGraph;
use serde::{Deserialize, Serialize};

/// A third party with many claim connections or a high score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousThirdParty {
    pub id: NodeId,
    pub subtype: String,
    pub claim_connections: usize,
    pub risk_score: f64,
    pub location: Option<String>,
}

/// Third parties with more than `third_party_claim_connections` claim edges or
/// a score above `third_party_risk`, highest score first
pub fn suspicious_third_parties(
    scored: &ScoredGraph,
    thresholds: &PatternThresholds,
) -> Vec<SuspiciousThirdParty> {
    let graph = scored.graph();
    let mut findings: Vec<SuspiciousThirdParty> = graph
        .nodes_by_kind(NodeKind::ThirdParty)
        .filter_map(|node| {
            let attributes = node.as_third_party()?;
            let claim_connections = graph
                .incident_edges(&node.id)
                .filter_map(|e| e.other_end(&node.id))
                .filter_map(|other| graph.get_node(other))
                .filter(|other| other.kind() == NodeKind::Claim)
                .count();
            let risk_score = scored.risk_score(&node.id);

            let qualifies = claim_connections > thresholds.third_party_claim_connections
                || risk_score > thresholds.third_party_risk;
            qualifies.then(|| SuspiciousThirdParty {
                id: node.id.clone(),
                subtype: attributes.subtype.clone(),
                claim_connections,
                risk_score,
                location: node.location().map(str::to_string),
            })
        })
        .collect();

    findings.sort_by(|a, b| descending(a.risk_score, b.risk_score));
    findings
}
