use super::{descending, PatternThresholds};
use crate::graph::NodeKind;
use crate::scoring::ScoredGraph;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Risk concentration at one location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationRisk {
    pub location: String,
    pub agents: usize,
    pub policies: usize,
    pub claims: usize,
    pub third_parties: usize,
    pub total_risk: f64,
    pub high_risk_nodes: usize,
    pub average_risk: f64,
}

impl LocationRisk {
    pub fn total_entities(&self) -> usize {
        self.agents + self.policies + self.claims + self.third_parties
    }
}

/// Per-location aggregates, highest average risk first (ties by name)
pub fn location_risks(scored: &ScoredGraph, thresholds: &PatternThresholds) -> Vec<LocationRisk> {
    let mut by_location: IndexMap<&str, LocationRisk> = IndexMap::new();
    let mut skipped = 0usize;

    for (node, risk) in scored.scored_nodes() {
        let Some(location) = node.location() else {
            skipped += 1;
            continue;
        };
        let entry = by_location.entry(location).or_insert_with(|| LocationRisk {
            location: location.to_string(),
            ..LocationRisk::default()
        });
        match node.kind() {
            NodeKind::Agent => entry.agents += 1,
            NodeKind::Policy => entry.policies += 1,
            NodeKind::Claim => entry.claims += 1,
            NodeKind::ThirdParty => entry.third_parties += 1,
        }
        entry.total_risk += risk.risk_score;
        if risk.risk_score > thresholds.high_risk_node {
            entry.high_risk_nodes += 1;
        }
    }

    if skipped > 0 {
        debug!("{} nodes without a location left out of location aggregation", skipped);
    }

    let mut findings: Vec<LocationRisk> = by_location
        .into_values()
        .map(|mut l| {
            let members = l.total_entities();
            l.average_risk = if members == 0 {
                0.0
            } else {
                l.total_risk / members as f64
            };
            l
        })
        .collect();

    findings.sort_by(|a, b| {
        descending(a.average_risk, b.average_risk).then_with(|| a.location.cmp(&b.location))
    });
    findings
}
