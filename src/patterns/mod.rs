//! Suspicious-pattern detection
//!
//! Each detector is a pure function of a [`ScoredGraph`]. All of them are
//! total: an empty graph yields empty collections, degenerate statistics yield
//! no findings, and entities lacking a location are left out of location
//! aggregation only.

mod agents;
mod amounts;
mod holders;
mod locations;
mod rings;
mod third_parties;

pub use agents::{agent_clusters, AgentCluster};
pub use amounts::{amount_anomalies, AmountAnomaly};
pub use holders::{policy_claim_patterns, PolicyClaimPattern};
pub use locations::{location_risks, LocationRisk};
pub use rings::{fraud_rings, FraudRing};
pub use third_parties::{suspicious_third_parties, SuspiciousThirdParty};

use crate::scoring::ScoredGraph;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::info;

/// Detector thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternThresholds {
    /// Third parties with more claim connections than this are reported
    pub third_party_claim_connections: usize,
    pub third_party_risk: f64,
    /// Agents managing more policies than this are reported
    pub agent_policy_count: usize,
    pub agent_risk: f64,
    /// Location members above this score count as high-risk
    pub high_risk_node: f64,
    /// Claims at least this many standard deviations above the mean are anomalies
    pub anomaly_sigma: f64,
    /// Policies with more claims than this are reported
    pub policy_claim_count: usize,
    pub min_ring_size: usize,
}

impl Default for PatternThresholds {
    fn default() -> Self {
        Self {
            third_party_claim_connections: 8,
            third_party_risk: 3.5,
            agent_policy_count: 8,
            agent_risk: 3.0,
            high_risk_node: 3.5,
            anomaly_sigma: 2.0,
            policy_claim_count: 3,
            min_ring_size: 2,
        }
    }
}

impl PatternThresholds {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.anomaly_sigma > 0.0) {
            return Err(format!("anomaly_sigma must be positive, got {}", self.anomaly_sigma));
        }
        if self.min_ring_size < 2 {
            return Err(format!(
                "min_ring_size must be at least 2, got {}",
                self.min_ring_size
            ));
        }
        Ok(())
    }
}

/// Every finding collection of one snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousPatterns {
    pub suspicious_third_parties: Vec<SuspiciousThirdParty>,
    pub agent_clusters: Vec<AgentCluster>,
    pub location_risks: Vec<LocationRisk>,
    pub amount_anomalies: Vec<AmountAnomaly>,
    pub policy_claim_patterns: Vec<PolicyClaimPattern>,
    pub fraud_rings: Vec<FraudRing>,
}

impl SuspiciousPatterns {
    pub fn total_findings(&self) -> usize {
        self.suspicious_third_parties.len()
            + self.agent_clusters.len()
            + self.amount_anomalies.len()
            + self.policy_claim_patterns.len()
            + self.fraud_rings.len()
    }
}

/// Runs every detector over a scored graph
#[derive(Debug, Clone, Default)]
pub struct PatternDetector {
    thresholds: PatternThresholds,
}

impl PatternDetector {
    pub fn new(thresholds: PatternThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &PatternThresholds {
        &self.thresholds
    }

    pub fn detect(&self, graph: &ScoredGraph) -> SuspiciousPatterns {
        let t = &self.thresholds;
        let patterns = SuspiciousPatterns {
            suspicious_third_parties: suspicious_third_parties(graph, t),
            agent_clusters: agent_clusters(graph, t),
            location_risks: location_risks(graph, t),
            amount_anomalies: amount_anomalies(graph, t),
            policy_claim_patterns: policy_claim_patterns(graph, t),
            fraud_rings: fraud_rings(graph, t),
        };

        info!(
            "Detected {} third parties, {} agent clusters, {} anomalies, {} rings over {} locations",
            patterns.suspicious_third_parties.len(),
            patterns.agent_clusters.len(),
            patterns.amount_anomalies.len(),
            patterns.fraud_rings.len(),
            patterns.location_risks.len()
        );
        patterns
    }
}

/// Descending order for scores; NaN never occurs since scores are clamped
pub(crate) fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
