use super::{descending, PatternThresholds};
use crate::algo::population_summary;
use crate::graph::{NodeId, NodeKind};
use crate::scoring::ScoredGraph;
use serde::{Deserialize, Serialize};

/// A claim whose amount sits far above the batch mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountAnomaly {
    pub claim_id: NodeId,
    pub amount: f64,
    pub claim_type: String,
    pub z_score: f64,
    pub location: Option<String>,
}

/// Claims whose amount reaches `mean + anomaly_sigma × stddev` (population
/// standard deviation over every claim). A zero deviation flags nothing.
///
/// The cutoff is inclusive. A single outlier among `n` equal claims has a
/// z-score of exactly `sqrt(n - 1)`, so with five claims and the default
/// sigma of 2 it lands on the cutoff itself: for amounts 100 ×4 and 10 000
/// the mean is 2 080, σ is 3 960 and the cutoff is 10 000.
pub fn amount_anomalies(scored: &ScoredGraph, thresholds: &PatternThresholds) -> Vec<AmountAnomaly> {
    let graph = scored.graph();
    let amounts: Vec<f64> = graph
        .nodes_by_kind(NodeKind::Claim)
        .filter_map(|n| n.claim_amount())
        .collect();

    let Some(summary) = population_summary(&amounts) else {
        return Vec::new();
    };
    if summary.std_dev <= 0.0 {
        return Vec::new();
    }
    let cutoff = summary.mean + thresholds.anomaly_sigma * summary.std_dev;

    let mut findings: Vec<AmountAnomaly> = graph
        .nodes_by_kind(NodeKind::Claim)
        .filter_map(|node| {
            let claim = node.as_claim()?;
            if claim.amount < cutoff {
                return None;
            }
            Some(AmountAnomaly {
                claim_id: node.id.clone(),
                amount: claim.amount,
                claim_type: claim.claim_type.clone(),
                z_score: summary.z_score(claim.amount)?,
                location: node.location().map(str::to_string),
            })
        })
        .collect();

    findings.sort_by(|a, b| descending(a.z_score, b.z_score));
    findings
}
