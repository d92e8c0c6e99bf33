//! Graph builder
//!
//! Turns a [`RecordBatch`] into a [`FraudGraph`]:
//! - `manages` edges from each policy's agent to the policy
//! - `has_claim` edges from each claim's policy to the claim
//! - 1-3 `involves` edges from each claim to third parties, with tiered weights
//! - `frequent_collaboration` edges between a flagged subset of agents and
//!   third parties
//!
//! All randomness comes from the caller's generator, so a fixed batch and a
//! fixed seed always produce the same graph.

pub mod records;
pub mod synthetic;

pub use records::{
    AgentRecord, BatchFingerprint, ClaimRecord, CollaborationRecord, PolicyRecord, RecordBatch,
    ThirdPartyRecord,
};
pub use synthetic::{GenerationConfig, SyntheticGenerator};

use crate::graph::{
    Edge, EdgeFlag, FraudGraph, GraphError, GraphResult, NodeId, NodeKind, Relationship,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Probabilities of the `involves` weight tiers, checked in order.
///
/// A draw below `critical` gives weight 4, the next `high` share gives 3, the
/// next `elevated` share gives 2 and everything else gives 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightTiers {
    pub critical: f64,
    pub high: f64,
    pub elevated: f64,
}

impl Default for WeightTiers {
    fn default() -> Self {
        Self {
            critical: 0.10,
            high: 0.20,
            elevated: 0.30,
        }
    }
}

impl WeightTiers {
    /// Weight for a uniform draw in [0, 1)
    pub fn weight_for(&self, draw: f64) -> f64 {
        if draw < self.critical {
            4.0
        } else if draw < self.critical + self.high {
            3.0
        } else if draw < self.critical + self.high + self.elevated {
            2.0
        } else {
            1.0
        }
    }
}

/// Association rule set used while building a graph.
///
/// How many third parties a claim involves is drawn from the fan-out
/// probabilities alone; the claim amount only scales the transaction amount
/// on each `involves` edge. Large claims therefore carry large transactions
/// but no more counterparties than small ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssociationRules {
    /// Chance a claim involves exactly one third party
    pub single_party_probability: f64,
    /// Chance a claim involves exactly two; the remainder involves three
    pub double_party_probability: f64,
    /// Transaction amount range as a fraction of the claim amount
    pub min_transaction_fraction: f64,
    pub max_transaction_fraction: f64,
    pub weight_tiers: WeightTiers,
    /// Share of agents that get `frequent_collaboration` edges
    pub collaboration_ratio: f64,
    /// Maximum collaborators per flagged agent
    pub max_collaborators: usize,
    /// Weight range of collaboration edges, upper bound exclusive
    pub min_collaboration_weight: f64,
    pub max_collaboration_weight: f64,
    /// Generated collaborations date back at most this many days
    pub collaboration_window_days: i64,
}

impl Default for AssociationRules {
    fn default() -> Self {
        Self {
            single_party_probability: 0.70,
            double_party_probability: 0.25,
            min_transaction_fraction: 0.10,
            max_transaction_fraction: 0.50,
            weight_tiers: WeightTiers::default(),
            collaboration_ratio: 0.20,
            max_collaborators: 3,
            min_collaboration_weight: 3.0,
            max_collaboration_weight: 5.0,
            collaboration_window_days: 365,
        }
    }
}

impl AssociationRules {
    /// Number of third parties for a uniform draw in [0, 1), whatever the claim amount
    pub fn fan_out_for(&self, draw: f64) -> usize {
        if draw < self.single_party_probability {
            1
        } else if draw < self.single_party_probability + self.double_party_probability {
            2
        } else {
            3
        }
    }

    /// Check ranges; returns a description of the first problem found
    pub fn validate(&self) -> Result<(), String> {
        let probabilities = [
            ("single_party_probability", self.single_party_probability),
            ("double_party_probability", self.double_party_probability),
            ("collaboration_ratio", self.collaboration_ratio),
            ("weight_tiers.critical", self.weight_tiers.critical),
            ("weight_tiers.high", self.weight_tiers.high),
            ("weight_tiers.elevated", self.weight_tiers.elevated),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{} must be within [0, 1], got {}", name, p));
            }
        }
        if self.single_party_probability + self.double_party_probability > 1.0 {
            return Err("fan-out probabilities sum above 1".to_string());
        }
        let tiers = &self.weight_tiers;
        if tiers.critical + tiers.high + tiers.elevated > 1.0 {
            return Err("weight tier probabilities sum above 1".to_string());
        }
        if !(0.0 <= self.min_transaction_fraction
            && self.min_transaction_fraction <= self.max_transaction_fraction
            && self.max_transaction_fraction.is_finite())
        {
            return Err("transaction fraction range is empty or negative".to_string());
        }
        if !(0.0 <= self.min_collaboration_weight
            && self.min_collaboration_weight <= self.max_collaboration_weight
            && self.max_collaboration_weight.is_finite())
        {
            return Err("collaboration weight range is empty or negative".to_string());
        }
        if !(0..=MAX_WINDOW_DAYS).contains(&self.collaboration_window_days) {
            return Err(format!(
                "collaboration_window_days must be within [0, {}], got {}",
                MAX_WINDOW_DAYS, self.collaboration_window_days
            ));
        }
        Ok(())
    }

    fn draw_fan_out<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.fan_out_for(rng.gen())
    }

    fn draw_involvement_weight<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.weight_tiers.weight_for(rng.gen())
    }

    fn draw_transaction_fraction<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        draw_in(rng, self.min_transaction_fraction, self.max_transaction_fraction)
    }

    fn draw_collaboration_weight<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        draw_in(rng, self.min_collaboration_weight, self.max_collaboration_weight)
    }
}

/// Longest day window any generated date may span
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// `p` clamped to [0, 1]; NaN counts as 0
pub(crate) fn probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// `date` moved back by `days`, or `date` itself when that leaves chrono's range
pub(crate) fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| date.checked_sub_signed(delta))
        .unwrap_or(date)
}

/// Uniform draw in [low, high), or `low` for an empty or unbounded range
fn draw_in<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if low < high && (high - low).is_finite() {
        rng.gen_range(low..high)
    } else {
        low
    }
}

pub(crate) fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

/// Builds fraud graphs from record batches
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    rules: AssociationRules,
}

impl GraphBuilder {
    pub fn new(rules: AssociationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &AssociationRules {
        &self.rules
    }

    /// Build a graph from a batch.
    ///
    /// Fails with [`GraphError::MissingReference`] when a record names an id
    /// that is not a node of the expected kind.
    pub fn build<R: Rng + ?Sized>(&self, batch: &RecordBatch, rng: &mut R) -> GraphResult<FraudGraph> {
        let mut graph = FraudGraph::new();

        for agent in &batch.agents {
            graph.insert_node(agent.to_node())?;
        }
        for third_party in &batch.third_parties {
            graph.insert_node(third_party.to_node())?;
        }
        for policy in &batch.policies {
            graph.insert_node(policy.to_node())?;
        }
        for claim in &batch.claims {
            graph.insert_node(claim.to_node())?;
        }

        self.link_agents(&mut graph, batch)?;
        self.link_claims(&mut graph, batch)?;
        self.link_third_parties(&mut graph, batch, rng)?;
        self.link_collaborations(&mut graph, batch, rng)?;

        info!(
            "Built fraud graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    fn link_agents(&self, graph: &mut FraudGraph, batch: &RecordBatch) -> GraphResult<()> {
        for policy in &batch.policies {
            let Some(agent_id) = &policy.agent_id else {
                continue;
            };
            expect_kind(graph, agent_id, NodeKind::Agent)?;
            let edge = Edge::new(
                agent_id.clone(),
                policy.id.clone(),
                Relationship::Manages,
                midnight(policy.attributes.start_date),
            );
            graph.insert_edge(edge)?;
        }
        Ok(())
    }

    fn link_claims(&self, graph: &mut FraudGraph, batch: &RecordBatch) -> GraphResult<()> {
        for claim in &batch.claims {
            let policy_id = &claim.attributes.policy_id;
            expect_kind(graph, policy_id, NodeKind::Policy)?;
            let edge = Edge::new(
                policy_id.clone(),
                claim.id.clone(),
                Relationship::HasClaim,
                midnight(claim.attributes.date),
            );
            graph.insert_edge(edge)?;
        }
        Ok(())
    }

    fn link_third_parties<R: Rng + ?Sized>(
        &self,
        graph: &mut FraudGraph,
        batch: &RecordBatch,
        rng: &mut R,
    ) -> GraphResult<()> {
        let pool: Vec<NodeId> = batch.third_parties.iter().map(|t| t.id.clone()).collect();

        for claim in &batch.claims {
            let involved: Vec<NodeId> = if claim.third_party_ids.is_empty() {
                if pool.is_empty() {
                    continue;
                }
                let fan_out = self.rules.draw_fan_out(rng).min(pool.len());
                pool.choose_multiple(rng, fan_out).cloned().collect()
            } else {
                for id in &claim.third_party_ids {
                    expect_kind(graph, id, NodeKind::ThirdParty)?;
                }
                claim.third_party_ids.clone()
            };

            for third_party in involved {
                let weight = self.rules.draw_involvement_weight(rng);
                let amount = claim.attributes.amount * self.rules.draw_transaction_fraction(rng);
                let edge = Edge::new(
                    claim.id.clone(),
                    third_party,
                    Relationship::Involves,
                    midnight(claim.attributes.date),
                )
                .with_weight(weight)
                .with_transaction_amount(amount);
                graph.insert_edge(edge)?;
            }
        }
        Ok(())
    }

    fn link_collaborations<R: Rng + ?Sized>(
        &self,
        graph: &mut FraudGraph,
        batch: &RecordBatch,
        rng: &mut R,
    ) -> GraphResult<()> {
        let reference = batch.latest_date().unwrap_or_default();

        for known in &batch.collaborations {
            expect_kind(graph, &known.agent_id, NodeKind::Agent)?;
            expect_kind(graph, &known.third_party_id, NodeKind::ThirdParty)?;
            let weight = match known.weight {
                Some(w) => w,
                None => self.rules.draw_collaboration_weight(rng),
            };
            graph.insert_edge(collaboration(
                &known.agent_id,
                &known.third_party_id,
                weight,
                midnight(known.since.unwrap_or(reference)),
            ))?;
        }

        if batch.third_parties.is_empty() || self.rules.max_collaborators == 0 {
            return Ok(());
        }

        let pool: Vec<&NodeId> = batch.third_parties.iter().map(|t| &t.id).collect();
        let ratio = probability(self.rules.collaboration_ratio);
        let mut flagged = 0usize;

        for agent in &batch.agents {
            if !rng.gen_bool(ratio) {
                continue;
            }
            flagged += 1;
            let partners = rng.gen_range(1..=self.rules.max_collaborators.min(pool.len()));
            for &third_party in pool.choose_multiple(rng, partners) {
                let weight = self.rules.draw_collaboration_weight(rng);
                let window = self.rules.collaboration_window_days.clamp(0, MAX_WINDOW_DAYS);
                let since = days_before(reference, rng.gen_range(0..=window));
                graph.insert_edge(collaboration(&agent.id, third_party, weight, midnight(since)))?;
            }
        }

        debug!("Flagged {} of {} agents for collaboration edges", flagged, batch.agents.len());
        Ok(())
    }
}

fn collaboration(agent: &NodeId, third_party: &NodeId, weight: f64, at: DateTime<Utc>) -> Edge {
    Edge::new(
        agent.clone(),
        third_party.clone(),
        Relationship::FrequentCollaboration,
        at,
    )
    .with_weight(weight)
    .with_flags([EdgeFlag::HighFrequency, EdgeFlag::UnusualAmounts])
}

/// Resolve `id` to a node of `kind`, or report it as a missing reference
fn expect_kind(graph: &FraudGraph, id: &NodeId, kind: NodeKind) -> GraphResult<()> {
    match graph.get_node(id) {
        Some(node) if node.kind() == kind => Ok(()),
        _ => Err(GraphError::MissingReference(id.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_weight_tier_boundaries() {
        let tiers = WeightTiers::default();
        assert_eq!(tiers.weight_for(0.0), 4.0);
        assert_eq!(tiers.weight_for(0.099), 4.0);
        assert_eq!(tiers.weight_for(0.10), 3.0);
        assert_eq!(tiers.weight_for(0.29), 3.0);
        assert_eq!(tiers.weight_for(0.301), 2.0);
        assert_eq!(tiers.weight_for(0.59), 2.0);
        assert_eq!(tiers.weight_for(0.601), 1.0);
        assert_eq!(tiers.weight_for(0.999), 1.0);
    }

    #[test]
    fn test_fan_out_boundaries() {
        let rules = AssociationRules::default();
        assert_eq!(rules.fan_out_for(0.0), 1);
        assert_eq!(rules.fan_out_for(0.69), 1);
        assert_eq!(rules.fan_out_for(0.70), 2);
        assert_eq!(rules.fan_out_for(0.94), 2);
        assert_eq!(rules.fan_out_for(0.95), 3);
    }

    #[test]
    fn test_default_rules_are_valid() {
        assert!(AssociationRules::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_rules() {
        let mut rules = AssociationRules::default();
        rules.weight_tiers.critical = 0.6;
        assert!(rules.validate().is_err());

        let mut rules = AssociationRules::default();
        rules.collaboration_ratio = 1.5;
        assert!(rules.validate().is_err());

        let mut rules = AssociationRules::default();
        rules.min_transaction_fraction = 0.6;
        assert!(rules.validate().unwrap_err().contains("transaction"));
    }

    #[test]
    fn test_collaboration_window_is_bounded() {
        let mut rules = AssociationRules::default();
        rules.collaboration_window_days = i64::MAX;
        assert!(rules
            .validate()
            .unwrap_err()
            .contains("collaboration_window_days"));

        rules.collaboration_window_days = MAX_WINDOW_DAYS;
        assert!(rules.validate().is_ok());
        rules.collaboration_window_days = -1;
        assert!(rules.validate().is_err());
    }

    fn sample_batch() -> RecordBatch {
        SyntheticGenerator::default().generate(&mut StdRng::seed_from_u64(11))
    }

    fn collaboration_count(graph: &FraudGraph) -> usize {
        graph
            .edges()
            .iter()
            .filter(|e| e.relationship == Relationship::FrequentCollaboration)
            .count()
    }

    #[test]
    fn test_unvalidated_rules_do_not_panic() {
        let batch = sample_batch();

        let rules = AssociationRules {
            collaboration_ratio: 1.0,
            collaboration_window_days: i64::MAX,
            ..AssociationRules::default()
        };
        let graph = GraphBuilder::new(rules)
            .build(&batch, &mut StdRng::seed_from_u64(2))
            .unwrap();
        assert!(collaboration_count(&graph) >= batch.agents.len());

        let rules = AssociationRules {
            collaboration_ratio: f64::NAN,
            max_transaction_fraction: f64::INFINITY,
            ..AssociationRules::default()
        };
        let graph = GraphBuilder::new(rules)
            .build(&batch, &mut StdRng::seed_from_u64(2))
            .unwrap();
        assert_eq!(collaboration_count(&graph), 0);
    }

    #[test]
    fn test_probability() {
        assert_eq!(probability(f64::NAN), 0.0);
        assert_eq!(probability(-0.5), 0.0);
        assert_eq!(probability(0.25), 0.25);
        assert_eq!(probability(7.0), 1.0);
    }

    #[test]
    fn test_days_before_out_of_range() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(days_before(date, 31), NaiveDate::from_ymd_opt(2024, 11, 30).unwrap());
        assert_eq!(days_before(date, i64::MAX), date);
    }

    #[test]
    fn test_fan_out_ignores_claim_amount() {
        let batch = sample_batch();
        let mut inflated = batch.clone();
        for claim in &mut inflated.claims {
            claim.attributes.amount *= 100.0;
        }

        let involves = |batch: &RecordBatch| -> Vec<(NodeId, NodeId)> {
            GraphBuilder::default()
                .build(batch, &mut StdRng::seed_from_u64(5))
                .unwrap()
                .edges()
                .iter()
                .filter(|e| e.relationship == Relationship::Involves)
                .map(|e| (e.source.clone(), e.target.clone()))
                .collect()
        };
        assert_eq!(involves(&batch), involves(&inflated));
    }

    #[test]
    fn test_midnight() {
        let at = midnight(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(at.to_rfc3339(), "2024-02-29T00:00:00+00:00");
    }
}
