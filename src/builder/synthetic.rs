//! Synthetic record generation
//!
//! Produces a plausible batch when no real data is available. Counts default
//! to 50 policies, 120 claims, 25 agents and 40 third parties.

use super::records::{AgentRecord, ClaimRecord, PolicyRecord, RecordBatch, ThirdPartyRecord};
use super::{days_before, probability, MAX_WINDOW_DAYS};
use crate::graph::{
    AgentAttributes, ClaimAttributes, ClaimStatus, NodeId, PolicyAttributes,
    ThirdPartyAttributes, MAX_BASE_RISK,
};
use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

const LOCATIONS: &[&str] = &[
    "New York",
    "Los Angeles",
    "Chicago",
    "Houston",
    "Phoenix",
    "Miami",
    "Seattle",
    "Denver",
];

const COVERAGE_TYPES: &[&str] = &["auto", "home", "life", "health", "commercial"];

const CLAIM_TYPES: &[&str] = &[
    "collision",
    "theft",
    "fire",
    "water_damage",
    "medical",
    "liability",
];

const THIRD_PARTY_SUBTYPES: &[&str] = &[
    "repair_shop",
    "medical_provider",
    "law_firm",
    "towing_service",
    "appraiser",
];

/// Synthetic generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub policies: usize,
    pub claims: usize,
    pub agents: usize,
    pub third_parties: usize,
    /// Latest date any generated record may carry
    pub reference_date: NaiveDate,
    /// Policies start at most this many days before the reference date
    pub history_days: i64,
    /// Share of claims drawn from the high-value range
    pub high_value_claim_probability: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            policies: 50,
            claims: 120,
            agents: 25,
            third_parties: 40,
            reference_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            history_days: 730,
            high_value_claim_probability: 0.10,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.high_value_claim_probability) {
            return Err(format!(
                "high_value_claim_probability must be within [0, 1], got {}",
                self.high_value_claim_probability
            ));
        }
        if !(30..=MAX_WINDOW_DAYS).contains(&self.history_days) {
            return Err(format!(
                "history_days must be within [30, {}], got {}",
                MAX_WINDOW_DAYS, self.history_days
            ));
        }
        Ok(())
    }
}

/// Generates record batches from a caller-supplied random source
#[derive(Debug, Clone, Default)]
pub struct SyntheticGenerator {
    config: GenerationConfig,
}

impl SyntheticGenerator {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> RecordBatch {
        let mut agents: Vec<AgentRecord> = (1..=self.config.agents)
            .map(|i| AgentRecord {
                id: NodeId::new(format!("AGT-{:03}", i)),
                base_risk: base_risk(rng),
                attributes: AgentAttributes {
                    commission_rate: round_to(rng.gen_range(0.05..0.20), 3),
                    total_policies: 0,
                    specialty: pick(rng, COVERAGE_TYPES),
                    location: Some(pick(rng, LOCATIONS)),
                },
            })
            .collect();

        let third_parties: Vec<ThirdPartyRecord> = (1..=self.config.third_parties)
            .map(|i| ThirdPartyRecord {
                id: NodeId::new(format!("TP-{:03}", i)),
                base_risk: base_risk(rng),
                attributes: ThirdPartyAttributes {
                    subtype: pick(rng, THIRD_PARTY_SUBTYPES),
                    years_in_business: rng.gen_range(1..=40),
                    location: Some(pick(rng, LOCATIONS)),
                },
            })
            .collect();

        let mut policies = Vec::with_capacity(self.config.policies);
        for i in 1..=self.config.policies {
            let agent_id = if agents.is_empty() {
                None
            } else {
                let agent = &mut agents[rng.gen_range(0..self.config.agents)];
                agent.attributes.total_policies += 1;
                Some(agent.id.clone())
            };
            let days_back = rng.gen_range(30..=self.config.history_days.clamp(30, MAX_WINDOW_DAYS));
            policies.push(PolicyRecord {
                id: NodeId::new(format!("POL-{:03}", i)),
                base_risk: base_risk(rng),
                agent_id,
                attributes: PolicyAttributes {
                    premium: round_to(rng.gen_range(400.0..6000.0), 2),
                    coverage_type: pick(rng, COVERAGE_TYPES),
                    start_date: self.days_before_reference(days_back),
                    holder_age: rng.gen_range(18..=85),
                    location: Some(pick(rng, LOCATIONS)),
                },
            });
        }

        let claim_count = if policies.is_empty() { 0 } else { self.config.claims };
        let mut claims = Vec::with_capacity(claim_count);
        for i in 1..=claim_count {
            let policy = &policies[rng.gen_range(0..policies.len())];
            let open_days = (self.config.reference_date - policy.attributes.start_date)
                .num_days()
                .max(0);
            let start = policy.attributes.start_date;
            let date = Duration::try_days(rng.gen_range(0..=open_days))
                .and_then(|delta| start.checked_add_signed(delta))
                .unwrap_or(start);

            let amount = if rng.gen_bool(probability(self.config.high_value_claim_probability)) {
                rng.gen_range(20_000.0..80_000.0)
            } else {
                rng.gen_range(500.0..15_000.0)
            };

            // Most claims are filed where the policy is held
            let location = if rng.gen_bool(0.8) {
                policy.attributes.location.clone()
            } else {
                Some(pick(rng, LOCATIONS))
            };

            claims.push(ClaimRecord {
                id: NodeId::new(format!("CLM-{:04}", i)),
                base_risk: base_risk(rng),
                third_party_ids: Vec::new(),
                attributes: ClaimAttributes {
                    amount: round_to(amount, 2),
                    claim_type: pick(rng, CLAIM_TYPES),
                    date,
                    status: ClaimStatus::ALL[rng.gen_range(0..ClaimStatus::ALL.len())],
                    policy_id: policy.id.clone(),
                    location,
                },
            });
        }

        debug!(
            "Generated {} policies, {} claims, {} agents, {} third parties",
            policies.len(),
            claims.len(),
            agents.len(),
            third_parties.len()
        );

        RecordBatch {
            policies,
            claims,
            agents,
            third_parties,
            collaborations: Vec::new(),
        }
    }

    fn days_before_reference(&self, days: i64) -> NaiveDate {
        days_before(self.config.reference_date, days)
    }
}

fn base_risk<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(0.0..MAX_BASE_RISK)
}

fn pick<R: Rng + ?Sized>(rng: &mut R, values: &[&str]) -> String {
    values[rng.gen_range(0..values.len())].to_string()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_counts() {
        let mut rng = StdRng::seed_from_u64(7);
        let batch = SyntheticGenerator::default().generate(&mut rng);

        assert_eq!(batch.policies.len(), 50);
        assert_eq!(batch.claims.len(), 120);
        assert_eq!(batch.agents.len(), 25);
        assert_eq!(batch.third_parties.len(), 40);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let generator = SyntheticGenerator::default();
        let a = generator.generate(&mut StdRng::seed_from_u64(42));
        let b = generator.generate(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);

        let c = generator.generate(&mut StdRng::seed_from_u64(43));
        assert_ne!(a, c);
    }

    #[test]
    fn test_records_are_consistent() {
        let config = GenerationConfig::default();
        let batch = SyntheticGenerator::new(config.clone()).generate(&mut StdRng::seed_from_u64(1));

        let assigned: u32 = batch.agents.iter().map(|a| a.attributes.total_policies).sum();
        assert_eq!(assigned as usize, batch.policies.len());

        for claim in &batch.claims {
            let policy = batch
                .policies
                .iter()
                .find(|p| p.id == claim.attributes.policy_id)
                .expect("claim references a generated policy");
            assert!(claim.attributes.date >= policy.attributes.start_date);
            assert!(claim.attributes.date <= config.reference_date);
            assert!(claim.attributes.amount >= 500.0);
        }

        let all_risks = batch
            .policies
            .iter()
            .map(|p| p.base_risk)
            .chain(batch.claims.iter().map(|c| c.base_risk));
        for risk in all_risks {
            assert!((0.0..MAX_BASE_RISK).contains(&risk));
        }
    }

    #[test]
    fn test_no_policies_means_no_claims() {
        let config = GenerationConfig {
            policies: 0,
            agents: 0,
            ..GenerationConfig::default()
        };
        let batch = SyntheticGenerator::new(config).generate(&mut StdRng::seed_from_u64(3));
        assert!(batch.policies.is_empty());
        assert!(batch.claims.is_empty());
        assert_eq!(batch.third_parties.len(), 40);
    }

    #[test]
    fn test_validate() {
        assert!(GenerationConfig::default().validate().is_ok());
        let config = GenerationConfig {
            high_value_claim_probability: 2.0,
            ..GenerationConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GenerationConfig {
            history_days: i64::MAX,
            ..GenerationConfig::default()
        };
        assert!(config.validate().unwrap_err().contains("history_days"));
    }

    #[test]
    fn test_out_of_range_settings_do_not_panic() {
        let config = GenerationConfig {
            history_days: i64::MAX,
            high_value_claim_probability: f64::NAN,
            ..GenerationConfig::default()
        };
        let batch = SyntheticGenerator::new(config.clone()).generate(&mut StdRng::seed_from_u64(9));
        assert_eq!(batch.claims.len(), config.claims);
        for policy in &batch.policies {
            assert!(policy.attributes.start_date <= config.reference_date);
        }
    }
}
