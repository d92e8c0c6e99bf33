//! Input records for one analysis session
//!
//! A [`RecordBatch`] is the immutable input of a build: typed rows for each
//! entity kind plus any collaborations already known from real data.

use crate::graph::{
    AgentAttributes, ClaimAttributes, Node, NodeAttributes, NodeId, PolicyAttributes,
    ThirdPartyAttributes,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub id: NodeId,
    pub base_risk: f64,
    /// Agent assigned to the policy; produces a `manages` edge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<NodeId>,
    #[serde(flatten)]
    pub attributes: PolicyAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub id: NodeId,
    pub base_risk: f64,
    /// Third parties known to be involved. Empty lets the association rules choose.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub third_party_ids: Vec<NodeId>,
    #[serde(flatten)]
    pub attributes: ClaimAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: NodeId,
    pub base_risk: f64,
    #[serde(flatten)]
    pub attributes: AgentAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThirdPartyRecord {
    pub id: NodeId,
    pub base_risk: f64,
    #[serde(flatten)]
    pub attributes: ThirdPartyAttributes,
}

/// A known agent / third-party collaboration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationRecord {
    pub agent_id: NodeId,
    pub third_party_id: NodeId,
    /// Suspicion weight; drawn from the collaboration range when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<NaiveDate>,
}

/// One batch of input records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordBatch {
    #[serde(default)]
    pub policies: Vec<PolicyRecord>,
    #[serde(default)]
    pub claims: Vec<ClaimRecord>,
    #[serde(default)]
    pub agents: Vec<AgentRecord>,
    #[serde(default)]
    pub third_parties: Vec<ThirdPartyRecord>,
    #[serde(default)]
    pub collaborations: Vec<CollaborationRecord>,
}

/// SHA-256 digest of a batch's canonical JSON encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchFingerprint([u8; 32]);

impl BatchFingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for BatchFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl RecordBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_records(&self) -> usize {
        self.policies.len() + self.claims.len() + self.agents.len() + self.third_parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_records() == 0 && self.collaborations.is_empty()
    }

    /// Identity of the batch for memoization. Equal batches hash equally.
    pub fn fingerprint(&self) -> Result<BatchFingerprint, serde_json::Error> {
        let mut hasher = Sha256::new();
        serde_json::to_writer(&mut hasher, self)?;
        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Ok(BatchFingerprint(bytes))
    }

    /// Latest date mentioned by any policy or claim
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.policies
            .iter()
            .map(|p| p.attributes.start_date)
            .chain(self.claims.iter().map(|c| c.attributes.date))
            .max()
    }
}

impl PolicyRecord {
    pub fn to_node(&self) -> Node {
        Node::new(
            self.id.clone(),
            self.base_risk,
            NodeAttributes::Policy(self.attributes.clone()),
        )
    }
}

impl ClaimRecord {
    pub fn to_node(&self) -> Node {
        Node::new(
            self.id.clone(),
            self.base_risk,
            NodeAttributes::Claim(self.attributes.clone()),
        )
    }
}

impl AgentRecord {
    pub fn to_node(&self) -> Node {
        Node::new(
            self.id.clone(),
            self.base_risk,
            NodeAttributes::Agent(self.attributes.clone()),
        )
    }
}

impl ThirdPartyRecord {
    pub fn to_node(&self) -> Node {
        Node::new(
            self.id.clone(),
            self.base_risk,
            NodeAttributes::ThirdParty(self.attributes.clone()),
        )
    }
}
