//! Node implementation for the fraud graph
//!
//! A node is one of four entity kinds. Kind-specific attributes live in a
//! tagged union so the kind is fixed by construction.

use super::types::{NodeId, NodeKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound (exclusive) of the attribute-intrinsic seed risk
pub const MAX_BASE_RISK: f64 = 5.0;

/// Attributes of an insurance policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyAttributes {
    pub premium: f64,
    pub coverage_type: String,
    pub start_date: NaiveDate,
    pub holder_age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Lifecycle state of a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 4] = [
        ClaimStatus::Pending,
        ClaimStatus::UnderReview,
        ClaimStatus::Approved,
        ClaimStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::UnderReview => "under_review",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes of a claim filed against a policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimAttributes {
    pub amount: f64,
    pub claim_type: String,
    pub date: NaiveDate,
    pub status: ClaimStatus,
    pub policy_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Attributes of a sales agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAttributes {
    pub commission_rate: f64,
    pub total_policies: u32,
    pub specialty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Attributes of a third party (repair shop, clinic, law firm, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThirdPartyAttributes {
    pub subtype: String,
    pub years_in_business: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Kind-specific attributes, one case per [`NodeKind`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeAttributes {
    Policy(PolicyAttributes),
    Claim(ClaimAttributes),
    Agent(AgentAttributes),
    ThirdParty(ThirdPartyAttributes),
}

impl NodeAttributes {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeAttributes::Policy(_) => NodeKind::Policy,
            NodeAttributes::Claim(_) => NodeKind::Claim,
            NodeAttributes::Agent(_) => NodeKind::Agent,
            NodeAttributes::ThirdParty(_) => NodeKind::ThirdParty,
        }
    }

    pub fn location(&self) -> Option<&str> {
        let location = match self {
            NodeAttributes::Policy(p) => &p.location,
            NodeAttributes::Claim(c) => &c.location,
            NodeAttributes::Agent(a) => &a.location,
            NodeAttributes::ThirdParty(t) => &t.location,
        };
        location.as_deref().filter(|l| !l.trim().is_empty())
    }
}

/// A node in the fraud graph
///
/// Nodes carry their identity, the seed risk assigned at creation and their
/// kind-specific attributes. Derived risk fields are kept in a separate score
/// table, never on the node itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,

    /// Attribute-intrinsic seed risk in [0, 5)
    pub base_risk: f64,

    /// Kind-specific attributes
    #[serde(flatten)]
    pub attributes: NodeAttributes,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, base_risk: f64, attributes: NodeAttributes) -> Self {
        Node {
            id: id.into(),
            base_risk,
            attributes,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.attributes.kind()
    }

    /// Location, if present and non-blank
    pub fn location(&self) -> Option<&str> {
        self.attributes.location()
    }

    pub fn as_policy(&self) -> Option<&PolicyAttributes> {
        match &self.attributes {
            NodeAttributes::Policy(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_claim(&self) -> Option<&ClaimAttributes> {
        match &self.attributes {
            NodeAttributes::Claim(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_agent(&self) -> Option<&AgentAttributes> {
        match &self.attributes {
            NodeAttributes::Agent(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_third_party(&self) -> Option<&ThirdPartyAttributes> {
        match &self.attributes {
            NodeAttributes::ThirdParty(t) => Some(t),
            _ => None,
        }
    }

    /// Claim amount, for claim nodes
    pub fn claim_amount(&self) -> Option<f64> {
        self.as_claim().map(|c| c.amount)
    }

    /// Check the attribute ranges that the graph relies on.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if !(0.0..MAX_BASE_RISK).contains(&self.base_risk) {
            return Err(format!(
                "base risk {} outside [0, {})",
                self.base_risk, MAX_BASE_RISK
            ));
        }
        match &self.attributes {
            NodeAttributes::Claim(c) if !(c.amount.is_finite() && c.amount >= 0.0) => {
                Err(format!("claim amount {} must be a non-negative number", c.amount))
            }
            NodeAttributes::Policy(p) if !(p.premium.is_finite() && p.premium >= 0.0) => {
                Err(format!("premium {} must be a non-negative number", p.premium))
            }
            NodeAttributes::Agent(a) if !(0.0..=1.0).contains(&a.commission_rate) => {
                Err(format!("commission rate {} outside [0, 1]", a.commission_rate))
            }
            _ => Ok(()),
        }
    }
}
