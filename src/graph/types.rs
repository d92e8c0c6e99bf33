//! Core type definitions for the fraud graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node (e.g. "POL-0001", "CLM-0042")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

/// Unique identifier for an edge (dense insertion index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EdgeId(pub u64);

impl EdgeId {
    pub fn new(id: u64) -> Self {
        EdgeId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

impl From<u64> for EdgeId {
    fn from(id: u64) -> Self {
        EdgeId(id)
    }
}

/// The four entity kinds of the fraud graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Policy,
    Claim,
    Agent,
    ThirdParty,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Policy,
        NodeKind::Claim,
        NodeKind::Agent,
        NodeKind::ThirdParty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Policy => "policy",
            NodeKind::Claim => "claim",
            NodeKind::Agent => "agent",
            NodeKind::ThirdParty => "third_party",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship carried by an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    /// policy -> claim
    HasClaim,
    /// agent -> policy
    Manages,
    /// claim -> third party
    Involves,
    /// agent -> third party
    FrequentCollaboration,
}

impl Relationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::HasClaim => "has_claim",
            Relationship::Manages => "manages",
            Relationship::Involves => "involves",
            Relationship::FrequentCollaboration => "frequent_collaboration",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Markers attached to suspicious edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EdgeFlag {
    HighFrequency,
    UnusualAmounts,
}

impl EdgeFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeFlag::HighFrequency => "high_frequency",
            EdgeFlag::UnusualAmounts => "unusual_amounts",
        }
    }
}

impl fmt::Display for EdgeFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
