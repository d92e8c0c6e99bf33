//! Edge implementation for the fraud graph
//!
//! Edges are directed, weighted and may repeat between the same pair of
//! nodes. They reference their endpoints by id and own nothing.

use super::types::{EdgeFlag, EdgeId, NodeId, Relationship};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A directed edge in the fraud graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier, assigned when the edge is inserted into a graph
    pub id: EdgeId,

    /// Source node (edge goes FROM this node)
    pub source: NodeId,

    /// Target node (edge goes TO this node)
    pub target: NodeId,

    pub relationship: Relationship,

    /// Relative suspicion of the relationship; higher is more suspicious
    pub weight: f64,

    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_amount: Option<f64>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub flags: BTreeSet<EdgeFlag>,
}

impl Edge {
    /// Create a new directed edge with weight 1 and no flags.
    ///
    /// The id is a placeholder until the graph assigns one on insertion.
    pub fn new(
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        relationship: Relationship,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Edge {
            id: EdgeId::new(0),
            source: source.into(),
            target: target.into(),
            relationship,
            weight: 1.0,
            timestamp,
            transaction_amount: None,
            flags: BTreeSet::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_transaction_amount(mut self, amount: f64) -> Self {
        self.transaction_amount = Some(amount);
        self
    }

    pub fn with_flags(mut self, flags: impl IntoIterator<Item = EdgeFlag>) -> Self {
        self.flags.extend(flags);
        self
    }

    pub fn has_flag(&self, flag: EdgeFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Check if this edge touches a node as source or target
    pub fn touches(&self, node: &NodeId) -> bool {
        self.source == *node || self.target == *node
    }

    /// The endpoint opposite to `node`, if `node` is an endpoint
    pub fn other_end(&self, node: &NodeId) -> Option<&NodeId> {
        if self.source == *node {
            Some(&self.target)
        } else if self.target == *node {
            Some(&self.source)
        } else {
            None
        }
    }

    /// Check if this edge connects two specific nodes (in either direction)
    pub fn connects(&self, node1: &NodeId, node2: &NodeId) -> bool {
        (self.source == *node1 && self.target == *node2)
            || (self.source == *node2 && self.target == *node1)
    }
}
