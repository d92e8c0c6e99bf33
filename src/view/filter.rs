//! Risk-threshold views of a scored graph

use crate::graph::{EdgeFlag, NodeId, NodeKind, Relationship};
use crate::scoring::ScoredGraph;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Risk threshold selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFilter {
    #[default]
    All,
    Medium,
    High,
}

impl RiskFilter {
    /// Minimum score a node needs to stay in the view
    pub fn min_score(&self) -> f64 {
        match self {
            RiskFilter::All => 0.0,
            RiskFilter::Medium => 2.0,
            RiskFilter::High => 3.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskFilter::All => "all",
            RiskFilter::Medium => "medium",
            RiskFilter::High => "high",
        }
    }
}

impl fmt::Display for RiskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(RiskFilter::All),
            "medium" => Ok(RiskFilter::Medium),
            "high" => Ok(RiskFilter::High),
            other => Err(format!(
                "unknown risk filter '{}', expected one of: all, medium, high",
                other
            )),
        }
    }
}

/// A node as handed to the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub risk_score: f64,
    pub connection_count: usize,
    pub high_risk_connection_count: usize,
    pub location: Option<String>,
}

/// An edge between two surviving nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub relationship: Relationship,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub flags: BTreeSet<EdgeFlag>,
}

/// Induced subgraph of the nodes meeting a score cutoff
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilteredGraph {
    pub min_score: f64,
    pub nodes: Vec<ViewNode>,
    pub edges: Vec<ViewEdge>,
}

impl FilteredGraph {
    pub fn node(&self, id: &NodeId) -> Option<&ViewNode> {
        self.nodes.iter().find(|n| n.id == *id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// View for one of the three selector levels
pub fn filter_view(scored: &ScoredGraph, filter: RiskFilter) -> FilteredGraph {
    filter_by_score(scored, filter.min_score())
}

/// Nodes with `risk_score >= min_score` and the edges whose endpoints both
/// survive, in graph order. The source graph is left untouched.
pub fn filter_by_score(scored: &ScoredGraph, min_score: f64) -> FilteredGraph {
    let nodes: Vec<ViewNode> = scored
        .scored_nodes()
        .filter(|(_, risk)| risk.risk_score >= min_score)
        .map(|(node, risk)| ViewNode {
            id: node.id.clone(),
            kind: node.kind(),
            risk_score: risk.risk_score,
            connection_count: risk.connection_count,
            high_risk_connection_count: risk.high_risk_connection_count,
            location: node.location().map(str::to_string),
        })
        .collect();

    let kept: FxHashSet<&NodeId> = nodes.iter().map(|n| &n.id).collect();
    let edges: Vec<ViewEdge> = scored
        .graph()
        .edges()
        .iter()
        .filter(|e| kept.contains(&e.source) && kept.contains(&e.target))
        .map(|e| ViewEdge {
            source: e.source.clone(),
            target: e.target.clone(),
            relationship: e.relationship,
            weight: e.weight,
            flags: e.flags.clone(),
        })
        .collect();

    FilteredGraph {
        min_score,
        nodes,
        edges,
    }
}
