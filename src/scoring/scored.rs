//! Scored graph snapshots

use super::RiskScorer;
use crate::graph::{Edge, FraudGraph, GraphResult, Node, NodeId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Derived risk fields of one node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeRisk {
    pub connection_count: usize,
    pub high_risk_connection_count: usize,
    pub multiplier: f64,
    /// Composite score in [0, 5]
    pub risk_score: f64,
}

/// Score table keyed by node id, in graph insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskScores {
    entries: IndexMap<NodeId, NodeRisk>,
}

impl RiskScores {
    pub(crate) fn from_entries(entries: IndexMap<NodeId, NodeRisk>) -> Self {
        Self { entries }
    }

    pub fn get(&self, id: &NodeId) -> Option<&NodeRisk> {
        self.entries.get(id)
    }

    /// Score of a node, 0 for unknown ids
    pub fn risk_score(&self, id: &NodeId) -> f64 {
        self.entries.get(id).map_or(0.0, |r| r.risk_score)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &NodeRisk)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A frozen graph together with its score table.
///
/// The pair is immutable: adding an edge returns a new snapshot whose scores
/// were recomputed from scratch and leaves this one untouched.
#[derive(Debug, Clone)]
pub struct ScoredGraph {
    graph: FraudGraph,
    scores: RiskScores,
    scorer: RiskScorer,
}

impl ScoredGraph {
    pub(crate) fn new(graph: FraudGraph, scores: RiskScores, scorer: RiskScorer) -> Self {
        Self {
            graph,
            scores,
            scorer,
        }
    }

    pub fn graph(&self) -> &FraudGraph {
        &self.graph
    }

    pub fn scores(&self) -> &RiskScores {
        &self.scores
    }

    pub fn risk(&self, id: &NodeId) -> Option<&NodeRisk> {
        self.scores.get(id)
    }

    pub fn risk_score(&self, id: &NodeId) -> f64 {
        self.scores.risk_score(id)
    }

    /// Nodes paired with their derived fields, in insertion order
    pub fn scored_nodes(&self) -> impl Iterator<Item = (&Node, &NodeRisk)> {
        self.graph
            .nodes()
            .filter_map(move |node| self.scores.get(&node.id).map(|risk| (node, risk)))
    }

    /// Recompute the score table without changing the snapshot
    pub fn rescore(&self) -> RiskScores {
        self.scorer.compute(&self.graph)
    }

    /// A new snapshot with one more edge. On error this snapshot is still valid.
    pub fn with_edge(&self, edge: Edge) -> GraphResult<ScoredGraph> {
        let mut graph = self.graph.clone();
        graph.insert_edge(edge)?;
        Ok(self.scorer.score(graph))
    }

    pub fn into_parts(self) -> (FraudGraph, RiskScores) {
        (self.graph, self.scores)
    }
}
