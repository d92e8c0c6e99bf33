//! In-memory fraud graph storage
//!
//! Nodes are kept in insertion order so every traversal, and every finding
//! derived from one, comes out in a reproducible order. Nodes are never
//! removed; edges are only ever appended.

use super::edge::Edge;
use super::node::Node;
use super::types::{EdgeId, NodeId, NodeKind, Relationship};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during graph construction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// An edge or record refers to a node that does not exist
    #[error("Missing reference: node {0} does not exist")]
    MissingReference(NodeId),

    #[error("Node {0} already exists")]
    DuplicateNode(NodeId),

    #[error("Invalid attribute on {id}: {reason}")]
    InvalidAttribute { id: NodeId, reason: String },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Node and edge counts of a graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub node_count: usize,
    pub edge_count: usize,
    pub policies: usize,
    pub claims: usize,
    pub agents: usize,
    pub third_parties: usize,
    /// Edge counts keyed by relationship, in first-seen order
    pub relationships: IndexMap<Relationship, usize>,
}

/// In-memory fraud graph
///
/// - nodes: NodeId -> Node, in insertion order
/// - edges: dense arena indexed by EdgeId
/// - outgoing / incoming: adjacency lists of edge ids per node
/// - kind_index: NodeKind -> node ids, in insertion order
#[derive(Debug, Clone, Default)]
pub struct FraudGraph {
    nodes: IndexMap<NodeId, Node>,
    edges: Vec<Edge>,
    outgoing: HashMap<NodeId, Vec<EdgeId>>,
    incoming: HashMap<NodeId, Vec<EdgeId>>,
    kind_index: HashMap<NodeKind, Vec<NodeId>>,
}

impl FraudGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, validating its id and attributes
    pub fn insert_node(&mut self, node: Node) -> GraphResult<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        node.validate().map_err(|reason| GraphError::InvalidAttribute {
            id: node.id.clone(),
            reason,
        })?;

        self.kind_index
            .entry(node.kind())
            .or_default()
            .push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Insert an edge and return its assigned id.
    ///
    /// Both endpoints must already exist; the source is checked first.
    pub fn insert_edge(&mut self, mut edge: Edge) -> GraphResult<EdgeId> {
        for endpoint in [&edge.source, &edge.target] {
            if !self.nodes.contains_key(endpoint) {
                return Err(GraphError::MissingReference(endpoint.clone()));
            }
        }
        if !(edge.weight.is_finite() && edge.weight >= 0.0) {
            return Err(GraphError::InvalidAttribute {
                id: edge.source.clone(),
                reason: format!("edge weight {} must be a non-negative number", edge.weight),
            });
        }

        let id = EdgeId::new(self.edges.len() as u64);
        edge.id = id;

        self.outgoing.entry(edge.source.clone()).or_default().push(id);
        self.incoming.entry(edge.target.clone()).or_default().push(id);
        self.edges.push(edge);
        Ok(id)
    }

    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn has_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Position of a node in insertion order
    pub fn node_index(&self, id: &NodeId) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    /// Node at a position in insertion order
    pub fn node_at(&self, index: usize) -> Option<&Node> {
        self.nodes.get_index(index).map(|(_, node)| node)
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.as_u64() as usize)
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All edges in insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Nodes of one kind, in insertion order
    pub fn nodes_by_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.kind_index
            .get(&kind)
            .into_iter()
            .flatten()
            .filter_map(|id| self.nodes.get(id))
    }

    /// Edges leaving a node
    pub fn outgoing_edges(&self, id: &NodeId) -> impl Iterator<Item = &Edge> {
        self.edge_list(self.outgoing.get(id))
    }

    /// Edges entering a node
    pub fn incoming_edges(&self, id: &NodeId) -> impl Iterator<Item = &Edge> {
        self.edge_list(self.incoming.get(id))
    }

    /// Edges touching a node in either direction (outgoing first)
    pub fn incident_edges(&self, id: &NodeId) -> impl Iterator<Item = &Edge> {
        self.outgoing_edges(id).chain(self.incoming_edges(id))
    }

    /// Nodes at the other end of the node's edges with a given relationship.
    ///
    /// Multi-edges yield the same neighbor more than once.
    pub fn neighbors<'a>(
        &'a self,
        id: &'a NodeId,
        relationship: Relationship,
    ) -> impl Iterator<Item = &'a Node> + 'a {
        self.incident_edges(id)
            .filter(move |e| e.relationship == relationship)
            .filter_map(move |e| e.other_end(id))
            .filter_map(|other| self.nodes.get(other))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn count_by_kind(&self, kind: NodeKind) -> usize {
        self.kind_index.get(&kind).map_or(0, Vec::len)
    }

    pub fn statistics(&self) -> GraphStatistics {
        let mut relationships = IndexMap::new();
        for edge in &self.edges {
            *relationships.entry(edge.relationship).or_insert(0) += 1;
        }

        GraphStatistics {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            policies: self.count_by_kind(NodeKind::Policy),
            claims: self.count_by_kind(NodeKind::Claim),
            agents: self.count_by_kind(NodeKind::Agent),
            third_parties: self.count_by_kind(NodeKind::ThirdParty),
            relationships,
        }
    }

    fn edge_list<'a>(&'a self, ids: Option<&'a Vec<EdgeId>>) -> impl Iterator<Item = &'a Edge> + 'a {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id.as_u64() as usize))
    }
}
