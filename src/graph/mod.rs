//! Fraud relationship graph
//!
//! This module implements the entity and relationship model:
//! - Policy, claim, agent and third-party nodes with kind-specific attributes
//! - Directed, weighted edges; several edges may join the same pair of nodes
//! - In-memory storage with adjacency lists and a per-kind index

pub mod edge;
pub mod node;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::Edge;
pub use node::{
    AgentAttributes, ClaimAttributes, ClaimStatus, Node, NodeAttributes, PolicyAttributes,
    ThirdPartyAttributes, MAX_BASE_RISK,
};
pub use store::{FraudGraph, GraphError, GraphResult, GraphStatistics};
pub use types::{EdgeFlag, EdgeId, NodeId, NodeKind, Relationship};
