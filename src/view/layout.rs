//! Layout boundary
//!
//! The crate does not simulate forces. It prepares per-node radii and charges
//! and per-link distances, hands them to a [`LayoutEngine`] and checks what
//! comes back.

use super::filter::FilteredGraph;
use crate::graph::{NodeId, NodeKind, Relationship};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Layout errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Layout engine failed: {0}")]
    Engine(String),

    #[error("Layout engine returned no position for node {0}")]
    MissingPosition(NodeId),

    #[error("Layout engine returned a non-finite position for node {0}")]
    NonFinitePosition(NodeId),
}

/// Force parameters handed to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub width: f64,
    pub height: f64,
    /// Link distance between nodes of the same kind
    pub same_kind_distance: f64,
    /// Cross-kind link distance is `cross_kind_base + cross_kind_weight_factor × weight`
    pub cross_kind_base: f64,
    pub cross_kind_weight_factor: f64,
    /// Charge is `-(charge_base + charge_risk_factor × risk)`
    pub charge_base: f64,
    pub charge_risk_factor: f64,
    /// Added to the radius for collision avoidance
    pub collision_padding: f64,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 640.0,
            same_kind_distance: 120.0,
            cross_kind_base: 80.0,
            cross_kind_weight_factor: 10.0,
            charge_base: 300.0,
            charge_risk_factor: 50.0,
            collision_padding: 2.0,
        }
    }
}

impl ForceConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(format!(
                "layout canvas must be positive, got {}x{}",
                self.width, self.height
            ));
        }
        if self.same_kind_distance < 0.0 || self.cross_kind_base < 0.0 {
            return Err("link distances must not be negative".to_string());
        }
        Ok(())
    }

    pub fn link_distance(&self, source: NodeKind, target: NodeKind, weight: f64) -> f64 {
        if source == target {
            self.same_kind_distance
        } else {
            self.cross_kind_base + self.cross_kind_weight_factor * weight
        }
    }

    /// Repulsion grows with risk so risky nodes claim more room
    pub fn charge_strength(&self, risk_score: f64) -> f64 {
        -(self.charge_base + self.charge_risk_factor * risk_score)
    }
}

/// `max(6, 6 + 3·√risk + 2·ln(max(1, connections)))`
pub fn node_radius(risk_score: f64, connection_count: usize) -> f64 {
    let connections = connection_count.max(1) as f64;
    let radius = 6.0 + 3.0 * risk_score.max(0.0).sqrt() + 2.0 * connections.ln();
    radius.max(6.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub risk_score: f64,
    pub radius: f64,
    pub collision_radius: f64,
    pub charge: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutLink {
    pub source: NodeId,
    pub target: NodeId,
    pub relationship: Relationship,
    pub weight: f64,
    pub distance: f64,
}

/// Everything an engine needs to place a filtered graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRequest {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<LayoutNode>,
    pub links: Vec<LayoutLink>,
}

impl LayoutRequest {
    pub fn from_view(view: &FilteredGraph, config: &ForceConfig) -> Self {
        let nodes: Vec<LayoutNode> = view
            .nodes
            .iter()
            .map(|n| {
                let radius = node_radius(n.risk_score, n.connection_count);
                LayoutNode {
                    id: n.id.clone(),
                    kind: n.kind,
                    risk_score: n.risk_score,
                    radius,
                    collision_radius: radius + config.collision_padding,
                    charge: config.charge_strength(n.risk_score),
                }
            })
            .collect();

        let kinds: FxHashMap<&NodeId, NodeKind> = view.nodes.iter().map(|n| (&n.id, n.kind)).collect();
        let links = view
            .edges
            .iter()
            .filter_map(|e| {
                let source = *kinds.get(&e.source)?;
                let target = *kinds.get(&e.target)?;
                Some(LayoutLink {
                    source: e.source.clone(),
                    target: e.target.clone(),
                    relationship: e.relationship,
                    weight: e.weight,
                    distance: config.link_distance(source, target, e.weight),
                })
            })
            .collect();

        Self {
            width: config.width,
            height: config.height,
            nodes,
            links,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Final position of every node
pub type Positions = IndexMap<NodeId, Point>;

/// An external force-directed layout
pub trait LayoutEngine {
    fn layout(&self, request: &LayoutRequest) -> Result<Positions, LayoutError>;
}

/// Lay out a filtered view and check that every node got a finite position
pub fn run_layout<E: LayoutEngine + ?Sized>(
    engine: &E,
    view: &FilteredGraph,
    config: &ForceConfig,
) -> Result<Positions, LayoutError> {
    let request = LayoutRequest::from_view(view, config);
    let positions = engine.layout(&request)?;

    for node in &request.nodes {
        match positions.get(&node.id) {
            None => return Err(LayoutError::MissingPosition(node.id.clone())),
            Some(p) if !p.is_finite() => {
                return Err(LayoutError::NonFinitePosition(node.id.clone()))
            }
            Some(_) => {}
        }
    }

    debug!("Laid out {} nodes and {} links", request.nodes.len(), request.links.len());
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::filter::{ViewEdge, ViewNode};
    use std::collections::BTreeSet;

    struct GridEngine;

    impl LayoutEngine for GridEngine {
        fn layout(&self, request: &LayoutRequest) -> Result<Positions, LayoutError> {
            Ok(request
                .nodes
                .iter()
                .enumerate()
                .map(|(i, n)| (n.id.clone(), Point::new(i as f64 * 10.0, 0.0)))
                .collect())
        }
    }

    struct BrokenEngine;

    impl LayoutEngine for BrokenEngine {
        fn layout(&self, request: &LayoutRequest) -> Result<Positions, LayoutError> {
            let mut positions = Positions::new();
            if let Some(first) = request.nodes.first() {
                positions.insert(first.id.clone(), Point::new(f64::NAN, 1.0));
            }
            Ok(positions)
        }
    }

    struct EmptyEngine;

    impl LayoutEngine for EmptyEngine {
        fn layout(&self, _request: &LayoutRequest) -> Result<Positions, LayoutError> {
            Ok(Positions::new())
        }
    }

    fn view() -> FilteredGraph {
        let node = |id: &str, kind, risk, connections| ViewNode {
            id: NodeId::new(id),
            kind,
            risk_score: risk,
            connection_count: connections,
            high_risk_connection_count: 0,
            location: None,
        };
        let edge = |s: &str, t: &str, relationship, weight| ViewEdge {
            source: NodeId::new(s),
            target: NodeId::new(t),
            relationship,
            weight,
            flags: BTreeSet::new(),
        };
        FilteredGraph {
            min_score: 0.0,
            nodes: vec![
                node("AGT-1", NodeKind::Agent, 4.0, 2),
                node("AGT-2", NodeKind::Agent, 1.0, 1),
                node("TP-1", NodeKind::ThirdParty, 0.0, 0),
            ],
            edges: vec![
                edge("AGT-1", "AGT-2", Relationship::Manages, 1.0),
                edge("AGT-1", "TP-1", Relationship::FrequentCollaboration, 3.0),
            ],
        }
    }

    #[test]
    fn test_node_radius() {
        assert_eq!(node_radius(0.0, 0), 6.0);
        assert_eq!(node_radius(0.0, 1), 6.0);
        assert_eq!(node_radius(4.0, 1), 12.0);
        let expected = 6.0 + 3.0 * 2.0 + 2.0 * 10f64.ln();
        assert!((node_radius(4.0, 10) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_request_distances_and_charges() {
        let request = LayoutRequest::from_view(&view(), &ForceConfig::default());

        assert_eq!(request.links[0].distance, 120.0);
        assert_eq!(request.links[1].distance, 110.0);
        assert_eq!(request.nodes[0].charge, -500.0);
        assert_eq!(request.nodes[2].charge, -300.0);
        assert_eq!(request.nodes[2].radius, 6.0);
        assert_eq!(request.nodes[2].collision_radius, 8.0);

        let config = ForceConfig {
            cross_kind_weight_factor: 5.0,
            ..ForceConfig::default()
        };
        assert_eq!(config.link_distance(NodeKind::Claim, NodeKind::ThirdParty, 2.0), 90.0);
    }

    #[test]
    fn test_run_layout_checks_positions() {
        let positions = run_layout(&GridEngine, &view(), &ForceConfig::default()).unwrap();
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[&NodeId::new("TP-1")], Point::new(20.0, 0.0));

        let err = run_layout(&BrokenEngine, &view(), &ForceConfig::default()).unwrap_err();
        assert_eq!(err, LayoutError::NonFinitePosition(NodeId::new("AGT-1")));

        let err = run_layout(&EmptyEngine, &view(), &ForceConfig::default()).unwrap_err();
        assert_eq!(err, LayoutError::MissingPosition(NodeId::new("AGT-1")));
    }
}
