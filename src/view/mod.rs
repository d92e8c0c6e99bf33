//! Views handed to the rendering layer
//!
//! - [`filter`]: risk-threshold induced subgraphs
//! - [`layout`]: the boundary to an external force-directed layout engine

pub mod filter;
pub mod layout;

pub use filter::{filter_by_score, filter_view, FilteredGraph, RiskFilter, ViewEdge, ViewNode};
pub use layout::{
    node_radius, run_layout, ForceConfig, LayoutEngine, LayoutError, LayoutLink, LayoutNode,
    LayoutRequest, Point, Positions,
};
