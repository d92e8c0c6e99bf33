//! Claimgraph
//!
//! Fraud relationship-graph analyzer for insurance claims. Builds a graph of
//! policies, claims, agents and third parties, scores every entity from graph
//! topology and attribute outliers, and derives suspicious-pattern findings.
//!
//! # Pipeline
//!
//! Data flows one way, and every stage returns a new value:
//!
//! - records → [`FraudGraph`] ([`builder`])
//! - graph → [`ScoredGraph`], a frozen graph plus its score table ([`scoring`])
//! - scored graph → [`SuspiciousPatterns`] ([`patterns`])
//! - scored graph → [`FilteredGraph`] for a risk threshold ([`view`])
//! - filtered graph → an external [`LayoutEngine`]
//!
//! Randomness (synthetic data, third-party fan-out, collaboration edges) is
//! drawn from a generator the caller supplies, so a fixed seed reproduces the
//! same snapshot.
//!
//! ## Example Usage
//!
//! ```rust
//! use claimgraph::{FraudAnalyzer, RiskFilter};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let analyzer = FraudAnalyzer::default();
//! let mut rng = StdRng::seed_from_u64(42);
//! let analysis = analyzer.analyze_synthetic(&mut rng).unwrap();
//!
//! // Every score is bounded
//! assert!(analysis
//!     .graph
//!     .scored_nodes()
//!     .all(|(_, risk)| (0.0..=5.0).contains(&risk.risk_score)));
//!
//! // Only high-risk nodes and the edges between them
//! let view = analysis.view(RiskFilter::High);
//! assert!(view.nodes.iter().all(|n| n.risk_score >= 3.5));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod analysis;
pub mod assistant;
pub mod builder;
pub mod config;
pub mod graph;
pub mod patterns;
pub mod scoring;
pub mod view;

// Re-export main types for convenience
pub use graph::{
    Edge, EdgeFlag, EdgeId, FraudGraph, GraphError, GraphResult, GraphStatistics, Node,
    NodeAttributes, NodeId, NodeKind, Relationship,
};

pub use builder::{
    AssociationRules, GenerationConfig, GraphBuilder, RecordBatch, SyntheticGenerator,
};

pub use scoring::{NodeRisk, RiskRules, RiskScorer, RiskScores, ScoredGraph};

pub use patterns::{PatternDetector, PatternThresholds, SuspiciousPatterns};

pub use view::{
    filter_by_score, filter_view, node_radius, run_layout, FilteredGraph, ForceConfig,
    LayoutEngine, LayoutError, LayoutRequest, Positions, RiskFilter,
};

pub use assistant::{ask, summarize_findings, AssistantError, TextAssistant};

pub use config::{AnalyzerConfig, ConfigError, ConfigResult};

pub use analysis::{
    Analysis, AnalysisCache, AnalysisError, AnalysisReport, AnalysisResult, FraudAnalyzer,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
