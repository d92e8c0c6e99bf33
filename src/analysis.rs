//! Analysis pipeline
//!
//! One call takes an immutable [`RecordBatch`] and a random source and returns
//! one immutable [`Analysis`]: build, score, detect. Snapshots are never
//! updated in place; [`AnalysisCache`] shares them behind `Arc`.

use crate::builder::{BatchFingerprint, GraphBuilder, RecordBatch, SyntheticGenerator};
use crate::config::{AnalyzerConfig, ConfigResult};
use crate::graph::{GraphError, GraphResult, GraphStatistics};
use crate::patterns::{PatternDetector, SuspiciousPatterns};
use crate::scoring::{RiskScorer, ScoredGraph};
use crate::view::{
    filter_view, run_layout, FilteredGraph, ForceConfig, LayoutEngine, LayoutError, Positions,
    RiskFilter,
};
use lru::LruCache;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Failed to fingerprint record batch: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Runs the whole pipeline with one configuration
#[derive(Debug, Clone)]
pub struct FraudAnalyzer {
    config: AnalyzerConfig,
    generator: SyntheticGenerator,
    builder: GraphBuilder,
    scorer: RiskScorer,
    detector: PatternDetector,
}

impl Default for FraudAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl FraudAnalyzer {
    /// Analyzer over `config` as given. Out-of-range settings are clamped
    /// where they are used; see [`FraudAnalyzer::try_new`] to reject them.
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            generator: SyntheticGenerator::new(config.generation.clone()),
            builder: GraphBuilder::new(config.associations.clone()),
            scorer: RiskScorer::new(config.risk.clone()),
            detector: PatternDetector::new(config.patterns.clone()),
            config,
        }
    }

    /// Validate `config` first
    pub fn try_new(config: AnalyzerConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn force_config(&self) -> &ForceConfig {
        &self.config.layout
    }

    /// Lay out `view` with the configured forces
    pub fn layout<E: LayoutEngine + ?Sized>(
        &self,
        engine: &E,
        view: &FilteredGraph,
    ) -> Result<Positions, LayoutError> {
        run_layout(engine, view, &self.config.layout)
    }

    /// Synthesize a batch with the configured counts
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> RecordBatch {
        self.generator.generate(rng)
    }

    /// Build, score and detect over one batch
    pub fn analyze<R: Rng + ?Sized>(&self, batch: &RecordBatch, rng: &mut R) -> GraphResult<Analysis> {
        let graph = self.builder.build(batch, rng)?;
        let scored = self.scorer.score(graph);
        let patterns = self.detector.detect(&scored);

        info!(
            "Analyzed {} nodes and {} edges: {} findings",
            scored.graph().node_count(),
            scored.graph().edge_count(),
            patterns.total_findings()
        );
        Ok(Analysis {
            graph: scored,
            patterns,
        })
    }

    /// Generate a batch from `rng` and analyze it with the same source
    pub fn analyze_synthetic<R: Rng + ?Sized>(&self, rng: &mut R) -> GraphResult<Analysis> {
        let batch = self.generate(rng);
        self.analyze(&batch, rng)
    }
}

/// One immutable snapshot: the scored graph and its findings
#[derive(Debug, Clone)]
pub struct Analysis {
    pub graph: ScoredGraph,
    pub patterns: SuspiciousPatterns,
}

impl Analysis {
    pub fn statistics(&self) -> GraphStatistics {
        self.graph.graph().statistics()
    }

    pub fn view(&self, filter: RiskFilter) -> FilteredGraph {
        filter_view(&self.graph, filter)
    }

    pub fn report(&self, filter: RiskFilter) -> AnalysisReport {
        AnalysisReport {
            statistics: self.statistics(),
            filter,
            view: self.view(filter),
            patterns: self.patterns.clone(),
        }
    }
}

/// Serializable output handed to the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub statistics: GraphStatistics,
    pub filter: RiskFilter,
    pub view: FilteredGraph,
    pub patterns: SuspiciousPatterns,
}

/// Memoizes analyses by batch fingerprint and seed
pub struct AnalysisCache {
    entries: LruCache<(BatchFingerprint, u64), Arc<Analysis>>,
    hits: u64,
    misses: u64,
}

impl AnalysisCache {
    /// A zero capacity is treated as one
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Cache sized by `config.cache_capacity`
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.cache_capacity)
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Return the cached snapshot for `(batch, seed)` or run the analysis with
    /// a generator seeded from `seed`
    pub fn get_or_analyze(
        &mut self,
        analyzer: &FraudAnalyzer,
        batch: &RecordBatch,
        seed: u64,
    ) -> AnalysisResult<Arc<Analysis>> {
        let key = (batch.fingerprint()?, seed);
        if let Some(analysis) = self.entries.get(&key) {
            self.hits += 1;
            debug!("Analysis cache hit for {} (seed {})", key.0, seed);
            return Ok(Arc::clone(analysis));
        }

        self.misses += 1;
        debug!("Analysis cache miss for {} (seed {})", key.0, seed);
        let mut rng = StdRng::seed_from_u64(seed);
        let analysis = Arc::new(analyzer.analyze(batch, &mut rng)?);
        self.entries.put(key, Arc::clone(&analysis));
        Ok(analysis)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GenerationConfig;

    fn small_analyzer() -> FraudAnalyzer {
        FraudAnalyzer::new(AnalyzerConfig {
            generation: GenerationConfig {
                policies: 8,
                claims: 20,
                agents: 4,
                third_parties: 6,
                ..GenerationConfig::default()
            },
            ..AnalyzerConfig::default()
        })
    }

    #[test]
    fn test_synthetic_analysis_is_deterministic() {
        let analyzer = small_analyzer();
        let a = analyzer.analyze_synthetic(&mut StdRng::seed_from_u64(11)).unwrap();
        let b = analyzer.analyze_synthetic(&mut StdRng::seed_from_u64(11)).unwrap();

        assert_eq!(a.statistics(), b.statistics());
        assert_eq!(a.graph.scores(), b.graph.scores());
        assert_eq!(a.patterns, b.patterns);
        assert_eq!(a.statistics().node_count, 38);
    }

    #[test]
    fn test_report_carries_filter() {
        let analysis = small_analyzer()
            .analyze_synthetic(&mut StdRng::seed_from_u64(5))
            .unwrap();
        let report = analysis.report(RiskFilter::High);
        assert_eq!(report.filter, RiskFilter::High);
        assert_eq!(report.view.min_score, 3.5);
        assert!(report.view.nodes.iter().all(|n| n.risk_score >= 3.5));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["filter"], "high");
    }

    #[test]
    fn test_cache_returns_the_same_snapshot() {
        let analyzer = small_analyzer();
        let batch = analyzer.generate(&mut StdRng::seed_from_u64(9));
        let mut cache = AnalysisCache::new(2);

        let first = cache.get_or_analyze(&analyzer, &batch, 1).unwrap();
        let again = cache.get_or_analyze(&analyzer, &batch, 1).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);

        let other_seed = cache.get_or_analyze(&analyzer, &batch, 2).unwrap();
        assert!(!Arc::ptr_eq(&first, &other_seed));
        assert_eq!(cache.len(), 2);

        // capacity 2: a third key evicts the least recently used
        let mut changed = batch.clone();
        changed.claims.truncate(5);
        cache.get_or_analyze(&analyzer, &changed, 1).unwrap();
        assert_eq!(cache.len(), 2);
        let refreshed = cache.get_or_analyze(&analyzer, &batch, 1).unwrap();
        assert!(!Arc::ptr_eq(&first, &refreshed));
        assert_eq!(cache.misses(), 4);
    }

    #[test]
    fn test_zero_capacity() {
        let cache = AnalysisCache::new(0);
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 1);
    }

    #[test]
    fn test_cache_sized_from_config() {
        let config = AnalyzerConfig {
            cache_capacity: 1,
            ..small_analyzer().config().clone()
        };
        let analyzer = FraudAnalyzer::new(config.clone());
        let mut cache = AnalysisCache::from_config(&config);
        assert_eq!(cache.capacity(), 1);

        let batch = analyzer.generate(&mut StdRng::seed_from_u64(4));
        let first = cache.get_or_analyze(&analyzer, &batch, 1).unwrap();
        cache.get_or_analyze(&analyzer, &batch, 2).unwrap();
        assert_eq!(cache.len(), 1);
        let again = cache.get_or_analyze(&analyzer, &batch, 1).unwrap();
        assert!(!Arc::ptr_eq(&first, &again));
        assert_eq!(cache.misses(), 3);

        assert_eq!(AnalysisCache::from_config(&AnalyzerConfig::default()).capacity(), 16);
    }

    #[test]
    fn test_try_new_rejects_invalid_config() {
        let mut config = AnalyzerConfig::default();
        config.associations.collaboration_ratio = f64::NAN;
        let err = FraudAnalyzer::try_new(config.clone()).unwrap_err();
        assert!(matches!(
            err,
            crate::config::ConfigError::Invalid { section: "associations", .. }
        ));

        // the unchecked constructor still runs: NaN means no agent is flagged
        let analysis = FraudAnalyzer::new(config)
            .analyze_synthetic(&mut StdRng::seed_from_u64(6))
            .unwrap();
        assert!(!analysis
            .statistics()
            .relationships
            .contains_key(&crate::graph::Relationship::FrequentCollaboration));

        assert!(FraudAnalyzer::try_new(AnalyzerConfig::default()).is_ok());
    }
}
