//! Analyzer configuration
//!
//! Every threshold of the pipeline lives here with its reference default. A
//! YAML file may override any subset of it:
//!
//! ```yaml
//! generation:
//!   policies: 200
//!   claims: 600
//! risk:
//!   heavy_edge_weight: 3.0
//! patterns:
//!   anomaly_sigma: 2.5
//! cache_capacity: 8
//! ```

use crate::builder::{AssociationRules, GenerationConfig};
use crate::patterns::PatternThresholds;
use crate::scoring::RiskRules;
use crate::view::ForceConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid {section} config: {reason}")]
    Invalid {
        section: &'static str,
        reason: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub generation: GenerationConfig,
    pub associations: AssociationRules,
    pub risk: RiskRules,
    pub patterns: PatternThresholds,
    pub layout: ForceConfig,
    /// Number of analyses kept by the cache
    pub cache_capacity: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            associations: AssociationRules::default(),
            risk: RiskRules::default(),
            patterns: PatternThresholds::default(),
            layout: ForceConfig::default(),
            cache_capacity: 16,
        }
    }
}

impl AnalyzerConfig {
    /// Load and validate a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        debug!("Loaded config from {}", path.display());
        Self::from_yaml_str(&text)
    }

    /// Parse and validate YAML; missing sections and fields keep their defaults
    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        let config: AnalyzerConfig = if text.trim().is_empty() {
            AnalyzerConfig::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        fn section(name: &'static str, result: Result<(), String>) -> ConfigResult<()> {
            result.map_err(|reason| ConfigError::Invalid {
                section: name,
                reason,
            })
        }

        section("generation", self.generation.validate())?;
        section("associations", self.associations.validate())?;
        section("risk", self.risk.validate())?;
        section("patterns", self.patterns.validate())?;
        section("layout", self.layout.validate())?;
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                section: "cache",
                reason: "cache_capacity must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
