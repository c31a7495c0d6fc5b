//! # Configuration
//!
//! Engine settings, loadable from a JSON file. Every field has a default, so
//! a partial file (or none at all) is valid.
//!
//! Values are not clamped. [`EngineConfig::validate`] is called at the CLI
//! and HTTP boundaries and rejects out-of-range settings.

use assay_core::{EliminationCriteria, LoopLimits, SynthesisConfig, ValidationError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_hypotheses: usize,
    pub confidence_threshold: f64,
    pub max_iterations: usize,
    /// Spend allowed per interrogation run.
    pub budget_per_hypothesis: f64,
    /// Total cost of the routed strategies.
    pub routing_budget: f64,
    pub elimination: EliminationCriteria,
    pub synthesis: SynthesisConfig,
    /// Per-query timeout applied to the configured source.
    pub source_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_hypotheses: 5,
            confidence_threshold: 0.7,
            max_iterations: 10,
            budget_per_hypothesis: 5.0,
            routing_budget: 10.0,
            elimination: EliminationCriteria::default(),
            synthesis: SynthesisConfig::default(),
            source_timeout_ms: 10_000,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Limits for one interrogation run.
    pub fn loop_limits(&self) -> LoopLimits {
        LoopLimits {
            confidence_threshold: self.confidence_threshold,
            max_iterations: self.max_iterations,
            budget: self.budget_per_hypothesis,
        }
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_hypotheses == 0 {
            return Err(ValidationError::Zero {
                field: "max_hypotheses",
            });
        }
        if !self.routing_budget.is_finite() || self.routing_budget < 0.0 {
            return Err(ValidationError::Negative {
                field: "routing_budget",
                value: self.routing_budget,
            });
        }
        self.loop_limits().validate()?;
        self.elimination.validate()
    }
}

// =============================================================================
// TESTS
// =============================================================================
