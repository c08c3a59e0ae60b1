//! Evaluation configuration, loaded from TOML.
//!
//! ```toml
//! strategy = "overlap"
//! overlap_threshold = 0.5
//! aggregation = "raw_counts"
//! elevate_headings = false
//! limit = 100
//!
//! [label_map]
//! NAME_STUDENT = "PERSON"
//! PHONE_NUM = "PHONE"
//! ```
//!
//! Every key is optional. An absent `label_map` means the Kaggle PII table;
//! an empty one means identity.

use crate::eval::{AggregationMode, EvalOptions, LabelMap, MatchStrategy, DEFAULT_OVERLAP_THRESHOLD};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of a matching strategy, as written in config files and on the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Exact span and text.
    Exact,
    /// Symmetric containment at `overlap_threshold`.
    #[default]
    Overlap,
}

/// Settings for a corpus evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    /// Matching strategy.
    pub strategy: StrategyKind,
    /// Threshold for the overlap strategy, in `(0, 1]`.
    pub overlap_threshold: f64,
    /// How per-document counts are combined.
    pub aggregation: AggregationMode,
    /// Ground-truth label remap. `None` selects the Kaggle table.
    pub label_map: Option<LabelMap>,
    /// Classify PERSON in headings as an explicit identifier.
    pub elevate_headings: bool,
    /// Evaluate only the first `n` valid rows.
    pub limit: Option<usize>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Overlap,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
            aggregation: AggregationMode::RawCounts,
            label_map: None,
            elevate_headings: false,
            limit: None,
        }
    }
}

impl EvalConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.overlap_threshold > 0.0 && self.overlap_threshold <= 1.0) {
            return Err(Error::config(format!(
                "overlap_threshold must be in (0, 1], got {}",
                self.overlap_threshold
            )));
        }
        if self.limit == Some(0) {
            return Err(Error::config("limit must be at least 1"));
        }
        Ok(())
    }

    /// The matching strategy these settings describe.
    pub fn match_strategy(&self) -> Result<MatchStrategy> {
        match self.strategy {
            StrategyKind::Exact => Ok(MatchStrategy::Exact),
            StrategyKind::Overlap => MatchStrategy::overlap(self.overlap_threshold),
        }
    }

    /// Convert into options for [`crate::eval::evaluate_corpus`].
    pub fn to_options(&self) -> Result<EvalOptions> {
        self.validate()?;
        Ok(EvalOptions {
            strategy: self.match_strategy()?,
            label_map: self.label_map.clone().unwrap_or_else(LabelMap::kaggle_default),
            aggregation: self.aggregation,
            limit: self.limit,
        })
    }
}
