//! Precision / recall / F1 from confusion counts, and the report shape.

use super::types::{FractionalCounts, LabelCounts};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Precision, recall, F1 and support for one label or overall.
///
/// `support` is `tp + fn`. It is integral when computed from raw counts and
/// may be fractional on the approximate aggregation path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// `tp / (tp + fp)`, 0 if no predictions.
    pub precision: f64,
    /// `tp / (tp + fn)`, 0 if no ground truth.
    pub recall: f64,
    /// Harmonic mean of precision and recall, 0 if both are 0.
    pub f1: f64,
    /// `tp + fn`.
    pub support: f64,
}

impl Metrics {
    /// Metrics from raw counts.
    #[must_use]
    pub fn from_counts(counts: &LabelCounts) -> Self {
        Self::from_fractional(&FractionalCounts::from(*counts))
    }

    /// Metrics from possibly fractional counts.
    #[must_use]
    pub fn from_fractional(counts: &FractionalCounts) -> Self {
        let tp = counts.true_positive;
        let predicted = tp + counts.false_positive;
        let actual = tp + counts.false_negative;

        let precision = if predicted > 0.0 { tp / predicted } else { 0.0 };
        let recall = if actual > 0.0 { tp / actual } else { 0.0 };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            precision,
            recall,
            f1,
            support: actual,
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P={:.1}% R={:.1}% F1={:.1}% (support {})",
            self.precision * 100.0,
            self.recall * 100.0,
            self.f1 * 100.0,
            self.support
        )
    }
}

/// `{overall, per_class}`: the externally consumed evaluation output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Metrics over label-summed counts.
    pub overall: Metrics,
    /// Metrics per label, sorted by label.
    pub per_class: BTreeMap<String, Metrics>,
}

impl EvaluationReport {
    /// Build a report from per-label raw counts.
    #[must_use]
    pub fn from_counts(counts: &BTreeMap<String, LabelCounts>) -> Self {
        let mut total = LabelCounts::default();
        let per_class = counts
            .iter()
            .map(|(label, c)| {
                total += *c;
                (label.clone(), Metrics::from_counts(c))
            })
            .collect();
        Self {
            overall: Metrics::from_counts(&total),
            per_class,
        }
    }

    /// Build a report from per-label fractional counts.
    #[must_use]
    pub fn from_fractional(counts: &BTreeMap<String, FractionalCounts>) -> Self {
        let mut total = FractionalCounts::default();
        let per_class = counts
            .iter()
            .map(|(label, c)| {
                total += *c;
                (label.clone(), Metrics::from_fractional(c))
            })
            .collect();
        Self {
            overall: Metrics::from_fractional(&total),
            per_class,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a report back from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Human-readable table.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = format!("{:<14} {:>9} {:>9} {:>9} {:>9}\n", "label", "precision", "recall", "f1", "support");
        for (label, m) in &self.per_class {
            out.push_str(&format!(
                "{:<14} {:>9.4} {:>9.4} {:>9.4} {:>9.1}\n",
                label, m.precision, m.recall, m.f1, m.support
            ));
        }
        let m = &self.overall;
        out.push_str(&format!(
            "{:<14} {:>9.4} {:>9.4} {:>9.4} {:>9.1}\n",
            "OVERALL", m.precision, m.recall, m.f1, m.support
        ));
        out
    }
}
