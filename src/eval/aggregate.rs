//! Cross-document aggregation.
//!
//! Two paths:
//!
//! - [`AggregationMode::RawCounts`]: sum per-label TP/FP/FN across documents,
//!   then compute metrics once. Exact.
//! - [`AggregationMode::Approximate`]: start from each document's per-label
//!   `{precision, recall, support}` and back-derive counts:
//!
//! ```text
//! tp ≈ support · recall
//! fp ≈ tp / precision − tp        if precision > 0
//!      support · (1 − recall)     otherwise
//! fn ≈ support − tp
//! ```
//!
//! The approximation loses information (a label with only false positives
//! has precision 0 and support 0, so its false positives vanish). It exists
//! to reproduce historical reports.

use super::matching::merge_counts;
use super::metrics::{EvaluationReport, Metrics};
use super::types::{FractionalCounts, LabelCounts};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How per-document results are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Sum raw counts.
    #[default]
    RawCounts,
    /// Back-derive counts from per-document metrics.
    Approximate,
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AggregationMode::RawCounts => "raw_counts",
            AggregationMode::Approximate => "approximate",
        })
    }
}

impl FromStr for AggregationMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "raw" | "raw_counts" => Ok(AggregationMode::RawCounts),
            "approximate" | "approx" => Ok(AggregationMode::Approximate),
            other => Err(crate::Error::invalid_input(format!(
                "unknown aggregation mode '{other}'"
            ))),
        }
    }
}

/// Back-derive counts from one label's metrics.
#[must_use]
pub fn approximate_counts(metrics: &Metrics) -> FractionalCounts {
    let tp = metrics.support * metrics.recall;
    let fp = if metrics.precision > 0.0 {
        tp / metrics.precision - tp
    } else {
        metrics.support * (1.0 - metrics.recall)
    };
    FractionalCounts {
        true_positive: tp,
        false_positive: fp,
        false_negative: metrics.support - tp,
    }
}

/// Sum raw per-label counts across documents into one report.
#[must_use]
pub fn aggregate_raw<'a>(
    documents: impl IntoIterator<Item = &'a BTreeMap<String, LabelCounts>>,
) -> EvaluationReport {
    let mut total = BTreeMap::new();
    for counts in documents {
        merge_counts(&mut total, counts);
    }
    EvaluationReport::from_counts(&total)
}

/// Combine per-document reports via back-derived counts.
#[must_use]
pub fn aggregate_approximate<'a>(
    reports: impl IntoIterator<Item = &'a EvaluationReport>,
) -> EvaluationReport {
    let mut total: BTreeMap<String, FractionalCounts> = BTreeMap::new();
    for report in reports {
        for (label, metrics) in &report.per_class {
            *total.entry(label.clone()).or_default() += approximate_counts(metrics);
        }
    }
    EvaluationReport::from_fractional(&total)
}

/// Aggregate per-document raw counts under `mode`.
///
/// On the approximate path each document is first reduced to its own
/// report, as if only metrics crossed the document boundary.
#[must_use]
pub fn aggregate<'a>(
    mode: AggregationMode,
    documents: impl IntoIterator<Item = &'a BTreeMap<String, LabelCounts>>,
) -> EvaluationReport {
    match mode {
        AggregationMode::RawCounts => aggregate_raw(documents),
        AggregationMode::Approximate => {
            let reports: Vec<EvaluationReport> = documents
                .into_iter()
                .map(EvaluationReport::from_counts)
                .collect();
            aggregate_approximate(&reports)
        }
    }
}
