//! Prediction to ground-truth matching for one element.
//!
//! # Strategies
//!
//! ```text
//! Exact      (text, start, end) must be identical, label must match
//!
//! Overlap    label must match and, with o = |pred ∩ gold|,
//!            o / |pred| >= t  and  o / |gold| >= t
//!
//!   pred  [==========)        0..10
//!   gold    [=======)         2..9     o = 7: 7/10 = 0.7, 7/7 = 1.0
//!                                      matches at t = 0.5, not at t = 0.9
//! ```
//!
//! Matching is greedy in prediction order and partitioned by label: each
//! label keeps its own set of consumed ground-truth entries.

use super::label_map::LabelMap;
use super::types::{GroundTruthEntity, LabelCounts};
use crate::{Entity, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Default overlap threshold.
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.5;

/// How predictions are matched to ground truth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Same label, text, start and end.
    #[default]
    Exact,
    /// Same label and symmetric containment at or above `threshold`.
    Overlap {
        /// Minimum fraction of both spans covered by the intersection.
        threshold: f64,
    },
}

impl MatchStrategy {
    /// Overlap strategy with a validated threshold in `(0, 1]`.
    pub fn overlap(threshold: f64) -> Result<Self> {
        if threshold > 0.0 && threshold <= 1.0 {
            Ok(MatchStrategy::Overlap { threshold })
        } else {
            Err(Error::invalid_input(format!(
                "overlap threshold must be in (0, 1], got {threshold}"
            )))
        }
    }

    /// Short name used in logs and reports.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::Overlap { .. } => "overlap",
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStrategy::Exact => f.write_str("exact"),
            MatchStrategy::Overlap { threshold } => write!(f, "overlap@{threshold}"),
        }
    }
}

/// Per-label counts for one element, plus which ground-truth entries each
/// label consumed (by index into the ground-truth slice).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    counts: BTreeMap<String, LabelCounts>,
    consumed: BTreeMap<String, BTreeSet<usize>>,
}

impl MatchOutcome {
    /// Counts per label. Every label seen in predictions or remapped ground
    /// truth has an entry, possibly all zero.
    #[must_use]
    pub fn counts(&self) -> &BTreeMap<String, LabelCounts> {
        &self.counts
    }

    /// Consume the outcome, keeping only the counts.
    #[must_use]
    pub fn into_counts(self) -> BTreeMap<String, LabelCounts> {
        self.counts
    }

    /// Counts for one label.
    #[must_use]
    pub fn label(&self, label: &str) -> LabelCounts {
        self.counts.get(label).copied().unwrap_or_default()
    }

    /// Ground-truth indices consumed under `label`.
    #[must_use]
    pub fn consumed(&self, label: &str) -> Option<&BTreeSet<usize>> {
        self.consumed.get(label)
    }

    /// Counts summed over labels.
    #[must_use]
    pub fn total(&self) -> LabelCounts {
        self.counts.values().fold(LabelCounts::default(), |mut acc, c| {
            acc += *c;
            acc
        })
    }
}

/// Add `other`'s counts into `into`, label by label.
pub fn merge_counts(into: &mut BTreeMap<String, LabelCounts>, other: &BTreeMap<String, LabelCounts>) {
    for (label, counts) in other {
        *into.entry(label.clone()).or_default() += *counts;
    }
}

/// Match one element's predictions against its ground truth.
///
/// `label_map` is applied to ground-truth labels only.
#[must_use]
pub fn evaluate_element(
    predictions: &[Entity],
    ground_truth: &[GroundTruthEntity],
    strategy: MatchStrategy,
    label_map: &LabelMap,
) -> MatchOutcome {
    let gold_labels: Vec<&str> = ground_truth.iter().map(|g| label_map.map(&g.label)).collect();
    let mut outcome = MatchOutcome::default();

    for pred in predictions {
        let consumed = outcome.consumed.entry(pred.label.clone()).or_default();
        let available = ground_truth
            .iter()
            .enumerate()
            .filter(|(i, _)| gold_labels[*i] == pred.label && !consumed.contains(i));

        let matched = match strategy {
            MatchStrategy::Exact => available
                .filter(|(_, g)| g.text == pred.text && g.span == pred.span)
                .map(|(i, _)| i)
                .next(),
            MatchStrategy::Overlap { threshold } => best_overlap(pred, available, threshold),
        };

        let counts = outcome.counts.entry(pred.label.clone()).or_default();
        match matched {
            Some(i) => {
                consumed.insert(i);
                counts.true_positive += 1;
            }
            None => counts.false_positive += 1,
        }
    }

    for (i, label) in gold_labels.iter().enumerate() {
        let hit = outcome
            .consumed
            .get(*label)
            .is_some_and(|set| set.contains(&i));
        let counts = outcome.counts.entry((*label).to_string()).or_default();
        if !hit {
            counts.false_negative += 1;
        }
    }

    outcome
}

/// Qualifying candidate with the greatest raw overlap; earliest wins ties.
fn best_overlap<'a>(
    pred: &Entity,
    candidates: impl Iterator<Item = (usize, &'a GroundTruthEntity)>,
    threshold: f64,
) -> Option<usize> {
    let pred_len = pred.span.len();
    if pred_len == 0 {
        return None;
    }
    let mut best: Option<(usize, usize)> = None;
    for (i, gold) in candidates {
        let gold_len = gold.span.len();
        let overlap = pred.span.overlap_len(&gold.span);
        if gold_len == 0 || overlap == 0 {
            continue;
        }
        let qualifies = overlap as f64 / pred_len as f64 >= threshold
            && overlap as f64 / gold_len as f64 >= threshold;
        if qualifies && best.map_or(true, |(_, o)| overlap > o) {
            best = Some((i, overlap));
        }
    }
    best.map(|(i, _)| i)
}
