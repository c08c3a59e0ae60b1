//! Shared evaluation primitives: ground-truth spans and confusion counts.

use crate::entity::Span;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// A hand-labeled entity in some base text's character coordinates.
///
/// Produced by [`convert_bio_to_offsets`](super::bio_adapter::convert_bio_to_offsets)
/// in document coordinates, then re-based onto an element by
/// [`map_ground_truth_to_elements`](super::corpus::map_ground_truth_to_elements).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundTruthEntity {
    /// Raw (un-remapped) label.
    pub label: String,
    /// Character span.
    #[serde(flatten)]
    pub span: Span,
    /// Surface text.
    pub text: String,
}

impl GroundTruthEntity {
    /// Create a ground-truth entity.
    #[must_use]
    pub fn new(label: impl Into<String>, start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            span: Span::new(start, end),
            text: text.into(),
        }
    }

    /// Start offset.
    #[must_use]
    pub fn start(&self) -> usize {
        self.span.start
    }

    /// End offset (exclusive).
    #[must_use]
    pub fn end(&self) -> usize {
        self.span.end
    }
}

/// True-positive / false-positive / false-negative counts for one label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    /// Predictions matched to a ground-truth entry.
    pub true_positive: usize,
    /// Predictions with no qualifying ground-truth entry.
    pub false_positive: usize,
    /// Ground-truth entries no prediction consumed.
    pub false_negative: usize,
}

impl LabelCounts {
    /// Create counts.
    #[must_use]
    pub const fn new(true_positive: usize, false_positive: usize, false_negative: usize) -> Self {
        Self {
            true_positive,
            false_positive,
            false_negative,
        }
    }

    /// `true_positive + false_negative`.
    #[must_use]
    pub const fn support(&self) -> usize {
        self.true_positive + self.false_negative
    }

    /// True if all counts are zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.true_positive == 0 && self.false_positive == 0 && self.false_negative == 0
    }
}

impl AddAssign for LabelCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.true_positive += rhs.true_positive;
        self.false_positive += rhs.false_positive;
        self.false_negative += rhs.false_negative;
    }
}

/// Counts that may be fractional, as produced by back-deriving them from
/// rounded metrics. See [`approximate_counts`](super::aggregate::approximate_counts).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FractionalCounts {
    /// Estimated true positives.
    pub true_positive: f64,
    /// Estimated false positives.
    pub false_positive: f64,
    /// Estimated false negatives.
    pub false_negative: f64,
}

impl From<LabelCounts> for FractionalCounts {
    fn from(c: LabelCounts) -> Self {
        Self {
            true_positive: c.true_positive as f64,
            false_positive: c.false_positive as f64,
            false_negative: c.false_negative as f64,
        }
    }
}

impl AddAssign for FractionalCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.true_positive += rhs.true_positive;
        self.false_positive += rhs.false_positive;
        self.false_negative += rhs.false_negative;
    }
}
