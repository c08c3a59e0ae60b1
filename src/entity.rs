//! Span and entity types.
//!
//! All offsets are **character** offsets into the text of one document
//! element, half-open `[start, end)`.

use crate::document::ElementKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open character interval `[start, end)` over a fixed base text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span. No validation is performed; see [`Span::is_valid_for`].
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of characters covered. Zero for inverted spans.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True if the span covers no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `0 <= start < end <= text_len`.
    #[must_use]
    pub fn is_valid_for(&self, text_len: usize) -> bool {
        self.start < self.end && self.end <= text_len
    }

    /// Length of the intersection with `other`, zero if disjoint.
    #[must_use]
    pub fn overlap_len(&self, other: &Span) -> usize {
        self.end.min(other.end).saturating_sub(self.start.max(other.start))
    }

    /// True if the two spans share at least one character.
    #[must_use]
    pub fn overlaps(&self, other: &Span) -> bool {
        self.overlap_len(other) > 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Which detection capability produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Lexical pattern provider (regexes).
    Pattern,
    /// Statistical model provider.
    Model,
}

impl Source {
    /// Short name used in logs and JSON.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Pattern => "pattern",
            Source::Model => "model",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw output of a detector: `(text, start, end, label)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Surface text.
    pub text: String,
    /// Start character offset.
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
    /// Entity label, e.g. `EMAIL`, `PERSON`.
    pub label: String,
}

impl Detection {
    /// Create a detection.
    #[must_use]
    pub fn new(text: impl Into<String>, start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            label: label.into(),
        }
    }

    /// Span of this detection.
    #[must_use]
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// A detection tagged with its source. Lives only for one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntity {
    /// Surface text.
    pub text: String,
    /// Entity label.
    pub label: String,
    /// Character span.
    pub span: Span,
    /// Producing capability.
    pub source: Source,
}

impl CandidateEntity {
    /// Tag a detection with its source.
    #[must_use]
    pub fn from_detection(detection: Detection, source: Source) -> Self {
        let span = detection.span();
        Self {
            text: detection.text,
            label: detection.label,
            span,
            source,
        }
    }
}

/// Sensitivity class of a resolved entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sensitivity {
    /// Identifies an individual on its own (email, phone, SSN, card number).
    ExplicitIdentifier,
    /// Narrows identity only in combination (name, organization, location).
    QuasiIdentifier,
}

impl Sensitivity {
    /// Kebab-case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Sensitivity::ExplicitIdentifier => "explicit-identifier",
            Sensitivity::QuasiIdentifier => "quasi-identifier",
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate that survived conflict resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Surface text.
    pub text: String,
    /// Entity label.
    pub label: String,
    /// Character span within the owning element.
    #[serde(flatten)]
    pub span: Span,
    /// Base risk in `[0, 1]`.
    pub base_risk_score: f64,
    /// Sensitivity class.
    pub sensitivity: Sensitivity,
    /// Producing capability.
    pub source: Source,
    /// Kind of the element the entity was found in.
    pub element_kind: ElementKind,
}

impl Entity {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_overlap() {
        let a = Span::new(0, 4);
        let b = Span::new(5, 10);
        let c = Span::new(0, 10);

        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
        assert_eq!(c.overlap_len(&b), 5);
        // Adjacent spans share no character.
        assert_eq!(Span::new(0, 5).overlap_len(&Span::new(5, 8)), 0);
    }

    #[test]
    fn test_span_validity() {
        assert!(Span::new(0, 5).is_valid_for(5));
        assert!(!Span::new(0, 6).is_valid_for(5));
        assert!(!Span::new(3, 3).is_valid_for(5));
        assert!(!Span::new(4, 2).is_valid_for(5));
        assert_eq!(Span::new(4, 2).len(), 0);
    }

    #[test]
    fn test_sensitivity_serde() {
        let json = serde_json::to_string(&Sensitivity::ExplicitIdentifier).unwrap();
        assert_eq!(json, "\"explicit-identifier\"");
        let back: Sensitivity = serde_json::from_str("\"quasi-identifier\"").unwrap();
        assert_eq!(back, Sensitivity::QuasiIdentifier);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn overlap_is_symmetric(
            s1 in 0usize..100,
            len1 in 1usize..50,
            s2 in 0usize..100,
            len2 in 1usize..50,
        ) {
            let a = Span::new(s1, s1 + len1);
            let b = Span::new(s2, s2 + len2);
            prop_assert_eq!(a.overlap_len(&b), b.overlap_len(&a));
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn overlap_bounded_by_shorter(
            s1 in 0usize..100,
            len1 in 1usize..50,
            s2 in 0usize..100,
            len2 in 1usize..50,
        ) {
            let a = Span::new(s1, s1 + len1);
            let b = Span::new(s2, s2 + len2);
            prop_assert!(a.overlap_len(&b) <= a.len().min(b.len()));
        }
    }
}
