//! # spanguard
//!
//! PII span detection, conflict resolution, and span-level evaluation.
//!
//! - **Detection**: two independent capabilities, a lexical pattern provider
//!   and a statistical model provider, behind the [`Detector`] trait
//! - **Resolution**: [`SpanResolver`] merges their candidates into one
//!   non-overlapping, ordered, risk-scored entity list per element
//! - **Evaluation**: BIO ground-truth conversion, exact and overlap matching,
//!   per-class precision/recall/F1, and corpus aggregation ([`eval`])
//!
//! ## Quick Start
//!
//! ```rust
//! use spanguard::{Element, SpanResolver};
//!
//! let resolver = SpanResolver::default();
//! let element = Element::new("elem_0", "Mail alice@example.com or call 555-123-4567.");
//! let entities = resolver.detect_element(&element).unwrap();
//!
//! assert_eq!(entities[0].label, "EMAIL");
//! assert_eq!(entities[1].label, "PHONE");
//! ```
//!
//! ## Evaluation
//!
//! ```rust
//! use spanguard::eval::{evaluate_element, GroundTruthEntity, MatchStrategy, LabelMap};
//! use spanguard::Element;
//!
//! let element = Element::new("e", "Alice");
//! let gold = vec![GroundTruthEntity::new("PERSON", 0, 5, "Alice")];
//! let outcome = evaluate_element(&[], &gold, MatchStrategy::Exact, &LabelMap::identity());
//! assert_eq!(outcome.total().false_negative, 1);
//! # let _ = element;
//! ```
//!
//! ## Design
//!
//! - **Pattern precedence**: on any overlap a pattern-sourced candidate wins
//!   over a model-sourced one, whatever order they arrive in
//! - **Character offsets** everywhere (see [`offset`])
//! - **Non-fatal outcomes are typed**: dropped candidates, unalignable ground
//!   truth, and malformed corpus rows are reported, never raised

#![warn(missing_docs)]

pub mod backends;
pub mod checksum;
pub mod config;
pub mod document;
mod entity;
mod error;
pub mod eval;
pub mod offset;
pub mod resolver;
pub mod risk;

pub use document::{segment_document, Document, Element, ElementKind};
pub use entity::{CandidateEntity, Detection, Entity, Sensitivity, Source, Span};
pub use error::{Error, Result};
pub use resolver::{Rejection, Resolution, SpanResolver};

pub use backends::{HeuristicDetector, PatternDetector};

/// A detection capability: text in, ordered candidate spans out.
///
/// Offsets in the returned detections are zero-based, half-open character
/// offsets into `text`. Two implementations are composed by
/// [`SpanResolver`]: one reporting [`Source::Pattern`], one [`Source::Model`].
/// Alternative detectors plug in by implementing this trait.
pub trait Detector: Send + Sync {
    /// Detect candidate spans in `text`, in the detector's native order.
    fn detect(&self, text: &str) -> Result<Vec<Detection>>;

    /// Which capability this detector provides.
    fn source(&self) -> Source;

    /// Get the detector name/identifier.
    fn name(&self) -> &'static str {
        "unknown"
    }
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn detect(&self, text: &str) -> Result<Vec<Detection>> {
        (**self).detect(text)
    }

    fn source(&self) -> Source {
        (**self).source()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// A detector with fixed output, for tests.
///
/// # Example
///
/// ```rust
/// use spanguard::{Detection, Detector, MockDetector, Source};
///
/// let mock = MockDetector::new("fixed", Source::Model)
///     .with_detections(vec![Detection::new("Alice", 0, 5, "PERSON")]);
/// assert_eq!(mock.detect("Alice").unwrap().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockDetector {
    name: &'static str,
    source: Source,
    detections: Vec<Detection>,
}

impl MockDetector {
    /// Create an empty mock detector.
    #[must_use]
    pub fn new(name: &'static str, source: Source) -> Self {
        Self {
            name,
            source,
            detections: Vec::new(),
        }
    }

    /// Set detections to return from every call.
    #[must_use]
    pub fn with_detections(mut self, detections: Vec<Detection>) -> Self {
        self.detections = detections;
        self
    }
}

impl Detector for MockDetector {
    fn detect(&self, _text: &str) -> Result<Vec<Detection>> {
        Ok(self.detections.clone())
    }

    fn source(&self) -> Source {
        self.source
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use spanguard::prelude::*;
    //!
    //! let resolver = SpanResolver::default();
    //! let mut doc = Document::from_text("doc-1", "Call 555-111-2222.");
    //! resolver.detect_document(&mut doc).unwrap();
    //! assert_eq!(doc.elements[0].entities[0].label, "PHONE");
    //! ```
    pub use crate::document::{Document, Element, ElementKind};
    pub use crate::entity::{Detection, Entity, Sensitivity, Source, Span};
    pub use crate::error::{Error, Result};
    pub use crate::eval::{
        evaluate_element, EvaluationReport, GroundTruthEntity, LabelMap, MatchStrategy, Metrics,
    };
    pub use crate::resolver::SpanResolver;
    pub use crate::{Detector, MockDetector};
}
