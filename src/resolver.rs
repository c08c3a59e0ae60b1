//! Span resolution: merge candidates from several detectors into one
//! conflict-free, ordered entity list per element.
//!
//! # How candidates flow
//!
//! ```text
//! "Card 4532 0151 1283 0366, ask Dr. Ada Byrne"
//!
//!   pattern source            model source
//!   ──────────────            ────────────
//!   CREDIT_CARD [5,24)        PERSON [30,43)
//!   PHONE ...                 ORG    [5,9)   (bogus)
//!        │                         │
//!        ▼                         │
//!   1. checksum (cards only) ──► reject on failure
//!   2. covered-set, in order ──► accept / reject
//!        │                         ▼
//!        └──────────────► 3. covered-set, same rule
//!                                  │
//!                                  ▼
//!                   4. risk + sensitivity, 5. sort by start
//! ```
//!
//! Pattern candidates always run through the covered set before model
//! candidates, whatever order the detectors were registered in, so a
//! pattern match wins every overlap against a model match.

use crate::checksum::{is_luhn_valid, strip_separators};
use crate::document::{Document, Element, ElementKind};
use crate::entity::{CandidateEntity, Entity, Sensitivity, Source, Span};
use crate::offset::char_len;
use crate::risk::{assign_base_risk, classify_sensitivity};
use crate::{Detector, HeuristicDetector, PatternDetector, Result};
use std::fmt;

/// Labels whose pattern matches must pass a Luhn check.
const CHECKSUM_LABELS: &[&str] = &["CREDIT_CARD"];

/// Why a candidate did not become an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Span outside the text, or `start >= end`.
    InvalidSpan(CandidateEntity),
    /// Checksum-validated label whose digits fail the checksum.
    ChecksumFailure(CandidateEntity),
    /// Span intersects an already accepted entity.
    Overlap {
        /// The discarded candidate.
        candidate: CandidateEntity,
        /// The accepted span it collided with.
        covered_by: Span,
    },
}

impl Rejection {
    /// The rejected candidate.
    #[must_use]
    pub fn candidate(&self) -> &CandidateEntity {
        match self {
            Rejection::InvalidSpan(c) | Rejection::ChecksumFailure(c) => c,
            Rejection::Overlap { candidate, .. } => candidate,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::InvalidSpan(c) => write!(f, "invalid span {} for {}", c.span, c.label),
            Rejection::ChecksumFailure(c) => write!(f, "{} '{}' failed checksum", c.label, c.text),
            Rejection::Overlap {
                candidate,
                covered_by,
            } => write!(
                f,
                "{} {} '{}' overlaps accepted {}",
                candidate.source, candidate.label, candidate.text, covered_by
            ),
        }
    }
}

/// Result of one resolution pass.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Accepted entities, ascending by start, pairwise disjoint.
    pub entities: Vec<Entity>,
    /// Dropped candidates, in the order they were considered.
    pub rejected: Vec<Rejection>,
}

impl Resolution {
    /// Number of candidates dropped by a failed checksum.
    #[must_use]
    pub fn checksum_failures(&self) -> usize {
        self.rejected
            .iter()
            .filter(|r| matches!(r, Rejection::ChecksumFailure(_)))
            .count()
    }
}

/// Merges candidate spans from registered detectors.
///
/// # Example
///
/// ```rust
/// use spanguard::{Detection, MockDetector, Source, SpanResolver};
///
/// let resolver = SpanResolver::builder()
///     .detector(MockDetector::new("model", Source::Model)
///         .with_detections(vec![Detection::new("Alice", 0, 5, "PERSON")]))
///     .build();
/// let element = spanguard::Element::new("e", "Alice is here");
/// let entities = resolver.detect_element(&element).unwrap();
/// assert_eq!(entities[0].label, "PERSON");
/// ```
pub struct SpanResolver {
    detectors: Vec<Box<dyn Detector>>,
    elevate_headings: bool,
}

/// Builder for [`SpanResolver`].
#[derive(Default)]
pub struct SpanResolverBuilder {
    detectors: Vec<Box<dyn Detector>>,
    elevate_headings: bool,
}

impl SpanResolverBuilder {
    /// Register a detector. Its [`Detector::source`] decides its precedence.
    #[must_use]
    pub fn detector<D: Detector + 'static>(mut self, detector: D) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    /// Register a boxed detector.
    #[must_use]
    pub fn detector_boxed(mut self, detector: Box<dyn Detector>) -> Self {
        self.detectors.push(detector);
        self
    }

    /// Classify PERSON entities found in headings as explicit identifiers.
    /// Never changes which spans are accepted.
    #[must_use]
    pub fn elevate_headings(mut self, enabled: bool) -> Self {
        self.elevate_headings = enabled;
        self
    }

    /// Build the resolver.
    #[must_use]
    pub fn build(self) -> SpanResolver {
        SpanResolver {
            detectors: self.detectors,
            elevate_headings: self.elevate_headings,
        }
    }
}

impl Default for SpanResolver {
    /// Pattern detector plus the heuristic model detector.
    fn default() -> Self {
        Self::builder()
            .detector(PatternDetector::new())
            .detector(HeuristicDetector::new())
            .build()
    }
}

impl SpanResolver {
    /// Create a builder.
    #[must_use]
    pub fn builder() -> SpanResolverBuilder {
        SpanResolverBuilder::default()
    }

    /// Compose one pattern and one model detector.
    #[must_use]
    pub fn new(pattern: Box<dyn Detector>, model: Box<dyn Detector>) -> Self {
        Self::builder()
            .detector_boxed(pattern)
            .detector_boxed(model)
            .build()
    }

    /// Enable or disable heading elevation on an existing resolver.
    #[must_use]
    pub fn with_elevate_headings(mut self, enabled: bool) -> Self {
        self.elevate_headings = enabled;
        self
    }

    /// Whether heading elevation is on.
    #[must_use]
    pub fn elevates_headings(&self) -> bool {
        self.elevate_headings
    }

    /// Names of the registered detectors, in registration order.
    #[must_use]
    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// Run every detector over `text` and tag the output with its source.
    pub fn collect_candidates(&self, text: &str) -> Result<Vec<CandidateEntity>> {
        let mut candidates = Vec::new();
        for detector in &self.detectors {
            let source = detector.source();
            let found = detector.detect(text)?;
            log::trace!("{} produced {} candidates", detector.name(), found.len());
            candidates.extend(
                found
                    .into_iter()
                    .map(|d| CandidateEntity::from_detection(d, source)),
            );
        }
        Ok(candidates)
    }

    /// Resolve candidates for one element's text.
    ///
    /// Pattern candidates are considered before model candidates; within a
    /// source the given order is kept. Invalid spans and failed checksums are
    /// dropped before the overlap check. Never fails.
    #[must_use]
    pub fn resolve(
        &self,
        text: &str,
        kind: ElementKind,
        candidates: impl IntoIterator<Item = CandidateEntity>,
    ) -> Resolution {
        let text_len = char_len(text);
        let (pattern, model): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|c| c.source == Source::Pattern);

        let mut covered: Vec<Span> = Vec::new();
        let mut accepted: Vec<CandidateEntity> = Vec::new();
        let mut rejected = Vec::new();

        for candidate in pattern.into_iter().chain(model) {
            if !candidate.span.is_valid_for(text_len) {
                rejected.push(Rejection::InvalidSpan(candidate));
                continue;
            }
            if candidate.source == Source::Pattern
                && CHECKSUM_LABELS.contains(&candidate.label.as_str())
                && !is_luhn_valid(&strip_separators(&candidate.text))
            {
                log::debug!("discarded {} '{}': failed Luhn check", candidate.label, candidate.text);
                rejected.push(Rejection::ChecksumFailure(candidate));
                continue;
            }
            if let Some(hit) = covered.iter().find(|s| s.overlaps(&candidate.span)) {
                let rejection = Rejection::Overlap {
                    covered_by: *hit,
                    candidate,
                };
                log::debug!("discarded {rejection}");
                rejected.push(rejection);
                continue;
            }
            covered.push(candidate.span);
            accepted.push(candidate);
        }

        let mut entities: Vec<Entity> = accepted
            .into_iter()
            .map(|c| self.finalize(c, kind))
            .collect();
        entities.sort_by_key(|e| e.span.start);

        Resolution { entities, rejected }
    }

    fn finalize(&self, candidate: CandidateEntity, kind: ElementKind) -> Entity {
        let mut sensitivity = classify_sensitivity(&candidate.label);
        if self.elevate_headings && kind == ElementKind::Heading && candidate.label == "PERSON" {
            sensitivity = Sensitivity::ExplicitIdentifier;
        }
        Entity {
            base_risk_score: assign_base_risk(&candidate.label),
            sensitivity,
            source: candidate.source,
            element_kind: kind,
            text: candidate.text,
            label: candidate.label,
            span: candidate.span,
        }
    }

    /// Detect and resolve one element, keeping the rejections.
    pub fn resolve_element(&self, element: &Element) -> Result<Resolution> {
        let candidates = self.collect_candidates(&element.text)?;
        Ok(self.resolve(&element.text, element.kind, candidates))
    }

    /// Detect and resolve entities for one element.
    pub fn detect_element(&self, element: &Element) -> Result<Vec<Entity>> {
        Ok(self.resolve_element(element)?.entities)
    }

    /// Detect entities for every element, replacing each element's list.
    /// Returns the total number of entities found.
    pub fn detect_document(&self, document: &mut Document) -> Result<usize> {
        let mut total = 0;
        for element in &mut document.elements {
            element.entities = self.detect_element(element)?;
            total += element.entities.len();
        }
        log::info!(
            "document {}: {} entities in {} elements",
            document.id,
            total,
            document.elements.len()
        );
        Ok(total)
    }
}

impl fmt::Debug for SpanResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpanResolver")
            .field("detectors", &self.detector_names())
            .field("elevate_headings", &self.elevate_headings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Detection, MockDetector};

    fn cand(text: &str, start: usize, end: usize, label: &str, source: Source) -> CandidateEntity {
        CandidateEntity::from_detection(Detection::new(text, start, end, label), source)
    }

    fn labels(resolution: &Resolution) -> Vec<&str> {
        resolution.entities.iter().map(|e| e.label.as_str()).collect()
    }

    #[test]
    fn test_pattern_wins_regardless_of_order() {
        let text = "Reach alice@example.com today";
        let email = cand("alice@example.com", 6, 23, "EMAIL", Source::Pattern);
        let org = cand("example.com", 12, 23, "ORG", Source::Model);
        let resolver = SpanResolver::builder().build();

        let forward = resolver.resolve(text, ElementKind::Paragraph, vec![email.clone(), org.clone()]);
        let backward = resolver.resolve(text, ElementKind::Paragraph, vec![org, email]);

        assert_eq!(labels(&forward), vec!["EMAIL"]);
        assert_eq!(forward.entities, backward.entities);
        assert!(matches!(backward.rejected[0], Rejection::Overlap { ref candidate, .. } if candidate.label == "ORG"));
    }

    #[test]
    fn test_earlier_pattern_wins_within_source() {
        let text = "x 555-12-3456 y";
        let resolver = SpanResolver::builder().build();
        let resolution = resolver.resolve(
            text,
            ElementKind::Paragraph,
            vec![
                cand("555-12-3456", 2, 13, "SSN", Source::Pattern),
                cand("12-3456", 6, 13, "PHONE", Source::Pattern),
            ],
        );
        assert_eq!(labels(&resolution), vec!["SSN"]);
    }

    #[test]
    fn test_luhn_rejects_before_overlap() {
        let text = "card 4532015112830367 and Bob Stone";
        let resolver = SpanResolver::builder().build();
        let resolution = resolver.resolve(
            text,
            ElementKind::Paragraph,
            vec![
                cand("4532015112830367", 5, 21, "CREDIT_CARD", Source::Pattern),
                cand("4532015112830367", 5, 21, "ID_NUM", Source::Model),
            ],
        );
        // The failed card never covers its span, so the model candidate lands.
        assert_eq!(labels(&resolution), vec!["ID_NUM"]);
        assert!(matches!(resolution.rejected[0], Rejection::ChecksumFailure(_)));
    }

    #[test]
    fn test_luhn_accepts_valid_card_with_separators() {
        let text = "card 4532-0151-1283-0366 ok";
        let resolver = SpanResolver::builder()
            .detector(MockDetector::new("cards", Source::Pattern).with_detections(vec![
                Detection::new("4532-0151-1283-0366", 5, 24, "CREDIT_CARD"),
            ]))
            .build();
        let entities = resolver.detect_element(&Element::new("e", text)).unwrap();

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].label, "CREDIT_CARD");
        assert_eq!(entities[0].base_risk_score, 1.0);
        assert_eq!(entities[0].sensitivity, Sensitivity::ExplicitIdentifier);
    }

    #[test]
    fn test_invalid_spans_dropped_silently() {
        let text = "short";
        let resolver = SpanResolver::builder().build();
        let resolution = resolver.resolve(
            text,
            ElementKind::Paragraph,
            vec![
                cand("x", 3, 3, "PERSON", Source::Model),
                cand("x", 4, 2, "PERSON", Source::Model),
                cand("x", 2, 9, "EMAIL", Source::Pattern),
                cand("short", 0, 5, "PERSON", Source::Model),
            ],
        );
        assert_eq!(labels(&resolution), vec!["PERSON"]);
        assert_eq!(resolution.rejected.len(), 3);
        assert!(resolution
            .rejected
            .iter()
            .all(|r| matches!(r, Rejection::InvalidSpan(_))));
    }

    #[test]
    fn test_output_sorted_by_start() {
        let text = "Alice met Bob at bob@x.io";
        let resolver = SpanResolver::builder().build();
        let resolution = resolver.resolve(
            text,
            ElementKind::Paragraph,
            vec![
                cand("bob@x.io", 17, 25, "EMAIL", Source::Pattern),
                cand("Bob", 10, 13, "PERSON", Source::Model),
                cand("Alice", 0, 5, "PERSON", Source::Model),
            ],
        );
        let starts: Vec<usize> = resolution.entities.iter().map(Entity::start).collect();
        assert_eq!(starts, vec![0, 10, 17]);
        assert_eq!(resolution.entities[0].source, Source::Model);
        assert_eq!(resolution.entities[2].source, Source::Pattern);
    }

    #[test]
    fn test_unknown_label_scores_zero() {
        let resolver = SpanResolver::builder().build();
        let resolution = resolver.resolve(
            "https://a.io",
            ElementKind::Paragraph,
            vec![cand("https://a.io", 0, 12, "URL", Source::Pattern)],
        );
        assert_eq!(resolution.entities[0].base_risk_score, 0.0);
        assert_eq!(resolution.entities[0].sensitivity, Sensitivity::QuasiIdentifier);
    }

    #[test]
    fn test_heading_elevation_is_opt_in() {
        let person = Detection::new("Ada Byrne", 0, 9, "PERSON");
        let mock = MockDetector::new("model", Source::Model).with_detections(vec![person]);
        let heading = Element::new("h", "Ada Byrne").with_kind(ElementKind::Heading);

        let inert = SpanResolver::builder().detector(mock.clone()).build();
        let entities = inert.detect_element(&heading).unwrap();
        assert_eq!(entities[0].sensitivity, Sensitivity::QuasiIdentifier);
        assert_eq!(entities[0].element_kind, ElementKind::Heading);

        let elevating = SpanResolver::builder()
            .detector(mock.clone())
            .elevate_headings(true)
            .build();
        let entities = elevating.detect_element(&heading).unwrap();
        assert_eq!(entities[0].sensitivity, Sensitivity::ExplicitIdentifier);
        assert_eq!(entities[0].base_risk_score, 0.6);

        // Paragraphs are unaffected.
        let para = Element::new("p", "Ada Byrne");
        let entities = elevating.detect_element(&para).unwrap();
        assert_eq!(entities[0].sensitivity, Sensitivity::QuasiIdentifier);
    }

    #[test]
    fn test_resolve_element_reports_checksum_failures() {
        let element = Element::new("e", "Card 4532015112830367 on file");
        let resolution = SpanResolver::default().resolve_element(&element).unwrap();
        assert_eq!(resolution.checksum_failures(), 1);
        assert!(resolution.entities.iter().all(|e| e.label != "CREDIT_CARD"));

        let valid = Element::new("e", "Card 4532015112830366 on file");
        let resolution = SpanResolver::default().resolve_element(&valid).unwrap();
        assert_eq!(resolution.checksum_failures(), 0);
    }

    #[test]
    fn test_detect_document_replaces_entities() {
        let resolver = SpanResolver::default();
        let mut doc = Document::from_text("d", "Email a@b.io now.\n\nNothing here.");
        assert_eq!(resolver.detect_document(&mut doc).unwrap(), 1);
        assert_eq!(doc.elements[0].entities[0].label, "EMAIL");

        // A second run replaces rather than appends.
        assert_eq!(resolver.detect_document(&mut doc).unwrap(), 1);
        assert_eq!(doc.entity_count(), 1);
    }

    #[test]
    fn test_default_resolver_end_to_end() {
        let text = "Contact me at test@example.com or call 555-123-4567. SSN: 999-00-1111.";
        let entities = SpanResolver::default()
            .detect_element(&Element::new("e", text))
            .unwrap();
        let found: Vec<(&str, &str)> = entities
            .iter()
            .map(|e| (e.label.as_str(), e.text.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("EMAIL", "test@example.com"),
                ("PHONE", "555-123-4567"),
                ("SSN", "999-00-1111"),
            ]
        );
    }

    #[test]
    fn test_detector_error_propagates() {
        struct Failing;
        impl Detector for Failing {
            fn detect(&self, _text: &str) -> Result<Vec<Detection>> {
                Err(crate::Error::detection("failing", "model unavailable"))
            }
            fn source(&self) -> Source {
                Source::Model
            }
        }
        let resolver = SpanResolver::new(Box::new(PatternDetector::new()), Box::new(Failing));
        assert!(resolver.detect_element(&Element::new("e", "text")).is_err());
        assert_eq!(resolver.detector_names(), vec!["pattern", "unknown"]);
    }
}
