//! Pattern-based PII detection - regex patterns only.
//!
//! Extracts identifiers that can be recognized by their format alone:
//! emails, phone numbers, SSNs, dates, card numbers, ZIP codes, US street
//! addresses, and URLs.
//!
//! Every raw match is emitted, grouped by pattern in [`PATTERNS`] order and
//! then by position. Overlap resolution and checksum validation happen in
//! [`SpanResolver`](crate::SpanResolver), not here.

use super::pattern_config::PATTERNS;
use crate::offset::SpanConverter;
use crate::{Detection, Detector, Result, Source};

/// Lexical pattern provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternDetector;

impl PatternDetector {
    /// Create a new pattern detector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Labels this detector can emit, in priority order.
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        PATTERNS.iter().map(|p| p.label).collect()
    }
}

impl Detector for PatternDetector {
    fn detect(&self, text: &str) -> Result<Vec<Detection>> {
        let converter = SpanConverter::new(text);
        let mut detections = Vec::new();

        for def in PATTERNS.iter() {
            for m in def.regex.find_iter(text) {
                let (start, end) = converter.chars_from_bytes(m.start(), m.end());
                detections.push(Detection::new(m.as_str(), start, end, def.label));
            }
        }

        Ok(detections)
    }

    fn source(&self) -> Source {
        Source::Pattern
    }

    fn name(&self) -> &'static str {
        "pattern"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels_of(detections: &[Detection]) -> Vec<&str> {
        detections.iter().map(|d| d.label.as_str()).collect()
    }

    #[test]
    fn test_basic_pii() {
        let text = "Contact me at test@example.com or call 555-123-4567. SSN: 999-00-1111.";
        let detections = PatternDetector::new().detect(text).unwrap();

        assert_eq!(labels_of(&detections), vec!["EMAIL", "PHONE", "SSN"]);
        assert_eq!(detections[0].text, "test@example.com");
        assert_eq!(detections[1].text, "555-123-4567");
        assert_eq!(detections[2].text, "999-00-1111");
    }

    #[test]
    fn test_grouped_by_pattern_then_position() {
        let text = "call 555-222-3333 or a@b.io, then 555-444-5555 or c@d.io";
        let detections = PatternDetector::new().detect(text).unwrap();

        assert_eq!(labels_of(&detections), vec!["EMAIL", "EMAIL", "PHONE", "PHONE"]);
        assert!(detections[0].start < detections[1].start);
        assert!(detections[2].start < detections[3].start);
    }

    #[test]
    fn test_raw_overlaps_are_kept() {
        // The phone pattern has no leading word boundary, so it also fires
        // inside the card number.
        let text = "card 4532015112830366 end";
        let detections = PatternDetector::new().detect(text).unwrap();

        assert!(detections.iter().any(|d| d.label == "CREDIT_CARD" && d.text == "4532015112830366"));
        assert!(detections.iter().any(|d| d.label == "PHONE"));
    }

    #[test]
    fn test_char_offsets_for_unicode() {
        let text = "Café: 555-123-4567";
        let detections = PatternDetector::new().detect(text).unwrap();

        let phone = detections.iter().find(|d| d.label == "PHONE").unwrap();
        assert_eq!((phone.start, phone.end), (6, 18));
        let slice: String = text.chars().skip(phone.start).take(phone.end - phone.start).collect();
        assert_eq!(slice, phone.text);
    }

    #[test]
    fn test_no_matches() {
        let detections = PatternDetector::new().detect("Nothing to see here.").unwrap();
        assert!(detections.is_empty());
        assert_eq!(PatternDetector::new().source(), Source::Pattern);
    }
}
