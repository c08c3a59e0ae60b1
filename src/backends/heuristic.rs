//! Heuristic model provider.
//!
//! Stands in for a statistical NER model so the resolution pipeline runs
//! without external model files. Emits `PERSON`, `ORG`, and `GPE` spans from
//! structural signals only:
//!
//! 1. Capitalized word runs (with `of`/`the` as connectors)
//! 2. High-precision cues: organization suffixes (`Inc.`, `University`),
//!    person titles (`Dr.`, `Ms.`), location prepositions (`in`, `from`)
//! 3. A short list of form-field words and sentence starters that are
//!    capitalized but never names
//!
//! Output is in emission order (left to right). Offsets are characters.

use crate::offset::slice_chars;
use crate::{Detection, Detector, Result, Source};

/// Capitalization-driven stand-in for a statistical NER model.
#[derive(Debug, Clone)]
pub struct HeuristicDetector {
    /// Minimum confidence for a span to be emitted.
    threshold: f64,
}

impl Default for HeuristicDetector {
    fn default() -> Self {
        Self { threshold: 0.35 }
    }
}

impl HeuristicDetector {
    /// Create a detector with the default threshold.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with a custom confidence threshold.
    #[must_use]
    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }
}

const ORG_SUFFIX: &[&str] = &[
    "inc", "corp", "ltd", "llc", "co", "plc", "foundation", "institute", "university", "college",
    "school", "academy", "bank", "group", "agency", "limited", "corporation", "incorporated",
    "company", "holdings", "gmbh", "ag", "sa", "nv", "bv",
];

const PERSON_PREFIX: &[&str] = &["mr", "ms", "mrs", "dr", "prof", "miss", "mx"];

const LOC_PREPOSITION: &[&str] = &["in", "from", "at", "near", "to"];

const PLACE_INDICATORS: &[&str] = &["united", "new", "south", "north", "west", "east", "great", "san", "los"];

// Capitalized single words that label a field or a role rather than name one.
const SKIP_WORDS: &[&str] = &[
    "ssn", "email", "phone", "tel", "fax", "dob", "address", "name", "zip", "url", "id", "ceo",
    "cto", "cfo", "vp", "president", "director", "student", "teacher", "i", "you",
];

const COMMON_SENTENCE_STARTERS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "it", "he", "she", "we", "they", "my",
    "our", "your", "his", "her", "their", "in", "on", "at", "to", "for", "from", "by", "with",
    "and", "but", "or", "so", "if", "because", "contact", "call", "mail", "email", "write",
    "visit", "please", "see", "note", "send", "ship", "reach", "dear", "hi", "hello", "thanks",
    "regards", "today", "yesterday", "tomorrow", "now", "then", "what", "where", "when", "who",
    "why", "how", "is", "are", "was", "were", "have", "has", "had", "after", "before", "during",
];

/// A whitespace-delimited word with character offsets.
#[derive(Debug, Clone, Copy)]
struct Word<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

impl Word<'_> {
    fn stripped(&self) -> &str {
        self.text.trim_matches(|c: char| !c.is_alphanumeric())
    }

    fn lower(&self) -> String {
        self.stripped().to_lowercase()
    }

    fn is_capitalized(&self) -> bool {
        self.stripped().chars().next().is_some_and(char::is_uppercase)
    }

    fn ends_group(&self) -> bool {
        self.text.ends_with(['.', '!', '?', ')', ']', '}', ';', ':', ','])
    }
}

fn split_words(text: &str) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    let mut start: Option<(usize, usize)> = None;
    let mut char_pos = 0;

    for (byte_idx, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some((b, ch)) = start.take() {
                words.push(Word { text: &text[b..byte_idx], start: ch, end: char_pos });
            }
        } else if start.is_none() {
            start = Some((byte_idx, char_pos));
        }
        char_pos += 1;
    }
    if let Some((b, ch)) = start {
        words.push(Word { text: &text[b..], start: ch, end: char_pos });
    }
    words
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Person,
    Org,
    Place,
    Skip,
}

impl Class {
    fn label(self) -> Option<&'static str> {
        match self {
            Class::Person => Some("PERSON"),
            Class::Org => Some("ORG"),
            Class::Place => Some("GPE"),
            Class::Skip => None,
        }
    }
}

/// Classify a capitalized run. `prev` is the word before the run, if any.
fn classify(span: &[Word<'_>], prev: Option<&Word<'_>>) -> (Class, f64) {
    let lowered: Vec<String> = span.iter().map(Word::lower).collect();
    let (Some(first), Some(last)) = (lowered.first(), lowered.last()) else {
        return (Class::Skip, 0.0);
    };
    let prev_lower = prev.map(Word::lower);

    if span.len() == 1 && SKIP_WORDS.contains(&first.as_str()) {
        return (Class::Skip, 0.0);
    }
    if ORG_SUFFIX.contains(&last.as_str()) && span.len() >= 2 {
        return (Class::Org, 0.85);
    }
    if PERSON_PREFIX.contains(&first.as_str()) && span.len() >= 2 {
        return (Class::Person, 0.80);
    }
    if let Some(prev) = prev_lower.as_deref() {
        if PERSON_PREFIX.contains(&prev) {
            return (Class::Person, 0.80);
        }
        if LOC_PREPOSITION.contains(&prev) && span.len() <= 2 {
            return (Class::Place, 0.70);
        }
    }

    match span.len() {
        2 if PLACE_INDICATORS.contains(&first.as_str()) => (Class::Place, 0.65),
        2 => (Class::Person, 0.60),
        n if n >= 3 && lowered.get(1).is_some_and(|w| w == "of") => (Class::Org, 0.65),
        n if n >= 3 => (Class::Org, 0.50),
        // Lone capitalized word opening the text: usually just a sentence start.
        _ if prev.is_none() => (Class::Person, 0.30),
        _ => (Class::Person, 0.45),
    }
}

impl Detector for HeuristicDetector {
    fn detect(&self, text: &str) -> Result<Vec<Detection>> {
        let words = split_words(text);
        let mut detections = Vec::new();

        let mut i = 0;
        while i < words.len() {
            let word = words[i];
            let sentence_start = i == 0 || words[i - 1].text.ends_with(['.', '!', '?', ':']);
            if !word.is_capitalized()
                || (sentence_start && COMMON_SENTENCE_STARTERS.contains(&word.lower().as_str()))
            {
                i += 1;
                continue;
            }

            // Grow the run: capitalized words, plus "of"/"the" between two of them.
            let start_idx = i;
            while i < words.len() {
                let w = words[i];
                let is_connector = i > start_idx && matches!(w.lower().as_str(), "of" | "the");
                let next_upper = words.get(i + 1).is_some_and(Word::is_capitalized);

                if w.is_capitalized() || (is_connector && next_upper) {
                    i += 1;
                    let next_is_suffix = words
                        .get(i)
                        .is_some_and(|n| ORG_SUFFIX.contains(&n.lower().as_str()));
                    let is_title = PERSON_PREFIX.contains(&w.lower().as_str());
                    if w.ends_group() && !next_is_suffix && !is_title {
                        break;
                    }
                } else {
                    break;
                }
            }
            if i == start_idx {
                i += 1;
                continue;
            }

            let mut span_start = start_idx;
            if start_idx > 0 && PERSON_PREFIX.contains(&words[start_idx - 1].lower().as_str()) {
                span_start = start_idx - 1;
            }
            let span = &words[span_start..i];
            let prev = span_start.checked_sub(1).map(|p| &words[p]);

            let (class, confidence) = classify(span, prev);
            let Some(label) = class.label() else { continue };
            if confidence < self.threshold {
                continue;
            }

            // Trim punctuation at both ends; keep a person title's period.
            let first = span[0];
            let last = span[span.len() - 1];
            let leading = first.text.chars().take_while(|c| !c.is_alphanumeric()).count();
            let trailing = last.text.chars().rev().take_while(|c| !c.is_alphanumeric()).count();
            let start = first.start + leading;
            let end = last.end - trailing;
            if start >= end {
                continue;
            }
            if let Some(surface) = slice_chars(text, start, end) {
                detections.push(Detection::new(surface, start, end, label));
            }
        }

        Ok(detections)
    }

    fn source(&self) -> Source {
        Source::Model
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}
