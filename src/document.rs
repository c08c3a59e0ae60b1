//! Document elements that entities attach to.

use crate::entity::Entity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural role of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Body text.
    #[default]
    Paragraph,
    /// Section title.
    Heading,
    /// Bulleted or numbered item.
    ListItem,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ElementKind::Paragraph => "paragraph",
            ElementKind::Heading => "heading",
            ElementKind::ListItem => "list_item",
        })
    }
}

/// One unit of a document. Owns the entities resolved from its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Identifier, unique within its document.
    pub id: String,
    /// Element text; entity offsets are relative to it.
    pub text: String,
    /// Structural role.
    #[serde(default)]
    pub kind: ElementKind,
    /// Resolved entities, ascending by start. Replaced wholesale on each run.
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl Element {
    /// Create a paragraph element with no entities.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind: ElementKind::Paragraph,
            entities: Vec::new(),
        }
    }

    /// Set the element kind.
    #[must_use]
    pub fn with_kind(mut self, kind: ElementKind) -> Self {
        self.kind = kind;
        self
    }
}

/// A whole document as an ordered list of elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier.
    pub id: String,
    /// Elements in reading order.
    pub elements: Vec<Element>,
}

impl Document {
    /// Create a document from elements.
    #[must_use]
    pub fn new(id: impl Into<String>, elements: Vec<Element>) -> Self {
        Self {
            id: id.into(),
            elements,
        }
    }

    /// Segment raw text into paragraphs and wrap it as a document.
    #[must_use]
    pub fn from_text(id: impl Into<String>, text: &str) -> Self {
        Self::new(id, segment_document(text))
    }

    /// Total number of resolved entities across elements.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.elements.iter().map(|e| e.entities.len()).sum()
    }
}

/// Longest block, in characters, that can still be a heading.
pub const MAX_HEADING_CHARS: usize = 150;

/// Most lines a heading block may have.
pub const MAX_HEADING_LINES: usize = 2;

fn is_cased(c: char) -> bool {
    c.is_uppercase() || c.is_lowercase()
}

/// At least one cased character and no lowercase ones.
fn is_all_caps(line: &str) -> bool {
    line.chars().any(is_cased) && !line.chars().any(char::is_lowercase)
}

/// Every cased run starts with an uppercase character and continues in
/// lowercase ("Annual Report 2024", "O'Brien Memo").
fn is_title_case(line: &str) -> bool {
    let mut prev_cased = false;
    let mut any_cased = false;
    for c in line.chars() {
        if c.is_uppercase() {
            if prev_cased {
                return false;
            }
            prev_cased = true;
            any_cased = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return false;
            }
            prev_cased = true;
        } else {
            prev_cased = false;
        }
    }
    any_cased
}

/// Heading heuristic for a cleaned block: at most [`MAX_HEADING_LINES`]
/// lines and [`MAX_HEADING_CHARS`] characters, some alphabetic content, and
/// a first line in all caps or title case.
#[must_use]
pub fn is_likely_heading(block: &str) -> bool {
    let first = block.split('\n').next().unwrap_or_default();
    if block.split('\n').count() > MAX_HEADING_LINES {
        return false;
    }
    if block.chars().count() > MAX_HEADING_CHARS || !block.chars().any(char::is_alphabetic) {
        return false;
    }
    is_all_caps(first) || is_title_case(first)
}

/// Split text into elements on blank lines.
///
/// Lines inside a block are trimmed and blank lines dropped; empty blocks are
/// skipped. Ids are `elem_0`, `elem_1`, ... in order of the kept blocks.
/// Blocks that pass [`is_likely_heading`] become [`ElementKind::Heading`],
/// the rest [`ElementKind::Paragraph`].
#[must_use]
pub fn segment_document(text: &str) -> Vec<Element> {
    text.trim()
        .split("\n\n")
        .map(|block| {
            block
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|block| !block.is_empty())
        .enumerate()
        .map(|(i, block)| {
            let kind = if is_likely_heading(&block) {
                ElementKind::Heading
            } else {
                ElementKind::Paragraph
            };
            Element::new(format!("elem_{i}"), block).with_kind(kind)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_paragraphs() {
        let text = "  First line\n  continues here \n\nSecond para.\n\n\n\nThird.";
        let elements = segment_document(text);

        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].id, "elem_0");
        assert_eq!(elements[0].text, "First line\ncontinues here");
        assert_eq!(elements[1].text, "Second para.");
        assert_eq!(elements[2].id, "elem_2");
        assert_eq!(elements[0].kind, ElementKind::Paragraph);
        assert_eq!(elements[1].kind, ElementKind::Paragraph);
        // A single capitalized word reads as title case.
        assert_eq!(elements[2].kind, ElementKind::Heading);
    }

    #[test]
    fn test_segment_marks_headings() {
        let text = "Quarterly Review Notes\n\nJOHN SMITH\n\nJohn Smith wrote the summary below.";
        let kinds: Vec<ElementKind> = segment_document(text).iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![ElementKind::Heading, ElementKind::Heading, ElementKind::Paragraph]
        );
    }

    #[test]
    fn test_heading_heuristic() {
        assert!(is_likely_heading("Annual Report 2024"));
        assert!(is_likely_heading("APPENDIX A\nContact list"));
        assert!(!is_likely_heading("Annual report"));
        assert!(!is_likely_heading("One Two\nThree Four\nFive Six"));
        assert!(!is_likely_heading("2024-01-01"));
        assert!(!is_likely_heading(""));
        assert!(!is_likely_heading(&"Word ".repeat(40)));
        // Mixed case inside a word breaks title case.
        assert!(!is_likely_heading("McDonald Holdings"));
    }

    #[test]
    fn test_segment_empty() {
        assert!(segment_document("").is_empty());
        assert!(segment_document("\n\n   \n\n").is_empty());
    }
}
