//! BIO tag sequence adapter.
//!
//! Reconstructs character-offset ground truth from parallel token / tag /
//! trailing-whitespace sequences and the raw text they were cut from.
//!
//! Tokens are located in the text rather than re-assembled from the
//! whitespace flags, so offsets are exact even when the tokenizer dropped or
//! normalized characters between tokens.
//!
//! # Example
//!
//! ```rust
//! use spanguard::eval::bio_adapter::convert_bio_to_offsets;
//!
//! let tokens = ["John", "Doe", "works"];
//! let tags = ["B-PERSON", "I-PERSON", "O"];
//! let ws = [true, true, false];
//!
//! let gold = convert_bio_to_offsets(&tokens, &tags, &ws, "John Doe works").unwrap();
//! assert_eq!(gold.len(), 1);
//! assert_eq!(gold[0].text, "John Doe");
//! assert_eq!((gold[0].start(), gold[0].end()), (0, 8));
//! ```

use super::types::GroundTruthEntity;
use crate::offset::SpanConverter;
use thiserror::Error;

/// Why a tag sequence could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// A token does not occur in the text at or after the cursor. The whole
    /// sequence is abandoned.
    #[error("token {index} ({token:?}) not found in text after byte {cursor}")]
    TokenAlignment {
        /// Index of the token in the sequence.
        index: usize,
        /// The token text.
        token: String,
        /// Byte offset the search started from.
        cursor: usize,
    },

    /// The three sequences differ in length.
    #[error("sequence lengths differ: {tokens} tokens, {tags} tags, {trailing_whitespace} whitespace flags")]
    LengthMismatch {
        /// Number of tokens.
        tokens: usize,
        /// Number of tags.
        tags: usize,
        /// Number of whitespace flags.
        trailing_whitespace: usize,
    },
}

/// A parsed BIO tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag<'a> {
    Begin(&'a str),
    Inside(&'a str),
    Outside,
}

impl<'a> Tag<'a> {
    fn parse(tag: &'a str) -> Self {
        if let Some(label) = tag.strip_prefix("B-") {
            Tag::Begin(label)
        } else if let Some(label) = tag.strip_prefix("I-") {
            Tag::Inside(label)
        } else {
            Tag::Outside
        }
    }
}

/// Convert BIO-tagged tokens to character-offset entities.
///
/// For each token the cursor skips whitespace, then the token is located as
/// the first exact occurrence at or after the cursor. An entity opened by
/// `B-X` is extended by `I-X` and closed at the previous token's end by
/// anything else. `I-` tags that do not continue an open entity of the same
/// label open nothing.
///
/// # Errors
///
/// [`ConversionError::TokenAlignment`] if any token cannot be found; no
/// partial result is returned. [`ConversionError::LengthMismatch`] if the
/// sequences differ in length.
pub fn convert_bio_to_offsets<S, T>(
    tokens: &[S],
    tags: &[T],
    trailing_whitespace: &[bool],
    text: &str,
) -> Result<Vec<GroundTruthEntity>, ConversionError>
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    if tokens.len() != tags.len() || tokens.len() != trailing_whitespace.len() {
        return Err(ConversionError::LengthMismatch {
            tokens: tokens.len(),
            tags: tags.len(),
            trailing_whitespace: trailing_whitespace.len(),
        });
    }

    // Byte offsets throughout; converted to chars once at the end.
    let mut cursor = 0;
    let mut prev_end = 0;
    let mut open: Option<(&str, usize)> = None;
    let mut closed: Vec<(&str, usize, usize)> = Vec::new();

    for (index, (token, tag)) in tokens.iter().zip(tags).enumerate() {
        let token = token.as_ref();
        let rest = &text[cursor..];
        let search_from = cursor + (rest.len() - rest.trim_start().len());

        let Some(found) = text[search_from..].find(token) else {
            return Err(ConversionError::TokenAlignment {
                index,
                token: token.to_string(),
                cursor: search_from,
            });
        };
        let start = search_from + found;
        let end = start + token.len();
        cursor = end;

        match Tag::parse(tag.as_ref()) {
            Tag::Begin(label) => {
                if let Some((open_label, open_start)) = open.take() {
                    closed.push((open_label, open_start, prev_end));
                }
                open = Some((label, start));
            }
            Tag::Inside(label) if open.is_some_and(|(l, _)| l == label) => {}
            Tag::Inside(_) | Tag::Outside => {
                if let Some((open_label, open_start)) = open.take() {
                    closed.push((open_label, open_start, prev_end));
                }
            }
        }
        prev_end = end;
    }
    if let Some((open_label, open_start)) = open {
        closed.push((open_label, open_start, prev_end));
    }

    let converter = SpanConverter::new(text);
    Ok(closed
        .into_iter()
        .map(|(label, start, end)| {
            let (char_start, char_end) = converter.chars_from_bytes(start, end);
            GroundTruthEntity::new(label, char_start, char_end, &text[start..end])
        })
        .collect())
}

/// Like [`convert_bio_to_offsets`], but logs failures and returns an empty
/// list instead.
///
/// Callers that aggregate over a corpus should prefer the fallible version
/// so that an unalignable document is not mistaken for one without PII.
#[must_use]
pub fn convert_bio_lossy<S, T>(
    tokens: &[S],
    tags: &[T],
    trailing_whitespace: &[bool],
    text: &str,
) -> Vec<GroundTruthEntity>
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    convert_bio_to_offsets(tokens, tags, trailing_whitespace, text).unwrap_or_else(|e| {
        log::warn!("ground truth conversion aborted: {e}");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(tokens: &[&str], tags: &[&str], text: &str) -> Result<Vec<GroundTruthEntity>, ConversionError> {
        let ws = vec![true; tokens.len()];
        convert_bio_to_offsets(tokens, tags, &ws, text)
    }

    #[test]
    fn test_single_entity() {
        let gold = convert(&["John", "Doe", "works"], &["B-PERSON", "I-PERSON", "O"], "John Doe works").unwrap();
        assert_eq!(gold, vec![GroundTruthEntity::new("PERSON", 0, 8, "John Doe")]);
    }

    #[test]
    fn test_adjacent_begins_split() {
        let gold = convert(&["Ann", "Bob", "left"], &["B-NAME", "B-NAME", "O"], "Ann Bob left").unwrap();
        assert_eq!(gold.len(), 2);
        assert_eq!(gold[0].text, "Ann");
        assert_eq!(gold[1].text, "Bob");
    }

    #[test]
    fn test_inside_with_other_label_closes() {
        let gold = convert(
            &["Ann", "Lee", "Paris"],
            &["B-NAME", "I-NAME", "I-LOC"],
            "Ann Lee Paris",
        )
        .unwrap();
        // I-LOC closes NAME and opens nothing.
        assert_eq!(gold, vec![GroundTruthEntity::new("NAME", 0, 7, "Ann Lee")]);
    }

    #[test]
    fn test_orphan_inside_ignored() {
        let gold = convert(&["hello", "there"], &["I-NAME", "O"], "hello there").unwrap();
        assert!(gold.is_empty());
    }

    #[test]
    fn test_entity_open_at_end() {
        let gold = convert(&["call", "555", "-", "0100"], &["O", "B-PHONE", "I-PHONE", "I-PHONE"], "call 555-0100").unwrap();
        assert_eq!(gold, vec![GroundTruthEntity::new("PHONE", 5, 13, "555-0100")]);
    }

    #[test]
    fn test_text_between_tokens_is_kept() {
        // Entity text is the raw substring, including the original spacing.
        let gold = convert(&["Jane", "Roe"], &["B-NAME", "I-NAME"], "Jane   Roe").unwrap();
        assert_eq!(gold[0].text, "Jane   Roe");
        assert_eq!(gold[0].end(), 10);
    }

    #[test]
    fn test_missing_token_aborts_whole_sequence() {
        let result = convert(&["John", "Smith"], &["B-NAME", "I-NAME"], "John Doe");
        assert!(matches!(result, Err(ConversionError::TokenAlignment { index: 1, .. })));

        let lossy = convert_bio_lossy(&["John", "Smith"], &["B-NAME", "I-NAME"], &[true, false], "John Doe");
        assert!(lossy.is_empty());
    }

    #[test]
    fn test_tokens_must_appear_in_order() {
        let result = convert(&["Doe", "John"], &["O", "B-NAME"], "John Doe");
        assert!(matches!(result, Err(ConversionError::TokenAlignment { .. })));
    }

    #[test]
    fn test_length_mismatch() {
        let result = convert_bio_to_offsets(&["a", "b"], &["O"], &[true, true], "a b");
        assert!(matches!(result, Err(ConversionError::LengthMismatch { tokens: 2, tags: 1, .. })));
    }

    #[test]
    fn test_char_offsets_with_multibyte_text() {
        let gold = convert(&["Zoë", "Brontë", "wrote"], &["B-NAME", "I-NAME", "O"], "Zoë Brontë wrote").unwrap();
        assert_eq!(gold[0].text, "Zoë Brontë");
        assert_eq!((gold[0].start(), gold[0].end()), (0, 10));
    }

    #[test]
    fn test_empty_input() {
        assert!(convert(&[], &[], "").unwrap().is_empty());
    }
}
