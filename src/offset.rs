//! Byte/character offset handling.
//!
//! Regex matches and `str::find` report **byte** offsets; every span in this
//! crate is in **characters** so that offsets agree with annotation tools.
//!
//! ```text
//! Text:   "Café: 555-1234"
//! Bytes:   C a f [é ] :   5 5 5 - 1 2 3 4
//!          0 1 2 3-4 5 6  7 ...          15
//! Chars:   C a f  é  :   5 5 5 - 1 2 3 4
//!          0 1 2  3  4 5  6 ...          14
//! ```
//!
//! The PHONE match is bytes `[7, 15)` but chars `[6, 14)`.

/// Converter for many spans over the same text.
///
/// Pre-computes mapping tables so each conversion is O(1). ASCII text maps
/// identically and allocates nothing.
#[derive(Debug, Clone)]
pub struct SpanConverter {
    byte_to_char: Vec<usize>,
    char_to_byte: Vec<usize>,
    is_ascii: bool,
}

impl SpanConverter {
    /// Create a converter for the given text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        if text.is_ascii() {
            return Self {
                byte_to_char: Vec::new(),
                char_to_byte: Vec::new(),
                is_ascii: true,
            };
        }

        let mut byte_to_char = vec![0usize; text.len() + 1];
        let mut char_to_byte = Vec::with_capacity(text.len() + 1);
        for (char_idx, (byte_idx, ch)) in text.char_indices().enumerate() {
            for b in byte_idx..byte_idx + ch.len_utf8() {
                byte_to_char[b] = char_idx;
            }
            char_to_byte.push(byte_idx);
        }
        byte_to_char[text.len()] = char_to_byte.len();
        char_to_byte.push(text.len());

        Self {
            byte_to_char,
            char_to_byte,
            is_ascii: false,
        }
    }

    /// Convert a byte offset to a char offset. Offsets past the end clamp.
    #[must_use]
    pub fn byte_to_char(&self, byte_idx: usize) -> usize {
        if self.is_ascii {
            return byte_idx;
        }
        self.byte_to_char
            .get(byte_idx)
            .or_else(|| self.byte_to_char.last())
            .copied()
            .unwrap_or(0)
    }

    /// Convert a char offset to a byte offset. Offsets past the end clamp.
    #[must_use]
    pub fn char_to_byte(&self, char_idx: usize) -> usize {
        if self.is_ascii {
            return char_idx;
        }
        self.char_to_byte
            .get(char_idx)
            .or_else(|| self.char_to_byte.last())
            .copied()
            .unwrap_or(0)
    }

    /// Convert a byte range to a char range.
    #[must_use]
    pub fn chars_from_bytes(&self, byte_start: usize, byte_end: usize) -> (usize, usize) {
        (self.byte_to_char(byte_start), self.byte_to_char(byte_end))
    }

    /// Check if the text is ASCII.
    #[must_use]
    pub const fn is_ascii(&self) -> bool {
        self.is_ascii
    }
}

/// Number of characters in `text`.
#[must_use]
pub fn char_len(text: &str) -> usize {
    if text.is_ascii() {
        text.len()
    } else {
        text.chars().count()
    }
}

/// Substring by char range, `None` if the range is out of bounds or inverted.
#[must_use]
pub fn slice_chars(text: &str, char_start: usize, char_end: usize) -> Option<&str> {
    if char_start > char_end {
        return None;
    }
    if text.is_ascii() {
        return text.get(char_start..char_end);
    }
    let mut indices = text.char_indices().map(|(b, _)| b).chain(std::iter::once(text.len()));
    let byte_start = indices.nth(char_start)?;
    let byte_end = if char_end == char_start {
        byte_start
    } else {
        indices.nth(char_end - char_start - 1)?
    };
    text.get(byte_start..byte_end)
}
