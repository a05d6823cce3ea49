//! Character/byte offset conversion.
//!
//! Annotation spans count characters (what a person counts, and what the
//! engine reports), while Rust slices `str` by byte. ASCII text maps 1:1;
//! everything else needs a conversion before slicing.
//!
//! ```text
//! Text:  "Zoë met Åsa"
//!         chars: Z=0 o=1 ë=2 ' '=3 m=4 ...
//!         bytes: Z=0 o=1 ë=2..4 ' '=4 m=5 ...
//! ```

use std::ops::Range;

use crate::span::Span;

/// Convert a character span to a byte range over `text`.
///
/// Returns `None` when the span runs past the end of the text.
#[must_use]
pub fn char_range_to_bytes(text: &str, span: Span) -> Option<Range<usize>> {
    if text.is_ascii() {
        return (span.end() <= text.len()).then(|| span.begin()..span.end());
    }

    let mut byte_begin = None;
    let mut byte_end = None;
    let mut char_count = 0;

    for (char_idx, (byte_idx, _ch)) in text.char_indices().enumerate() {
        if char_idx == span.begin() {
            byte_begin = Some(byte_idx);
        }
        if char_idx == span.end() {
            byte_end = Some(byte_idx);
            break;
        }
        char_count = char_idx + 1;
    }

    // A span may end (or be empty) exactly at the end of the text.
    if byte_end.is_none() && span.end() == char_count {
        byte_end = Some(text.len());
    }
    if byte_begin.is_none() && span.begin() == char_count {
        byte_begin = Some(text.len());
    }

    Some(byte_begin?..byte_end?)
}

/// Slice `text` by a character span.
#[must_use]
pub fn slice_chars(text: &str, span: Span) -> Option<&str> {
    char_range_to_bytes(text, span).and_then(|range| text.get(range))
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
