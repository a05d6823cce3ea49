//! Half-open character spans.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A half-open character interval `[begin, end)` over a document's text.
///
/// `begin <= end` always holds; [`Span::new`] rejects anything else.
/// Two spans are equal only when both endpoints match, so a span that merely
/// contains (or is contained by) another is never equal to it.
///
/// # Example
///
/// ```rust
/// use spanlink_core::Span;
///
/// let entity = Span::new(0, 12).unwrap();
/// let token = Span::new(7, 12).unwrap();
///
/// assert!(entity.contains(&token));
/// assert_ne!(entity, token);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    begin: usize,
    end: usize,
}

impl Span {
    /// Create a span, failing if `begin > end`.
    pub fn new(begin: usize, end: usize) -> Result<Self> {
        if begin > end {
            return Err(Error::InvalidSpan { begin, end });
        }
        Ok(Self { begin, end })
    }

    /// Start offset (inclusive).
    #[must_use]
    pub const fn begin(&self) -> usize {
        self.begin
    }

    /// End offset (exclusive).
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Length in characters.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.begin
    }

    /// Check if the span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Inclusive containment: `self.begin <= other.begin && other.end <= self.end`.
    #[must_use]
    pub const fn contains(&self, other: &Span) -> bool {
        self.begin <= other.begin && other.end <= self.end
    }

    /// Check if the two spans share at least one character.
    #[must_use]
    pub const fn overlaps(&self, other: &Span) -> bool {
        self.begin < other.end && other.begin < self.end
    }

    /// The smallest span covering every span in `spans`.
    ///
    /// Returns `None` for an empty input.
    #[must_use]
    pub fn covering<I>(spans: I) -> Option<Span>
    where
        I: IntoIterator<Item = Span>,
    {
        spans.into_iter().fold(None, |acc, s| match acc {
            None => Some(s),
            Some(a) => Some(Span {
                begin: a.begin.min(s.begin),
                end: a.end.max(s.end),
            }),
        })
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}

impl TryFrom<std::ops::Range<usize>> for Span {
    type Error = Error;

    fn try_from(range: std::ops::Range<usize>) -> Result<Self> {
        Span::new(range.start, range.end)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn span() -> impl Strategy<Value = Span> {
        (0usize..200, 0usize..50).prop_map(|(b, len)| Span::new(b, b + len).unwrap())
    }

    proptest! {
        /// The covering span contains every input span.
        #[test]
        fn covering_contains_inputs(spans in prop::collection::vec(span(), 1..10)) {
            let cover = Span::covering(spans.iter().copied()).unwrap();
            for s in &spans {
                prop_assert!(cover.contains(s));
            }
        }

        /// Mutual containment is equality.
        #[test]
        fn mutual_containment_is_equality(a in span(), b in span()) {
            prop_assert_eq!(a.contains(&b) && b.contains(&a), a == b);
        }
    }
}
