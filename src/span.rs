//! Character spans over a paper's concatenated text.
//!
//! Every offset in this crate is a character offset (not a byte offset) into
//! the shared coordinate space `"{title} {abstract}"`, matching the
//! conventions of the PubTator annotation format. A [`TextSpan`] is parsed
//! once, at construction, against its own literal text; downstream code can
//! then rely on `start < stop` and `stop - start == text.chars().count()`
//! without re-checking.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A half-open character interval `[start, stop)` carrying the literal
/// substring it denotes.
///
/// Ordering is by `start`, tie-broken by `stop` ascending. This total order
/// is what the linear sentence/annotation alignment sweep relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextSpan {
    text: String,
    start: usize,
    stop: usize,
}

impl TextSpan {
    /// Create a span, validating offset/text consistency.
    ///
    /// # Errors
    ///
    /// Fails if `start >= stop` or if the character length of `text` does
    /// not equal `stop - start`.
    pub fn new(text: impl Into<String>, start: usize, stop: usize) -> Result<Self> {
        let text = text.into();
        if start >= stop {
            return Err(Error::SpanFormat {
                start,
                stop,
                text,
                reason: "start must be strictly less than stop".into(),
            });
        }
        let chars = text.chars().count();
        if chars != stop - start {
            return Err(Error::SpanFormat {
                start,
                stop,
                text,
                reason: format!("text is {} characters, span covers {}", chars, stop - start),
            });
        }
        Ok(Self { text, start, stop })
    }

    /// The literal text this span denotes.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Start offset (characters, inclusive).
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Stop offset (characters, exclusive).
    #[must_use]
    pub fn stop(&self) -> usize {
        self.stop
    }

    /// Length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stop - self.start
    }

    /// Spans are never empty; kept for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `other` lies fully within this span.
    #[must_use]
    pub fn contains(&self, other: &TextSpan) -> bool {
        other.start >= self.start && other.stop <= self.stop
    }

    /// Whether the two spans share at least one character position.
    #[must_use]
    pub fn overlaps(&self, other: &TextSpan) -> bool {
        !(self.stop <= other.start || other.stop <= self.start)
    }
}

impl Ord for TextSpan {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.stop.cmp(&other.stop))
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialOrd for TextSpan {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@[{}, {})", self.text, self.start, self.stop)
    }
}

/// Slice `text` by character offsets. Returns `None` if either offset is
/// past the end of the text.
pub(crate) fn char_slice(text: &str, start: usize, stop: usize) -> Option<&str> {
    if start > stop {
        return None;
    }
    let byte_start = char_to_byte(text, start)?;
    let byte_stop = char_to_byte(text, stop)?;
    text.get(byte_start..byte_stop)
}

/// Convert a character offset to a byte offset. `char_count(text)` maps to
/// `text.len()`.
fn char_to_byte(text: &str, char_idx: usize) -> Option<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .nth(char_idx)
}
