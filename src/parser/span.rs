//! Source location of a syntax node.
//!
//! Bytes are 0-based offsets into the source text; lines are 1-based.

use serde::{Deserialize, Serialize};
use tree_sitter::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start byte.
    pub start_byte: usize,
    /// Exclusive end byte.
    pub end_byte: usize,
    /// Inclusive start line.
    pub start_line: usize,
    /// Inclusive end line.
    pub end_line: usize,
}

impl Span {
    /// From the start of `first` to the end of `last`.
    pub fn between(first: Node<'_>, last: Node<'_>) -> Self {
        Self {
            start_byte: first.start_byte(),
            end_byte: last.end_byte(),
            start_line: first.start_position().row + 1,
            end_line: last.end_position().row + 1,
        }
    }

    /// The exact text covered by this span, or `None` when the span is out of
    /// bounds or does not fall on character boundaries.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        if self.start_byte > self.end_byte {
            return None;
        }
        text.get(self.start_byte..self.end_byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start_byte: usize, end_byte: usize) -> Span {
        Span {
            start_byte,
            end_byte,
            start_line: 1,
            end_line: 1,
        }
    }

    #[test]
    fn test_slice_within_bounds() {
        assert_eq!(span(4, 7).slice("def foo(): pass"), Some("foo"));
    }

    #[test]
    fn test_slice_out_of_bounds_is_none() {
        assert_eq!(span(4, 70).slice("def foo(): pass"), None);
        assert_eq!(span(7, 4).slice("def foo(): pass"), None);
    }

    #[test]
    fn test_slice_rejects_split_char() {
        // "é" is two bytes; byte 1 sits inside it.
        assert_eq!(span(1, 2).slice("é"), None);
        assert_eq!(span(0, 2).slice("é"), Some("é"));
    }
}
