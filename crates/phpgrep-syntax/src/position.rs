//! Source positions for lowered nodes.
//!
//! Tree-sitter positions are zero-based. For user-facing output we use
//! one-based line and column numbers.

use std::ops::Range;

/// Location of a node in the source it was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    /// One-based line of the first byte.
    pub line: u32,
    /// One-based column of the first byte.
    pub column: u32,
    /// Byte offset of the first byte.
    pub start_byte: usize,
    /// Byte offset one past the last byte.
    pub end_byte: usize,
}

impl Span {
    /// Returns the byte range covered by this span.
    #[must_use]
    pub const fn byte_range(&self) -> Range<usize> {
        self.start_byte..self.end_byte
    }

    /// Returns a span starting where `self` starts and ending where `end`
    /// ends.
    #[must_use]
    pub const fn to(self, end: Self) -> Self {
        Self {
            end_byte: end.end_byte,
            ..self
        }
    }

    pub(crate) fn of(node: tree_sitter::Node<'_>) -> Self {
        let (line, column) = point_to_one_based(node.start_position());
        Self {
            line,
            column,
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
        }
    }
}

/// Converts a Tree-sitter position (0-based) to one-based display coordinates.
#[must_use]
pub(crate) fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    // Line/column numbers will realistically never exceed u32::MAX.
    let line = u32::try_from(pos.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(pos.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}
