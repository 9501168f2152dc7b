//! Error types for parsing PHP sources.

use thiserror::Error;

/// Errors from the syntax tree provider.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Failed to initialise the Tree-sitter parser with the PHP grammar.
    #[error("failed to initialise PHP parser: {message}")]
    ParserInitError {
        /// Description of the failure.
        message: String,
    },

    /// Tree-sitter did not produce a tree at all.
    #[error("failed to parse PHP source: {message}")]
    ParseError {
        /// Description of the failure.
        message: String,
    },

    /// The source nests deeper than the lowered tree allows.
    #[error("source nests deeper than {limit} levels")]
    TooDeep {
        /// The nesting limit that was exceeded.
        limit: usize,
    },
}

impl SyntaxError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(message: impl Into<String>) -> Self {
        Self::ParserInitError {
            message: message.into(),
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Creates an error for a source nested beyond `limit` levels.
    #[must_use]
    pub const fn too_deep(limit: usize) -> Self {
        Self::TooDeep { limit }
    }
}
