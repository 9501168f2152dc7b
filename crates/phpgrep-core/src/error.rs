//! Error types for pattern and filter compilation.
//!
//! Both enums describe configuration problems that are detected once, before
//! any file is scanned. Problems found while matching individual candidates
//! never surface as errors.

use phpgrep_syntax::SyntaxError;
use thiserror::Error;

/// Pattern compilation failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PatternError {
    /// The pattern contains no code.
    #[error("pattern is empty")]
    Empty,

    /// The PHP parser could not be created.
    #[error(transparent)]
    Parser(#[from] SyntaxError),

    /// The pattern is not valid PHP.
    #[error("pattern has a syntax error at {line}:{column}: {message} near `{context}`")]
    Syntax {
        /// One-based line within the pattern.
        line: u32,
        /// One-based column within the pattern.
        column: u32,
        /// The offending pattern text.
        context: String,
        /// Description of the problem.
        message: String,
    },

    /// A meta-variable sigil is not followed by a valid name.
    #[error("invalid metavariable syntax: {message}")]
    InvalidMetavariable {
        /// Description of the problem.
        message: String,
    },

    /// A variadic meta-variable is not a direct element of a list.
    #[error("variadic metavariable `{name}` must be a whole element of a list, not part of `{parent}`")]
    VariadicPlacement {
        /// Display form of the meta-variable (`$*rest`).
        name: String,
        /// Kind of the node that contains it.
        parent: String,
    },

    /// A meta-variable appears inside a string literal.
    #[error("metavariables cannot be used inside string literals: {context}")]
    MetaInLiteral {
        /// Display form of the literal.
        context: String,
    },

    /// The same name is used for a single-node and a variadic capture.
    #[error("metavariable `{name}` is used both as `${name}` and `$*{name}`")]
    ConflictingCapture {
        /// The conflicting name.
        name: String,
    },
}

impl PatternError {
    /// Creates an invalid metavariable error.
    #[must_use]
    pub fn invalid_metavariable(message: impl Into<String>) -> Self {
        Self::InvalidMetavariable {
            message: message.into(),
        }
    }
}

/// Filter compilation failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FilterError {
    /// The filter does not have the `name<op>value` shape.
    #[error("invalid filter `{filter}`: {message}")]
    Syntax {
        /// The filter expression.
        filter: String,
        /// Description of the problem.
        message: String,
    },

    /// The filter has an operator but no value.
    #[error("filter `{filter}` has no value")]
    EmptyValue {
        /// The filter expression.
        filter: String,
    },

    /// The value list mixes quoted strings and integers.
    #[error("filter `{filter}` mixes string and integer values")]
    MixedValues {
        /// The filter expression.
        filter: String,
    },

    /// The `~` operand is not a valid regular expression.
    #[error("filter `{filter}` has an invalid regular expression: {source}")]
    Regex {
        /// The filter expression.
        filter: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The filter names a meta-variable that the pattern never binds.
    #[error("filter `{filter}` refers to `{name}`, which the pattern does not capture (captures: {known})")]
    UnknownName {
        /// The referenced name.
        name: String,
        /// The filter expression.
        filter: String,
        /// Comma-separated list of capture names, or `none`.
        known: String,
    },
}

impl FilterError {
    /// Creates a syntax error for `filter`.
    #[must_use]
    pub fn syntax(filter: &str, message: impl Into<String>) -> Self {
        Self::Syntax {
            filter: filter.to_owned(),
            message: message.into(),
        }
    }
}
