//! Filters over meta-variable bindings.
//!
//! A filter expression has the shape `<name><op><values>`:
//!
//! - `name="a",'b'` accepts bindings whose raw literal equals one of the
//!   alternatives, quotes included
//! - `name!="a"` rejects bindings equal to any alternative
//! - `v=1,0x2` and `v!=3` compare integer literals by value
//! - `name~regex` searches the raw literal text
//!
//! Filters are compiled once against a [`Pattern`] and evaluated against
//! each candidate [`Binding`].

mod eval;
mod parse;

use regex::Regex;

use crate::error::FilterError;
use crate::matcher::Binding;
use crate::pattern::Pattern;

pub use parse::parse_php_int;

/// Test applied to the value bound to one meta-variable.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// The string literal equals one of the raw alternatives.
    StrIn(Vec<String>),
    /// The string literal equals none of the raw alternatives.
    StrNotIn(Vec<String>),
    /// The string literal contains a match of the expression.
    Regex(Regex),
    /// The integer literal equals one of the values.
    IntIn(Vec<i64>),
    /// The integer literal equals none of the values.
    IntNotIn(Vec<i64>),
}

/// Outcome of evaluating a filter against a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The bound value satisfies the predicate.
    Accept,
    /// The bound value fails the predicate.
    Reject,
    /// The bound value has the wrong type for the predicate, or is missing.
    Mismatch,
}

impl Verdict {
    /// Returns whether the candidate is kept.
    #[must_use]
    pub const fn is_accept(self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// A single parsed filter expression.
#[derive(Debug, Clone)]
pub struct Filter {
    expression: String,
    name: String,
    predicate: Predicate,
}

impl Filter {
    /// Parses a filter expression.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression is malformed, has no value, mixes
    /// strings with integers, or carries an invalid regular expression.
    pub fn parse(expression: &str) -> Result<Self, FilterError> {
        let (name, predicate) = parse::parse_filter(expression)?;
        Ok(Self {
            expression: expression.to_owned(),
            name,
            predicate,
        })
    }

    /// Returns the expression as written.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Returns the meta-variable name, without `$`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the predicate.
    #[must_use]
    pub const fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Evaluates the filter against the bindings of one match.
    #[must_use]
    pub fn evaluate(&self, binding: &Binding<'_>) -> Verdict {
        binding
            .get(&self.name)
            .map_or(Verdict::Mismatch, |bound| eval::evaluate(&self.predicate, bound))
    }
}

/// All filters given for one search; a match is kept when every filter
/// accepts it.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    /// Parses `expressions` and checks each name against the pattern's
    /// captures.
    ///
    /// # Errors
    ///
    /// Returns the first parse error, or [`FilterError::UnknownName`] if a
    /// filter refers to a name the pattern never binds.
    pub fn compile<I, S>(expressions: I, pattern: &Pattern) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let filters = expressions
            .into_iter()
            .map(|expression| {
                let filter = Filter::parse(expression.as_ref())?;
                if pattern.capture_kind(filter.name()).is_none() {
                    return Err(unknown_name(&filter, pattern));
                }
                Ok(filter)
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { filters })
    }

    /// Returns whether every filter accepts `binding`.
    #[must_use]
    pub fn accepts(&self, binding: &Binding<'_>) -> bool {
        self.filters
            .iter()
            .all(|filter| filter.evaluate(binding).is_accept())
    }

    /// Returns the filters in the order given.
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Returns whether there are no filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

fn unknown_name(filter: &Filter, pattern: &Pattern) -> FilterError {
    let known = pattern.capture_names().collect::<Vec<_>>().join(", ");
    FilterError::UnknownName {
        name: filter.name().to_owned(),
        filter: filter.expression().to_owned(),
        known: if known.is_empty() {
            "none".to_owned()
        } else {
            known
        },
    }
}
