//! Pattern compiler, structural matcher, and filter evaluator for phpgrep.
//!
//! # Pattern Language
//!
//! Patterns are PHP code in which variables act as meta-variables:
//!
//! - `$name` - Matches any single node and binds it as `name`; a repeated
//!   name must bind structurally equal nodes
//! - `$_` - Matches any single node without binding
//! - `$*name` / `$*` - Matches zero or more consecutive elements of an
//!   argument, parameter, array, or statement list
//!
//! # Filters
//!
//! Filters restrict matches by the literal values bound to meta-variables:
//! `name="FOO"`, `name!='a','b'`, `v=1,2`, `v!=3`, `name~^"FO+"$`.
//!
//! # Example
//!
//! ```
//! use phpgrep_core::{FilterSet, Pattern};
//! use phpgrep_syntax::Parser;
//!
//! let pattern = Pattern::compile("define($name, $_)")?;
//! let filters = FilterSet::compile(["name='FOO'"], &pattern)?;
//!
//! let mut parser = Parser::new()?;
//! let tree = parser
//!     .parse("<?php define('FOO', 1); define('BAR', 2);")?
//!     .into_source_tree()?;
//!
//! let accepted: Vec<_> = pattern
//!     .find_all(&tree)
//!     .into_iter()
//!     .filter(|m| filters.accepts(m.binding()))
//!     .collect();
//! assert_eq!(accepted.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod filter;
mod matcher;
mod metavariables;
mod pattern;

pub use error::{FilterError, PatternError};
pub use filter::{Filter, FilterSet, Predicate, Verdict, parse_php_int};
pub use matcher::{Binding, Bound, BoundNode, Match};
pub use pattern::{CaptureKind, Pattern, is_list_kind};

#[cfg(test)]
mod tests;
