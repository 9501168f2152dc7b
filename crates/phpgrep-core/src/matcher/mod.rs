//! Structural matcher for compiled patterns.
//!
//! The matcher walks a lowered [`SourceTree`] in pre-order and unifies the
//! pattern template with every candidate node. Unification is a case
//! analysis over [`NodeKind`](phpgrep_syntax::NodeKind) pairs; variadic list
//! elements are matched by backtracking over sibling runs.

mod binding;
mod matching;

use std::ops::Range;

use phpgrep_syntax::{SourceTree, Span, SyntaxNode};

use crate::pattern::Pattern;

pub use binding::{Binding, Bound, BoundNode};

/// A successful match: the matched source region and its bindings.
#[derive(Debug, Clone)]
pub struct Match<'t> {
    span: Span,
    text: &'t str,
    binding: Binding<'t>,
}

impl<'t> Match<'t> {
    pub(crate) const fn new(span: Span, text: &'t str, binding: Binding<'t>) -> Self {
        Self {
            span,
            text,
            binding,
        }
    }

    /// Returns the span of the matched region.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns the one-based line where the match starts.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.span.line
    }

    /// Returns the one-based column where the match starts.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.span.column
    }

    /// Returns the byte range of the match in the source.
    #[must_use]
    pub const fn byte_range(&self) -> Range<usize> {
        self.span.byte_range()
    }

    /// Returns the matched source text.
    #[must_use]
    pub const fn text(&self) -> &'t str {
        self.text
    }

    /// Returns the meta-variable bindings.
    #[must_use]
    pub const fn binding(&self) -> &Binding<'t> {
        &self.binding
    }

    /// Returns the value bound to `name`.
    #[must_use]
    pub fn capture(&self, name: &str) -> Option<&Bound<'t>> {
        self.binding.get(name)
    }
}

impl Pattern {
    /// Finds all matches of this pattern in `tree`, in ascending source
    /// order. Nested matches are reported independently.
    #[must_use]
    pub fn find_all<'t>(&self, tree: &'t SourceTree) -> Vec<Match<'t>> {
        matching::find_all(self, tree)
    }

    /// Unifies this pattern with one node of `tree`.
    ///
    /// Returns the bindings on success and `None` when the node does not
    /// match.
    #[must_use]
    pub fn match_node<'t>(
        &self,
        candidate: &'t SyntaxNode,
        tree: &'t SourceTree,
    ) -> Option<Binding<'t>> {
        matching::match_node(self, candidate, matching::MatchContext::new(tree))
    }
}
