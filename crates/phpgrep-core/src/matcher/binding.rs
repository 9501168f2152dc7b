//! Meta-variable bindings produced by a successful match.
//!
//! Bindings borrow from the [`SourceTree`](phpgrep_syntax::SourceTree) that
//! was searched and live no longer than a single match.

use std::collections::HashMap;

use phpgrep_syntax::{Span, SyntaxNode};

/// A single bound source node together with its text.
#[derive(Debug, Clone, Copy)]
pub struct BoundNode<'t> {
    node: &'t SyntaxNode,
    text: &'t str,
}

impl<'t> BoundNode<'t> {
    pub(super) const fn new(node: &'t SyntaxNode, text: &'t str) -> Self {
        Self { node, text }
    }

    /// Returns the bound node.
    #[must_use]
    pub const fn node(&self) -> &'t SyntaxNode {
        self.node
    }

    /// Returns the source text of the bound node.
    #[must_use]
    pub const fn text(&self) -> &'t str {
        self.text
    }

    /// Returns the source span of the bound node.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.node.span()
    }
}

/// Value bound to a meta-variable name.
#[derive(Debug, Clone)]
pub enum Bound<'t> {
    /// A `$name` binding.
    Single(BoundNode<'t>),
    /// A `$*name` binding; may be empty.
    Sequence {
        /// The bound sibling nodes, in order.
        nodes: Vec<BoundNode<'t>>,
        /// Source text from the first node to the last, or empty.
        text: &'t str,
    },
}

impl<'t> Bound<'t> {
    /// Returns the source text covered by the binding.
    #[must_use]
    pub const fn text(&self) -> &'t str {
        match self {
            Self::Single(node) => node.text(),
            Self::Sequence { text, .. } => *text,
        }
    }

    /// Returns the bound node if this is a single-node binding.
    #[must_use]
    pub const fn as_single(&self) -> Option<&BoundNode<'t>> {
        match self {
            Self::Single(node) => Some(node),
            Self::Sequence { .. } => None,
        }
    }

    /// Returns the bound nodes if this is a sequence binding.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[BoundNode<'t>]> {
        match self {
            Self::Sequence { nodes, .. } => Some(nodes),
            Self::Single(_) => None,
        }
    }

    fn structurally_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Single(left), Self::Single(right)) => left.node.structurally_eq(right.node),
            (Self::Sequence { nodes: left, .. }, Self::Sequence { nodes: right, .. }) => {
                left.len() == right.len()
                    && left
                        .iter()
                        .zip(right)
                        .all(|(l, r)| l.node.structurally_eq(r.node))
            }
            _ => false,
        }
    }
}

/// Map from meta-variable names to their bound values.
///
/// Contains exactly the named meta-variables that took part in the match;
/// anonymous wildcards never appear.
#[derive(Debug, Clone, Default)]
pub struct Binding<'t> {
    inner: HashMap<String, Bound<'t>>,
}

impl<'t> Binding<'t> {
    /// Returns the value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Bound<'t>> {
        self.inner.get(name)
    }

    /// Iterates over all bindings in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bound<'t>)> {
        self.inner.iter().map(|(name, bound)| (name.as_str(), bound))
    }

    /// Returns the number of bound names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns whether nothing was bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Binds `name`, or checks the value against an earlier binding.
    ///
    /// Returns `false` when `name` is already bound to a structurally
    /// different value.
    pub(super) fn bind(&mut self, name: &str, value: Bound<'t>) -> bool {
        match self.inner.get(name) {
            Some(existing) => existing.structurally_eq(&value),
            None => {
                self.inner.insert(name.to_owned(), value);
                true
            }
        }
    }
}
