//! Owned PHP syntax trees.
//!
//! The concrete tree-sitter tree borrows from its parser and exposes node
//! kinds as strings. The matcher instead works over [`SyntaxNode`], an owned
//! tree whose node payloads form a closed enum ([`NodeKind`]), so that
//! unification is an exhaustive case analysis over node shapes.
//!
//! Lowering keeps every node that carries meaning and drops the rest:
//!
//! - comments and the `<?php` tag are dropped;
//! - pure punctuation tokens (`( ) [ ] { } , ;`) are dropped, so list-valued
//!   nodes such as `arguments` contain only their elements;
//! - keyword and operator tokens are kept as [`NodeKind::Token`] using the
//!   grammar's token name, which folds PHP's case-insensitive keywords;
//! - `true`, `false` and `null` are lowercased, matching how PHP reads them;
//! - names, variables, and other literals become leaves carrying their text
//!   verbatim, so function and class names compare case-sensitively.
//!
//! Lowering walks the tree with an explicit stack and refuses sources whose
//! nesting exceeds [`MAX_DEPTH`].

use crate::error::SyntaxError;
use crate::position::Span;

/// Deepest branch nesting a lowered tree may have.
///
/// Sources nested deeper than this are rejected with
/// [`SyntaxError::TooDeep`] instead of being lowered.
pub const MAX_DEPTH: usize = 4096;

const DROPPED_KINDS: &[&str] = &["comment", "php_tag"];
const PUNCTUATION: &[&str] = &["(", ")", "[", "]", "{", "}", ",", ";"];
const NAME_KINDS: &[&str] = &["name", "qualified_name", "namespace_name"];
/// Literal leaves whose spelling PHP treats case-insensitively.
const CASELESS_LITERALS: &[&str] = &["boolean", "null"];
const CASELESS_CONSTANTS: &[&str] = &["true", "false", "null"];
const STRING_KINDS: &[&str] = &["string", "encapsed_string", "heredoc", "nowdoc"];
const PLAIN_STRING_PARTS: &[&str] = &[
    "string_content",
    "string_value",
    "escape_sequence",
    "heredoc_start",
    "heredoc_end",
    "heredoc_body",
    "nowdoc_body",
    "nowdoc_string",
];

/// The role a meta-variable plays in a pattern template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKind {
    /// `$name`: matches one node and binds it.
    Named,
    /// `$_`: matches one node without binding.
    Anonymous,
    /// `$*name` / `$*`: matches a run of zero or more sibling nodes.
    Variadic,
}

/// A meta-variable placeholder carried by a pattern template node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetaTag {
    kind: MetaKind,
    name: Option<String>,
}

impl MetaTag {
    /// Creates a tag for a named single-node capture.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            kind: MetaKind::Named,
            name: Some(name.into()),
        }
    }

    /// Creates the anonymous wildcard tag.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            kind: MetaKind::Anonymous,
            name: None,
        }
    }

    /// Creates a variadic tag, optionally capturing the matched run.
    #[must_use]
    pub const fn variadic(name: Option<String>) -> Self {
        Self {
            kind: MetaKind::Variadic,
            name,
        }
    }

    /// Returns the tag kind.
    #[must_use]
    pub const fn kind(&self) -> MetaKind {
        self.kind
    }

    /// Returns the capture name, if the tag binds.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns whether this tag matches a run of siblings.
    #[must_use]
    pub const fn is_variadic(&self) -> bool {
        matches!(self.kind, MetaKind::Variadic)
    }
}

/// Payload of a [`SyntaxNode`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Interior grammar node, tagged with its tree-sitter kind.
    Branch(&'static str),
    /// Identifier or (qualified) name.
    Name(String),
    /// Variable, without the leading `$`.
    Variable(String),
    /// String literal, as written including its quotes.
    Str(String),
    /// Integer literal, as written.
    Int(String),
    /// Floating-point literal, as written.
    Float(String),
    /// Keyword, operator, or other leaf token.
    Token(String),
    /// Meta-variable placeholder; only found in pattern templates.
    Meta(MetaTag),
}

/// Node of an owned PHP syntax tree or pattern template.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    kind: NodeKind,
    span: Span,
    children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Creates a node from its parts.
    #[must_use]
    pub const fn new(kind: NodeKind, span: Span, children: Vec<Self>) -> Self {
        Self {
            kind,
            span,
            children,
        }
    }

    /// Creates a childless node.
    #[must_use]
    pub const fn leaf(kind: NodeKind, span: Span) -> Self {
        Self::new(kind, span, Vec::new())
    }

    /// Returns the node payload.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns the source span.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns the ordered children.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Splits the node into its parts.
    #[must_use]
    pub fn into_parts(self) -> (NodeKind, Span, Vec<Self>) {
        (self.kind, self.span, self.children)
    }

    /// Returns the tree-sitter kind of a branch node.
    #[must_use]
    pub const fn branch_kind(&self) -> Option<&'static str> {
        match self.kind {
            NodeKind::Branch(kind) => Some(kind),
            _ => None,
        }
    }

    /// Returns the meta-variable tag, if this is a placeholder node.
    #[must_use]
    pub const fn meta(&self) -> Option<&MetaTag> {
        match &self.kind {
            NodeKind::Meta(tag) => Some(tag),
            _ => None,
        }
    }

    /// Returns whether this node is a variadic placeholder.
    #[must_use]
    pub fn is_variadic(&self) -> bool {
        self.meta().is_some_and(MetaTag::is_variadic)
    }

    /// Returns whether this node is a keyword or operator token.
    #[must_use]
    pub const fn is_token(&self) -> bool {
        matches!(self.kind, NodeKind::Token(_))
    }

    /// Compares two subtrees by kind, payload, and children, ignoring spans.
    #[must_use]
    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(left, right)| left.structurally_eq(right))
    }

    /// Visits this node and all descendants in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Self)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// A lowered PHP source together with the text its spans refer to.
#[derive(Debug, Clone)]
pub struct SourceTree {
    source: String,
    root: SyntaxNode,
}

impl SourceTree {
    /// Lowers a concrete tree, failing when nesting exceeds [`MAX_DEPTH`].
    pub(crate) fn lower(tree: &tree_sitter::Tree, source: String) -> Result<Self, SyntaxError> {
        let root_node = tree.root_node();
        let root = lower_tree(root_node, &source)?.unwrap_or_else(|| {
            SyntaxNode::new(
                NodeKind::Branch(root_node.kind()),
                Span::of(root_node),
                Vec::new(),
            )
        });
        Ok(Self { source, root })
    }

    /// Returns the source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the root node (`program`).
    #[must_use]
    pub const fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// Returns the source text covered by `span`.
    #[must_use]
    pub fn text(&self, span: Span) -> &str {
        self.source.get(span.byte_range()).unwrap_or_default()
    }

    /// Returns the source text of `node`.
    #[must_use]
    pub fn text_of(&self, node: &SyntaxNode) -> &str {
        self.text(node.span())
    }

    /// Consumes the tree, returning the source and the root node.
    #[must_use]
    pub fn into_parts(self) -> (String, SyntaxNode) {
        (self.source, self.root)
    }
}

/// How a single concrete node lowers, before its children are visited.
enum Lowered {
    Dropped,
    Leaf(NodeKind),
    Branch(&'static str),
}

/// A branch whose children are still being lowered.
struct OpenBranch {
    kind: &'static str,
    span: Span,
    children: Vec<SyntaxNode>,
}

impl OpenBranch {
    fn close(self) -> SyntaxNode {
        SyntaxNode::new(NodeKind::Branch(self.kind), self.span, self.children)
    }
}

/// Lowers `root` with an explicit stack of open branches, so deeply nested
/// sources cost heap rather than call stack.
fn lower_tree(
    root: tree_sitter::Node<'_>,
    source: &str,
) -> Result<Option<SyntaxNode>, SyntaxError> {
    let mut cursor = root.walk();
    let mut open: Vec<OpenBranch> = Vec::new();
    let mut finished = None;

    loop {
        let node = cursor.node();
        match classify(node, source) {
            Lowered::Dropped => {}
            Lowered::Leaf(kind) => {
                attach(&mut open, &mut finished, SyntaxNode::leaf(kind, Span::of(node)));
            }
            Lowered::Branch(kind) => {
                if open.len() >= MAX_DEPTH {
                    return Err(SyntaxError::too_deep(MAX_DEPTH));
                }
                open.push(OpenBranch {
                    kind,
                    span: Span::of(node),
                    children: Vec::new(),
                });
                if cursor.goto_first_child() {
                    continue;
                }
                close_innermost(&mut open, &mut finished);
            }
        }

        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return Ok(finished);
            }
            close_innermost(&mut open, &mut finished);
        }
    }
}

fn attach(open: &mut [OpenBranch], finished: &mut Option<SyntaxNode>, node: SyntaxNode) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => *finished = Some(node),
    }
}

fn close_innermost(open: &mut Vec<OpenBranch>, finished: &mut Option<SyntaxNode>) {
    if let Some(branch) = open.pop() {
        attach(open, finished, branch.close());
    }
}

fn classify(node: tree_sitter::Node<'_>, source: &str) -> Lowered {
    let ts_kind = node.kind();
    if DROPPED_KINDS.contains(&ts_kind) {
        return Lowered::Dropped;
    }

    if !node.is_named() {
        if PUNCTUATION.contains(&ts_kind) {
            return Lowered::Dropped;
        }
        return Lowered::Leaf(NodeKind::Token(ts_kind.to_owned()));
    }

    let text = source.get(node.byte_range()).unwrap_or_default();
    let kind = match ts_kind {
        "variable_name" => NodeKind::Variable(text.strip_prefix('$').unwrap_or(text).to_owned()),
        "integer" => NodeKind::Int(text.to_owned()),
        "float" => NodeKind::Float(text.to_owned()),
        literal if is_caseless_constant(literal, text) && node.child_count() == 0 => {
            NodeKind::Token(text.to_ascii_lowercase())
        }
        name if NAME_KINDS.contains(&name) => NodeKind::Name(text.to_owned()),
        string if STRING_KINDS.contains(&string) && !has_interpolation(node) => {
            NodeKind::Str(text.to_owned())
        }
        _ if node.child_count() == 0 => NodeKind::Token(text.to_owned()),
        branch => return Lowered::Branch(branch),
    };

    Lowered::Leaf(kind)
}

/// Returns whether `text` is `true`, `false` or `null` in any case, spelled
/// either as a literal or as a bare constant name.
fn is_caseless_constant(ts_kind: &str, text: &str) -> bool {
    CASELESS_LITERALS.contains(&ts_kind)
        || (ts_kind == "name"
            && CASELESS_CONSTANTS
                .iter()
                .any(|constant| text.eq_ignore_ascii_case(constant)))
}

/// Returns whether a string literal embeds anything besides plain content.
fn has_interpolation(node: tree_sitter::Node<'_>) -> bool {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .any(|child| !PLAIN_STRING_PARTS.contains(&child.kind()) || has_interpolation(child))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn lower(source: &str) -> SourceTree {
        let mut parser = Parser::new().expect("parser init");
        parser
            .parse(source)
            .expect("parse")
            .into_source_tree()
            .expect("lower")
    }

    fn collect_leaves(tree: &SourceTree) -> Vec<NodeKind> {
        let mut leaves = Vec::new();
        tree.root().walk(&mut |node| {
            if node.children().is_empty() {
                leaves.push(node.kind().clone());
            }
        });
        leaves
    }

    #[test]
    fn lowers_call_arguments_without_punctuation() {
        let tree = lower("<?php define(\"FOO\", 1);");
        let leaves = collect_leaves(&tree);

        assert_eq!(
            leaves,
            vec![
                NodeKind::Name("define".to_owned()),
                NodeKind::Str("\"FOO\"".to_owned()),
                NodeKind::Int("1".to_owned()),
            ]
        );
    }

    #[test]
    fn drops_comments_and_open_tag() {
        let tree = lower("<?php\n// note\n/* block */ $x;");
        let leaves = collect_leaves(&tree);

        assert_eq!(leaves, vec![NodeKind::Variable("x".to_owned())]);
    }

    #[test]
    fn interpolated_strings_stay_branches() {
        let tree = lower("<?php \"Hello $name\";");
        let mut found = false;
        tree.root().walk(&mut |node| {
            if node.branch_kind() == Some("encapsed_string") {
                found = true;
            }
        });

        assert!(found, "interpolated string should keep its structure");
    }

    #[test]
    fn structural_equality_ignores_position() {
        let tree = lower("<?php f(1 + 2);\n\n    f(1 + 2);\nf(1 - 2);");
        let statements = tree.root().children();
        let [first, second, third] = statements else {
            panic!("expected three statements, got {}", statements.len());
        };

        assert_ne!(first.span(), second.span());
        assert!(first.structurally_eq(second));
        assert!(!first.structurally_eq(third));
    }

    fn outline(node: &SyntaxNode, depth: usize, out: &mut String) {
        let label = match node.kind() {
            NodeKind::Branch(kind) => (*kind).to_owned(),
            other => format!("{other:?}"),
        };
        out.push_str(&format!("{}{label}\n", "  ".repeat(depth)));
        for child in node.children() {
            outline(child, depth + 1, out);
        }
    }

    #[test]
    fn assignment_lowers_to_an_outline() {
        let tree = lower("<?php $x = 1;");
        let mut rendered = String::new();
        outline(tree.root(), 0, &mut rendered);

        insta::assert_snapshot!(rendered.trim_end(), @r#"
        program
          expression_statement
            assignment_expression
              Variable("x")
              Token("=")
              Int("1")
        "#);
    }

    fn concatenation(terms: usize) -> String {
        format!("<?php $s = {}$a;", "$a . ".repeat(terms))
    }

    #[test]
    fn long_concatenations_lower_without_recursion() {
        let tree = lower(&concatenation(1_000));
        let mut variables = 0;
        tree.root().walk(&mut |node| {
            if matches!(node.kind(), NodeKind::Variable(name) if name == "a") {
                variables += 1;
            }
        });

        assert_eq!(variables, 1_001);
    }

    #[test]
    fn sources_nested_past_the_limit_are_rejected() {
        let mut parser = Parser::new().expect("parser init");
        let parsed = parser
            .parse(&concatenation(MAX_DEPTH + 10))
            .expect("parse");

        let error = parsed.into_source_tree().expect_err("too deep");
        assert!(
            matches!(error, SyntaxError::TooDeep { limit } if limit == MAX_DEPTH),
            "{error}"
        );
    }

    #[test]
    fn boolean_and_null_literals_fold_case() {
        let tree = lower("<?php f(TRUE, False, NULL);");
        let leaves = collect_leaves(&tree);

        assert_eq!(
            leaves,
            vec![
                NodeKind::Name("f".to_owned()),
                NodeKind::Token("true".to_owned()),
                NodeKind::Token("false".to_owned()),
                NodeKind::Token("null".to_owned()),
            ]
        );
    }

    #[test]
    fn spans_are_one_based() {
        let tree = lower("<?php\n\n  foo();");
        let statement = tree.root().children().first().expect("statement");

        assert_eq!(statement.span().line, 3);
        assert_eq!(statement.span().column, 3);
        assert_eq!(tree.text_of(statement), "foo();");
    }
}
