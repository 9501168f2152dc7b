//! Pattern compilation for structural code matching.
//!
//! A pattern is PHP code. Compilation parses it with the same grammar as the
//! scanned sources, lowers it, and then rewrites meta-variables into
//! [`NodeKind::Meta`] placeholders. That rewrite is the only place where
//! meta-variable conventions are interpreted.

use std::collections::BTreeMap;

use phpgrep_syntax::{MetaKind, MetaTag, NodeKind, ParseResult, Parser, Span, SyntaxNode};

use crate::error::PatternError;
use crate::metavariables::{
    VARIADIC_PLACEHOLDER_PREFIX, display_tag, normalise_variadics, tag_for_brace_literal,
    tag_for_variable,
};

const OPEN_TAG: &str = "<?php ";

/// Node kinds whose children form a list that a variadic may span.
const LIST_KINDS: &[&str] = &[
    "program",
    "arguments",
    "formal_parameters",
    "compound_statement",
    "colon_block",
    "array_creation_expression",
    "list_literal",
    "declaration_list",
    "enum_declaration_list",
    "switch_block",
    "case_statement",
    "default_statement",
    "match_block",
    "anonymous_function_use_clause",
    "attribute_group",
    "sequence_expression",
];

/// Nodes that wrap a single list element. A lone variadic inside one stands
/// for the variadic itself.
const ELEMENT_WRAPPERS: &[&str] = &[
    "argument",
    "expression_statement",
    "array_element_initializer",
    "simple_parameter",
];

const INTERPOLATED_STRING_KINDS: &[&str] = &["encapsed_string", "heredoc"];

/// Returns whether nodes of this tree-sitter kind hold a list of elements
/// (arguments, parameters, array items, statements).
#[must_use]
pub fn is_list_kind(kind: &str) -> bool {
    LIST_KINDS.contains(&kind)
}

/// How a named meta-variable binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    /// `$name`: one node.
    Single,
    /// `$*name`: a run of sibling nodes.
    Sequence,
}

#[derive(Debug)]
pub(crate) enum Template {
    /// A single expression or statement, matched against every node.
    Node(SyntaxNode),
    /// Several statements, matched against consecutive list elements.
    Statements(Vec<SyntaxNode>),
}

/// A compiled structural pattern.
///
/// Patterns are immutable once compiled and can be shared by reference
/// across threads.
#[derive(Debug)]
pub struct Pattern {
    source: String,
    template: Template,
    captures: BTreeMap<String, CaptureKind>,
}

impl Pattern {
    /// Compiles a pattern string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the pattern is empty or is not valid PHP
    /// - a variadic meta-variable has an invalid name or is not a whole list
    ///   element
    /// - a meta-variable appears inside a string literal
    /// - a name is used for both a single and a variadic capture
    ///
    /// # Examples
    ///
    /// ```
    /// use phpgrep_core::Pattern;
    ///
    /// let pattern = Pattern::compile("in_array($x, $*_)")?;
    /// assert!(pattern.has_metavariables());
    /// # Ok::<(), phpgrep_core::PatternError>(())
    /// ```
    pub fn compile(source: &str) -> Result<Self, PatternError> {
        if source.trim().is_empty() {
            return Err(PatternError::Empty);
        }

        let normalised = normalise_variadics(source)?;
        let mut parser = Parser::new()?;
        let parsed = parse_pattern(&mut parser, &normalised)?;
        let (_, root) = parsed.into_source_tree()?.into_parts();

        let template = match select_template(root)? {
            Template::Node(node) => {
                let rewritten = rewrite(node)?;
                if let Some(tag) = rewritten.meta().filter(|tag| tag.is_variadic()) {
                    return Err(PatternError::VariadicPlacement {
                        name: display_tag(tag),
                        parent: "the pattern root".to_owned(),
                    });
                }
                Template::Node(rewritten)
            }
            Template::Statements(statements) => Template::Statements(
                statements
                    .into_iter()
                    .map(rewrite)
                    .collect::<Result<_, _>>()?,
            ),
        };

        let captures = collect_captures(&template)?;

        Ok(Self {
            source: source.to_owned(),
            template,
            captures,
        })
    }

    /// Returns the original pattern source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns how `name` binds, or `None` if the pattern never binds it.
    #[must_use]
    pub fn capture_kind(&self, name: &str) -> Option<CaptureKind> {
        self.captures.get(name).copied()
    }

    /// Returns the names bound by a successful match, in sorted order.
    pub fn capture_names(&self) -> impl Iterator<Item = &str> {
        self.captures.keys().map(String::as_str)
    }

    /// Returns whether this pattern contains any meta-variables, including
    /// anonymous ones.
    #[must_use]
    pub fn has_metavariables(&self) -> bool {
        let mut found = false;
        self.for_each_template_node(&mut |node| found |= node.meta().is_some());
        found
    }

    /// Returns whether the pattern spans several statements.
    #[must_use]
    pub const fn is_statement_sequence(&self) -> bool {
        matches!(self.template, Template::Statements(_))
    }

    pub(crate) const fn template(&self) -> &Template {
        &self.template
    }

    fn for_each_template_node<'a>(&'a self, visit: &mut impl FnMut(&'a SyntaxNode)) {
        match &self.template {
            Template::Node(node) => node.walk(visit),
            Template::Statements(statements) => {
                for statement in statements {
                    statement.walk(visit);
                }
            }
        }
    }
}

/// Parses the normalised pattern with a terminating semicolon, so that bare
/// expressions form a statement, and then as written.
fn parse_pattern(parser: &mut Parser, normalised: &str) -> Result<ParseResult, PatternError> {
    let terminated = parser.parse(&format!("{OPEN_TAG}{normalised};"))?;
    if !terminated.has_errors() {
        return Ok(terminated);
    }

    let bare = parser.parse(&format!("{OPEN_TAG}{normalised}"))?;
    if !bare.has_errors() {
        return Ok(bare);
    }

    let first = bare.errors().into_iter().next();
    let (line, column, context, message) = first.map_or_else(
        || (1, 1, normalised.to_owned(), "syntax error".to_owned()),
        |error| {
            let column = if error.line == 1 {
                error.column.saturating_sub(column_offset()).max(1)
            } else {
                error.column
            };
            (error.line, column, error.context, error.message)
        },
    );

    Err(PatternError::Syntax {
        line,
        column,
        context,
        message,
    })
}

fn column_offset() -> u32 {
    u32::try_from(OPEN_TAG.len()).unwrap_or(0)
}

fn select_template(root: SyntaxNode) -> Result<Template, PatternError> {
    let (_, _, children) = root.into_parts();
    let mut statements: Vec<SyntaxNode> = children
        .into_iter()
        .filter(|node| node.branch_kind() != Some("empty_statement"))
        .collect();

    if statements.len() > 1 {
        return Ok(Template::Statements(statements));
    }

    let statement = statements.pop().ok_or(PatternError::Empty)?;
    Ok(Template::Node(unwrap_expression_statement(statement)))
}

/// Unwraps `expr;` to `expr` so expression patterns match at any depth.
fn unwrap_expression_statement(statement: SyntaxNode) -> SyntaxNode {
    if statement.branch_kind() != Some("expression_statement") || statement.children().len() != 1
    {
        return statement;
    }

    let (kind, span, mut children) = statement.into_parts();
    match children.pop() {
        Some(expression) => expression,
        None => SyntaxNode::new(kind, span, children),
    }
}

/// Replaces meta-variables with tags and checks where they appear.
fn rewrite(node: SyntaxNode) -> Result<SyntaxNode, PatternError> {
    let (kind, span, children) = node.into_parts();
    match kind {
        NodeKind::Variable(name) => Ok(SyntaxNode::leaf(
            NodeKind::Meta(tag_for_variable(&name)),
            span,
        )),
        NodeKind::Str(raw) => {
            if raw.contains(VARIADIC_PLACEHOLDER_PREFIX) {
                return Err(PatternError::MetaInLiteral {
                    context: raw.replace(VARIADIC_PLACEHOLDER_PREFIX, "*"),
                });
            }
            Ok(SyntaxNode::leaf(NodeKind::Str(raw), span))
        }
        NodeKind::Branch(branch) => rewrite_branch(branch, span, children),
        leaf @ (NodeKind::Name(_)
        | NodeKind::Int(_)
        | NodeKind::Float(_)
        | NodeKind::Token(_)
        | NodeKind::Meta(_)) => Ok(SyntaxNode::new(leaf, span, children)),
    }
}

fn rewrite_branch(
    branch: &'static str,
    span: Span,
    children: Vec<SyntaxNode>,
) -> Result<SyntaxNode, PatternError> {
    if branch == "dynamic_variable_name"
        && let Some(tag) = brace_variadic(&children)
    {
        return Ok(SyntaxNode::leaf(NodeKind::Meta(tag), span));
    }

    if INTERPOLATED_STRING_KINDS.contains(&branch) {
        return Err(PatternError::MetaInLiteral {
            context: format!("interpolated {branch}"),
        });
    }

    let mut rewritten = children
        .into_iter()
        .map(rewrite)
        .collect::<Result<Vec<_>, _>>()?;

    if is_list_kind(branch) {
        return Ok(SyntaxNode::new(NodeKind::Branch(branch), span, rewritten));
    }

    if ELEMENT_WRAPPERS.contains(&branch)
        && rewritten.len() == 1
        && rewritten.first().is_some_and(SyntaxNode::is_variadic)
        && let Some(only) = rewritten.pop()
    {
        return Ok(only);
    }

    if let Some(tag) = rewritten
        .iter()
        .find_map(|child| child.meta().filter(|tag| tag.is_variadic()))
    {
        return Err(PatternError::VariadicPlacement {
            name: display_tag(tag),
            parent: branch.to_owned(),
        });
    }

    Ok(SyntaxNode::new(NodeKind::Branch(branch), span, rewritten))
}

fn brace_variadic(children: &[SyntaxNode]) -> Option<MetaTag> {
    let mut operands = children.iter().filter(|child| !child.is_token());
    let only = operands.next()?;
    if operands.next().is_some() {
        return None;
    }
    match only.kind() {
        NodeKind::Str(raw) => tag_for_brace_literal(raw),
        _ => None,
    }
}

fn collect_captures(template: &Template) -> Result<BTreeMap<String, CaptureKind>, PatternError> {
    let mut captures = BTreeMap::new();
    let mut conflict = None;

    let mut record = |node: &SyntaxNode| {
        let Some(tag) = node.meta() else {
            return;
        };
        let Some(name) = tag.name() else {
            return;
        };
        let kind = match tag.kind() {
            MetaKind::Variadic => CaptureKind::Sequence,
            MetaKind::Named | MetaKind::Anonymous => CaptureKind::Single,
        };
        let existing = captures.entry(name.to_owned()).or_insert(kind);
        if *existing != kind && conflict.is_none() {
            conflict = Some(name.to_owned());
        }
    };

    match template {
        Template::Node(node) => node.walk(&mut record),
        Template::Statements(statements) => {
            for statement in statements {
                statement.walk(&mut record);
            }
        }
    }

    match conflict {
        Some(name) => Err(PatternError::ConflictingCapture { name }),
        None => Ok(captures),
    }
}
