//! Tree-sitter parsing wrapper with error recovery.
//!
//! Tree-sitter is error-tolerant: a parse always yields a tree, with ERROR
//! and MISSING nodes marking the regions it could not make sense of. The
//! scanner treats any such node as a reason to skip the file, and the pattern
//! compiler rejects patterns that contain them.

use std::ops::Range;

use crate::error::SyntaxError;
use crate::language::tree_sitter_language;
use crate::position::point_to_one_based;
use crate::tree::SourceTree;

/// Result of parsing PHP source code.
#[derive(Debug)]
pub struct ParseResult {
    tree: tree_sitter::Tree,
    source: String,
}

impl ParseResult {
    /// Returns whether Tree-sitter had to recover from any syntax error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Collects the ERROR and MISSING nodes of the tree, in source order.
    #[must_use]
    pub fn errors(&self) -> Vec<SyntaxErrorInfo> {
        let mut errors = Vec::new();
        collect_error_nodes(self.tree.root_node(), &self.source, &mut errors);
        errors
    }

    /// Lowers the concrete tree into an owned [`SourceTree`], consuming the
    /// parse result.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::TooDeep`] when the source nests deeper than
    /// [`crate::MAX_DEPTH`].
    pub fn into_source_tree(self) -> Result<SourceTree, SyntaxError> {
        SourceTree::lower(&self.tree, self.source)
    }
}

/// Information about a syntax error found during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorInfo {
    /// Byte range of the error in the source.
    pub byte_range: Range<usize>,
    /// Line number (one-based) where the error starts.
    pub line: u32,
    /// Column number (one-based) where the error starts.
    pub column: u32,
    /// A snippet of the problematic source text.
    pub context: String,
    /// Human-readable description of the error.
    pub message: String,
}

const SNIPPET_CHARS: usize = 40;

impl SyntaxErrorInfo {
    fn from_node(node: tree_sitter::Node<'_>, source: &str) -> Self {
        let (line, column) = point_to_one_based(node.start_position());
        let message = if node.is_missing() {
            format!("missing `{}`", node.kind())
        } else {
            "unexpected input".to_owned()
        };

        Self {
            byte_range: node.byte_range(),
            line,
            column,
            context: snippet(source.get(node.byte_range()).unwrap_or_default()),
            message,
        }
    }
}

/// First line of `text`, shortened to a readable length.
fn snippet(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default().trim_end();
    if first_line.chars().count() <= SNIPPET_CHARS {
        return first_line.to_owned();
    }
    let mut shortened: String = first_line.chars().take(SNIPPET_CHARS).collect();
    shortened.push_str("...");
    shortened
}

/// Tree-sitter parser configured for PHP.
///
/// A parser is not thread-safe; create one per worker thread.
pub struct Parser {
    inner: tree_sitter::Parser,
}

impl Parser {
    /// Creates a new PHP parser.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar is incompatible with the linked
    /// Tree-sitter runtime.
    pub fn new() -> Result<Self, SyntaxError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&tree_sitter_language())
            .map_err(|e| SyntaxError::parser_init(e.to_string()))?;

        Ok(Self { inner })
    }

    /// Parses source code and returns the result.
    ///
    /// Use [`ParseResult::has_errors`] to check whether the source was valid.
    ///
    /// # Errors
    ///
    /// Returns an error if the parser fails to produce a syntax tree. This
    /// is rare and typically indicates a parser configuration issue.
    pub fn parse(&mut self, source: &str) -> Result<ParseResult, SyntaxError> {
        let tree = self
            .inner
            .parse(source, None)
            .ok_or_else(|| SyntaxError::parse("parsing failed"))?;

        Ok(ParseResult {
            tree,
            source: source.to_owned(),
        })
    }
}

fn collect_error_nodes(
    root: tree_sitter::Node<'_>,
    source: &str,
    errors: &mut Vec<SyntaxErrorInfo>,
) {
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        if node.is_error() || node.is_missing() {
            errors.push(SyntaxErrorInfo::from_node(node, source));
        }

        if !node.has_error() {
            continue;
        }

        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        pending.extend(children.into_iter().rev());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("<?php echo 1;")]
    #[case("<?php function hello() { return 'hi'; }")]
    #[case("<?php\n$list = [1, 2, 3];\n")]
    fn parser_parses_valid_source(#[case] source: &str) {
        let mut parser = Parser::new().expect("parser init");
        let result = parser.parse(source).expect("parse");

        assert!(!result.has_errors());
        assert!(result.errors().is_empty());
    }

    #[rstest]
    #[case("<?php function broken( {")]
    #[case("<?php $x = ;")]
    fn parser_detects_syntax_errors(#[case] source: &str) {
        let mut parser = Parser::new().expect("parser init");
        let result = parser.parse(source).expect("parse");

        assert!(result.has_errors());
        assert!(!result.errors().is_empty());
    }

    #[test]
    fn syntax_error_info_has_line_and_column() {
        let mut parser = Parser::new().expect("parser init");
        let result = parser
            .parse("<?php\nfunction test() {\n    $x = \n}")
            .expect("parse");

        let errors = result.errors();
        let first_error = errors.first().expect("has error");
        assert!(first_error.line >= 2);
        assert!(first_error.column >= 1);
    }

    #[rstest]
    #[case("$x = ;", "$x = ;")]
    #[case("first\nsecond", "first")]
    #[case(
        "an_unreasonably_long_identifier_that_keeps_going_on",
        "an_unreasonably_long_identifier_that_kee..."
    )]
    fn snippets_are_single_short_lines(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(snippet(text), expected);
    }
}
