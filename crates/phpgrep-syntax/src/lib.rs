//! Tree-sitter powered PHP syntax trees for phpgrep.
//!
//! This crate is the syntax tree provider used by the structural matcher. It
//! wraps the `tree-sitter-php` grammar and lowers the concrete tree-sitter
//! tree into an owned [`SyntaxNode`] tree with a closed set of node variants
//! ([`NodeKind`]), which is what patterns and candidates are unified over.
//!
//! # Example
//!
//! ```
//! use phpgrep_syntax::{NodeKind, Parser};
//!
//! let mut parser = Parser::new()?;
//! let parsed = parser.parse("<?php define('FOO', 1);")?;
//! assert!(!parsed.has_errors());
//!
//! let tree = parsed.into_source_tree()?;
//! let mut literals = Vec::new();
//! tree.root().walk(&mut |node| {
//!     if let NodeKind::Int(raw) = node.kind() {
//!         literals.push(raw.clone());
//!     }
//! });
//! assert_eq!(literals, vec!["1".to_owned()]);
//! # Ok::<(), phpgrep_syntax::SyntaxError>(())
//! ```

mod error;
mod language;
mod parser;
mod position;
mod tree;

pub use error::SyntaxError;
pub use language::{PHP_EXTENSIONS, is_php_extension, is_php_path, tree_sitter_language};
pub use parser::{ParseResult, Parser, SyntaxErrorInfo};
pub use position::Span;
pub use tree::{MAX_DEPTH, MetaKind, MetaTag, NodeKind, SourceTree, SyntaxNode};
