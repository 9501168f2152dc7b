//! PHP grammar selection and source file detection.

use std::path::Path;

/// File extensions treated as PHP sources when walking a directory.
pub const PHP_EXTENSIONS: &[&str] = &[
    "php", "phtml", "php3", "php4", "php5", "php7", "php8", "phps", "inc",
];

/// Returns whether `ext` names a PHP source extension (case-insensitive).
///
/// # Examples
///
/// ```
/// use phpgrep_syntax::is_php_extension;
///
/// assert!(is_php_extension("PHP"));
/// assert!(!is_php_extension("rs"));
/// ```
#[must_use]
pub fn is_php_extension(ext: &str) -> bool {
    let normalised = ext.to_ascii_lowercase();
    PHP_EXTENSIONS.contains(&normalised.as_str())
}

/// Returns whether `path` has a PHP source extension.
#[must_use]
pub fn is_php_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(is_php_extension)
}

/// Returns the Tree-sitter grammar for PHP files (including the `<?php` tag
/// and inline HTML).
#[must_use]
pub fn tree_sitter_language() -> tree_sitter::Language {
    tree_sitter_php::LANGUAGE_PHP.into()
}
