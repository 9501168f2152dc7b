//! Meta-variable naming rules shared by the pattern compiler.
//!
//! Plain meta-variables are ordinary PHP variables, so they survive parsing
//! untouched and are recognised after lowering. Variadic meta-variables
//! (`$*name`) are not PHP; they are rewritten into placeholder variables
//! before parsing and recognised by their reserved prefix afterwards.

use phpgrep_syntax::MetaTag;

use crate::error::PatternError;

pub(crate) const ANONYMOUS_NAME: &str = "_";
pub(crate) const VARIADIC_PLACEHOLDER_PREFIX: &str = "__phpgrep_variadic_";

const fn is_name_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

const fn is_name_continuation_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns whether `name` is a valid meta-variable or filter name.
pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_name_start_char) && chars.all(is_name_continuation_char)
}

fn extract_name(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> String {
    let mut name = String::new();

    if !chars.peek().is_some_and(|(_, c)| is_name_start_char(*c)) {
        return name;
    }

    while let Some((_, c)) = chars.peek().copied() {
        if !is_name_continuation_char(c) {
            break;
        }
        name.push(c);
        chars.next();
    }

    name
}

/// Rewrites every `$*name` (or bare `$*`) into a placeholder variable so the
/// pattern becomes valid PHP.
pub(crate) fn normalise_variadics(source: &str) -> Result<String, PatternError> {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        if ch != '$' || !chars.peek().is_some_and(|(_, c)| *c == '*') {
            out.push(ch);
            continue;
        }
        chars.next();

        let name = extract_name(&mut chars);
        if name.is_empty() && chars.peek().is_some_and(|(_, c)| c.is_ascii_digit()) {
            return Err(PatternError::invalid_metavariable(format!(
                "variadic metavariable at offset {offset} has an invalid name"
            )));
        }

        out.push('$');
        out.push_str(&placeholder_for_variadic(&name));
    }

    Ok(out)
}

/// Builds the placeholder variable name (without `$`) for a variadic.
pub(crate) fn placeholder_for_variadic(name: &str) -> String {
    let name = if name.is_empty() { ANONYMOUS_NAME } else { name };
    format!("{VARIADIC_PLACEHOLDER_PREFIX}{name}")
}

/// Builds a variadic tag from the capture name, treating `_` and the empty
/// name as anonymous.
pub(crate) fn variadic_tag(name: &str) -> MetaTag {
    if name.is_empty() || name == ANONYMOUS_NAME {
        MetaTag::variadic(None)
    } else {
        MetaTag::variadic(Some(name.to_owned()))
    }
}

/// Classifies a pattern variable (name without `$`).
pub(crate) fn tag_for_variable(name: &str) -> MetaTag {
    if let Some(variadic) = name.strip_prefix(VARIADIC_PLACEHOLDER_PREFIX) {
        return variadic_tag(variadic);
    }
    if name == ANONYMOUS_NAME {
        return MetaTag::anonymous();
    }
    MetaTag::named(name)
}

/// Recognises the brace spelling `${"*"}` / `${"name:*"}` from the content of
/// its string literal (quotes included).
pub(crate) fn tag_for_brace_literal(raw: &str) -> Option<MetaTag> {
    let inner = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .or_else(|| raw.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')))?;

    if inner == "*" {
        return Some(MetaTag::variadic(None));
    }

    let name = inner.strip_suffix(":*")?;
    is_valid_name(name).then(|| variadic_tag(name))
}

/// Returns the user-facing spelling of a tag (`$x`, `$_`, `$*rest`).
pub(crate) fn display_tag(tag: &MetaTag) -> String {
    match (tag.is_variadic(), tag.name()) {
        (true, Some(name)) => format!("$*{name}"),
        (true, None) => "$*".to_owned(),
        (false, Some(name)) => format!("${name}"),
        (false, None) => format!("${ANONYMOUS_NAME}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phpgrep_syntax::MetaKind;
    use rstest::rstest;

    #[rstest]
    #[case("f($a, $*rest)", "f($a, $__phpgrep_variadic_rest)")]
    #[case("f($*)", "f($__phpgrep_variadic__)")]
    #[case("f($*_, 1)", "f($__phpgrep_variadic__, 1)")]
    #[case("$a * $b", "$a * $b")]
    fn normalises_variadic_sigils(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(normalise_variadics(source).expect("normalise"), expected);
    }

    #[test]
    fn rejects_numeric_variadic_name() {
        assert!(normalise_variadics("f($*1)").is_err());
    }

    #[rstest]
    #[case("x", MetaKind::Named, Some("x"))]
    #[case("_", MetaKind::Anonymous, None)]
    #[case("__phpgrep_variadic_rest", MetaKind::Variadic, Some("rest"))]
    #[case("__phpgrep_variadic__", MetaKind::Variadic, None)]
    fn classifies_variables(
        #[case] name: &str,
        #[case] kind: MetaKind,
        #[case] capture: Option<&str>,
    ) {
        let tag = tag_for_variable(name);
        assert_eq!(tag.kind(), kind);
        assert_eq!(tag.name(), capture);
    }

    #[rstest]
    #[case("\"*\"", Some(None))]
    #[case("'args:*'", Some(Some("args")))]
    #[case("\"x\"", None)]
    #[case("\"1a:*\"", None)]
    fn recognises_brace_variadics(#[case] raw: &str, #[case] expected: Option<Option<&str>>) {
        let tag = tag_for_brace_literal(raw);
        assert_eq!(tag.as_ref().map(MetaTag::name), expected);
    }
}
