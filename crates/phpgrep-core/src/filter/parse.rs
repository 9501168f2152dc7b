//! Filter expression parsing.

use regex::Regex;

use crate::error::FilterError;
use crate::filter::Predicate;
use crate::metavariables::is_valid_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Eq,
    NotEq,
    Regex,
}

#[derive(Debug, PartialEq, Eq)]
enum Value {
    Str(String),
    Int(i64),
}

/// Parses `<name><op><values>` into a name and predicate.
pub(super) fn parse_filter(expression: &str) -> Result<(String, Predicate), FilterError> {
    let body = expression.strip_prefix('$').unwrap_or(expression);
    let name_end = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(body.len());
    let (name, rest) = body.split_at(name_end);

    if !is_valid_name(name) {
        return Err(FilterError::syntax(
            expression,
            "expected a metavariable name at the start",
        ));
    }

    let (operator, operand) = split_operator(rest).ok_or_else(|| {
        FilterError::syntax(expression, "expected `=`, `!=` or `~` after the name")
    })?;

    if operand.is_empty() {
        return Err(FilterError::EmptyValue {
            filter: expression.to_owned(),
        });
    }

    let predicate = match operator {
        Operator::Regex => {
            let regex = Regex::new(operand).map_err(|source| FilterError::Regex {
                filter: expression.to_owned(),
                source,
            })?;
            Predicate::Regex(regex)
        }
        Operator::Eq | Operator::NotEq => {
            let values = split_values(expression, operand)?
                .into_iter()
                .map(|item| parse_value(expression, item))
                .collect::<Result<Vec<_>, _>>()?;
            build_set_predicate(expression, operator, values)?
        }
    };

    Ok((name.to_owned(), predicate))
}

fn split_operator(rest: &str) -> Option<(Operator, &str)> {
    if let Some(operand) = rest.strip_prefix("!=") {
        return Some((Operator::NotEq, operand));
    }
    if let Some(operand) = rest.strip_prefix('=') {
        return Some((Operator::Eq, operand));
    }
    rest.strip_prefix('~')
        .map(|operand| (Operator::Regex, operand))
}

/// Splits a value list on commas outside quotes.
fn split_values<'a>(expression: &str, operand: &'a str) -> Result<Vec<&'a str>, FilterError> {
    let mut items = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (offset, ch) in operand.char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if ch == '\\' => escaped = true,
            Some(open) if ch == open => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch == ',' => {
                items.push(operand.get(start..offset).unwrap_or_default());
                start = offset + ch.len_utf8();
            }
            None => {}
        }
    }

    if quote.is_some() {
        return Err(FilterError::syntax(expression, "unterminated string value"));
    }
    items.push(operand.get(start..).unwrap_or_default());

    let trimmed: Vec<&str> = items.into_iter().map(str::trim).collect();
    if trimmed.iter().any(|item| item.is_empty()) {
        return Err(FilterError::syntax(expression, "empty value in list"));
    }
    Ok(trimmed)
}

fn parse_value(expression: &str, item: &str) -> Result<Value, FilterError> {
    if is_quoted(item) {
        return Ok(Value::Str(item.to_owned()));
    }

    parse_php_int(item).map(Value::Int).ok_or_else(|| {
        FilterError::syntax(
            expression,
            format!("`{item}` is neither a quoted string nor an integer"),
        )
    })
}

fn is_quoted(item: &str) -> bool {
    ['"', '\''].into_iter().any(|quote| {
        item.len() >= 2 && item.starts_with(quote) && item.ends_with(quote)
    })
}

fn build_set_predicate(
    expression: &str,
    operator: Operator,
    values: Vec<Value>,
) -> Result<Predicate, FilterError> {
    let mut strings = Vec::new();
    let mut ints = Vec::new();
    for value in values {
        match value {
            Value::Str(raw) => strings.push(raw),
            Value::Int(number) => ints.push(number),
        }
    }

    let mixed = || FilterError::MixedValues {
        filter: expression.to_owned(),
    };

    match (operator, strings.is_empty(), ints.is_empty()) {
        (_, false, false) => Err(mixed()),
        (Operator::Eq, false, true) => Ok(Predicate::StrIn(strings)),
        (Operator::NotEq, false, true) => Ok(Predicate::StrNotIn(strings)),
        (Operator::Eq, true, _) => Ok(Predicate::IntIn(ints)),
        (Operator::NotEq, true, _) => Ok(Predicate::IntNotIn(ints)),
        (Operator::Regex, ..) => Err(FilterError::syntax(
            expression,
            "regular expressions take a single operand",
        )),
    }
}

/// Parses a PHP integer literal.
///
/// Accepts an optional sign, `_` digit separators, and the `0x`, `0b`, `0o`
/// and legacy leading-`0` octal prefixes. Returns `None` for anything else,
/// including values that do not fit in an `i64`.
///
/// # Examples
///
/// ```
/// use phpgrep_core::parse_php_int;
///
/// assert_eq!(parse_php_int("0x1A"), Some(26));
/// assert_eq!(parse_php_int("1_000"), Some(1000));
/// assert_eq!(parse_php_int("-010"), Some(-8));
/// assert_eq!(parse_php_int("'1'"), None);
/// ```
#[must_use]
pub fn parse_php_int(literal: &str) -> Option<i64> {
    let trimmed = literal.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    if unsigned.starts_with('_') || unsigned.ends_with('_') || unsigned.contains("__") {
        return None;
    }
    let cleaned: String = unsigned.chars().filter(|c| *c != '_').collect();
    let (radix, digits) = split_radix(&cleaned);

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = u64::from_str_radix(digits, radix).ok()?;
    if negative {
        0_i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    }
}

fn split_radix(cleaned: &str) -> (u32, &str) {
    const PREFIXES: [(&str, u32); 6] = [
        ("0x", 16),
        ("0X", 16),
        ("0b", 2),
        ("0B", 2),
        ("0o", 8),
        ("0O", 8),
    ];

    for (prefix, radix) in PREFIXES {
        if let Some(digits) = cleaned.strip_prefix(prefix) {
            return (radix, digits);
        }
    }

    match cleaned.strip_prefix('0') {
        Some(octal) if !octal.is_empty() => (8, octal),
        _ => (10, cleaned),
    }
}
