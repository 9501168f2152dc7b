//! Predicate evaluation against bound values.

use phpgrep_syntax::{NodeKind, SyntaxNode};

use crate::filter::{Predicate, Verdict, parse_php_int};
use crate::matcher::Bound;

pub(super) fn evaluate(predicate: &Predicate, bound: &Bound<'_>) -> Verdict {
    match predicate {
        Predicate::StrIn(values) => {
            string_value(bound).map_or(Verdict::Mismatch, |text| verdict(contains(values, text)))
        }
        Predicate::StrNotIn(values) => {
            string_value(bound).map_or(Verdict::Mismatch, |text| verdict(!contains(values, text)))
        }
        Predicate::Regex(regex) => {
            string_value(bound).map_or(Verdict::Mismatch, |text| verdict(regex.is_match(text)))
        }
        Predicate::IntIn(values) => {
            int_value(bound).map_or(Verdict::Mismatch, |number| verdict(values.contains(&number)))
        }
        Predicate::IntNotIn(values) => {
            int_value(bound).map_or(Verdict::Mismatch, |number| verdict(!values.contains(&number)))
        }
    }
}

const fn verdict(accepted: bool) -> Verdict {
    if accepted {
        Verdict::Accept
    } else {
        Verdict::Reject
    }
}

fn contains(values: &[String], text: &str) -> bool {
    values.iter().any(|value| value == text)
}

/// Raw text of a string-valued binding: a literal, an interpolated string,
/// or the text spanned by a variadic run.
fn string_value<'t>(bound: &Bound<'t>) -> Option<&'t str> {
    match bound {
        Bound::Single(node) => match node.node().kind() {
            NodeKind::Str(_) | NodeKind::Branch("encapsed_string" | "heredoc") => Some(node.text()),
            _ => None,
        },
        Bound::Sequence { text, .. } => Some(*text),
    }
}

/// Value of an integer literal, optionally negated (`-1` is a unary
/// expression in PHP).
fn int_value(bound: &Bound<'_>) -> Option<i64> {
    let node = bound.as_single()?.node();
    match node.kind() {
        NodeKind::Int(raw) => parse_php_int(raw),
        NodeKind::Branch("unary_op_expression") => signed_int(node),
        _ => None,
    }
}

fn signed_int(node: &SyntaxNode) -> Option<i64> {
    let [sign, operand] = node.children() else {
        return None;
    };
    let (NodeKind::Token(op), NodeKind::Int(raw)) = (sign.kind(), operand.kind()) else {
        return None;
    };
    let magnitude = parse_php_int(raw)?;
    match op.as_str() {
        "-" => magnitude.checked_neg(),
        "+" => Some(magnitude),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::pattern::Pattern;
    use phpgrep_syntax::{Parser, SourceTree};
    use rstest::rstest;

    const SOURCE: &str = "<?php\nf(\"FOO\", 1);\nf('FOO', -2);\nf(\"a $b\", 0x3);\nf($x, [1]);\n";

    fn tree() -> SourceTree {
        let mut parser = Parser::new().expect("parser");
        parser
            .parse(SOURCE)
            .expect("parse")
            .into_source_tree()
            .expect("lower")
    }

    /// Returns the lines of `f($v, $n)` matches accepted by `filter`.
    fn accepted_lines(filter: &str) -> Vec<u32> {
        let tree = tree();
        let pattern = Pattern::compile("f($v, $n)").expect("pattern");
        let compiled = Filter::parse(filter).expect("filter");
        pattern
            .find_all(&tree)
            .iter()
            .filter(|found| compiled.evaluate(found.binding()).is_accept())
            .map(|found| found.line())
            .collect()
    }

    #[rstest]
    #[case("v=\"FOO\"", vec![2])]
    #[case("v='FOO'", vec![3])]
    #[case("v='FOO',\"FOO\"", vec![2, 3])]
    #[case("v!='FOO'", vec![2, 4])]
    #[case("v~FOO", vec![2, 3])]
    #[case("v~^\"", vec![2, 4])]
    #[case("v~\\$b", vec![4])]
    #[case("n=1", vec![2])]
    #[case("n=-2", vec![3])]
    #[case("n=3", vec![4])]
    #[case("n!=1,3", vec![3])]
    fn filters_bound_literals(#[case] filter: &str, #[case] expected: Vec<u32>) {
        assert_eq!(accepted_lines(filter), expected);
    }

    #[test]
    fn type_mismatch_rejects() {
        let tree = tree();
        let pattern = Pattern::compile("f($v, $n)").expect("pattern");
        let matches = pattern.find_all(&tree);
        let last = matches.last().expect("match on the last line");

        let by_string = Filter::parse("n!='x'").expect("filter");
        let by_int = Filter::parse("v!=1").expect("filter");
        let by_regex = Filter::parse("n~1").expect("filter");
        let variable_by_regex = Filter::parse("v~x").expect("filter");
        assert_eq!(by_string.evaluate(last.binding()), Verdict::Mismatch);
        assert_eq!(by_int.evaluate(last.binding()), Verdict::Mismatch);
        assert_eq!(by_regex.evaluate(last.binding()), Verdict::Mismatch);
        assert_eq!(variable_by_regex.evaluate(last.binding()), Verdict::Mismatch);
    }

    #[test]
    fn sequences_compare_their_spanned_text() {
        let tree = tree();
        let pattern = Pattern::compile("f($*args)").expect("pattern");
        let matches = pattern.find_all(&tree);
        let first = matches.first().expect("match");

        let exact = Filter::parse("args=\"\\\"FOO\\\", 1\"").expect("filter");
        let regex = Filter::parse("args~^\"FOO\", 1$").expect("filter");
        let as_int = Filter::parse("args=1").expect("filter");

        assert_eq!(regex.evaluate(first.binding()), Verdict::Accept);
        assert_eq!(as_int.evaluate(first.binding()), Verdict::Mismatch);
        assert_eq!(exact.evaluate(first.binding()), Verdict::Reject);
    }
}
