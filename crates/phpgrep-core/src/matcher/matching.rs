//! Unification of pattern templates with lowered source trees.

use phpgrep_syntax::{MetaKind, MetaTag, NodeKind, SourceTree, SyntaxNode};

use crate::matcher::Match;
use crate::matcher::binding::{Binding, Bound, BoundNode};
use crate::pattern::{Pattern, Template, is_list_kind};

#[derive(Clone, Copy)]
pub(super) struct MatchContext<'t> {
    tree: &'t SourceTree,
}

impl<'t> MatchContext<'t> {
    pub(super) const fn new(tree: &'t SourceTree) -> Self {
        Self { tree }
    }

    fn bound_node(self, node: &'t SyntaxNode) -> BoundNode<'t> {
        BoundNode::new(node, self.tree.text_of(node))
    }

    fn bound_sequence(self, nodes: &'t [SyntaxNode]) -> Bound<'t> {
        let text = match (nodes.first(), nodes.last()) {
            (Some(first), Some(last)) => self.tree.text(first.span().to(last.span())),
            _ => "",
        };
        Bound::Sequence {
            nodes: nodes.iter().map(|node| self.bound_node(node)).collect(),
            text,
        }
    }
}

/// Finds every match of `pattern` in `tree`, in pre-order.
pub(super) fn find_all<'t>(pattern: &Pattern, tree: &'t SourceTree) -> Vec<Match<'t>> {
    let ctx = MatchContext::new(tree);
    let mut results = Vec::new();
    match pattern.template() {
        Template::Node(template) => find_nodes(template, tree.root(), ctx, &mut results),
        Template::Statements(statements) => {
            find_windows(statements, tree.root(), ctx, &mut results);
        }
    }
    results
}

/// Unifies the pattern with a single candidate node.
///
/// A statement-sequence pattern matches a list node whose elements unify with
/// the statements from first to last.
pub(super) fn match_node<'t>(
    pattern: &Pattern,
    candidate: &'t SyntaxNode,
    ctx: MatchContext<'t>,
) -> Option<Binding<'t>> {
    let mut binding = Binding::default();
    let matched = match pattern.template() {
        Template::Node(template) => unify(template, candidate, ctx, &mut binding),
        Template::Statements(statements) => {
            candidate.branch_kind().is_some_and(is_list_kind)
                && SequenceMatcher::anchored(statements, candidate.children(), ctx)
                    .matches(0, 0, &mut binding)
                    .is_some()
        }
    };
    matched.then_some(binding)
}

fn find_nodes<'t>(
    template: &SyntaxNode,
    node: &'t SyntaxNode,
    ctx: MatchContext<'t>,
    results: &mut Vec<Match<'t>>,
) {
    if !node.is_token() {
        let mut binding = Binding::default();
        if unify(template, node, ctx, &mut binding) {
            results.push(Match::new(node.span(), ctx.tree.text_of(node), binding));
        }
    }

    for child in node.children() {
        find_nodes(template, child, ctx, results);
    }
}

/// Tries a window at each element of every list, before descending into that
/// element, so results stay in source order.
fn find_windows<'t>(
    statements: &[SyntaxNode],
    node: &'t SyntaxNode,
    ctx: MatchContext<'t>,
    results: &mut Vec<Match<'t>>,
) {
    let is_list = node.branch_kind().is_some_and(is_list_kind);
    let children = node.children();

    for (start, child) in children.iter().enumerate() {
        if is_list && let Some(found) = match_window(statements, children, start, ctx) {
            results.push(found);
        }
        find_windows(statements, child, ctx, results);
    }
}

fn match_window<'t>(
    statements: &[SyntaxNode],
    siblings: &'t [SyntaxNode],
    start: usize,
    ctx: MatchContext<'t>,
) -> Option<Match<'t>> {
    let mut binding = Binding::default();
    let end = SequenceMatcher::open_ended(statements, siblings, ctx).matches(
        start,
        0,
        &mut binding,
    )?;

    let window = siblings.get(start..end)?;
    let span = window.first()?.span().to(window.last()?.span());
    Some(Match::new(span, ctx.tree.text(span), binding))
}

fn unify<'t>(
    pattern: &SyntaxNode,
    node: &'t SyntaxNode,
    ctx: MatchContext<'t>,
    binding: &mut Binding<'t>,
) -> bool {
    match (pattern.kind(), node.kind()) {
        (NodeKind::Meta(tag), _) => bind_single(tag, node, ctx, binding),
        (NodeKind::Branch(expected), NodeKind::Branch(actual)) => {
            expected == actual && unify_children(pattern.children(), node.children(), ctx, binding)
        }
        (NodeKind::Name(expected), NodeKind::Name(actual))
        | (NodeKind::Variable(expected), NodeKind::Variable(actual))
        | (NodeKind::Str(expected), NodeKind::Str(actual))
        | (NodeKind::Int(expected), NodeKind::Int(actual))
        | (NodeKind::Float(expected), NodeKind::Float(actual))
        | (NodeKind::Token(expected), NodeKind::Token(actual)) => expected == actual,
        (
            NodeKind::Branch(_)
            | NodeKind::Name(_)
            | NodeKind::Variable(_)
            | NodeKind::Str(_)
            | NodeKind::Int(_)
            | NodeKind::Float(_)
            | NodeKind::Token(_),
            _,
        ) => false,
    }
}

fn unify_children<'t>(
    pattern: &[SyntaxNode],
    source: &'t [SyntaxNode],
    ctx: MatchContext<'t>,
    binding: &mut Binding<'t>,
) -> bool {
    if pattern.iter().any(SyntaxNode::is_variadic) {
        return SequenceMatcher::anchored(pattern, source, ctx)
            .matches(0, 0, binding)
            .is_some();
    }

    pattern.len() == source.len()
        && pattern
            .iter()
            .zip(source)
            .all(|(pattern_child, source_child)| unify(pattern_child, source_child, ctx, binding))
}

fn bind_single<'t>(
    tag: &MetaTag,
    node: &'t SyntaxNode,
    ctx: MatchContext<'t>,
    binding: &mut Binding<'t>,
) -> bool {
    match (tag.kind(), tag.name()) {
        (MetaKind::Anonymous, _) | (_, None) => true,
        (MetaKind::Named, Some(name)) => binding.bind(name, Bound::Single(ctx.bound_node(node))),
        (MetaKind::Variadic, Some(name)) => {
            binding.bind(name, ctx.bound_sequence(std::slice::from_ref(node)))
        }
    }
}

fn bind_sequence<'t>(
    tag: &MetaTag,
    nodes: &'t [SyntaxNode],
    ctx: MatchContext<'t>,
    binding: &mut Binding<'t>,
) -> bool {
    tag.name()
        .is_none_or(|name| binding.bind(name, ctx.bound_sequence(nodes)))
}

/// Backtracking matcher for element lists that contain variadics.
///
/// Each variadic tries the shortest run first. Bindings are cloned per
/// attempt, so a failed placement leaves no trace.
struct SequenceMatcher<'t, 'p> {
    pattern: &'p [SyntaxNode],
    source: &'t [SyntaxNode],
    ctx: MatchContext<'t>,
    /// Whether the pattern must consume the source list to its end.
    anchored: bool,
}

impl<'t, 'p> SequenceMatcher<'t, 'p> {
    const fn anchored(
        pattern: &'p [SyntaxNode],
        source: &'t [SyntaxNode],
        ctx: MatchContext<'t>,
    ) -> Self {
        Self {
            pattern,
            source,
            ctx,
            anchored: true,
        }
    }

    const fn open_ended(
        pattern: &'p [SyntaxNode],
        source: &'t [SyntaxNode],
        ctx: MatchContext<'t>,
    ) -> Self {
        Self {
            pattern,
            source,
            ctx,
            anchored: false,
        }
    }

    /// Returns the source index one past the last consumed element.
    fn matches(
        &self,
        source_idx: usize,
        pattern_idx: usize,
        binding: &mut Binding<'t>,
    ) -> Option<usize> {
        let Some(pattern_child) = self.pattern.get(pattern_idx) else {
            return (!self.anchored || source_idx == self.source.len()).then_some(source_idx);
        };

        match pattern_child.meta().filter(|tag| tag.is_variadic()) {
            Some(tag) => self.matches_variadic(source_idx, pattern_idx, tag, binding),
            None => self.matches_element(source_idx, pattern_idx, pattern_child, binding),
        }
    }

    fn matches_variadic(
        &self,
        source_idx: usize,
        pattern_idx: usize,
        tag: &MetaTag,
        binding: &mut Binding<'t>,
    ) -> Option<usize> {
        for end in source_idx..=self.source.len() {
            let Some(run) = self.source.get(source_idx..end) else {
                continue;
            };

            let mut trial = binding.clone();
            if !bind_sequence(tag, run, self.ctx, &mut trial) {
                continue;
            }

            if let Some(found) = self.matches(end, pattern_idx + 1, &mut trial) {
                *binding = trial;
                return Some(found);
            }
        }

        None
    }

    fn matches_element(
        &self,
        source_idx: usize,
        pattern_idx: usize,
        pattern_child: &SyntaxNode,
        binding: &mut Binding<'t>,
    ) -> Option<usize> {
        let source_child = self.source.get(source_idx)?;

        let mut trial = binding.clone();
        if !unify(pattern_child, source_child, self.ctx, &mut trial) {
            return None;
        }

        let found = self.matches(source_idx + 1, pattern_idx + 1, &mut trial)?;
        *binding = trial;
        Some(found)
    }
}
