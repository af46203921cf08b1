//! AST003: loops that can never complete normally.

use crate::context::ScanContext;
use crate::node::{Node, NodeKind, Span};
use crate::rules::{Diagnostic, Rule, RuleCode, Severity};

const EXPRESSION_KINDS: &[NodeKind] = &[
    NodeKind::BinaryExpr,
    NodeKind::UnaryExpr,
    NodeKind::AssignmentExpr,
    NodeKind::MethodCall,
    NodeKind::FieldAccess,
    NodeKind::NameRef,
    NodeKind::Literal,
];

/// Flags loops whose condition is the constant `true` -- or absent, as in
/// `for (;;)` -- when the body offers no way out: no `break` binding to
/// this loop, no `return`, no `throw`.
///
/// A `break` inside a nested loop exits that loop, not this one, so it
/// does not count; `return`/`throw` exit regardless of loop nesting.
/// Nested class and method bodies (anonymous classes, lambdas) run on
/// their own call stacks and are not searched at all. No fix is offered:
/// deliberate server loops look exactly like this, only the author knows.
pub struct InfiniteLoopRule;

impl InfiniteLoopRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InfiniteLoopRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for InfiniteLoopRule {
    fn code(&self) -> RuleCode {
        RuleCode::AST003
    }

    fn kinds(&self) -> Option<&'static [NodeKind]> {
        Some(&[NodeKind::WhileLoop, NodeKind::DoWhileLoop, NodeKind::ForLoop])
    }

    fn check(&mut self, node: Node<'_>, _ctx: &ScanContext<'_>) -> Option<Diagnostic> {
        let always_true = match node.kind() {
            NodeKind::ForLoop => for_condition_always_true(node),
            _ => node
                .children()
                .find(|c| EXPRESSION_KINDS.contains(&c.kind()))
                .is_some_and(|c| c.is_literal("true")),
        };
        if !always_true {
            return None;
        }

        let body = node.child_of_kind(NodeKind::Block)?;
        if subtree_escapes(body, false) {
            return None;
        }

        Some(Diagnostic::new(
            self.code(),
            node,
            keyword_span(node),
            Severity::Warning,
            "loop condition is always true and the body cannot exit the loop",
        ))
    }
}

/// Whether a for loop's condition clause is the constant `true` or absent.
///
/// The init and update clauses are expressions too, so "first expression
/// child" cannot identify the condition. The clauses are separated by the
/// header's two semicolons: the condition is the child whose span lies
/// between them, and a blank region means `for (;;)`. An enhanced for
/// (`for (x : xs)`) has no semicolons and is never constant-true.
fn for_condition_always_true(node: Node<'_>) -> bool {
    let text = node.text();
    let Some(open) = text.find('(') else {
        return false;
    };
    let Some(first) = text[open..].find(';').map(|i| i + open) else {
        return false;
    };
    let Some(second) = text[first + 1..].find(';').map(|i| i + first + 1) else {
        return false;
    };

    let start = node.span().start;
    let region = Span::new(start + first + 1, start + second);
    let condition = node.children().find(|c| region.contains(c.span()));
    match condition {
        Some(cond) => cond.is_literal("true"),
        None => text[first + 1..second].trim().is_empty(),
    }
}

/// Whether anything under `node` can leave the enclosing loop.
/// `in_nested_loop` is true once we crossed into an inner loop, where
/// `break` binds to that inner loop instead.
fn subtree_escapes(node: Node<'_>, in_nested_loop: bool) -> bool {
    for child in node.children() {
        match child.kind() {
            NodeKind::ReturnStatement | NodeKind::ThrowStatement => return true,
            NodeKind::BreakStatement if !in_nested_loop => return true,
            NodeKind::BreakStatement | NodeKind::ContinueStatement => {}
            // Separate execution contexts: their control flow is their own.
            NodeKind::ClassDecl | NodeKind::MethodDecl => {}
            kind if kind.is_loop() => {
                if subtree_escapes(child, true) {
                    return true;
                }
            }
            _ => {
                if subtree_escapes(child, in_nested_loop) {
                    return true;
                }
            }
        }
    }
    false
}

/// Span of the loop keyword, falling back to the whole node when the
/// source does not start with one (unusual trivia layouts).
fn keyword_span(node: Node<'_>) -> Span {
    let keyword = match node.kind() {
        NodeKind::WhileLoop => "while",
        NodeKind::DoWhileLoop => "do",
        _ => "for",
    };
    let start = node.span().start;
    if node.text().starts_with(keyword) {
        Span::new(start, start + keyword.len())
    } else {
        node.span()
    }
}
