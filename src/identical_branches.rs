//! AST004: `if`/`else` with structurally identical branches.

use crate::context::ScanContext;
use crate::node::{Node, NodeKind, Span};
use crate::rules::{Diagnostic, Edit, Fix, Rule, RuleCode, Severity};

/// Flags `if` statements where the then and else branches are the same
/// subtree shape for shape: the condition decides nothing. The fix keeps
/// one copy of the branch, dropping the condition, so it is only safe
/// when the condition has no side effects; the message says so.
pub struct IdenticalBranchesRule;

impl IdenticalBranchesRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IdenticalBranchesRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for IdenticalBranchesRule {
    fn code(&self) -> RuleCode {
        RuleCode::AST004
    }

    fn kinds(&self) -> Option<&'static [NodeKind]> {
        Some(&[NodeKind::IfStatement])
    }

    fn check(&mut self, node: Node<'_>, _ctx: &ScanContext<'_>) -> Option<Diagnostic> {
        // Children convention: condition, then-branch, else-branch.
        if node.child_count() != 3 {
            return None;
        }
        let then_branch = node.child(1)?;
        let else_branch = node.child(2)?;
        if !same_shape(then_branch, else_branch) {
            return None;
        }

        let fix = Fix::new(
            "replace the if statement with its then branch",
            vec![Edit::replace(node, node.span(), then_branch.text())],
        );
        Some(
            Diagnostic::new(
                self.code(),
                node,
                keyword_span(node),
                Severity::Warning,
                "both branches of this if statement are identical; \
                 the condition only matters if it has side effects",
            )
            .with_fix(fix),
        )
    }
}

/// Structural equality: kind, label, and children pairwise. Spans are
/// positions, not content, and are ignored.
fn same_shape(a: Node<'_>, b: Node<'_>) -> bool {
    if a.kind() != b.kind() || a.label() != b.label() || a.child_count() != b.child_count() {
        return false;
    }
    a.children().zip(b.children()).all(|(x, y)| same_shape(x, y))
}

fn keyword_span(node: Node<'_>) -> Span {
    let start = node.span().start;
    if node.text().starts_with("if") {
        Span::new(start, start + 2)
    } else {
        node.span()
    }
}
