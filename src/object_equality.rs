//! AST001: object identity comparison via `==`/`!=` instead of `equals()`.

use crate::context::ScanContext;
use crate::node::{Node, NodeKind, Span};
use crate::rules::{Diagnostic, Edit, Fix, Rule, RuleCode, Severity};
use crate::semantic::TypeCategory;

/// Flags `==` and `!=` where both operand types resolve to non-enum
/// reference types, arrays included. Enum constants are singletons
/// (identity comparison is the idiom), primitives compare by value, and
/// `== null` is the only way to null-check, so those all pass. Comparisons
/// inside an `equals()` override pass too: reference equality there is the
/// standard self-check. The `equals()` rewrite is offered only for plain
/// object operands; on arrays `equals()` is identity as well, so an array
/// comparison gets the diagnostic without a fix.
pub struct ObjectEqualityRule;

impl ObjectEqualityRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ObjectEqualityRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for ObjectEqualityRule {
    fn code(&self) -> RuleCode {
        RuleCode::AST001
    }

    fn kinds(&self) -> Option<&'static [NodeKind]> {
        Some(&[NodeKind::BinaryExpr])
    }

    fn check(&mut self, node: Node<'_>, ctx: &ScanContext<'_>) -> Option<Diagnostic> {
        let op = node.label()?;
        if op != "==" && op != "!=" {
            return None;
        }
        let lhs = node.child(0)?;
        let rhs = node.child(1)?;

        if lhs.is_literal("null") || rhs.is_literal("null") {
            return None;
        }

        // Resolution gap on either side: cannot determine, skip.
        let lhs_cat = ctx.category_of(lhs)?;
        let rhs_cat = ctx.category_of(rhs)?;
        let sem = ctx.semantics();
        if !sem.is_object(lhs.type_id()?) || !sem.is_object(rhs.type_id()?) {
            return None;
        }

        if ctx.in_equals_method() {
            return None;
        }

        let op_span = operator_span(node, lhs, rhs, op);
        let lhs_name = ctx.type_of(lhs).map(|t| t.name.as_str()).unwrap_or("?");
        let rhs_name = ctx.type_of(rhs).map(|t| t.name.as_str()).unwrap_or("?");

        let diagnostic = Diagnostic::new(
            self.code(),
            node,
            op_span,
            Severity::Warning,
            format!(
                "objects of type '{lhs_name}' and '{rhs_name}' are compared \
                 with '{op}', not equals()"
            ),
        );

        // Array.equals() compares identity too, so there is no textual
        // rewrite worth offering for array operands.
        if lhs_cat != TypeCategory::Object || rhs_cat != TypeCategory::Object {
            return Some(diagnostic);
        }

        let replacement = if op == "==" {
            format!("{}.equals({})", lhs.text(), rhs.text())
        } else {
            format!("!{}.equals({})", lhs.text(), rhs.text())
        };
        let fix = Fix::new(
            format!("replace '{op}' with equals()"),
            vec![Edit::replace(node, node.span(), replacement)],
        );
        Some(diagnostic.with_fix(fix))
    }
}

/// Span of the operator token: the model stores node spans only, so the
/// token is located textually between the operands.
fn operator_span(node: Node<'_>, lhs: Node<'_>, rhs: Node<'_>, op: &str) -> Span {
    let between_start = lhs.span().end;
    let between = node.tree().text(Span::new(between_start, rhs.span().start));
    match between.find(op) {
        Some(rel) => Span::new(between_start + rel, between_start + rel + op.len()),
        None => node.span(),
    }
}
