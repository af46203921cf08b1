//! AST002: contract method names that differ from the canonical spelling
//! only in letter case.

use crate::context::ScanContext;
use crate::node::{Node, NodeKind, Span};
use crate::rules::{Diagnostic, Edit, Fix, Rule, RuleCode, Severity};
use crate::semantic::Visibility;

/// Well-known contract methods and their arity. A method matching one of
/// these case-insensitively but not exactly compiles fine and silently
/// fails to override anything.
const CONTRACT_METHODS: &[(&str, usize)] = &[
    ("hashCode", 0),
    ("toString", 0),
    ("equals", 1),
    ("clone", 0),
    ("finalize", 0),
];

/// Flags public methods whose name matches a contract method up to case
/// (`hashcode`, `tostring`, ...) with the contract arity. `hashcode(int x)`
/// is an ordinary method and passes.
pub struct MisspelledMethodRule;

impl MisspelledMethodRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MisspelledMethodRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for MisspelledMethodRule {
    fn code(&self) -> RuleCode {
        RuleCode::AST002
    }

    fn kinds(&self) -> Option<&'static [NodeKind]> {
        Some(&[NodeKind::MethodDecl])
    }

    fn check(&mut self, node: Node<'_>, ctx: &ScanContext<'_>) -> Option<Diagnostic> {
        let name = node.label()?;
        let (canonical, arity) = CONTRACT_METHODS
            .iter()
            .find(|(c, _)| name.eq_ignore_ascii_case(c) && name != *c)
            .copied()?;

        if ctx.method_param_count(node)? != arity {
            return None;
        }

        // Only public methods can be meant as overrides. An unresolved
        // declaration is a resolution gap: skip rather than guess.
        let decl = ctx.decl_of(node)?;
        if decl.visibility != Visibility::Public {
            return None;
        }

        let name_span = name_token_span(node, name)?;
        let fix = Fix::new(
            format!("rename to '{canonical}'"),
            vec![Edit::replace(node, name_span, canonical)],
        );

        Some(
            Diagnostic::new(
                self.code(),
                node,
                name_span,
                Severity::Warning,
                format!(
                    "method '{name}' looks like '{canonical}' but does not \
                     override it"
                ),
            )
            .with_fix(fix),
        )
    }
}

/// Locate the name token inside the declaration's text.
fn name_token_span(node: Node<'_>, name: &str) -> Option<Span> {
    let rel = node.text().find(name)?;
    let start = node.span().start + rel;
    Some(Span::new(start, start + name.len()))
}
