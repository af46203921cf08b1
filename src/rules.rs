//! Rule definitions and the diagnostic/fix data model.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::context::ScanContext;
use crate::node::{Node, NodeId, NodeKind, Span};

// ---------------------------------------------------------------------------
// Rule codes
// ---------------------------------------------------------------------------

/// Stable codes for the built-in rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleCode {
    /// AST001: `==`/`!=` on object-typed operands instead of `equals()`.
    AST001,
    /// AST002: miscased well-known contract method name (`hashcode`, ...).
    AST002,
    /// AST003: constant-true loop with no way to complete normally.
    AST003,
    /// AST004: `if` whose then and else branches are identical.
    AST004,
}

impl RuleCode {
    /// Parse a rule code from string (e.g. "AST001").
    pub fn parse_code(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "AST001" => Some(RuleCode::AST001),
            "AST002" => Some(RuleCode::AST002),
            "AST003" => Some(RuleCode::AST003),
            "AST004" => Some(RuleCode::AST004),
            _ => None,
        }
    }

    /// All available rule codes.
    pub fn all() -> &'static [RuleCode] {
        &[
            RuleCode::AST001,
            RuleCode::AST002,
            RuleCode::AST003,
            RuleCode::AST004,
        ]
    }

    /// Short kebab-case rule name.
    pub fn name(&self) -> &'static str {
        match self {
            RuleCode::AST001 => "object-equality",
            RuleCode::AST002 => "misspelled-contract-method",
            RuleCode::AST003 => "non-terminating-loop",
            RuleCode::AST004 => "identical-if-branches",
        }
    }

    /// Detailed description of what the rule checks.
    pub fn description(&self) -> &'static str {
        match self {
            RuleCode::AST001 => {
                "Detects == and != applied to operands whose static types are \
                 non-enum reference types. Identity comparison of objects is \
                 almost always a bug; the fix rewrites the comparison to \
                 equals(). Comparisons against the null literal and comparisons \
                 inside an equals() override itself are exempt."
            }
            RuleCode::AST002 => {
                "Detects public methods whose name matches a well-known contract \
                 method (hashCode, toString, equals, clone, finalize) in every \
                 way except letter case, with the matching parameter count. Such \
                 a method silently fails to override the contract method. The \
                 fix renames it to the canonical spelling."
            }
            RuleCode::AST003 => {
                "Detects loops whose condition is the constant true (or absent) \
                 and whose body contains no break binding to the loop, no \
                 return, and no throw. Such a loop can never complete normally. \
                 Break statements of nested loops do not count; nested class \
                 and method bodies are not searched."
            }
            RuleCode::AST004 => {
                "Detects if statements whose then and else branches are \
                 structurally identical, making the condition irrelevant. The \
                 fix collapses the statement to the then branch; review it when \
                 the condition has side effects."
            }
        }
    }

    /// Whether the rule can produce an automatic fix.
    pub fn is_fixable(&self) -> bool {
        !matches!(self, RuleCode::AST003)
    }

    /// String form of the code itself (e.g. `"AST001"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCode::AST001 => "AST001",
            RuleCode::AST002 => "AST002",
            RuleCode::AST003 => "AST003",
            RuleCode::AST004 => "AST004",
        }
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RuleCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Fixes
// ---------------------------------------------------------------------------

/// A single text edit against the tree's source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    /// Range to replace (zero-width for pure insertion).
    pub span: Span,
    /// Snapshot of the text currently occupying `span`. The fix applier
    /// re-checks this before applying; a mismatch means the fix was
    /// recorded against an older tree revision and is rejected as stale.
    pub original: String,
    /// Replacement text (empty for deletion).
    pub new_text: String,
}

impl Edit {
    /// Build a replacement edit for `span`, snapshotting the current text
    /// from the node's tree.
    pub fn replace(node: Node<'_>, span: Span, new_text: impl Into<String>) -> Self {
        Self {
            span,
            original: node.tree().text(span).to_string(),
            new_text: new_text.into(),
        }
    }
}

/// A suggested fix: one or more edits plus a description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fix {
    /// Description of what the fix does.
    pub message: String,
    /// The edits to apply, in source order.
    pub edits: Vec<Edit>,
}

impl Fix {
    pub fn new(message: impl Into<String>, edits: Vec<Edit>) -> Self {
        Self {
            message: message.into(),
            edits,
        }
    }

    /// Source position of the fix's first edit; fixes are applied in this
    /// order.
    pub fn start(&self) -> usize {
        self.edits.iter().map(|e| e.span.start).min().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// One finding produced by a rule during a scan.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// The rule that produced this diagnostic.
    #[serde(rename = "rule_id")]
    pub rule: RuleCode,
    /// Identity of the node reported against (used for deduplication).
    #[serde(skip)]
    pub node: NodeId,
    /// Highlighted source range. Often narrower than the node's own span
    /// (the operator token rather than the whole expression).
    #[serde(rename = "node_span")]
    pub span: Span,
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Optional fix suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

impl Diagnostic {
    pub fn new(
        rule: RuleCode,
        node: Node<'_>,
        span: Span,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule,
            node: node.id(),
            span,
            severity,
            message: message.into(),
            fix: None,
        }
    }

    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }
}

// ---------------------------------------------------------------------------
// Rule trait
// ---------------------------------------------------------------------------

/// A scan rule: a flat per-node predicate, not a visitor subclass.
///
/// Rules are invoked by the engine during one shared pre-order traversal.
/// `check` must not mutate the tree -- any change a rule wants goes into the
/// returned [`Fix`] and happens later through the fix applier. Rules may
/// keep local mutable state across the nodes of one traversal; the engine
/// calls [`Rule::reset`] before each tree so that state never leaks across
/// files.
pub trait Rule: Send {
    /// The rule's code.
    fn code(&self) -> RuleCode;

    /// Node kinds this rule wants to see. `None` means every node. The
    /// engine dispatches only to interested rules, so declaring kinds is
    /// the cheap way to keep a rule off the hot path.
    fn kinds(&self) -> Option<&'static [NodeKind]> {
        None
    }

    /// Reset per-traversal state. Called once before each tree.
    fn reset(&mut self) {}

    /// Whether descent into `node`'s subtree should be suppressed for this
    /// rule. Checked after `check` on the same node; the default is full
    /// descent.
    fn prune(&self, _node: Node<'_>, _ctx: &ScanContext<'_>) -> bool {
        false
    }

    /// Inspect one node. Read-only on the tree; returns a diagnostic when
    /// the pattern matches.
    fn check(&mut self, node: Node<'_>, ctx: &ScanContext<'_>) -> Option<Diagnostic>;
}
