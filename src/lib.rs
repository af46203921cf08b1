//! Source pattern scanner over syntax trees.
//!
//! This crate walks arena-backed syntax trees with a set of pattern
//! rules, collects deduplicated and ordered diagnostics, and applies
//! the textual fixes rules attach to them. Rules query a semantic
//! index for declaration and type facts; where resolution has gaps the
//! rules stay silent rather than guess.

pub mod context;
pub mod engine;
pub mod error;
pub mod fix_applier;
pub mod node;
pub mod output;
pub mod reporter;
pub mod rules;
pub mod semantic;

mod identical_branches;
mod infinite_loop;
mod misspelled_method;
mod object_equality;

pub use context::ScanContext;
pub use engine::{
    CancelToken, RuleFault, ScanConfig, ScanEngine, ScanOutcome, ScanReport, scan_trees,
};
pub use error::{Result, ScanError};
pub use fix_applier::{FixResult, FixStatus, apply_fixes};
pub use identical_branches::IdenticalBranchesRule;
pub use infinite_loop::InfiniteLoopRule;
pub use misspelled_method::MisspelledMethodRule;
pub use node::{Node, NodeId, NodeKind, Span, SyntaxTree, TreeBuilder};
pub use object_equality::ObjectEqualityRule;
pub use output::{OutputFormat, render};
pub use reporter::DiagnosticReporter;
pub use rules::{Diagnostic, Edit, Fix, Rule, RuleCode, Severity};
pub use semantic::{
    DeclId, DeclKind, Declaration, SemanticIndex, TypeCategory, TypeId, TypeInfo, Visibility,
};

/// Fresh instances of every built-in rule. `ScanConfig` filtering
/// happens in the engine, so this always returns the full set.
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(ObjectEqualityRule::new()),
        Box::new(MisspelledMethodRule::new()),
        Box::new(InfiniteLoopRule::new()),
        Box::new(IdenticalBranchesRule::new()),
    ]
}
