//! Ordered diagnostic collection with per-(node, rule) deduplication.

use rustc_hash::FxHashSet;

use crate::node::NodeId;
use crate::rules::{Diagnostic, RuleCode};

/// Collects diagnostics during one traversal.
///
/// Insertion order is traversal order. A pre-order walk of a tree already
/// yields source order, but `finalize` stably sorts by span start anyway:
/// resolved references can form graph-like shapes where two traversal paths
/// reach the same underlying entity, and the output contract promises
/// span-sorted, deduplicated diagnostics regardless.
#[derive(Debug, Default)]
pub struct DiagnosticReporter {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<(NodeId, RuleCode)>,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic. Returns `false` (and drops it) when the same
    /// rule already reported against the same node.
    pub fn report(&mut self, diagnostic: Diagnostic) -> bool {
        if !self.seen.insert((diagnostic.node, diagnostic.rule)) {
            return false;
        }
        self.diagnostics.push(diagnostic);
        true
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Finish the collection: stable sort by span start, ties keep
    /// traversal order.
    pub fn finalize(mut self) -> Vec<Diagnostic> {
        self.diagnostics
            .sort_by_key(|d| d.span.start);
        self.diagnostics
    }
}
