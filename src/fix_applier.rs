//! Batch fix application with conflict and staleness rejection.
//!
//! Fixes are applied against the tree's source text, in source order
//! (position of each fix's first edit). A fix whose edits overlap an
//! already-accepted edit is rejected as a conflict -- first in source order
//! wins, which keeps batch application deterministic. A fix whose recorded
//! original text no longer matches the source is rejected as stale: it was
//! produced against a tree revision that no longer exists.
//!
//! The applier produces new source text; re-parsing and re-resolving it is
//! the external parser's job. Applying fixes is not safe against a
//! concurrent scan of the same tree -- callers serialize the two.

use serde::Serialize;
use tracing::debug;

use crate::node::{Span, SyntaxTree};
use crate::rules::{Edit, Fix};

/// Terminal state of one proposed fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixStatus {
    Applied,
    /// An edit overlaps one accepted from an earlier fix in the batch.
    RejectedConflict,
    /// The text the fix recorded is no longer what the tree contains.
    RejectedStale,
}

/// Per-fix application result, in input batch order.
#[derive(Debug, Clone, Serialize)]
pub struct FixResult {
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip)]
    pub status: FixStatus,
}

impl FixResult {
    fn applied() -> Self {
        Self {
            applied: true,
            reason: None,
            status: FixStatus::Applied,
        }
    }

    fn rejected(status: FixStatus, reason: impl Into<String>) -> Self {
        Self {
            applied: false,
            reason: Some(reason.into()),
            status,
        }
    }
}

/// Apply a batch of fixes to `tree`'s source.
///
/// Returns the rewritten source plus one [`FixResult`] per input fix, in
/// input order. The input order does not affect which fixes win: candidates
/// are considered in source order.
pub fn apply_fixes(tree: &SyntaxTree, fixes: &[Fix]) -> (String, Vec<FixResult>) {
    let source = tree.source();

    // Consider fixes in source order; ties keep batch order. Every index
    // appears exactly once, so every result slot below gets written.
    let mut order: Vec<usize> = (0..fixes.len()).collect();
    order.sort_by_key(|&i| fixes[i].start());

    let mut results: Vec<FixResult> = Vec::new();
    results.resize_with(fixes.len(), FixResult::applied);

    let mut accepted: Vec<Edit> = Vec::new();
    let mut accepted_spans: Vec<Span> = Vec::new();

    for i in order {
        let fix = &fixes[i];
        results[i] = evaluate(fix, source, &accepted_spans);
        if results[i].applied {
            for edit in &fix.edits {
                accepted_spans.push(edit.span);
                accepted.push(edit.clone());
            }
        }
    }

    debug!(
        total = fixes.len(),
        applied = accepted_spans.len(),
        "fix batch evaluated"
    );

    let new_source = splice(source, accepted);
    (new_source, results)
}

/// Decide one fix against the current source and already-accepted spans.
fn evaluate(fix: &Fix, source: &str, accepted: &[Span]) -> FixResult {
    if fix.edits.is_empty() {
        return FixResult::rejected(FixStatus::RejectedStale, "fix carries no edits");
    }

    // Edits inside one fix must not overlap each other either.
    for (a, b) in pairs(&fix.edits) {
        if a.span.overlaps(b.span) {
            return FixResult::rejected(
                FixStatus::RejectedConflict,
                format!("edits {} and {} within the fix overlap", a.span, b.span),
            );
        }
    }

    for edit in &fix.edits {
        if edit.span.end > source.len() {
            return FixResult::rejected(
                FixStatus::RejectedStale,
                format!("edit span {} is beyond the source end", edit.span),
            );
        }
        // A span landing inside a multibyte character can only come from a
        // fix recorded against different text.
        if !source.is_char_boundary(edit.span.start) || !source.is_char_boundary(edit.span.end) {
            return FixResult::rejected(
                FixStatus::RejectedStale,
                format!("edit span {} splits a UTF-8 character", edit.span),
            );
        }
        let current = &source[edit.span.start..edit.span.end];
        if current != edit.original {
            return FixResult::rejected(
                FixStatus::RejectedStale,
                format!(
                    "expected {:?} at {}, found {:?}",
                    edit.original, edit.span, current
                ),
            );
        }
        if let Some(clash) = accepted.iter().find(|s| s.overlaps(edit.span)) {
            return FixResult::rejected(
                FixStatus::RejectedConflict,
                format!("edit span {} overlaps an applied fix at {clash}", edit.span),
            );
        }
    }

    FixResult::applied()
}

fn pairs(edits: &[Edit]) -> impl Iterator<Item = (&Edit, &Edit)> {
    edits
        .iter()
        .enumerate()
        .flat_map(move |(i, a)| edits[i + 1..].iter().map(move |b| (a, b)))
}

/// Splice accepted edits into the source, highest offset first so earlier
/// offsets stay valid.
fn splice(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by(|a, b| b.span.start.cmp(&a.span.start));
    let mut out = source.to_string();
    for edit in edits {
        out.replace_range(edit.span.start..edit.span.end, &edit.new_text);
    }
    out
}
