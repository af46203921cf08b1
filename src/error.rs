//! Error types for the scanner and fix applier.
//!
//! Most failure modes in this crate are deliberately *not* errors:
//!
//! - A rule that panics on an unexpected tree shape is caught per node and
//!   recorded as a [`RuleFault`](crate::engine::RuleFault) on the scan
//!   report, so one buggy rule cannot block the others.
//! - A node missing resolved type/declaration info is a resolution gap;
//!   rules treat it as "cannot determine" and skip.
//! - Overlapping or stale fixes are rejected per fix and reported as
//!   [`FixResult`](crate::fix_applier::FixResult) data, never as an `Err`.
//! - Cancellation is a distinct scan outcome, not an error.
//!
//! What remains is construction-time validation: a tree handed to the
//! scanner must uphold the structural invariants, and violating them is a
//! caller bug surfaced as [`ScanError::MalformedTree`].

use thiserror::Error;

/// Errors that can occur while building trees or rendering output.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The tree violates a structural invariant (dangling parent link,
    /// child spans outside the parent span, multiple roots, ...).
    #[error("malformed tree: {0}")]
    MalformedTree(String),

    /// A span refers to positions outside the tree's source text.
    #[error("span {start}..{end} out of bounds for source of length {len}")]
    SpanOutOfBounds {
        start: usize,
        end: usize,
        len: usize,
    },

    /// JSON serialization of a scan report failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
