//! The scan engine: one shared pre-order traversal dispatching to rules.
//!
//! Scanning a single tree is single-threaded and synchronous; traversal
//! order is fixed, so repeated scans of the same tree with the same rules
//! produce identical ordered output. Independent trees can be scanned in
//! parallel via [`scan_trees`], each worker owning its own rule set and
//! diagnostic collection and sharing only the read-only semantic index.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::{debug, warn};

use crate::context::ScanContext;
use crate::node::{Node, NodeId, Span, SyntaxTree};
use crate::reporter::DiagnosticReporter;
use crate::rules::{Diagnostic, Rule, RuleCode};
use crate::semantic::SemanticIndex;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a scan. Passed in explicitly; there is no global
/// registry or settings singleton.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Rules to enable (if `None`, all registered rules are enabled).
    pub select: Option<FxHashSet<RuleCode>>,
    /// Rules to disable.
    pub ignore: FxHashSet<RuleCode>,
    /// Stop collecting once this many diagnostics were reported.
    /// `None` means unlimited.
    pub max_diagnostics: Option<usize>,
}

impl ScanConfig {
    /// Build a configuration from comma-separated code lists (the shape a
    /// host passes through from its own option surface).
    ///
    /// Unknown codes are logged and skipped. If `select` is given but
    /// yields zero valid codes, [`ScanConfig::has_empty_selection`] returns
    /// true and the engine skips the traversal entirely.
    pub fn new(select: Option<&str>, ignore: Option<&str>) -> Self {
        let select_set = select.map(Self::parse_codes);
        if let Some(ref set) = select_set {
            if set.is_empty() {
                warn!("no valid rules selected, nothing will be checked");
            }
        }
        let ignore_set = ignore.map(Self::parse_codes).unwrap_or_default();

        Self {
            select: select_set,
            ignore: ignore_set,
            max_diagnostics: None,
        }
    }

    fn parse_codes(list: &str) -> FxHashSet<RuleCode> {
        let mut valid = FxHashSet::default();
        for raw in list.split(',') {
            let code = raw.trim();
            if code.is_empty() {
                continue;
            }
            match RuleCode::parse_code(code) {
                Some(rc) => {
                    valid.insert(rc);
                }
                None => warn!("unknown rule code '{code}' (ignored)"),
            }
        }
        valid
    }

    /// Builder: cap the number of collected diagnostics.
    pub fn with_max_diagnostics(mut self, max: Option<usize>) -> Self {
        self.max_diagnostics = max;
        self
    }

    /// True when `select` was provided but nothing valid was in it.
    pub fn has_empty_selection(&self) -> bool {
        matches!(&self.select, Some(set) if set.is_empty())
    }

    /// Whether a rule participates in the scan.
    pub fn is_rule_enabled(&self, rule: RuleCode) -> bool {
        if self.ignore.contains(&rule) {
            return false;
        }
        match &self.select {
            Some(selected) => selected.contains(&rule),
            None => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Cooperative cancellation handle, checked between node visits.
///
/// Cloning shares the flag, so a host can hand one clone to a background
/// scan and keep the other on its UI thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Scan results
// ---------------------------------------------------------------------------

/// Record of a rule panicking on a node. Kept separate from rule-produced
/// diagnostics: a fault is a bug in a rule, not a finding about the code.
#[derive(Debug, Clone, Serialize)]
pub struct RuleFault {
    pub rule: RuleCode,
    #[serde(skip)]
    pub node: NodeId,
    pub span: Span,
    pub detail: String,
}

/// The product of a completed scan.
#[derive(Debug, Default, Serialize)]
pub struct ScanReport {
    /// Rule findings in source-span order, deduplicated per (node, rule).
    pub diagnostics: Vec<Diagnostic>,
    /// Rules that faulted during the traversal (skipped, not fatal).
    pub faults: Vec<RuleFault>,
}

/// Outcome of a scan: either it ran to completion or it was cancelled.
/// A cancelled scan discards its partial diagnostics -- a partial list is
/// never silently surfaced as complete.
#[derive(Debug)]
pub enum ScanOutcome {
    Completed(ScanReport),
    Cancelled,
}

impl ScanOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScanOutcome::Cancelled)
    }

    /// The report of a completed scan, `None` when cancelled.
    pub fn report(&self) -> Option<&ScanReport> {
        match self {
            ScanOutcome::Completed(report) => Some(report),
            ScanOutcome::Cancelled => None,
        }
    }

    pub fn into_report(self) -> Option<ScanReport> {
        match self {
            ScanOutcome::Completed(report) => Some(report),
            ScanOutcome::Cancelled => None,
        }
    }
}

/// Why a traversal stopped before visiting every node.
enum Stop {
    Cancelled,
    /// The `max_diagnostics` cap was hit; the partial report is still valid.
    Capped,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The scan engine: a configured set of rules plus the traversal driver.
pub struct ScanEngine {
    config: ScanConfig,
    rules: Vec<Box<dyn Rule>>,
}

impl ScanEngine {
    /// Create an engine from an explicit rule list. Rules disabled by the
    /// configuration are dropped up front.
    pub fn new(config: ScanConfig, rules: Vec<Box<dyn Rule>>) -> Self {
        let rules: Vec<Box<dyn Rule>> = rules
            .into_iter()
            .filter(|r| config.is_rule_enabled(r.code()))
            .collect();
        Self { config, rules }
    }

    /// Engine with the full built-in rule set.
    pub fn with_builtin_rules(config: ScanConfig) -> Self {
        Self::new(config, crate::builtin_rules())
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Scan one tree to completion.
    pub fn scan(&mut self, tree: &SyntaxTree, semantics: &SemanticIndex) -> ScanOutcome {
        self.scan_cancellable(tree, semantics, &CancelToken::new())
    }

    /// Scan one tree, checking `token` between node visits. On
    /// cancellation the partial diagnostic list is discarded.
    pub fn scan_cancellable(
        &mut self,
        tree: &SyntaxTree,
        semantics: &SemanticIndex,
        token: &CancelToken,
    ) -> ScanOutcome {
        if self.config.has_empty_selection() {
            warn!("empty rule selection, skipping traversal");
            return ScanOutcome::Completed(ScanReport::default());
        }

        debug!(
            nodes = tree.len(),
            rules = self.rules.len(),
            "starting scan"
        );

        for rule in &mut self.rules {
            rule.reset();
        }

        let mut ctx = ScanContext::new(tree, semantics);
        let mut reporter = DiagnosticReporter::new();
        let mut faults = Vec::new();
        // Per-rule descent suppression: Some(n) while inside the subtree of
        // the node n the rule asked to prune.
        let mut suppressed: Vec<Option<NodeId>> = vec![None; self.rules.len()];
        let cap = self.config.max_diagnostics.unwrap_or(usize::MAX);

        let stopped = self.visit(
            tree.root(),
            &mut ctx,
            &mut reporter,
            &mut faults,
            &mut suppressed,
            token,
            cap,
        );

        match stopped {
            Err(Stop::Cancelled) => {
                debug!(collected = reporter.len(), "scan cancelled, discarding");
                ScanOutcome::Cancelled
            }
            Ok(()) | Err(Stop::Capped) => {
                let diagnostics = reporter.finalize();
                debug!(
                    diagnostics = diagnostics.len(),
                    faults = faults.len(),
                    "scan complete"
                );
                ScanOutcome::Completed(ScanReport {
                    diagnostics,
                    faults,
                })
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn visit(
        &mut self,
        node: Node<'_>,
        ctx: &mut ScanContext<'_>,
        reporter: &mut DiagnosticReporter,
        faults: &mut Vec<RuleFault>,
        suppressed: &mut Vec<Option<NodeId>>,
        token: &CancelToken,
        cap: usize,
    ) -> Result<(), Stop> {
        if token.is_cancelled() {
            return Err(Stop::Cancelled);
        }

        let kind = node.kind();
        for i in 0..self.rules.len() {
            if suppressed[i].is_some() {
                continue;
            }
            // Kind dispatch: the declared-kinds slice is tiny, a membership
            // test beats any map here.
            if let Some(kinds) = self.rules[i].kinds() {
                if !kinds.contains(&kind) {
                    continue;
                }
            }

            let rule = &mut self.rules[i];
            match catch_unwind(AssertUnwindSafe(|| rule.check(node, ctx))) {
                Ok(Some(diagnostic)) => {
                    if reporter.report(diagnostic) && reporter.len() >= cap {
                        debug!(cap, "diagnostic cap reached, stopping traversal");
                        return Err(Stop::Capped);
                    }
                }
                Ok(None) => {}
                Err(payload) => {
                    let detail = panic_message(payload);
                    let fault = RuleFault {
                        rule: self.rules[i].code(),
                        node: node.id(),
                        span: node.span(),
                        detail,
                    };
                    warn!(
                        rule = %fault.rule,
                        node = %fault.node,
                        detail = %fault.detail,
                        "rule faulted, skipping node for that rule"
                    );
                    faults.push(fault);
                }
            }

            if self.rules[i].prune(node, ctx) {
                suppressed[i] = Some(node.id());
            }
        }

        ctx.push(node.id());
        let result = (|| {
            for child in node.children() {
                self.visit(child, ctx, reporter, faults, suppressed, token, cap)?;
            }
            Ok(())
        })();
        ctx.pop();

        for slot in suppressed.iter_mut() {
            if *slot == Some(node.id()) {
                *slot = None;
            }
        }

        result
    }
}

/// Best-effort extraction of a panic payload's message.
fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "rule panicked".to_string()
    }
}

// ---------------------------------------------------------------------------
// Multi-tree scanning
// ---------------------------------------------------------------------------

/// Scan independent trees in parallel.
///
/// Each worker builds its own rule set via `make_rules` (rules carry
/// per-traversal state and are not shared), owns its own diagnostic
/// collection, and shares only the read-only `semantics` index. One
/// `token` covers the whole batch; cancelled workers yield
/// [`ScanOutcome::Cancelled`] individually.
///
/// Output order matches input order regardless of scheduling.
pub fn scan_trees<F>(
    trees: &[SyntaxTree],
    semantics: &SemanticIndex,
    config: &ScanConfig,
    token: &CancelToken,
    make_rules: F,
) -> Vec<ScanOutcome>
where
    F: Fn() -> Vec<Box<dyn Rule>> + Sync,
{
    debug!(trees = trees.len(), "scanning tree batch");
    trees
        .par_iter()
        .map(|tree| {
            let mut engine = ScanEngine::new(config.clone(), make_rules());
            engine.scan_cancellable(tree, semantics, token)
        })
        .collect()
}
