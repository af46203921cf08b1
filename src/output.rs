//! Rendering of scan reports for a consuming CLI or UI layer.
//!
//! Two formats: human-readable text (line:col positions computed from the
//! tree's source) and machine-readable JSON following the diagnostic record
//! contract `{rule_id, node_span, message, severity, fix}`.

use std::fmt::Write as _;

use crate::engine::ScanReport;
use crate::error::Result;
use crate::node::SyntaxTree;

/// Output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// 1-indexed line and column of a byte offset in `source`.
///
/// Columns count characters, not bytes, so positions stay correct for
/// multibyte UTF-8 content.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.bytes().filter(|&b| b == b'\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |p| p + 1);
    let col = before[line_start..].chars().count() + 1;
    (line, col)
}

/// Render a report in the requested format.
pub fn render(tree: &SyntaxTree, report: &ScanReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(tree, report)),
        OutputFormat::Json => render_json(report),
    }
}

/// Human-readable rendering, one line per diagnostic plus fix previews.
pub fn render_text(tree: &SyntaxTree, report: &ScanReport) -> String {
    let mut out = String::new();
    let source = tree.source();

    for diag in &report.diagnostics {
        let (line, col) = line_col(source, diag.span.start);
        let _ = writeln!(
            out,
            "{}:{}: {}[{}] {}: {}",
            line,
            col,
            diag.severity,
            diag.rule,
            diag.rule.name(),
            diag.message
        );
        if let Some(ref fix) = diag.fix {
            let _ = writeln!(out, "  fix: {}", fix.message);
            for edit in &fix.edits {
                let _ = writeln!(out, "    - {:?}", edit.original);
                let _ = writeln!(out, "    + {:?}", edit.new_text);
            }
        }
    }

    for fault in &report.faults {
        let (line, col) = line_col(source, fault.span.start);
        let _ = writeln!(
            out,
            "{}:{}: scan-error[{}]: rule faulted: {}",
            line, col, fault.rule, fault.detail
        );
    }

    if report.diagnostics.is_empty() && report.faults.is_empty() {
        out.push_str("no issues found\n");
    }
    out
}

/// JSON rendering of the full report.
pub fn render_json(report: &ScanReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeKind, Span, TreeBuilder};
    use crate::rules::{Diagnostic, Edit, Fix, RuleCode, Severity};

    #[test]
    fn line_col_basics() {
        let src = "ab\ncd\nef";
        assert_eq!(line_col(src, 0), (1, 1));
        assert_eq!(line_col(src, 1), (1, 2));
        assert_eq!(line_col(src, 3), (2, 1));
        assert_eq!(line_col(src, 7), (3, 2));
        // Past the end clamps to the last position.
        assert_eq!(line_col(src, 100), (3, 3));
    }

    #[test]
    fn line_col_counts_chars_not_bytes() {
        let src = "héllo\nx";
        // 'é' is two bytes; the byte offset of 'x' is 7.
        assert_eq!(line_col(src, 7), (2, 1));
    }

    fn sample() -> (SyntaxTree, ScanReport) {
        let src = "a == b";
        let mut b = TreeBuilder::new(src);
        let root = b.root(NodeKind::CompilationUnit, Span::new(0, src.len()));
        let cmp = b.push(root, NodeKind::BinaryExpr, Span::new(0, 6));
        b.label(cmp, "==");
        let tree = b.finish().unwrap();

        let node = tree.node(cmp);
        let diag = Diagnostic::new(
            RuleCode::AST001,
            node,
            Span::new(2, 4),
            Severity::Warning,
            "object comparison via ==",
        )
        .with_fix(Fix::new(
            "replace with equals()",
            vec![Edit::replace(node, Span::new(0, 6), "a.equals(b)")],
        ));

        let report = ScanReport {
            diagnostics: vec![diag],
            faults: vec![],
        };
        (tree, report)
    }

    #[test]
    fn text_rendering_includes_position_rule_and_fix() {
        let (tree, report) = sample();
        let text = render_text(&tree, &report);
        assert!(text.contains("1:3: warning[AST001] object-equality"));
        assert!(text.contains("fix: replace with equals()"));
        assert!(text.contains("\"a.equals(b)\""));
    }

    #[test]
    fn json_rendering_follows_record_contract() {
        let (tree, report) = sample();
        let json = render(&tree, &report, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let diag = &value["diagnostics"][0];
        assert_eq!(diag["rule_id"], "AST001");
        assert_eq!(diag["node_span"][0], 2);
        assert_eq!(diag["node_span"][1], 4);
        assert_eq!(diag["severity"], "warning");
        assert_eq!(diag["fix"]["edits"][0]["new_text"], "a.equals(b)");
    }

    #[test]
    fn empty_report_text() {
        let (tree, _) = sample();
        let report = ScanReport::default();
        assert_eq!(render_text(&tree, &report), "no issues found\n");
    }
}
