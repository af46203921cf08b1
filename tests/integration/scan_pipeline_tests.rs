//! Scan pipeline tests: tree construction through rendered output.
//!
//! Coverage:
//!  - Built-in rule set over a tree with multiple findings
//!  - Position ordering of the final report
//!  - select/ignore configuration and the diagnostic cap
//!  - Cooperative cancellation
//!  - Parallel batch scans preserving input order
//!  - Text and JSON output contracts

use astlint::{
    CancelToken, NodeKind, OutputFormat, RuleCode, ScanConfig, ScanEngine, SemanticIndex, Span,
    SyntaxTree, TreeBuilder, TypeCategory, builtin_rules, render, scan_trees,
};

/// `class C { void m() { a == b; while (true) { run(); } } }`
///
/// Two findings: an object identity comparison and a loop that never
/// terminates. Both operands of `==` resolve to the same object type.
fn fixture() -> (SyntaxTree, SemanticIndex) {
    let src = "class C { void m() { a == b; while (true) { run(); } } }";
    let mut index = SemanticIndex::new();
    let string_ty = index.add_type("String", TypeCategory::Object);

    let mut b = TreeBuilder::new(src);
    let root = b.root(NodeKind::CompilationUnit, Span::new(0, src.len()));
    let class = b.push(root, NodeKind::ClassDecl, Span::new(0, src.len()));
    let method = b.push(class, NodeKind::MethodDecl, Span::new(10, 54));
    b.label(method, "m");
    let body = b.push(method, NodeKind::Block, Span::new(19, 54));

    let stmt = b.push(body, NodeKind::ExpressionStatement, Span::new(21, 28));
    let cmp = b.push(stmt, NodeKind::BinaryExpr, Span::new(21, 27));
    b.label(cmp, "==");
    let lhs = b.push(cmp, NodeKind::NameRef, Span::new(21, 22));
    b.label(lhs, "a");
    b.resolve_type(lhs, string_ty);
    let rhs = b.push(cmp, NodeKind::NameRef, Span::new(26, 27));
    b.label(rhs, "b");
    b.resolve_type(rhs, string_ty);

    let lp = b.push(body, NodeKind::WhileLoop, Span::new(29, 52));
    let cond = b.push(lp, NodeKind::Literal, Span::new(36, 40));
    b.label(cond, "true");
    let lp_body = b.push(lp, NodeKind::Block, Span::new(42, 52));
    let call_stmt = b.push(lp_body, NodeKind::ExpressionStatement, Span::new(44, 50));
    let call = b.push(call_stmt, NodeKind::MethodCall, Span::new(44, 49));
    let callee = b.push(call, NodeKind::NameRef, Span::new(44, 47));
    b.label(callee, "run");

    (b.finish().unwrap(), index)
}

#[test]
fn builtin_scan_reports_both_findings_in_source_order() {
    let (tree, index) = fixture();
    let mut engine = ScanEngine::with_builtin_rules(ScanConfig::default());
    let report = engine.scan(&tree, &index).into_report().unwrap();

    assert!(report.faults.is_empty());
    let codes: Vec<RuleCode> = report.diagnostics.iter().map(|d| d.rule).collect();
    assert_eq!(codes, vec![RuleCode::AST001, RuleCode::AST003]);
    assert_eq!(tree.text(report.diagnostics[0].span), "==");
    assert_eq!(tree.text(report.diagnostics[1].span), "while");
    assert!(report.diagnostics[0].span.start < report.diagnostics[1].span.start);
}

#[test]
fn select_restricts_to_named_rules() {
    let (tree, index) = fixture();
    let config = ScanConfig::new(Some("AST003"), None);
    let mut engine = ScanEngine::with_builtin_rules(config);
    let report = engine.scan(&tree, &index).into_report().unwrap();

    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].rule, RuleCode::AST003);
}

#[test]
fn ignore_drops_named_rules() {
    let (tree, index) = fixture();
    let config = ScanConfig::new(None, Some("AST003"));
    let mut engine = ScanEngine::with_builtin_rules(config);
    let report = engine.scan(&tree, &index).into_report().unwrap();

    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].rule, RuleCode::AST001);
}

#[test]
fn diagnostic_cap_truncates_the_report() {
    let (tree, index) = fixture();
    let config = ScanConfig::default().with_max_diagnostics(Some(1));
    let mut engine = ScanEngine::with_builtin_rules(config);
    let report = engine.scan(&tree, &index).into_report().unwrap();

    assert_eq!(report.diagnostics.len(), 1);
}

#[test]
fn cancelled_scan_yields_no_report() {
    let (tree, index) = fixture();
    let token = CancelToken::new();
    token.cancel();

    let mut engine = ScanEngine::with_builtin_rules(ScanConfig::default());
    let outcome = engine.scan_cancellable(&tree, &index, &token);

    assert!(outcome.is_cancelled());
    assert!(outcome.report().is_none());
}

#[test]
fn batch_scan_preserves_input_order() {
    let (noisy, index) = fixture();

    let quiet = {
        let src = "x;";
        let mut b = TreeBuilder::new(src);
        let root = b.root(NodeKind::CompilationUnit, Span::new(0, 2));
        let x = b.push(root, NodeKind::NameRef, Span::new(0, 1));
        b.label(x, "x");
        b.finish().unwrap()
    };

    let trees = vec![quiet, noisy];
    let outcomes = scan_trees(
        &trees,
        &index,
        &ScanConfig::default(),
        &CancelToken::new(),
        builtin_rules,
    );

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].report().unwrap().diagnostics.is_empty());
    assert_eq!(outcomes[1].report().unwrap().diagnostics.len(), 2);
}

#[test]
fn text_output_lists_position_severity_and_rule() {
    let (tree, index) = fixture();
    let mut engine = ScanEngine::with_builtin_rules(ScanConfig::default());
    let report = engine.scan(&tree, &index).into_report().unwrap();

    let text = render(&tree, &report, OutputFormat::Text).unwrap();
    assert!(text.contains("1:24: warning[AST001] object-equality:"));
    assert!(text.contains("1:30: warning[AST003] non-terminating-loop:"));
    // AST001 carries a fix preview, AST003 does not.
    assert!(text.contains("  fix: "));
    assert!(text.contains("+ \"a.equals(b)\""));
}

#[test]
fn text_output_on_clean_tree_says_so() {
    let src = "x;";
    let mut b = TreeBuilder::new(src);
    let root = b.root(NodeKind::CompilationUnit, Span::new(0, 2));
    let x = b.push(root, NodeKind::NameRef, Span::new(0, 1));
    b.label(x, "x");
    let tree = b.finish().unwrap();

    let index = SemanticIndex::new();
    let mut engine = ScanEngine::with_builtin_rules(ScanConfig::default());
    let report = engine.scan(&tree, &index).into_report().unwrap();

    let text = render(&tree, &report, OutputFormat::Text).unwrap();
    assert_eq!(text, "no issues found\n");
}

#[test]
fn json_output_matches_the_published_shape() {
    let (tree, index) = fixture();
    let mut engine = ScanEngine::with_builtin_rules(ScanConfig::default());
    let report = engine.scan(&tree, &index).into_report().unwrap();

    let json = render(&tree, &report, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let diags = value["diagnostics"].as_array().unwrap();
    assert_eq!(diags.len(), 2);

    let first = &diags[0];
    assert_eq!(first["rule_id"], "AST001");
    assert_eq!(first["node_span"][0], 23);
    assert_eq!(first["node_span"][1], 25);
    assert_eq!(first["severity"], "warning");
    assert_eq!(first["fix"]["edits"][0]["new_text"], "a.equals(b)");

    let second = &diags[1];
    assert_eq!(second["rule_id"], "AST003");
    assert!(second["fix"].is_null());
}
