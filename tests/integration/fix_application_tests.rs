//! Fix application tests against full scan reports.
//!
//! Coverage:
//!  - Scan, apply, rescan round trips for the fixable rules
//!  - Stale fix rejection when the source moved underneath the fix
//!  - Conflict resolution between overlapping fixes

use astlint::{
    DeclKind, Declaration, Fix, FixStatus, NodeKind, RuleCode, ScanConfig, ScanEngine,
    SemanticIndex, Span, SyntaxTree, TreeBuilder, TypeCategory, Visibility, apply_fixes,
    rules::Edit,
};

fn scan(tree: &SyntaxTree, index: &SemanticIndex) -> Vec<astlint::Diagnostic> {
    let mut engine = ScanEngine::with_builtin_rules(ScanConfig::default());
    engine.scan(tree, index).into_report().unwrap().diagnostics
}

/// `a == b;` where both names resolve to an object type.
fn identity_comparison() -> (SyntaxTree, SemanticIndex) {
    let src = "a == b;";
    let mut index = SemanticIndex::new();
    let string_ty = index.add_type("String", TypeCategory::Object);

    let mut b = TreeBuilder::new(src);
    let root = b.root(NodeKind::CompilationUnit, Span::new(0, 7));
    let stmt = b.push(root, NodeKind::ExpressionStatement, Span::new(0, 7));
    let cmp = b.push(stmt, NodeKind::BinaryExpr, Span::new(0, 6));
    b.label(cmp, "==");
    let lhs = b.push(cmp, NodeKind::NameRef, Span::new(0, 1));
    b.label(lhs, "a");
    b.resolve_type(lhs, string_ty);
    let rhs = b.push(cmp, NodeKind::NameRef, Span::new(5, 6));
    b.label(rhs, "b");
    b.resolve_type(rhs, string_ty);

    (b.finish().unwrap(), index)
}

/// The tree a frontend would produce for `a.equals(b);`, the output of
/// the object-equality fix.
fn equals_call() -> (SyntaxTree, SemanticIndex) {
    let src = "a.equals(b);";
    let mut index = SemanticIndex::new();
    let string_ty = index.add_type("String", TypeCategory::Object);

    let mut b = TreeBuilder::new(src);
    let root = b.root(NodeKind::CompilationUnit, Span::new(0, 12));
    let stmt = b.push(root, NodeKind::ExpressionStatement, Span::new(0, 12));
    let call = b.push(stmt, NodeKind::MethodCall, Span::new(0, 11));
    let recv = b.push(call, NodeKind::NameRef, Span::new(0, 1));
    b.label(recv, "a");
    b.resolve_type(recv, string_ty);
    let callee = b.push(call, NodeKind::NameRef, Span::new(2, 8));
    b.label(callee, "equals");
    let arg = b.push(call, NodeKind::NameRef, Span::new(9, 10));
    b.label(arg, "b");
    b.resolve_type(arg, string_ty);

    (b.finish().unwrap(), index)
}

#[test]
fn object_equality_fix_rewrites_and_rescans_clean() {
    let (tree, index) = identity_comparison();
    let diags = scan(&tree, &index);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].rule, RuleCode::AST001);

    let fix = diags[0].fix.clone().unwrap();
    let (fixed, results) = apply_fixes(&tree, &[fix]);
    assert_eq!(fixed, "a.equals(b);");
    assert_eq!(results[0].status, FixStatus::Applied);

    // Reparsed, the fixed source no longer triggers anything.
    let (fixed_tree, fixed_index) = equals_call();
    assert_eq!(fixed_tree.source(), fixed);
    assert!(scan(&fixed_tree, &fixed_index).is_empty());
}

#[test]
fn misspelled_method_fix_renames_the_token() {
    let src = "class C { public void hashcode() { } }";
    let mut index = SemanticIndex::new();
    let decl = index.add_decl(Declaration {
        name: "hashcode".to_string(),
        kind: DeclKind::Method { param_count: 0 },
        visibility: Visibility::Public,
        owner: None,
    });

    let mut b = TreeBuilder::new(src);
    let root = b.root(NodeKind::CompilationUnit, Span::new(0, src.len()));
    let class = b.push(root, NodeKind::ClassDecl, Span::new(0, src.len()));
    let method = b.push(class, NodeKind::MethodDecl, Span::new(10, 36));
    b.label(method, "hashcode");
    b.resolve_decl(method, decl);
    b.push(method, NodeKind::Block, Span::new(33, 36));
    let tree = b.finish().unwrap();

    let diags = scan(&tree, &index);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].rule, RuleCode::AST002);

    let fix = diags[0].fix.clone().unwrap();
    let (fixed, results) = apply_fixes(&tree, &[fix]);
    assert_eq!(fixed, "class C { public void hashCode() { } }");
    assert_eq!(results[0].status, FixStatus::Applied);
}

#[test]
fn fix_from_an_outdated_tree_is_rejected() {
    let (tree, index) = identity_comparison();
    let diags = scan(&tree, &index);
    let fix = diags[0].fix.clone().unwrap();

    // Same shape, but the operator text changed since the fix was made.
    let src = "a != b;";
    let mut b = TreeBuilder::new(src);
    let root = b.root(NodeKind::CompilationUnit, Span::new(0, 7));
    let stmt = b.push(root, NodeKind::ExpressionStatement, Span::new(0, 7));
    let cmp = b.push(stmt, NodeKind::BinaryExpr, Span::new(0, 6));
    b.label(cmp, "!=");
    let lhs = b.push(cmp, NodeKind::NameRef, Span::new(0, 1));
    b.label(lhs, "a");
    let rhs = b.push(cmp, NodeKind::NameRef, Span::new(5, 6));
    b.label(rhs, "b");
    let moved = b.finish().unwrap();

    let (out, results) = apply_fixes(&moved, &[fix]);
    assert_eq!(out, "a != b;");
    assert_eq!(results[0].status, FixStatus::RejectedStale);
    assert!(results[0].reason.is_some());
}

#[test]
fn overlapping_fixes_resolve_in_source_order() {
    let src = "abcdef;";
    let mut b = TreeBuilder::new(src);
    b.root(NodeKind::CompilationUnit, Span::new(0, 7));
    let tree = b.finish().unwrap();
    let root = tree.root();

    let wide = Fix::new("rewrite head", vec![Edit::replace(root, Span::new(0, 4), "X")]);
    let late = Fix::new("rewrite tail", vec![Edit::replace(root, Span::new(2, 6), "Y")]);

    // Batch order is reversed on purpose; source order decides.
    let (out, results) = apply_fixes(&tree, &[late, wide]);
    assert_eq!(out, "Xef;");
    assert_eq!(results[0].status, FixStatus::RejectedConflict);
    assert_eq!(results[1].status, FixStatus::Applied);
}
