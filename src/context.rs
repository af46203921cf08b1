//! Read-only traversal context handed to rules.
//!
//! The engine threads one `ScanContext` through its recursive descent,
//! pushing the current node before visiting children and popping on the way
//! out. Rules get a shared reference, so "am I inside X" questions are
//! answered by walking the ancestor stack instead of by mutable flags on a
//! visitor object.

use crate::node::{Node, NodeId, NodeKind, SyntaxTree};
use crate::semantic::{Declaration, SemanticIndex, TypeCategory, TypeInfo};

/// Traversal state visible to rules at one node.
pub struct ScanContext<'t> {
    tree: &'t SyntaxTree,
    semantics: &'t SemanticIndex,
    /// Ancestors of the node currently being checked, outermost first.
    ancestors: Vec<NodeId>,
}

impl<'t> ScanContext<'t> {
    pub(crate) fn new(tree: &'t SyntaxTree, semantics: &'t SemanticIndex) -> Self {
        Self {
            tree,
            semantics,
            ancestors: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, id: NodeId) {
        self.ancestors.push(id);
    }

    pub(crate) fn pop(&mut self) {
        self.ancestors.pop();
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn semantics(&self) -> &'t SemanticIndex {
        self.semantics
    }

    /// Depth of the current node (the root is at depth 0).
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    /// Ancestors of the current node, innermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'t>> + '_ {
        let tree = self.tree;
        self.ancestors.iter().rev().map(move |&id| tree.node(id))
    }

    /// Nearest enclosing node of the given kind.
    pub fn enclosing(&self, kind: NodeKind) -> Option<Node<'t>> {
        self.ancestors().find(|n| n.kind() == kind)
    }

    /// Nearest enclosing method declaration.
    pub fn enclosing_method(&self) -> Option<Node<'t>> {
        self.enclosing(NodeKind::MethodDecl)
    }

    /// Whether the current node sits inside an `equals(Object)` override.
    /// Identity comparison is idiomatic there and rules exempt it.
    pub fn in_equals_method(&self) -> bool {
        let Some(method) = self.enclosing_method() else {
            return false;
        };
        if method.label() != Some("equals") {
            return false;
        }
        self.method_param_count(method) == Some(1)
    }

    /// Parameter count of a method declaration node, preferring the
    /// resolved declaration and falling back to counting `Parameter`
    /// children when resolution is missing.
    pub fn method_param_count(&self, method: Node<'t>) -> Option<usize> {
        if let Some(decl) = self.decl_of(method) {
            if let Some(count) = decl.param_count() {
                return Some(count);
            }
        }
        Some(
            method
                .children()
                .filter(|c| c.kind() == NodeKind::Parameter)
                .count(),
        )
    }

    /// Declaration a node resolves to, if the resolver recorded one.
    pub fn decl_of(&self, node: Node<'t>) -> Option<&'t Declaration> {
        self.semantics.decl(node.decl_id()?)
    }

    /// Static type of an expression node, if the resolver recorded one.
    pub fn type_of(&self, node: Node<'t>) -> Option<&'t TypeInfo> {
        self.semantics.type_info(node.type_id()?)
    }

    /// Type category of an expression node. `None` is a resolution gap and
    /// means "cannot determine, skip".
    pub fn category_of(&self, node: Node<'t>) -> Option<TypeCategory> {
        self.type_of(node).map(|t| t.category)
    }
}
