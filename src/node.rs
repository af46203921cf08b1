//! The syntax tree model the scanner operates on.
//!
//! Trees are produced by an external parser/resolver and handed to the
//! scanner fully built: every node already carries its resolved type and
//! declaration reference (when resolution succeeded). The scanner never
//! resolves anything itself.
//!
//! Storage is an arena: nodes live in a flat `Vec` and refer to each other
//! by [`NodeId`] index. Children are owned (each node holds its ordered
//! child id list), parent links are non-owning back-references. This keeps
//! the tree acyclic by construction -- a node's parent must exist before
//! the node is pushed -- and makes node identity a plain `Copy` value that
//! diagnostics can carry around.

use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::ScanError;
use crate::semantic::{DeclId, TypeId};

// ---------------------------------------------------------------------------
// Spans
// ---------------------------------------------------------------------------

/// A byte range into the tree's source text. `start` is inclusive,
/// `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "span end ({end}) must be >= start ({start})");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `other` lies entirely within this span.
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the two spans share at least one byte.
    ///
    /// Zero-width spans at the same position count as overlapping: two
    /// insertions at one offset have no defined order and must conflict.
    pub fn overlaps(&self, other: Span) -> bool {
        if self.is_empty() && other.is_empty() {
            return self.start == other.start;
        }
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// Serialized as the `(start, end)` pair consumers of the diagnostic
// record contract expect.
impl Serialize for Span {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(2)?;
        tup.serialize_element(&self.start)?;
        tup.serialize_element(&self.end)?;
        tup.end()
    }
}

// ---------------------------------------------------------------------------
// Node kinds
// ---------------------------------------------------------------------------

/// Syntactic category of a node.
///
/// Java-flavored but deliberately generic: the scanner only ever pattern
/// matches on these, it attaches no language semantics beyond what rules
/// themselves encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    CompilationUnit,
    ClassDecl,
    MethodDecl,
    FieldDecl,
    Parameter,
    VariableDecl,
    Block,
    IfStatement,
    WhileLoop,
    DoWhileLoop,
    ForLoop,
    BreakStatement,
    ContinueStatement,
    ReturnStatement,
    ThrowStatement,
    ExpressionStatement,
    BinaryExpr,
    UnaryExpr,
    AssignmentExpr,
    MethodCall,
    FieldAccess,
    NameRef,
    Literal,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::CompilationUnit => "compilation-unit",
            NodeKind::ClassDecl => "class-decl",
            NodeKind::MethodDecl => "method-decl",
            NodeKind::FieldDecl => "field-decl",
            NodeKind::Parameter => "parameter",
            NodeKind::VariableDecl => "variable-decl",
            NodeKind::Block => "block",
            NodeKind::IfStatement => "if-statement",
            NodeKind::WhileLoop => "while-loop",
            NodeKind::DoWhileLoop => "do-while-loop",
            NodeKind::ForLoop => "for-loop",
            NodeKind::BreakStatement => "break-statement",
            NodeKind::ContinueStatement => "continue-statement",
            NodeKind::ReturnStatement => "return-statement",
            NodeKind::ThrowStatement => "throw-statement",
            NodeKind::ExpressionStatement => "expression-statement",
            NodeKind::BinaryExpr => "binary-expr",
            NodeKind::UnaryExpr => "unary-expr",
            NodeKind::AssignmentExpr => "assignment-expr",
            NodeKind::MethodCall => "method-call",
            NodeKind::FieldAccess => "field-access",
            NodeKind::NameRef => "name-ref",
            NodeKind::Literal => "literal",
        }
    }

    /// Kinds that open a loop scope (break/continue bind to the nearest
    /// enclosing one of these).
    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            NodeKind::WhileLoop | NodeKind::DoWhileLoop | NodeKind::ForLoop
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tree storage
// ---------------------------------------------------------------------------

/// Index of a node within its [`SyntaxTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    span: Span,
    /// Identifier name, operator symbol, or literal token, depending on kind.
    label: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Declaration this node resolves to, when the resolver found one.
    decl: Option<DeclId>,
    /// Static type of the expression, when the resolver computed one.
    ty: Option<TypeId>,
}

/// An immutable syntax tree plus the source text it was parsed from.
///
/// Built once via [`TreeBuilder`], then only read during scanning. Fix
/// application produces new *source text*; re-parsing it into a fresh tree
/// is the external parser's job.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn root(&self) -> Node<'_> {
        self.node(self.root)
    }

    pub fn node(&self, id: NodeId) -> Node<'_> {
        debug_assert!(id.index() < self.nodes.len(), "dangling node id {id}");
        Node { tree: self, id }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Source text covered by `span`.
    pub fn text(&self, span: Span) -> &str {
        &self.source[span.start..span.end.min(self.source.len())]
    }

    /// Pre-order depth-first iteration over the subtree rooted at `id`.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }
}

/// Iterator returned by [`SyntaxTree::descendants`].
pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Node<'t>> {
        let id = self.stack.pop()?;
        let data = &self.tree.nodes[id.index()];
        // Push in reverse so children come off the stack in source order.
        self.stack.extend(data.children.iter().rev());
        Some(self.tree.node(id))
    }
}

// ---------------------------------------------------------------------------
// Node handle
// ---------------------------------------------------------------------------

/// A cheap handle to one node: the tree reference plus the node's id.
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> Node<'t> {
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.id.index()]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    pub fn span(&self) -> Span {
        self.data().span
    }

    pub fn label(&self) -> Option<&'t str> {
        self.data().label.as_deref()
    }

    /// The source text this node covers.
    pub fn text(&self) -> &'t str {
        self.tree.text(self.span())
    }

    pub fn parent(&self) -> Option<Node<'t>> {
        self.data().parent.map(|p| self.tree.node(p))
    }

    pub fn children(&self) -> impl ExactSizeIterator<Item = Node<'t>> + '_ {
        let tree = self.tree;
        self.data().children.iter().map(move |&c| tree.node(c))
    }

    pub fn child(&self, index: usize) -> Option<Node<'t>> {
        self.data()
            .children
            .get(index)
            .map(|&c| self.tree.node(c))
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    /// First child of the given kind, in source order.
    pub fn child_of_kind(&self, kind: NodeKind) -> Option<Node<'t>> {
        self.children().find(|c| c.kind() == kind)
    }

    pub fn decl_id(&self) -> Option<DeclId> {
        self.data().decl
    }

    pub fn type_id(&self) -> Option<TypeId> {
        self.data().ty
    }

    /// Whether this node is a literal with the given token text
    /// (e.g. `is_literal("null")`, `is_literal("true")`).
    pub fn is_literal(&self, token: &str) -> bool {
        self.kind() == NodeKind::Literal && self.label() == Some(token)
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}({})", self.kind(), self.id(), self.span())?;
        if let Some(label) = self.label() {
            write!(f, " {label:?}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Incremental tree constructor used by the external parser (and by tests).
///
/// Nodes are pushed top-down: the parent must already exist, which rules
/// out cycles. [`TreeBuilder::finish`] validates the remaining structural
/// invariants before handing out an immutable [`SyntaxTree`].
pub struct TreeBuilder {
    source: String,
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
}

impl TreeBuilder {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Push the root node. Panics if a root was already pushed.
    pub fn root(&mut self, kind: NodeKind, span: Span) -> NodeId {
        assert!(self.root.is_none(), "tree already has a root");
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            span,
            label: None,
            parent: None,
            children: Vec::new(),
            decl: None,
            ty: None,
        });
        self.root = Some(id);
        id
    }

    /// Push a child of `parent`, appended after its existing children.
    pub fn push(&mut self, parent: NodeId, kind: NodeKind, span: Span) -> NodeId {
        assert!(
            parent.index() < self.nodes.len(),
            "parent {parent} does not exist yet"
        );
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            span,
            label: None,
            parent: Some(parent),
            children: Vec::new(),
            decl: None,
            ty: None,
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Attach an identifier / operator / literal token to a node.
    pub fn label(&mut self, id: NodeId, label: impl Into<String>) {
        self.nodes[id.index()].label = Some(label.into());
    }

    /// Record the declaration a node resolves to.
    pub fn resolve_decl(&mut self, id: NodeId, decl: DeclId) {
        self.nodes[id.index()].decl = Some(decl);
    }

    /// Record the static type of an expression node.
    pub fn resolve_type(&mut self, id: NodeId, ty: TypeId) {
        self.nodes[id.index()].ty = Some(ty);
    }

    /// Validate invariants and produce the immutable tree.
    ///
    /// Checks: a root exists, every span lies within the source on UTF-8
    /// character boundaries, every child's span lies within its parent's
    /// span, sibling spans are in non-decreasing source order, and
    /// parent/child links agree.
    pub fn finish(self) -> Result<SyntaxTree, ScanError> {
        let root = self
            .root
            .ok_or_else(|| ScanError::MalformedTree("tree has no root".into()))?;

        for (i, node) in self.nodes.iter().enumerate() {
            let id = NodeId(i as u32);
            if node.span.end > self.source.len() {
                return Err(ScanError::SpanOutOfBounds {
                    start: node.span.start,
                    end: node.span.end,
                    len: self.source.len(),
                });
            }
            if !self.source.is_char_boundary(node.span.start)
                || !self.source.is_char_boundary(node.span.end)
            {
                return Err(ScanError::MalformedTree(format!(
                    "node {id} span {} splits a UTF-8 character",
                    node.span
                )));
            }
            let mut prev_start = None;
            for &child in &node.children {
                let child_data = &self.nodes[child.index()];
                if child_data.parent != Some(id) {
                    return Err(ScanError::MalformedTree(format!(
                        "node {child} listed as child of {id} but its parent link disagrees"
                    )));
                }
                if !node.span.contains(child_data.span) {
                    return Err(ScanError::MalformedTree(format!(
                        "child {child} span {} escapes parent {id} span {}",
                        child_data.span, node.span
                    )));
                }
                if let Some(prev) = prev_start {
                    if child_data.span.start < prev {
                        return Err(ScanError::MalformedTree(format!(
                            "children of {id} are not in source order"
                        )));
                    }
                }
                prev_start = Some(child_data.span.start);
            }
        }

        Ok(SyntaxTree {
            source: self.source,
            nodes: self.nodes,
            root,
        })
    }
}
