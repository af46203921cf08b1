//! Pre-resolved semantic facts attached to a tree before scanning.
//!
//! The index is built by the external resolver in a prior semantic-analysis
//! pass and is immutable for the duration of a scan. It is plain owned data
//! with no interior mutability, so sharing one index across rayon workers
//! scanning independent trees is safe.

use rustc_hash::FxHashMap;
use std::fmt;

/// Identity of a named entity. Stable for the lifetime of the index;
/// two references resolving to the same `DeclId` refer to the same entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclId(pub u32);

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// Identity of a resolved static type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// What sort of entity a declaration names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Class,
    Method {
        /// Number of declared parameters.
        param_count: usize,
    },
    Field,
    Variable,
    Parameter,
}

/// Visibility of a declaration as the resolver saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Package,
    Private,
}

/// A named entity created during semantic analysis.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    pub visibility: Visibility,
    /// Enclosing declaration (a method's class, a variable's method, ...).
    pub owner: Option<DeclId>,
}

impl Declaration {
    /// Parameter count for methods, `None` for everything else.
    pub fn param_count(&self) -> Option<usize> {
        match self.kind {
            DeclKind::Method { param_count } => Some(param_count),
            _ => None,
        }
    }
}

/// Broad classification of a resolved type, enough for the structural
/// rules: reference vs primitive vs enum is what they branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Primitive,
    Object,
    Enum,
    Array,
}

/// A resolved static type.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub name: String,
    pub category: TypeCategory,
}

/// Read-only symbol/type index shared by all scans.
///
/// Lookups return `Option`: an id the resolver never registered is a
/// resolution gap and callers skip, they do not fail.
#[derive(Debug, Default)]
pub struct SemanticIndex {
    decls: Vec<Declaration>,
    types: Vec<TypeInfo>,
    types_by_name: FxHashMap<String, TypeId>,
}

impl SemanticIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_decl(&mut self, decl: Declaration) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    pub fn add_type(&mut self, name: impl Into<String>, category: TypeCategory) -> TypeId {
        let name = name.into();
        let id = TypeId(self.types.len() as u32);
        self.types_by_name.insert(name.clone(), id);
        self.types.push(TypeInfo { name, category });
        id
    }

    pub fn decl(&self, id: DeclId) -> Option<&Declaration> {
        self.decls.get(id.0 as usize)
    }

    pub fn type_info(&self, id: TypeId) -> Option<&TypeInfo> {
        self.types.get(id.0 as usize)
    }

    pub fn type_by_name(&self, name: &str) -> Option<TypeId> {
        self.types_by_name.get(name).copied()
    }

    pub fn category_of(&self, id: TypeId) -> Option<TypeCategory> {
        self.type_info(id).map(|t| t.category)
    }

    /// Whether `id` resolves to a non-enum reference type.
    pub fn is_object(&self, id: TypeId) -> bool {
        matches!(
            self.category_of(id),
            Some(TypeCategory::Object | TypeCategory::Array)
        )
    }

    pub fn is_enum(&self, id: TypeId) -> bool {
        matches!(self.category_of(id), Some(TypeCategory::Enum))
    }
}
