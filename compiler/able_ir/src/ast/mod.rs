//! Abstract syntax tree.
//!
//! Nodes are plain owned trees: `Box` for recursion, `Vec` for lists.
//! Declarations live in [`items`], type syntax in [`types`].

pub mod build;
mod expr;
mod items;
mod pattern;
mod stmt;
mod types;

pub use expr::{
    BinaryOp, Expr, ExprKind, FloatSuffix, IntegerSuffix, InterpolationPart, Literal, MatchClause,
    MemberKey, OrClause, StructFieldInit, UnaryOp,
};
pub use items::{
    FieldDef, FunctionDef, FunctionSignature, GenericParam, ImplementationDef, InterfaceDef,
    MethodsDef, Param, StructDef, StructKind, UnionDef, WhereClause,
};
pub use pattern::{Pattern, PatternKind, StructPatternField};
pub use stmt::{AssignOp, DynImport, Stmt, StmtKind};
pub use types::{TypeExpr, TypeExprKind};

use crate::{Span, Spanned};

/// An identifier with its source location.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Ident {
            name: name.into(),
            span,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl Spanned for Ident {
    fn span(&self) -> Span {
        self.span
    }
}

/// One compilation unit: its imports followed by top-level statements.
#[derive(Clone, Debug, PartialEq)]
pub struct Module {
    pub package: Option<Ident>,
    pub imports: Vec<Import>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl Module {
    pub fn new(body: Vec<Stmt>) -> Self {
        Module {
            package: None,
            imports: Vec::new(),
            body,
            span: Span::DUMMY,
        }
    }
}

/// Static import: `import a.b`, `import a.b.*`, `import a.b::{x, y as z}`,
/// or `import a.b as alias`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Import {
    pub path: Vec<Ident>,
    pub wildcard: bool,
    pub selectors: Vec<ImportSelector>,
    pub alias: Option<Ident>,
    pub span: Span,
}

/// A single `name` or `name as alias` entry inside an import list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportSelector {
    pub name: Ident,
    pub alias: Option<Ident>,
}

impl ImportSelector {
    /// The name this selector introduces into scope.
    pub fn local_name(&self) -> &Ident {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}

impl Spanned for Import {
    fn span(&self) -> Span {
        self.span
    }
}
