//! Statements.
//!
//! Declarations appear as statements so that nested scopes may declare
//! local functions and types.

use super::{
    Expr, FunctionDef, Ident, ImplementationDef, ImportSelector, InterfaceDef, MethodsDef,
    Pattern, StructDef, UnionDef,
};
use crate::{Span, Spanned};

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

impl Spanned for Stmt {
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    /// `x := 1` declares, `x = 2` reassigns.
    Assign {
        op: AssignOp,
        target: Pattern,
        value: Expr,
    },
    Return(Option<Expr>),
    While {
        condition: Expr,
        body: Expr,
    },
    /// `for pattern in iterable { body }`
    For {
        pattern: Pattern,
        iterable: Expr,
        body: Expr,
    },
    Break(Option<Expr>),
    Continue,
    Struct(StructDef),
    Union(UnionDef),
    Interface(InterfaceDef),
    Function(FunctionDef),
    Implementation(ImplementationDef),
    Methods(MethodsDef),
    DynImport(DynImport),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AssignOp {
    /// `:=`
    Declare,
    /// `=`
    Assign,
}

/// `dynimport pkg.path::{a, b}`, `dynimport pkg.path.*`, `dynimport pkg.path as p`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynImport {
    pub path: Vec<Ident>,
    pub wildcard: bool,
    pub selectors: Vec<ImportSelector>,
    pub alias: Option<Ident>,
}
