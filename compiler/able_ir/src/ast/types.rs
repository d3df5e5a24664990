//! Type expressions as written in source.

use crate::{Ident, Span, Spanned};

/// A type annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeExprKind {
    /// `i32`, `Point`, `T`
    Simple(Ident),
    /// `Array<i32>`, `Map<K, V>`
    Generic {
        base: Box<TypeExpr>,
        args: Vec<TypeExpr>,
    },
    /// `(A, B) -> R`
    Function {
        params: Vec<TypeExpr>,
        ret: Box<TypeExpr>,
    },
    /// `T?`
    Nullable(Box<TypeExpr>),
    /// `!T`
    Result(Box<TypeExpr>),
    /// `A | B | C`
    Union(Vec<TypeExpr>),
    /// `_`
    Wildcard,
}

impl TypeExpr {
    pub fn new(kind: TypeExprKind, span: Span) -> Self {
        TypeExpr { kind, span }
    }

    /// Name of a simple type expression, if it is one.
    pub fn simple_name(&self) -> Option<&str> {
        match &self.kind {
            TypeExprKind::Simple(ident) => Some(ident.as_str()),
            _ => None,
        }
    }
}

impl Spanned for TypeExpr {
    fn span(&self) -> Span {
        self.span
    }
}
