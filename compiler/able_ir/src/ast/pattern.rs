//! Binding patterns for assignments, parameters, `for` loops, and `match` clauses.

use super::{Ident, Literal, TypeExpr};
use crate::{Span, Spanned};

#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PatternKind {
    Identifier(Ident),
    Wildcard,
    Literal(Literal),
    /// `Point { x, y: py }` or positional `Pair { a, b }`.
    Struct {
        struct_name: Option<Ident>,
        fields: Vec<StructPatternField>,
        positional: bool,
    },
    /// `[first, second, ...rest]`
    Array {
        elements: Vec<Pattern>,
        rest: Option<Ident>,
    },
    /// `x: i32`
    Typed {
        pattern: Box<Pattern>,
        ty: TypeExpr,
    },
}

/// One entry of a struct pattern. `field` is absent for positional entries.
#[derive(Clone, Debug, PartialEq)]
pub struct StructPatternField {
    pub field: Option<Ident>,
    pub pattern: Pattern,
    pub span: Span,
}

impl Pattern {
    pub fn new(kind: PatternKind, span: Span) -> Self {
        Pattern { kind, span }
    }

    /// Name bound by a bare or typed identifier pattern.
    pub fn identifier_name(&self) -> Option<&str> {
        match &self.kind {
            PatternKind::Identifier(ident) => Some(ident.as_str()),
            PatternKind::Typed { pattern, .. } => pattern.identifier_name(),
            _ => None,
        }
    }
}

impl Spanned for Pattern {
    fn span(&self) -> Span {
        self.span
    }
}
