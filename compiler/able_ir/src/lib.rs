//! Syntax tree for Able compilation units.
//!
//! The parser produces these nodes and the type checker consumes them.
//! Every node carries a [`Span`] so diagnostics can point back at source.
//!
//! # Layout
//!
//! - [`ast`]: modules, declarations, type expressions, expressions,
//!   statements, and patterns
//! - [`ast::build`]: span-less constructors for synthesizing trees

mod span;

pub mod ast;

pub use ast::{
    Expr, ExprKind, Ident, Import, ImportSelector, Literal, Module, Pattern, PatternKind, Stmt,
    StmtKind, TypeExpr, TypeExprKind,
};
pub use span::{Span, SpanError, Spanned};
