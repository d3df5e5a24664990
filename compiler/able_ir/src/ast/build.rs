//! Span-less constructors for synthesizing syntax trees.
//!
//! Each constructed node receives a distinct synthetic span from a
//! thread-local counter so that per-node side tables (such as inferred
//! types) keyed by span stay unambiguous.

use std::cell::Cell;

use super::{
    AssignOp, BinaryOp, DynImport, Expr, ExprKind, FieldDef, FunctionDef, FunctionSignature,
    GenericParam, Ident, ImplementationDef, Import, ImportSelector, InterfaceDef,
    InterpolationPart, Literal, MatchClause, MemberKey, MethodsDef, Module, OrClause, Param,
    Pattern, PatternKind, Stmt, StmtKind, StructDef, StructFieldInit, StructKind,
    StructPatternField, TypeExpr, TypeExprKind, UnaryOp, UnionDef, WhereClause,
};
use super::{FloatSuffix, IntegerSuffix};
use crate::Span;

thread_local! {
    static NEXT_OFFSET: Cell<u32> = const { Cell::new(1) };
}

/// Allocate a fresh one-byte synthetic span.
pub fn fresh_span() -> Span {
    NEXT_OFFSET.with(|next| {
        let start = next.get();
        next.set(start.wrapping_add(2));
        Span::new(start, start + 1)
    })
}

pub fn ident(name: &str) -> Ident {
    Ident::new(name, fresh_span())
}

pub fn module(body: Vec<Stmt>) -> Module {
    Module::new(body)
}

pub fn module_with_imports(imports: Vec<Import>, body: Vec<Stmt>) -> Module {
    Module {
        imports,
        ..Module::new(body)
    }
}

pub fn import(path: &[&str], selectors: &[&str]) -> Import {
    Import {
        path: path.iter().map(|p| ident(p)).collect(),
        wildcard: false,
        selectors: selectors
            .iter()
            .map(|name| ImportSelector {
                name: ident(name),
                alias: None,
            })
            .collect(),
        alias: None,
        span: fresh_span(),
    }
}

// Type expressions

pub fn ty(name: &str) -> TypeExpr {
    TypeExpr::new(TypeExprKind::Simple(ident(name)), fresh_span())
}

pub fn generic_ty(base: &str, args: Vec<TypeExpr>) -> TypeExpr {
    TypeExpr::new(
        TypeExprKind::Generic {
            base: Box::new(ty(base)),
            args,
        },
        fresh_span(),
    )
}

pub fn fn_ty(params: Vec<TypeExpr>, ret: TypeExpr) -> TypeExpr {
    TypeExpr::new(
        TypeExprKind::Function {
            params,
            ret: Box::new(ret),
        },
        fresh_span(),
    )
}

pub fn nullable_ty(inner: TypeExpr) -> TypeExpr {
    TypeExpr::new(TypeExprKind::Nullable(Box::new(inner)), fresh_span())
}

pub fn result_ty(inner: TypeExpr) -> TypeExpr {
    TypeExpr::new(TypeExprKind::Result(Box::new(inner)), fresh_span())
}

pub fn union_ty(members: Vec<TypeExpr>) -> TypeExpr {
    TypeExpr::new(TypeExprKind::Union(members), fresh_span())
}

pub fn wildcard_ty() -> TypeExpr {
    TypeExpr::new(TypeExprKind::Wildcard, fresh_span())
}

// Generics

pub fn generic_param(name: &str, constraints: Vec<TypeExpr>) -> GenericParam {
    GenericParam {
        name: ident(name),
        constraints,
        span: fresh_span(),
    }
}

pub fn where_clause(type_param: &str, constraints: Vec<TypeExpr>) -> WhereClause {
    WhereClause {
        type_param: ident(type_param),
        constraints,
        span: fresh_span(),
    }
}

// Expressions

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, fresh_span())
}

pub fn int(value: i128) -> Expr {
    expr(ExprKind::Literal(Literal::Integer {
        value,
        suffix: None,
    }))
}

pub fn int_suffixed(value: i128, suffix: IntegerSuffix) -> Expr {
    expr(ExprKind::Literal(Literal::Integer {
        value,
        suffix: Some(suffix),
    }))
}

pub fn float(value: f64) -> Expr {
    expr(ExprKind::Literal(Literal::Float {
        value,
        suffix: None,
    }))
}

pub fn float_suffixed(value: f64, suffix: FloatSuffix) -> Expr {
    expr(ExprKind::Literal(Literal::Float {
        value,
        suffix: Some(suffix),
    }))
}

pub fn string(value: &str) -> Expr {
    expr(ExprKind::Literal(Literal::String(value.to_owned())))
}

pub fn boolean(value: bool) -> Expr {
    expr(ExprKind::Literal(Literal::Bool(value)))
}

pub fn character(value: char) -> Expr {
    expr(ExprKind::Literal(Literal::Char(value)))
}

pub fn nil() -> Expr {
    expr(ExprKind::Literal(Literal::Nil))
}

pub fn var(name: &str) -> Expr {
    expr(ExprKind::Identifier(ident(name)))
}

pub fn array(elements: Vec<Expr>) -> Expr {
    expr(ExprKind::Array(elements))
}

pub fn block(stmts: Vec<Stmt>) -> Expr {
    expr(ExprKind::Block(stmts))
}

pub fn if_expr(condition: Expr, body: Expr, or_clauses: Vec<OrClause>) -> Expr {
    expr(ExprKind::If {
        condition: Box::new(condition),
        body: Box::new(body),
        or_clauses,
    })
}

pub fn or_clause(condition: Option<Expr>, body: Expr) -> OrClause {
    OrClause {
        condition,
        body,
        span: fresh_span(),
    }
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    expr(ExprKind::Unary {
        op,
        operand: Box::new(operand),
    })
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    expr(ExprKind::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn lambda(params: Vec<Param>, return_type: Option<TypeExpr>, body: Expr) -> Expr {
    expr(ExprKind::Lambda {
        generics: Vec::new(),
        params,
        return_type,
        body: Box::new(body),
    })
}

pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    call_with_type_args(callee, Vec::new(), args)
}

pub fn call_with_type_args(callee: Expr, type_args: Vec<TypeExpr>, args: Vec<Expr>) -> Expr {
    expr(ExprKind::Call {
        callee: Box::new(callee),
        type_args,
        args,
    })
}

pub fn member(object: Expr, name: &str) -> Expr {
    expr(ExprKind::Member {
        object: Box::new(object),
        member: MemberKey::Name(ident(name)),
    })
}

pub fn member_index(object: Expr, value: u32) -> Expr {
    expr(ExprKind::Member {
        object: Box::new(object),
        member: MemberKey::Index {
            value,
            span: fresh_span(),
        },
    })
}

/// `object.method(args)`
pub fn method_call(object: Expr, method: &str, args: Vec<Expr>) -> Expr {
    call(member(object, method), args)
}

pub fn index(object: Expr, index: Expr) -> Expr {
    expr(ExprKind::Index {
        object: Box::new(object),
        index: Box::new(index),
    })
}

pub fn struct_literal(name: &str, fields: Vec<(&str, Expr)>) -> Expr {
    struct_literal_with(name, Vec::new(), fields, Vec::new())
}

pub fn struct_literal_with(
    name: &str,
    type_args: Vec<TypeExpr>,
    fields: Vec<(&str, Expr)>,
    update_sources: Vec<Expr>,
) -> Expr {
    expr(ExprKind::StructLiteral {
        name: Some(ident(name)),
        type_args,
        fields: fields
            .into_iter()
            .map(|(field, value)| StructFieldInit {
                name: Some(ident(field)),
                value,
                span: fresh_span(),
            })
            .collect(),
        positional: false,
        update_sources,
    })
}

pub fn positional_struct_literal(name: &str, values: Vec<Expr>) -> Expr {
    expr(ExprKind::StructLiteral {
        name: Some(ident(name)),
        type_args: Vec::new(),
        fields: values
            .into_iter()
            .map(|value| StructFieldInit {
                name: None,
                value,
                span: fresh_span(),
            })
            .collect(),
        positional: true,
        update_sources: Vec::new(),
    })
}

pub fn match_expr(subject: Expr, clauses: Vec<MatchClause>) -> Expr {
    expr(ExprKind::Match {
        subject: Box::new(subject),
        clauses,
    })
}

pub fn match_clause(pattern: Pattern, guard: Option<Expr>, body: Expr) -> MatchClause {
    MatchClause {
        pattern,
        guard,
        body,
        span: fresh_span(),
    }
}

pub fn range(start: Expr, end: Expr, inclusive: bool) -> Expr {
    expr(ExprKind::Range {
        start: Box::new(start),
        end: Box::new(end),
        inclusive,
    })
}

pub fn interpolation(parts: Vec<InterpolationPart>) -> Expr {
    expr(ExprKind::Interpolation(parts))
}

pub fn proc_expr(body: Expr) -> Expr {
    expr(ExprKind::Proc(Box::new(body)))
}

pub fn spawn(body: Expr) -> Expr {
    expr(ExprKind::Spawn(Box::new(body)))
}

pub fn propagate(inner: Expr) -> Expr {
    expr(ExprKind::Propagate(Box::new(inner)))
}

// Statements

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, fresh_span())
}

pub fn expr_stmt(value: Expr) -> Stmt {
    stmt(StmtKind::Expr(value))
}

pub fn declare(name: &str, value: Expr) -> Stmt {
    declare_pattern(pat_ident(name), value)
}

pub fn declare_pattern(target: Pattern, value: Expr) -> Stmt {
    stmt(StmtKind::Assign {
        op: AssignOp::Declare,
        target,
        value,
    })
}

pub fn assign(name: &str, value: Expr) -> Stmt {
    stmt(StmtKind::Assign {
        op: AssignOp::Assign,
        target: pat_ident(name),
        value,
    })
}

pub fn ret(value: Option<Expr>) -> Stmt {
    stmt(StmtKind::Return(value))
}

pub fn while_loop(condition: Expr, body: Expr) -> Stmt {
    stmt(StmtKind::While { condition, body })
}

pub fn for_loop(pattern: Pattern, iterable: Expr, body: Expr) -> Stmt {
    stmt(StmtKind::For {
        pattern,
        iterable,
        body,
    })
}

pub fn break_stmt() -> Stmt {
    stmt(StmtKind::Break(None))
}

pub fn continue_stmt() -> Stmt {
    stmt(StmtKind::Continue)
}

pub fn dynimport_wildcard(path: &[&str]) -> Stmt {
    stmt(StmtKind::DynImport(DynImport {
        path: path.iter().map(|p| ident(p)).collect(),
        wildcard: true,
        selectors: Vec::new(),
        alias: None,
    }))
}

pub fn dynimport(path: &[&str], selectors: &[&str]) -> Stmt {
    stmt(StmtKind::DynImport(DynImport {
        path: path.iter().map(|p| ident(p)).collect(),
        wildcard: false,
        selectors: selectors
            .iter()
            .map(|name| ImportSelector {
                name: ident(name),
                alias: None,
            })
            .collect(),
        alias: None,
    }))
}

// Declarations

pub fn field(name: &str, ty: TypeExpr) -> FieldDef {
    FieldDef {
        name: Some(ident(name)),
        ty,
        span: fresh_span(),
    }
}

pub fn positional_field(ty: TypeExpr) -> FieldDef {
    FieldDef {
        name: None,
        ty,
        span: fresh_span(),
    }
}

pub fn struct_def(name: &str, generics: Vec<GenericParam>, fields: Vec<FieldDef>) -> StructDef {
    let kind = if fields.is_empty() {
        StructKind::Singleton
    } else if fields.iter().all(|f| f.name.is_none()) {
        StructKind::Positional
    } else {
        StructKind::Named
    };
    StructDef {
        name: ident(name),
        kind,
        generics,
        fields,
        where_clause: Vec::new(),
        is_private: false,
        span: fresh_span(),
    }
}

pub fn union_def(name: &str, generics: Vec<GenericParam>, variants: Vec<TypeExpr>) -> UnionDef {
    UnionDef {
        name: ident(name),
        generics,
        variants,
        where_clause: Vec::new(),
        is_private: false,
        span: fresh_span(),
    }
}

pub fn param(name: &str, ty: TypeExpr) -> Param {
    Param {
        pattern: pat_ident(name),
        ty: Some(ty),
        span: fresh_span(),
    }
}

pub fn untyped_param(name: &str) -> Param {
    Param {
        pattern: pat_ident(name),
        ty: None,
        span: fresh_span(),
    }
}

pub fn signature(name: &str, params: Vec<Param>, return_type: Option<TypeExpr>) -> FunctionSignature {
    FunctionSignature {
        name: ident(name),
        generics: Vec::new(),
        params,
        return_type,
        where_clause: Vec::new(),
        span: fresh_span(),
    }
}

pub fn interface_def(
    name: &str,
    generics: Vec<GenericParam>,
    signatures: Vec<FunctionSignature>,
) -> InterfaceDef {
    InterfaceDef {
        name: ident(name),
        generics,
        signatures,
        where_clause: Vec::new(),
        is_private: false,
        span: fresh_span(),
    }
}

pub fn fn_def(
    name: &str,
    generics: Vec<GenericParam>,
    params: Vec<Param>,
    return_type: Option<TypeExpr>,
    body: Expr,
) -> FunctionDef {
    FunctionDef {
        name: ident(name),
        generics,
        params,
        return_type,
        where_clause: Vec::new(),
        body,
        is_method_shorthand: false,
        is_private: false,
        span: fresh_span(),
    }
}

pub fn impl_def(
    interface: &str,
    interface_args: Vec<TypeExpr>,
    target: TypeExpr,
    definitions: Vec<FunctionDef>,
) -> ImplementationDef {
    ImplementationDef {
        impl_name: None,
        interface: ident(interface),
        interface_args,
        target,
        generics: Vec::new(),
        where_clause: Vec::new(),
        definitions,
        is_private: false,
        span: fresh_span(),
    }
}

pub fn methods_def(target: TypeExpr, definitions: Vec<FunctionDef>) -> MethodsDef {
    MethodsDef {
        target,
        generics: Vec::new(),
        where_clause: Vec::new(),
        definitions,
        span: fresh_span(),
    }
}

macro_rules! into_stmt {
    ($($def:ident => $variant:ident),* $(,)?) => {
        $(impl From<$def> for Stmt {
            fn from(def: $def) -> Self {
                stmt(StmtKind::$variant(def))
            }
        })*
    };
}

into_stmt!(
    StructDef => Struct,
    UnionDef => Union,
    InterfaceDef => Interface,
    FunctionDef => Function,
    ImplementationDef => Implementation,
    MethodsDef => Methods,
);

impl From<Expr> for Stmt {
    fn from(value: Expr) -> Self {
        expr_stmt(value)
    }
}

// Patterns

fn pattern(kind: PatternKind) -> Pattern {
    Pattern::new(kind, fresh_span())
}

pub fn pat_ident(name: &str) -> Pattern {
    pattern(PatternKind::Identifier(ident(name)))
}

pub fn pat_wildcard() -> Pattern {
    pattern(PatternKind::Wildcard)
}

pub fn pat_literal(literal: Literal) -> Pattern {
    pattern(PatternKind::Literal(literal))
}

pub fn pat_struct(name: &str, fields: Vec<(&str, Pattern)>) -> Pattern {
    pattern(PatternKind::Struct {
        struct_name: Some(ident(name)),
        fields: fields
            .into_iter()
            .map(|(field, pattern)| StructPatternField {
                field: Some(ident(field)),
                pattern,
                span: fresh_span(),
            })
            .collect(),
        positional: false,
    })
}

pub fn pat_positional_struct(name: &str, elements: Vec<Pattern>) -> Pattern {
    pattern(PatternKind::Struct {
        struct_name: Some(ident(name)),
        fields: elements
            .into_iter()
            .map(|pattern| StructPatternField {
                field: None,
                pattern,
                span: fresh_span(),
            })
            .collect(),
        positional: true,
    })
}

pub fn pat_array(elements: Vec<Pattern>, rest: Option<&str>) -> Pattern {
    pattern(PatternKind::Array {
        elements,
        rest: rest.map(ident),
    })
}

pub fn pat_typed(inner: Pattern, ty: TypeExpr) -> Pattern {
    pattern(PatternKind::Typed {
        pattern: Box::new(inner),
        ty,
    })
}
