//! Expression checking.
//!
//! Every expression yields a type; a failed check reports a diagnostic and
//! yields `Unknown` so checking continues. Each result is recorded against
//! the expression's span.

mod calls;
mod operators;
mod structs;

use std::mem;

use able_diagnostic::Diagnostic;
use able_ir::ast::{GenericParam, InterpolationPart, MatchClause, MemberKey, OrClause, Param};
use able_ir::{Expr, ExprKind, Literal, Span, Stmt, StmtKind, TypeExpr};

use crate::config::LookupMode;
use crate::env::TypeEnv;
use crate::relate::{build_union, merge_branch_types};
use crate::state::ModuleState;
use crate::types::{FunctionType, Type};

use structs::StructLiteral;

impl ModuleState {
    pub(crate) fn check_expr(&mut self, expr: &Expr, env: &TypeEnv) -> Type {
        let ty = self.infer_expr(expr, env);
        self.record(expr.span, &ty);
        ty
    }

    fn infer_expr(&mut self, expr: &Expr, env: &TypeEnv) -> Type {
        match &expr.kind {
            ExprKind::Literal(literal) => literal_type(literal),
            ExprKind::Identifier(ident) => self.check_identifier(ident.as_str(), expr.span, env),
            ExprKind::Array(elements) => self.check_array(elements, env),
            ExprKind::Block(stmts) => self.check_block(stmts, env),
            ExprKind::If {
                condition,
                body,
                or_clauses,
            } => self.check_if(condition, body, or_clauses, env),
            ExprKind::Unary { op, operand } => self.check_unary(*op, operand, expr.span, env),
            ExprKind::Binary { op, left, right } => {
                self.check_binary(*op, left, right, expr.span, env)
            }
            ExprKind::Lambda {
                generics,
                params,
                return_type,
                body,
            } => self.check_lambda(generics, params, return_type.as_ref(), body, env),
            ExprKind::Call {
                callee,
                type_args,
                args,
            } => self.check_call(callee, type_args, args, expr.span, env),
            ExprKind::Member { object, member } => {
                self.check_member(object, member, expr.span, env)
            }
            ExprKind::Index { object, index } => self.check_index(object, index, env),
            ExprKind::StructLiteral {
                name,
                type_args,
                fields,
                positional,
                update_sources,
            } => {
                let literal = StructLiteral {
                    name: name.as_ref(),
                    type_args,
                    fields,
                    positional: *positional,
                    update_sources,
                };
                self.check_struct_literal(&literal, expr.span, env)
            }
            ExprKind::Match { subject, clauses } => self.check_match(subject, clauses, env),
            ExprKind::Range { start, end, .. } => {
                let start = self.check_expr(start, env);
                let end = self.check_expr(end, env);
                Type::range(if start.is_unknown() { end } else { start })
            }
            ExprKind::Interpolation(parts) => {
                for part in parts {
                    if let InterpolationPart::Expr(part) = part {
                        self.check_expr(part, env);
                    }
                }
                Type::string()
            }
            ExprKind::Proc(body) => Type::proc(self.check_async_body(body, env)),
            ExprKind::Spawn(body) => Type::future(self.check_async_body(body, env)),
            ExprKind::Propagate(inner) => {
                let inner = self.check_expr(inner, env);
                propagated_type(&inner)
            }
        }
    }

    fn check_identifier(&mut self, name: &str, span: Span, env: &TypeEnv) -> Type {
        if let Some(ty) = env.lookup(name) {
            return ty.clone();
        }
        if self.lookup_mode == LookupMode::Strict {
            self.report(Diagnostic::reference(
                span,
                format!("typechecker: undefined identifier '{name}'"),
            ));
        }
        Type::Unknown
    }

    fn check_array(&mut self, elements: &[Expr], env: &TypeEnv) -> Type {
        let types: Vec<Type> = elements
            .iter()
            .map(|element| self.check_expr(element, env))
            .collect();
        let merged = merge_branch_types(&types);
        let element = if merged.is_unknown() {
            build_union(&types)
        } else {
            merged
        };
        Type::array(element)
    }

    /// The value of a block is that of its last statement when that is an
    /// expression or an assignment.
    pub(crate) fn check_block(&mut self, stmts: &[Stmt], env: &TypeEnv) -> Type {
        let mut scope = env.child();
        self.hoist_local_functions(stmts, &mut scope);
        let mut result = Type::Unknown;
        for stmt in stmts {
            result = match &stmt.kind {
                StmtKind::Expr(expr) => self.check_expr(expr, &scope),
                StmtKind::Assign { value, .. } => {
                    self.check_statement(stmt, &mut scope);
                    self.inferred.get(&value.span).cloned().unwrap_or(Type::Unknown)
                }
                StmtKind::Return(_) => {
                    self.check_statement(stmt, &mut scope);
                    return Type::Unknown;
                }
                _ => {
                    self.check_statement(stmt, &mut scope);
                    Type::Unknown
                }
            };
        }
        result
    }

    fn check_condition(&mut self, condition: &Expr, env: &TypeEnv, message: &str) {
        let ty = self.check_expr(condition, env);
        if !ty.is_deferred() && !ty.is_bool() {
            self.report(Diagnostic::compatibility(
                condition.span,
                format!("typechecker: {message}"),
            ));
        }
    }

    fn check_if(
        &mut self,
        condition: &Expr,
        body: &Expr,
        or_clauses: &[OrClause],
        env: &TypeEnv,
    ) -> Type {
        self.check_condition(condition, env, "if condition must be bool");
        let mut branches = vec![self.check_expr(body, env)];
        for clause in or_clauses {
            if let Some(condition) = &clause.condition {
                self.check_condition(condition, env, "if-or condition must be bool");
            }
            branches.push(self.check_expr(&clause.body, env));
        }
        merge_branch_types(&branches)
    }

    fn check_match(&mut self, subject: &Expr, clauses: &[MatchClause], env: &TypeEnv) -> Type {
        let subject = self.check_expr(subject, env);
        let mut branches = Vec::with_capacity(clauses.len());
        for clause in clauses {
            let mut scope = env.child();
            self.bind_pattern(&clause.pattern, &subject, &mut scope);
            if let Some(guard) = &clause.guard {
                self.check_condition(guard, &scope, "match guard must evaluate to bool");
            }
            branches.push(self.check_expr(&clause.body, &scope));
        }
        merge_branch_types(&branches)
    }

    fn check_lambda(
        &mut self,
        generics: &[GenericParam],
        params: &[Param],
        return_type: Option<&TypeExpr>,
        body: &Expr,
        env: &TypeEnv,
    ) -> Type {
        let mut type_scope = self.local_type_scope();
        let type_params = self.convert_generic_params(generics, &mut type_scope);
        self.enter_generics(&type_params, &[], None);

        let mut scope = env.child();
        let mut param_types = Vec::with_capacity(params.len());
        for param in params {
            let ty = self.resolve_annotation(param.ty.as_ref(), &type_scope);
            self.bind_pattern(&param.pattern, &ty, &mut scope);
            param_types.push(ty);
        }
        let declared = return_type.map(|ty| self.resolve_type_expr(ty, &type_scope));

        let loops = mem::take(&mut self.loop_depth);
        self.return_stack
            .push(declared.clone().unwrap_or(Type::Unknown));
        let body_type = self.check_expr(body, &scope);
        self.return_stack.pop();
        self.loop_depth = loops;
        self.exit_generics();

        if let Some(expected) = &declared {
            if !expected.is_unknown()
                && !expected.is_void()
                && !body_type.is_unknown()
                && !self.accepts(&body_type, expected)
            {
                self.report(Diagnostic::compatibility(
                    body.span,
                    format!("typechecker: lambda body returns {body_type}, expected {expected}"),
                ));
            }
        }

        Type::from(FunctionType {
            params: param_types,
            ret: Box::new(declared.unwrap_or(body_type)),
            type_params,
            ..FunctionType::default()
        })
    }

    fn check_member(&mut self, object: &Expr, member: &MemberKey, span: Span, env: &TypeEnv) -> Type {
        let object = self.check_expr(object, env);
        match self.resolve_member(&object, member, span) {
            Ok(ty) => ty,
            Err(diagnostic) => {
                self.report(diagnostic);
                Type::Unknown
            }
        }
    }

    fn check_index(&mut self, object: &Expr, index: &Expr, env: &TypeEnv) -> Type {
        let object_type = self.check_expr(object, env);
        let index_type = self.check_expr(index, env);
        if object_type.is_deferred() {
            return Type::Unknown;
        }
        let Some(element) = object_type.array_element() else {
            self.report(Diagnostic::compatibility(
                object.span,
                format!("typechecker: cannot index into type {object_type}"),
            ));
            return Type::Unknown;
        };
        if !index_type.is_deferred() && !index_type.is_integer() {
            self.report(Diagnostic::compatibility(
                index.span,
                "typechecker: index must be an integer",
            ));
        }
        element
    }

    fn check_async_body(&mut self, body: &Expr, env: &TypeEnv) -> Type {
        self.async_depth += 1;
        let loops = mem::take(&mut self.loop_depth);
        let result = self.check_expr(body, env);
        self.loop_depth = loops;
        self.async_depth -= 1;
        result
    }
}

fn literal_type(literal: &Literal) -> Type {
    match literal {
        Literal::Integer { suffix, .. } => suffix.map_or_else(Type::i32, Type::Integer),
        Literal::Float { suffix, .. } => suffix.map_or_else(Type::f64, Type::Float),
        Literal::Bool(_) => Type::bool(),
        Literal::String(_) => Type::string(),
        Literal::Char(_) => Type::char(),
        Literal::Nil => Type::nil(),
    }
}

/// Success type of `expr!`: the error arm is returned to the caller.
fn propagated_type(ty: &Type) -> Type {
    match ty {
        Type::Nullable(inner) => inner.as_ref().clone(),
        Type::UnionLiteral(members) => {
            let success: Vec<&Type> = members.iter().filter(|member| !is_error_type(member)).collect();
            build_union(success)
        }
        Type::Applied { args, .. }
            if ty.union_name() == Some("Result") || ty.struct_name() == Some("Result") =>
        {
            args.first().cloned().unwrap_or(Type::Unknown)
        }
        _ => ty.clone(),
    }
}

fn is_error_type(ty: &Type) -> bool {
    matches!(ty.struct_name(), Some("ProcError" | "Error"))
        || matches!(ty.as_interface(), Some((iface, _)) if iface.name == "Error")
}

#[cfg(test)]
mod tests {
    use crate::types::IntegerSuffix;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn literal_defaults() {
        assert_eq!(
            literal_type(&Literal::Integer {
                value: 1,
                suffix: None
            }),
            Type::i32()
        );
        assert_eq!(
            literal_type(&Literal::Integer {
                value: 1,
                suffix: Some(IntegerSuffix::U8)
            }),
            Type::Integer(IntegerSuffix::U8)
        );
        assert_eq!(
            literal_type(&Literal::Float {
                value: 1.5,
                suffix: None
            }),
            Type::f64()
        );
        assert_eq!(literal_type(&Literal::Nil), Type::nil());
    }

    #[test]
    fn propagation_strips_the_error_arm() {
        let proc_error = Type::nominal("ProcError");
        let union = Type::UnionLiteral(vec![Type::string(), proc_error]);
        assert_eq!(propagated_type(&union), Type::string());
        assert_eq!(propagated_type(&Type::nullable(Type::i32())), Type::i32());
        assert_eq!(propagated_type(&Type::bool()), Type::bool());
        let result = Type::applied(Type::nominal("Result"), vec![Type::i32()]);
        assert_eq!(propagated_type(&result), Type::i32());
    }
}
