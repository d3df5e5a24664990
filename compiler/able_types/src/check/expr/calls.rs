//! Call expressions.
//!
//! Generic callees are instantiated against the argument types; the
//! instantiated where-clause obligations are queued for the solver.

use able_diagnostic::Diagnostic;
use able_ir::{Expr, ExprKind, Span, TypeExpr};

use crate::builtins::{PROC_CANCELLED, PROC_YIELD};
use crate::env::TypeEnv;
use crate::state::ModuleState;
use crate::types::{FunctionType, Type};

impl ModuleState {
    pub(super) fn check_call(
        &mut self,
        callee: &Expr,
        type_args: &[TypeExpr],
        args: &[Expr],
        span: Span,
        env: &TypeEnv,
    ) -> Type {
        let callee_type = self.check_expr(callee, env);
        let arg_types: Vec<Type> = args.iter().map(|arg| self.check_expr(arg, env)).collect();
        let arg_spans: Vec<Span> = args.iter().map(|arg| arg.span).collect();
        let explicit: Vec<Type> = type_args.iter().map(|ty| self.resolve_local(ty)).collect();

        if let ExprKind::Identifier(ident) = &callee.kind {
            self.check_async_builtin(ident.as_str(), span, env);
        }

        match &callee_type {
            Type::Function(fn_type) => {
                self.check_function_call(fn_type, &explicit, &arg_types, &arg_spans, span)
            }
            Type::Unknown | Type::TypeParameter(_) => Type::Unknown,
            _ => {
                self.report(Diagnostic::compatibility(
                    callee.span,
                    "typechecker: cannot call non-function value",
                ));
                Type::Unknown
            }
        }
    }

    fn check_function_call(
        &mut self,
        fn_type: &FunctionType,
        explicit: &[Type],
        arg_types: &[Type],
        arg_spans: &[Span],
        span: Span,
    ) -> Type {
        if !explicit.is_empty() && explicit.len() != fn_type.type_params.len() {
            self.report(Diagnostic::arity(
                span,
                format!(
                    "typechecker: function expects {} type arguments, got {}",
                    fn_type.type_params.len(),
                    explicit.len()
                ),
            ));
        }

        let instantiation = self.instantiate_call(fn_type, explicit, arg_types, arg_spans, span);
        for diagnostic in instantiation.diagnostics {
            self.report(diagnostic);
        }
        let signature = instantiation.signature;
        tracing::trace!(
            obligations = signature.obligations.len(),
            "call obligations queued"
        );
        self.obligations
            .extend(signature.obligations.iter().cloned());

        if signature.params.len() != arg_types.len() {
            self.report(Diagnostic::arity(
                span,
                format!(
                    "typechecker: function expects {} arguments, got {}",
                    signature.params.len(),
                    arg_types.len()
                ),
            ));
        }
        for (index, (expected, actual)) in signature.params.iter().zip(arg_types).enumerate() {
            if expected.is_unknown() || actual.is_unknown() || self.accepts(actual, expected) {
                continue;
            }
            let arg_span = arg_spans.get(index).copied().unwrap_or(span);
            self.report(Diagnostic::compatibility(
                arg_span,
                format!(
                    "typechecker: argument {} has type {actual}, expected {expected}",
                    index + 1
                ),
            ));
        }

        signature.ret.as_ref().clone()
    }

    /// Runtime functions that only make sense inside an async task.
    fn check_async_builtin(&mut self, name: &str, span: Span, env: &TypeEnv) {
        if self.async_depth > 0 || !self.is_builtin_binding(name, env) {
            return;
        }
        let message = match name {
            PROC_YIELD => "typechecker: proc_yield() may only be called from within proc or spawn bodies",
            PROC_CANCELLED => "typechecker: proc_cancelled must be called inside an asynchronous task",
            _ => return,
        };
        self.report(Diagnostic::context(span, message));
    }

    /// Whether `name` resolves to the builtin scope, which is always the
    /// root, rather than a binding that shadows it.
    fn is_builtin_binding(&self, name: &str, env: &TypeEnv) -> bool {
        let mut scope = Some(env);
        while let Some(current) = scope {
            if current.is_bound_locally(name) {
                return current.parent().is_none();
            }
            scope = current.parent();
        }
        false
    }
}
