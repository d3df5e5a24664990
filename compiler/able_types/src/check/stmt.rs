//! Statement checking: bindings, control transfer, loops, and bodies of
//! functions, implementations, and method sets.

use std::mem;

use able_diagnostic::Diagnostic;
use able_ir::ast::{AssignOp, DynImport, FunctionDef, ImplementationDef, MethodsDef};
use able_ir::{Expr, Pattern, PatternKind, Span, Stmt, StmtKind};

use crate::collect::TypeScope;
use crate::config::LookupMode;
use crate::env::TypeEnv;
use crate::obligation::obligations_from_specs;
use crate::registry::implementation_label;
use crate::state::ModuleState;
use crate::subst::{populate_obligation_subjects, substitute_obligations, Subst};
use crate::types::{FunctionType, Type};

impl ModuleState {
    /// Module-level statement. Functions, implementations, and method sets
    /// were collected already; only their bodies are checked here.
    pub(super) fn check_top_level(&mut self, stmt: &Stmt, env: &mut TypeEnv) {
        match &stmt.kind {
            StmtKind::Function(def) => {
                let signature = self.definition_signature(def, &TypeScope::default());
                self.check_function_body(def, &signature, env);
            }
            StmtKind::Implementation(def) => self.check_implementation(def, env),
            StmtKind::Methods(def) => self.check_method_set(def, env),
            StmtKind::Struct(_) | StmtKind::Union(_) | StmtKind::Interface(_) => {}
            _ => self.check_statement(stmt, env),
        }
    }

    pub(crate) fn check_statement(&mut self, stmt: &Stmt, env: &mut TypeEnv) {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.check_expr(expr, env);
            }
            StmtKind::Assign { op, target, value } => {
                self.check_assignment(*op, target, value, env, stmt.span);
            }
            StmtKind::Return(value) => self.check_return(value.as_ref(), env, stmt.span),
            StmtKind::While { condition, body } => {
                let condition_type = self.check_expr(condition, env);
                if !condition_type.is_deferred() && !condition_type.is_bool() {
                    self.report(Diagnostic::compatibility(
                        condition.span,
                        format!("typechecker: while condition must be bool (got {condition_type})"),
                    ));
                }
                self.check_loop_body(body, env);
            }
            StmtKind::For {
                pattern,
                iterable,
                body,
            } => {
                let iterable_type = self.check_expr(iterable, env);
                let element = self.loop_element(&iterable_type, iterable.span);
                let mut scope = env.child();
                self.bind_pattern(pattern, &element, &mut scope);
                self.check_loop_body(body, &scope);
            }
            StmtKind::Break(value) => {
                if let Some(value) = value {
                    self.check_expr(value, env);
                }
                if self.loop_depth == 0 {
                    self.report(Diagnostic::context(
                        stmt.span,
                        "typechecker: break statement outside loop",
                    ));
                }
            }
            StmtKind::Continue => {
                if self.loop_depth == 0 {
                    self.report(Diagnostic::context(
                        stmt.span,
                        "typechecker: continue statement outside loop",
                    ));
                }
            }
            StmtKind::Function(def) => self.check_local_function(def, env),
            StmtKind::DynImport(import) => self.bind_dynamic_import(import, env),
            // Type declarations, implementations, and method sets only take
            // effect at module scope.
            StmtKind::Struct(_)
            | StmtKind::Union(_)
            | StmtKind::Interface(_)
            | StmtKind::Implementation(_)
            | StmtKind::Methods(_) => {}
        }
    }

    fn check_loop_body(&mut self, body: &Expr, env: &TypeEnv) {
        self.loop_depth += 1;
        self.check_expr(body, env);
        self.loop_depth -= 1;
    }

    fn loop_element(&mut self, iterable: &Type, span: Span) -> Type {
        if let Some(element) = iterable.iterable_element() {
            return element;
        }
        if let Some((iface, args)) = iterable.as_interface() {
            if iface.name == "Iterable" {
                return args.first().cloned().unwrap_or(Type::Unknown);
            }
        }
        if !iterable.is_type_parameter() {
            self.report(Diagnostic::compatibility(
                span,
                format!("typechecker: for loop expects an iterable (got {iterable})"),
            ));
        }
        Type::Unknown
    }

    fn check_assignment(
        &mut self,
        op: AssignOp,
        target: &Pattern,
        value: &Expr,
        env: &mut TypeEnv,
        span: Span,
    ) {
        match op {
            AssignOp::Declare => {
                let mut names = Vec::new();
                pattern_names(target, &mut names);
                let fresh: Vec<&str> = names
                    .iter()
                    .copied()
                    .filter(|name| !env.is_bound_locally(name))
                    .collect();
                if !names.is_empty() && fresh.is_empty() {
                    self.report(Diagnostic::structural(
                        span,
                        "typechecker: ':=' requires at least one new binding",
                    ));
                }
                // Bound before the value is checked so recursive lambdas resolve.
                for name in fresh {
                    env.define(name, Type::Unknown);
                }
                let value_type = self.check_expr(value, env);
                self.bind_pattern(target, &value_type, env);
            }
            AssignOp::Assign => {
                let value_type = self.check_expr(value, env);
                let PatternKind::Identifier(ident) = &target.kind else {
                    self.bind_pattern(target, &value_type, env);
                    return;
                };
                match env.lookup(ident.as_str()).cloned() {
                    Some(existing) => {
                        if !existing.is_unknown()
                            && !value_type.is_unknown()
                            && !self.accepts(&value_type, &existing)
                        {
                            self.report(Diagnostic::compatibility(
                                span,
                                format!(
                                    "typechecker: cannot assign {value_type} to '{}' (expected {existing})",
                                    ident.as_str()
                                ),
                            ));
                        }
                    }
                    None => env.define(ident.as_str(), value_type),
                }
            }
        }
    }

    fn check_return(&mut self, value: Option<&Expr>, env: &TypeEnv, span: Span) {
        let actual = value.map(|value| self.check_expr(value, env));
        let Some(expected) = self.return_stack.last().cloned() else {
            self.report(Diagnostic::context(
                span,
                "typechecker: return statement outside function",
            ));
            return;
        };
        if expected.is_unknown() || expected.is_void() {
            return;
        }
        match actual {
            None => self.report(Diagnostic::compatibility(
                span,
                format!("typechecker: return expects {expected}, got void"),
            )),
            Some(actual) if !actual.is_unknown() && !self.accepts(&actual, &expected) => {
                self.report(Diagnostic::compatibility(
                    span,
                    format!("typechecker: return expects {expected}, got {actual}"),
                ));
            }
            Some(_) => {}
        }
    }

    /// `dynimport` names are resolved at run time; a wildcard makes every
    /// later unresolved identifier `Unknown`.
    fn bind_dynamic_import(&mut self, import: &DynImport, env: &mut TypeEnv) {
        if import.wildcard {
            tracing::debug!("wildcard dynimport: permissive lookup");
            self.lookup_mode = LookupMode::Permissive;
        }
        if let Some(alias) = &import.alias {
            env.define(alias.as_str(), Type::Unknown);
        }
        for selector in &import.selectors {
            env.define(selector.local_name().as_str(), Type::Unknown);
        }
    }

    /// Bind every function declared directly in `stmts` so bodies may call
    /// functions declared later in the same block.
    pub(super) fn hoist_local_functions(&self, stmts: &[Stmt], env: &mut TypeEnv) {
        for stmt in stmts {
            if let StmtKind::Function(def) = &stmt.kind {
                env.define(def.name.as_str(), Type::from(self.local_function_signature(def)));
            }
        }
    }

    fn local_function_signature(&self, def: &FunctionDef) -> FunctionType {
        let mut signature = self.definition_signature(def, &self.local_type_scope());
        signature.obligations = obligations_from_specs(
            &format!("fn {}", def.name.as_str()),
            &signature.type_params,
            &signature.where_clause,
            def.span,
        );
        signature
    }

    fn check_local_function(&mut self, def: &FunctionDef, env: &mut TypeEnv) {
        let signature = self.local_function_signature(def);
        env.define(def.name.as_str(), Type::from(signature.clone()));
        self.check_function_body(def, &signature, env);
    }

    pub(crate) fn check_function_body(
        &mut self,
        def: &FunctionDef,
        signature: &FunctionType,
        env: &TypeEnv,
    ) {
        self.enter_generics(&signature.type_params, &signature.where_clause, None);
        let loops = mem::take(&mut self.loop_depth);
        let tasks = mem::take(&mut self.async_depth);

        let mut scope = env.child();
        let mut params = signature.params.iter().cloned();
        if def.is_method_shorthand {
            scope.define("self", params.next().unwrap_or(Type::Unknown));
        }
        for param in &def.params {
            let ty = params.next().unwrap_or(Type::Unknown);
            self.bind_pattern(&param.pattern, &ty, &mut scope);
        }

        let expected = signature.ret.as_ref().clone();
        self.return_stack.push(expected.clone());
        let body = self.check_expr(&def.body, &scope);
        self.return_stack.pop();

        self.loop_depth = loops;
        self.async_depth = tasks;
        self.exit_generics();

        if def.return_type.is_some()
            && !expected.is_unknown()
            && !expected.is_void()
            && !body.is_unknown()
            && !self.accepts(&body, &expected)
        {
            self.report(Diagnostic::compatibility(
                def.body.span,
                format!(
                    "typechecker: function '{}' body returns {body}, expected {expected}",
                    def.name.as_str()
                ),
            ));
        }
    }

    /// The implementation's own where-clause is proven immediately with
    /// `Self` bound to the target; its methods are checked in that scope.
    fn check_implementation(&mut self, def: &ImplementationDef, env: &TypeEnv) {
        if def.interface.as_str().is_empty() {
            return;
        }
        let (type_params, target, scope) = self.receiver_scope(&def.generics, &def.target);
        let where_clause = self.convert_where_clause(&def.where_clause, &scope);

        let label = implementation_label(def.interface.as_str(), &target);
        let obligations = obligations_from_specs(&label, &type_params, &where_clause, def.span);
        if !obligations.is_empty() {
            let mut subst = Subst::default();
            subst.insert("Self".to_string(), target.clone());
            let own = substitute_obligations(
                &populate_obligation_subjects(&obligations, &target),
                &subst,
            );
            for diagnostic in self.evaluate_obligations(&own) {
                self.report(diagnostic);
            }
        }

        self.enter_generics(&type_params, &where_clause, Some(&target));
        for method in &def.definitions {
            let signature = self.definition_signature(method, &scope);
            self.check_function_body(method, &signature, env);
        }
        self.exit_generics();
    }

    fn check_method_set(&mut self, def: &MethodsDef, env: &TypeEnv) {
        let (type_params, target, scope) = self.receiver_scope(&def.generics, &def.target);
        let where_clause = self.convert_where_clause(&def.where_clause, &scope);

        self.enter_generics(&type_params, &where_clause, Some(&target));
        for method in &def.definitions {
            let signature = self.definition_signature(method, &scope);
            self.check_function_body(method, &signature, env);
        }
        self.exit_generics();
    }
}

/// Names a pattern binds, in source order.
pub(super) fn pattern_names<'p>(pattern: &'p Pattern, out: &mut Vec<&'p str>) {
    match &pattern.kind {
        PatternKind::Identifier(ident) => out.push(ident.as_str()),
        PatternKind::Wildcard | PatternKind::Literal(_) => {}
        PatternKind::Typed { pattern, .. } => pattern_names(pattern, out),
        PatternKind::Struct { fields, .. } => {
            for field in fields {
                pattern_names(&field.pattern, out);
            }
        }
        PatternKind::Array { elements, rest } => {
            for element in elements {
                pattern_names(element, out);
            }
            if let Some(rest) = rest {
                out.push(rest.as_str());
            }
        }
    }
}
