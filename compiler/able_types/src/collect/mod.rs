//! Declaration collection.
//!
//! Two passes over a module's top-level statements: type declarations
//! first, then everything else. Each struct, union, interface, and
//! function is bound in the module scope; implementations
//! and method blocks are registered; every constrained generic parameter
//! and where-clause yields one obligation per constraint with the
//! parameter's own placeholder as subject.
//!
//! Nothing here is proven. Constraints may name interfaces declared later
//! in the module, so obligations wait for the solver.

mod resolve;

pub(crate) use resolve::TypeScope;

use std::collections::BTreeMap;
use std::sync::Arc;

use able_diagnostic::Diagnostic;
use able_ir::ast::{
    FunctionDef, GenericParam, ImplementationDef, InterfaceDef, MethodsDef, StructDef, UnionDef,
    WhereClause,
};
use able_ir::{Module, Span, Stmt, StmtKind, TypeExpr};

use crate::obligation::{obligations_from_specs, GenericParamSpec, WhereConstraintSpec};
use crate::registry::{
    describe_target, implementation_label, method_set_label, ImplementationSpec, MethodSetSpec,
};
use crate::state::{ExportRecord, ModuleState};
use crate::types::{FunctionType, InterfaceType, StructType, Type, UnionType};

/// Name introduced by a struct, union, or interface declaration.
fn declared_type_name(stmt: &Stmt) -> Option<&str> {
    match &stmt.kind {
        StmtKind::Struct(def) => Some(def.name.as_str()),
        StmtKind::Union(def) => Some(def.name.as_str()),
        StmtKind::Interface(def) => Some(def.name.as_str()),
        _ => None,
    }
}

impl ModuleState {
    /// Collect every top-level declaration of `module`.
    ///
    /// Type declarations are bound before any signature is resolved, so a
    /// module's own type wins over a same-named builtin wherever it is
    /// mentioned. Names still unbound resolve to nominal placeholders.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = module.body.len()))]
    pub(crate) fn collect_declarations(&mut self, module: &Module) {
        self.pending_types = module
            .body
            .iter()
            .filter_map(declared_type_name)
            .map(str::to_string)
            .collect();
        let (types, rest): (Vec<&Stmt>, Vec<&Stmt>) = module
            .body
            .iter()
            .partition(|stmt| declared_type_name(stmt).is_some());
        for stmt in types.into_iter().chain(rest) {
            self.collect_statement(stmt);
        }
        self.pending_types.clear();
        self.exports.sort_by_key(|export| export.span);

        tracing::debug!(
            implementations = self.implementations.len(),
            method_sets = self.method_sets.len(),
            obligations = self.obligations.len(),
            "declarations collected"
        );
    }

    fn collect_statement(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Struct(def) => self.collect_struct(def),
            StmtKind::Union(def) => self.collect_union(def),
            StmtKind::Interface(def) => self.collect_interface(def),
            StmtKind::Function(def) => self.collect_function(def),
            StmtKind::Implementation(def) => self.collect_implementation(def),
            StmtKind::Methods(def) => self.collect_method_set(def),
            StmtKind::Expr(_)
            | StmtKind::Assign { .. }
            | StmtKind::Return(_)
            | StmtKind::While { .. }
            | StmtKind::For { .. }
            | StmtKind::Break(_)
            | StmtKind::Continue
            | StmtKind::DynImport(_) => {}
        }
    }

    /// Bind a module-level name; a second binding is diagnosed and dropped.
    fn declare(&mut self, name: &str, ty: Type, span: Span, is_private: bool) {
        if self.global.is_bound_locally(name) {
            self.report(Diagnostic::structural(
                span,
                format!("typechecker: duplicate declaration '{name}'"),
            ));
            return;
        }
        tracing::trace!(name, ty = %ty, "declare");
        self.global.define(name, ty);
        if !is_private {
            self.exports.push(ExportRecord {
                name: name.to_string(),
                span,
            });
        }
    }

    /// Generic parameters and where-clause of a type declaration, plus
    /// their obligations under `owner`.
    fn declaration_generics(
        &mut self,
        owner: &str,
        generics: &[GenericParam],
        where_clause: &[WhereClause],
        span: Span,
    ) -> (Vec<GenericParamSpec>, Vec<WhereConstraintSpec>, TypeScope) {
        let mut scope = TypeScope::default();
        let params = self.convert_generic_params(generics, &mut scope);
        let where_clause = self.convert_where_clause(where_clause, &scope);
        self.obligations
            .extend(obligations_from_specs(owner, &params, &where_clause, span));
        (params, where_clause, scope)
    }

    fn collect_struct(&mut self, def: &StructDef) {
        let owner = format!("struct {}", def.name.as_str());
        let (type_params, where_clause, scope) =
            self.declaration_generics(&owner, &def.generics, &def.where_clause, def.span);

        let mut fields = BTreeMap::new();
        let mut positional = Vec::with_capacity(def.fields.len());
        for field in &def.fields {
            let ty = self.resolve_type_expr(&field.ty, &scope);
            if let Some(name) = &field.name {
                fields.insert(name.name.clone(), ty.clone());
            }
            positional.push(ty);
        }

        let ty = Type::Struct(Arc::new(StructType {
            name: def.name.name.clone(),
            type_params,
            fields,
            positional,
            where_clause,
        }));
        self.declare(def.name.as_str(), ty, def.span, def.is_private);
    }

    fn collect_union(&mut self, def: &UnionDef) {
        let owner = format!("union {}", def.name.as_str());
        let (type_params, where_clause, scope) =
            self.declaration_generics(&owner, &def.generics, &def.where_clause, def.span);
        let variants = def
            .variants
            .iter()
            .map(|variant| self.resolve_type_expr(variant, &scope))
            .collect();

        let ty = Type::Union(Arc::new(UnionType {
            name: def.name.name.clone(),
            type_params,
            where_clause,
            variants,
        }));
        self.declare(def.name.as_str(), ty, def.span, def.is_private);
    }

    fn collect_interface(&mut self, def: &InterfaceDef) {
        let owner = format!("interface {}", def.name.as_str());
        let (type_params, where_clause, mut scope) =
            self.declaration_generics(&owner, &def.generics, &def.where_clause, def.span);
        scope
            .entry("Self".to_string())
            .or_insert_with(|| Type::param("Self"));

        let mut methods = BTreeMap::new();
        for sig in &def.signatures {
            let name = sig.name.as_str();
            if methods.contains_key(name) {
                self.report(Diagnostic::structural(
                    sig.span,
                    format!("typechecker: duplicate interface method '{name}'"),
                ));
                continue;
            }
            let fn_type = self.interface_method_signature(sig, &scope);
            methods.insert(name.to_string(), fn_type);
        }

        let ty = Type::Interface(Arc::new(InterfaceType {
            name: def.name.name.clone(),
            type_params,
            where_clause,
            methods,
        }));
        self.declare(def.name.as_str(), ty, def.span, def.is_private);
    }

    fn collect_function(&mut self, def: &FunctionDef) {
        let owner = format!("fn {}", def.name.as_str());
        let fn_type = self.function_with_obligations(def, &TypeScope::default(), &owner);
        self.declare(
            def.name.as_str(),
            Type::from_function(fn_type),
            def.span,
            def.is_private,
        );
    }

    /// Signature of `def` carrying its own obligations, which are also
    /// queued on the module.
    pub(crate) fn function_with_obligations(
        &mut self,
        def: &FunctionDef,
        base: &TypeScope,
        owner: &str,
    ) -> FunctionType {
        let mut fn_type = self.definition_signature(def, base);
        fn_type.obligations =
            obligations_from_specs(owner, &fn_type.type_params, &fn_type.where_clause, def.span);
        self.obligations.extend(fn_type.obligations.iter().cloned());
        fn_type
    }

    /// Scope of an implementation or method block: its parameters, then
    /// `Self` bound to the resolved target.
    pub(crate) fn receiver_scope(
        &self,
        generics: &[GenericParam],
        target: &TypeExpr,
    ) -> (Vec<GenericParamSpec>, Type, TypeScope) {
        let mut scope = TypeScope::default();
        let params = self.convert_generic_params(generics, &mut scope);
        let target = self.resolve_type_expr(target, &scope);
        scope.insert("Self".to_string(), target.clone());
        (params, target, scope)
    }

    fn collect_implementation(&mut self, def: &ImplementationDef) {
        let interface_name = def.interface.as_str();
        if interface_name.is_empty() {
            self.report(Diagnostic::reference(
                def.span,
                "typechecker: implementation requires an interface name",
            ));
            return;
        }

        let (type_params, target, scope) = self.receiver_scope(&def.generics, &def.target);
        let interface_args: Vec<Type> = def
            .interface_args
            .iter()
            .map(|arg| self.resolve_type_expr(arg, &scope))
            .collect();

        self.check_implemented_interface(interface_name, &interface_args, &target, def.span);

        let where_clause = self.convert_where_clause(&def.where_clause, &scope);
        let label = implementation_label(interface_name, &target);

        let mut methods = BTreeMap::new();
        let mut method_spans = BTreeMap::new();
        for method in &def.definitions {
            let name = method.name.as_str();
            if methods.contains_key(name) {
                self.report(Diagnostic::structural(
                    method.span,
                    format!("typechecker: duplicate method '{name}' in implementation"),
                ));
                continue;
            }
            let owner = format!("{label}::{name}");
            let fn_type = self.function_with_obligations(method, &scope, &owner);
            methods.insert(name.to_string(), fn_type);
            method_spans.insert(name.to_string(), method.span);
        }

        let obligations = obligations_from_specs(&label, &type_params, &where_clause, def.span);
        self.obligations.extend(obligations.iter().cloned());

        self.implementations.push(ImplementationSpec {
            impl_name: def.impl_name.as_ref().map(|ident| ident.name.clone()),
            interface_name: interface_name.to_string(),
            type_params,
            target,
            interface_args,
            methods,
            where_clause,
            obligations,
            method_spans,
            span: def.span,
        });
    }

    /// Diagnose an implemented name that is not an interface, or whose
    /// arity disagrees with the supplied arguments.
    fn check_implemented_interface(
        &mut self,
        name: &str,
        args: &[Type],
        target: &Type,
        span: Span,
    ) {
        let expected = match self.global.lookup(name) {
            Some(Type::Interface(iface)) => iface.type_params.len(),
            Some(_) => {
                self.report(Diagnostic::reference(
                    span,
                    format!("typechecker: impl references '{name}' which is not an interface"),
                ));
                0
            }
            None => {
                self.report(Diagnostic::reference(
                    span,
                    format!("typechecker: impl references unknown interface '{name}'"),
                ));
                0
            }
        };

        let provided = args.len();
        let target = describe_target(target);
        if expected == 0 && provided > 0 {
            self.report(Diagnostic::arity(
                span,
                format!("typechecker: impl {name} does not accept type arguments"),
            ));
        } else if expected > 0 && provided == 0 {
            self.report(Diagnostic::arity(
                span,
                format!(
                    "typechecker: impl {name} for {target} requires {expected} interface type argument(s)"
                ),
            ));
        } else if expected > 0 && provided != expected {
            self.report(Diagnostic::arity(
                span,
                format!(
                    "typechecker: impl {name} for {target} expected {expected} interface type argument(s), got {provided}"
                ),
            ));
        }
    }

    fn collect_method_set(&mut self, def: &MethodsDef) {
        let (type_params, target, scope) = self.receiver_scope(&def.generics, &def.target);
        let where_clause = self.convert_where_clause(&def.where_clause, &scope);
        let label = method_set_label(&target);

        let mut methods = BTreeMap::new();
        for method in &def.definitions {
            let name = method.name.as_str();
            if methods.contains_key(name) {
                self.report(Diagnostic::structural(
                    method.span,
                    format!("typechecker: duplicate method '{name}' for target"),
                ));
                continue;
            }
            let owner = format!("{label}::{name}");
            let fn_type = self.function_with_obligations(method, &scope, &owner);
            methods.insert(name.to_string(), fn_type);
        }

        let obligations = obligations_from_specs(&label, &type_params, &where_clause, def.span);
        self.obligations.extend(obligations.iter().cloned());

        self.method_sets.push(MethodSetSpec {
            type_params,
            target,
            methods,
            where_clause,
            obligations,
            span: def.span,
        });
    }
}
