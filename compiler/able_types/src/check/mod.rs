//! Module checking entry point.
//!
//! [`Checker`] runs one module through every pass:
//!
//! 1. validate the input shape (the only fatal failures)
//! 2. collect declarations into a fresh [`ModuleState`]
//! 3. register prelude and builtin implementations ahead of the module's
//! 4. check every statement, queueing call-site obligations
//! 5. solve obligations, then validate implementations
//!
//! The state of the last run is kept for the cross-module surface
//! (`exported_symbols`, `global_env`, ...) until the next call.

mod expr;
mod patterns;
mod stmt;

use able_diagnostic::Diagnostic;
use able_ir::{Ident, Import, Module, Span, StmtKind, TypeExpr};

use crate::builtins::{builtin_env, builtin_implementations};
use crate::config::CheckerConfig;
use crate::env::TypeEnv;
use crate::error::CheckError;
use crate::obligation::{GenericParamSpec, WhereConstraintSpec};
use crate::registry::{ImplementationSpec, MethodSetSpec};
use crate::relate::type_assignable;
use crate::state::{GenericScope, ModuleState};
use crate::subst::{substitute, zip_subst};
use crate::types::Type;

/// A public declaration of the last checked module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedSymbol {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

/// Already-checked dependencies injected ahead of a module.
#[derive(Clone, Debug, Default)]
struct Prelude {
    env: TypeEnv,
    implementations: Vec<ImplementationSpec>,
    method_sets: Vec<MethodSetSpec>,
}

/// Type checker for Able modules.
///
/// Each [`Checker::check_module`] call starts from fresh state; nothing
/// from a previous module leaks into the next.
#[derive(Clone, Debug, Default)]
pub struct Checker {
    config: CheckerConfig,
    prelude: Option<Prelude>,
    state: ModuleState,
}

impl Checker {
    pub fn new() -> Self {
        Checker::default()
    }

    pub fn with_config(config: CheckerConfig) -> Self {
        Checker {
            config,
            ..Checker::default()
        }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Start later modules from a dependency's global scope and registries.
    ///
    /// `env` replaces the builtin scope as the parent of each module's
    /// global scope, so it should itself descend from one (as
    /// [`Checker::global_env`] does).
    pub fn set_prelude(
        &mut self,
        env: TypeEnv,
        implementations: Vec<ImplementationSpec>,
        method_sets: Vec<MethodSetSpec>,
    ) {
        self.prelude = Some(Prelude {
            env,
            implementations,
            method_sets,
        });
    }

    /// Check one module.
    ///
    /// Semantic problems are returned as diagnostics; `Err` is reserved for
    /// input the checker cannot interpret.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = module.body.len()))]
    pub fn check_module(&mut self, module: &Module) -> Result<Vec<Diagnostic>, CheckError> {
        validate_input(module)?;

        let parent = match &self.prelude {
            Some(prelude) => prelude.env.clone(),
            None => builtin_env(self.config.builtin_interfaces),
        };
        let mut state = ModuleState::new(parent.child(), self.config.lookup_mode);
        state.collect_declarations(module);
        self.register_inherited(&mut state);

        state.check_body(module);

        let unsatisfied = state.solve_obligations();
        state.diagnostics.extend(unsatisfied);
        let mismatched = state.validate_implementations();
        state.diagnostics.extend(mismatched);

        tracing::debug!(diagnostics = state.diagnostics.len(), "module checked");
        let diagnostics = state.diagnostics.clone();
        self.state = state;
        Ok(diagnostics)
    }

    /// Put prelude and builtin entries ahead of the module's own.
    fn register_inherited(&self, state: &mut ModuleState) {
        let mut implementations = Vec::new();
        let mut method_sets = Vec::new();
        if let Some(prelude) = &self.prelude {
            implementations.extend(prelude.implementations.iter().cloned());
            method_sets.extend(prelude.method_sets.iter().cloned());
        }
        if self.config.builtin_interfaces {
            let global = &state.global;
            implementations.extend(builtin_implementations(|name| {
                global.is_bound_locally(name)
                    && global.lookup(name).is_some_and(|ty| ty.as_interface().is_some())
            }));
        }

        state.inherited_impls = implementations.len();
        state.inherited_method_sets = method_sets.len();
        implementations.append(&mut state.implementations);
        method_sets.append(&mut state.method_sets);
        state.implementations = implementations;
        state.method_sets = method_sets;
    }

    /// Public declarations of the last checked module.
    pub fn exported_symbols(&self) -> Vec<ExportedSymbol> {
        self.state
            .exports
            .iter()
            .filter_map(|export| {
                let ty = self.state.global.lookup(&export.name)?;
                Some(ExportedSymbol {
                    name: export.name.clone(),
                    ty: ty.clone(),
                    span: export.span,
                })
            })
            .collect()
    }

    /// Implementations declared by the last module, without inherited ones.
    pub fn module_implementations(&self) -> &[ImplementationSpec] {
        self.state.module_implementations()
    }

    /// Method sets declared by the last module, without inherited ones.
    pub fn module_method_sets(&self) -> &[MethodSetSpec] {
        self.state.module_method_sets()
    }

    /// Global scope of the last module; suitable as a dependent's prelude.
    pub fn global_env(&self) -> &TypeEnv {
        &self.state.global
    }

    /// Type inferred for the node at `span`, if one was recorded.
    pub fn inferred_type(&self, span: Span) -> Option<&Type> {
        self.state.inferred.get(&span)
    }
}

/// Check `module` with a default [`Checker`].
pub fn check_module(module: &Module) -> Result<Vec<Diagnostic>, CheckError> {
    Checker::new().check_module(module)
}

fn validate_input(module: &Module) -> Result<(), CheckError> {
    for import in &module.imports {
        validate_import_path(&import.path, import.span)?;
    }
    for stmt in &module.body {
        let name = match &stmt.kind {
            StmtKind::Struct(def) => &def.name,
            StmtKind::Union(def) => &def.name,
            StmtKind::Interface(def) => &def.name,
            StmtKind::Function(def) => &def.name,
            StmtKind::DynImport(import) => {
                validate_import_path(&import.path, stmt.span)?;
                continue;
            }
            _ => continue,
        };
        if name.name.is_empty() {
            return Err(CheckError::EmptyDeclarationName { span: stmt.span });
        }
    }
    Ok(())
}

fn validate_import_path(path: &[Ident], span: Span) -> Result<(), CheckError> {
    if path.is_empty() || path.iter().any(|segment| segment.name.is_empty()) {
        return Err(CheckError::EmptyImportPath { span });
    }
    Ok(())
}

impl ModuleState {
    /// Check every top-level statement in a child of the global scope.
    fn check_body(&mut self, module: &Module) {
        let mut env = self.global.child();
        for import in &module.imports {
            bind_import(import, &mut env);
        }
        for stmt in &module.body {
            self.check_top_level(stmt, &mut env);
        }
    }

    /// Resolve a type annotation inside a body.
    pub(crate) fn resolve_local(&self, expr: &TypeExpr) -> Type {
        self.resolve_type_expr(expr, &self.local_type_scope())
    }

    /// Enter a generic body: its parameters become local type names and
    /// their constraints become visible to member lookup.
    pub(crate) fn enter_generics(
        &mut self,
        params: &[GenericParamSpec],
        where_clause: &[WhereConstraintSpec],
        self_type: Option<&Type>,
    ) {
        let mut scope = GenericScope::default();
        for param in params {
            scope
                .types
                .insert(param.name.clone(), Type::param(&param.name));
            scope
                .constraints
                .entry(param.name.clone())
                .or_default()
                .extend(param.constraints.iter().cloned());
        }
        for clause in where_clause {
            scope
                .constraints
                .entry(clause.type_param.clone())
                .or_default()
                .extend(clause.constraints.iter().cloned());
        }
        if let Some(self_type) = self_type {
            scope.types.insert("Self".to_string(), self_type.clone());
        }
        self.generic_stack.push(scope);
    }

    pub(crate) fn exit_generics(&mut self) {
        self.generic_stack.pop();
    }

    /// Whether a value of type `value` may flow into a slot of type `slot`.
    ///
    /// Extends [`type_assignable`] with interface slots (satisfied by
    /// implementation or method set), declared unions, and `nil` into
    /// nullable slots.
    pub(crate) fn accepts(&self, value: &Type, slot: &Type) -> bool {
        if type_assignable(value, slot) {
            return true;
        }
        if slot.as_interface().is_some() {
            return self.satisfies_constraint(value, slot);
        }
        match slot {
            Type::Nullable(inner) => *value == Type::nil() || self.accepts(value, inner),
            Type::Union(union) => union
                .variants
                .iter()
                .any(|variant| self.accepts(value, variant)),
            Type::Applied { base, args } => match base.as_ref() {
                Type::Union(union) => {
                    let subst = zip_subst(union.type_params.iter().map(|p| p.name.as_str()), args);
                    union
                        .variants
                        .iter()
                        .any(|variant| self.accepts(value, &substitute(variant, &subst)))
                }
                _ => false,
            },
            _ => false,
        }
    }
}

/// Names introduced by a static import are placeholders until the loader
/// supplies them through the prelude.
fn bind_import(import: &Import, env: &mut TypeEnv) {
    let mut placeholder = |name: &str| {
        if !env.is_bound(name) {
            env.define(name, Type::Unknown);
        }
    };
    if let Some(alias) = &import.alias {
        placeholder(alias.as_str());
        return;
    }
    if !import.wildcard && import.selectors.is_empty() {
        if let Some(last) = import.path.last() {
            placeholder(last.as_str());
        }
        return;
    }
    for selector in &import.selectors {
        placeholder(selector.local_name().as_str());
    }
}


#[cfg(test)]
mod integration_tests;
