//! Per-module checking state.
//!
//! Every `check_module` call builds a fresh [`ModuleState`]; nothing here
//! outlives the module it describes except as the checker's read-only
//! record of the last run.

use able_diagnostic::Diagnostic;
use able_ir::Span;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::LookupMode;
use crate::env::TypeEnv;
use crate::obligation::ConstraintObligation;
use crate::registry::{ImplementationSpec, MethodSetSpec};
use crate::types::{StructType, Type};

/// A public declaration recorded for export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ExportRecord {
    pub name: String,
    pub span: Span,
}

/// Type names and constraints introduced by one generic declaration body.
#[derive(Clone, Debug, Default)]
pub(crate) struct GenericScope {
    /// Local type names: parameters map to themselves, `Self` to the target.
    pub types: FxHashMap<String, Type>,
    /// Interface constraints per type parameter.
    pub constraints: FxHashMap<String, Vec<Type>>,
}

/// Mutable state of one module check.
#[derive(Clone, Debug, Default)]
pub(crate) struct ModuleState {
    /// Module-level declarations; parent is the prelude or builtin scope.
    pub global: TypeEnv,
    /// Builtin and prelude entries come first.
    pub implementations: Vec<ImplementationSpec>,
    pub method_sets: Vec<MethodSetSpec>,
    /// Deferred proofs, discharged once after every statement is checked.
    pub obligations: Vec<ConstraintObligation>,
    pub diagnostics: Vec<Diagnostic>,
    pub inferred: FxHashMap<Span, Type>,
    pub exports: Vec<ExportRecord>,
    /// Type declarations of the module not yet bound during collection.
    pub pending_types: FxHashSet<String>,
    /// Number of leading `implementations` entries not declared by the module.
    pub inherited_impls: usize,
    /// Number of leading `method_sets` entries not declared by the module.
    pub inherited_method_sets: usize,
    pub lookup_mode: LookupMode,
    /// Enclosing generic bodies, innermost last.
    pub generic_stack: Vec<GenericScope>,
    /// Declared return type of each enclosing function or lambda.
    pub return_stack: Vec<Type>,
    pub loop_depth: usize,
    pub async_depth: usize,
}

impl ModuleState {
    pub fn new(global: TypeEnv, lookup_mode: LookupMode) -> Self {
        ModuleState {
            global,
            lookup_mode,
            ..ModuleState::default()
        }
    }

    #[inline]
    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::trace!(message = %diagnostic.message, "diagnostic");
        self.diagnostics.push(diagnostic);
    }

    pub fn record(&mut self, span: Span, ty: &Type) {
        self.inferred.insert(span, ty.clone());
    }

    /// Look up a declared struct by name in module scope.
    pub fn lookup_struct(&self, name: &str) -> Option<&StructType> {
        match self.global.lookup(name)? {
            Type::Struct(st) => Some(st),
            _ => None,
        }
    }

    /// Innermost recorded constraints for a type parameter in scope.
    pub fn type_param_constraints(&self, name: &str) -> Option<&[Type]> {
        self.generic_stack
            .iter()
            .rev()
            .find_map(|scope| scope.constraints.get(name))
            .map(Vec::as_slice)
    }

    /// Local type names visible in the current body, inner scopes winning.
    pub fn local_type_scope(&self) -> FxHashMap<String, Type> {
        let mut scope = FxHashMap::default();
        for frame in &self.generic_stack {
            for (name, ty) in &frame.types {
                scope.insert(name.clone(), ty.clone());
            }
        }
        scope
    }

    pub fn module_implementations(&self) -> &[ImplementationSpec] {
        self.implementations
            .get(self.inherited_impls..)
            .unwrap_or_default()
    }

    pub fn module_method_sets(&self) -> &[MethodSetSpec] {
        self.method_sets
            .get(self.inherited_method_sets..)
            .unwrap_or_default()
    }
}
