//! Type-expression resolution.
//!
//! Turns source type syntax into [`Type`] under a locally threaded scope of
//! type names (generic parameters, `Self`). Names that resolve to nothing
//! become nominal struct placeholders so later passes can still look them
//! up by name once every declaration is known.

use std::str::FromStr;

use able_ir::ast::{FunctionDef, FunctionSignature, GenericParam, Param, WhereClause};
use able_ir::{TypeExpr, TypeExprKind};
use rustc_hash::FxHashMap;

use crate::obligation::{GenericParamSpec, WhereConstraintSpec};
use crate::state::ModuleState;
use crate::types::{FloatSuffix, FunctionType, IntegerSuffix, PrimitiveKind, Type};

/// Local type names in scope while resolving one declaration.
pub(crate) type TypeScope = FxHashMap<String, Type>;

impl ModuleState {
    /// Resolve a type expression under `scope`.
    pub(crate) fn resolve_type_expr(&self, expr: &TypeExpr, scope: &TypeScope) -> Type {
        match &expr.kind {
            TypeExprKind::Simple(ident) => self.resolve_type_name(ident.as_str(), scope),
            TypeExprKind::Generic { base, args } => {
                let base = self.resolve_type_expr(base, scope);
                let args: Vec<Type> = args
                    .iter()
                    .map(|arg| self.resolve_type_expr(arg, scope))
                    .collect();
                if base.struct_name() == Some("Array") {
                    return Type::array(args.into_iter().next().unwrap_or(Type::Unknown));
                }
                Type::applied(base, args)
            }
            TypeExprKind::Function { params, ret } => Type::function(
                params
                    .iter()
                    .map(|param| self.resolve_type_expr(param, scope))
                    .collect(),
                self.resolve_type_expr(ret, scope),
            ),
            TypeExprKind::Nullable(inner) => Type::nullable(self.resolve_type_expr(inner, scope)),
            TypeExprKind::Result(inner) => Type::applied(
                Type::nominal("Result"),
                vec![self.resolve_type_expr(inner, scope)],
            ),
            TypeExprKind::Union(members) => Type::UnionLiteral(
                members
                    .iter()
                    .map(|member| self.resolve_type_expr(member, scope))
                    .collect(),
            ),
            TypeExprKind::Wildcard => Type::Unknown,
        }
    }

    /// Resolve an optional annotation; a missing one is `Unknown`.
    pub(crate) fn resolve_annotation(&self, expr: Option<&TypeExpr>, scope: &TypeScope) -> Type {
        expr.map_or(Type::Unknown, |expr| self.resolve_type_expr(expr, scope))
    }

    fn resolve_type_name(&self, name: &str, scope: &TypeScope) -> Type {
        if let Some(local) = scope.get(name) {
            return local.clone();
        }
        if let Some(kind) = PrimitiveKind::from_name(name) {
            return Type::Primitive(kind);
        }
        if let Ok(suffix) = IntegerSuffix::from_str(name) {
            return Type::Integer(suffix);
        }
        if let Ok(suffix) = FloatSuffix::from_str(name) {
            return Type::Float(suffix);
        }
        if self.pending_types.contains(name) && !self.global.is_bound_locally(name) {
            return Type::nominal(name);
        }
        match self.global.lookup(name) {
            Some(declared) => declared.clone(),
            None => Type::nominal(name),
        }
    }

    /// Convert generic parameters, extending `scope` with each parameter
    /// before its own constraints are resolved.
    pub(crate) fn convert_generic_params(
        &self,
        params: &[GenericParam],
        scope: &mut TypeScope,
    ) -> Vec<GenericParamSpec> {
        let mut specs = Vec::with_capacity(params.len());
        for param in params {
            let name = param.name.as_str();
            scope.insert(name.to_string(), Type::param(name));
            let constraints = param
                .constraints
                .iter()
                .map(|constraint| self.resolve_type_expr(constraint, scope))
                .collect();
            specs.push(GenericParamSpec::new(name, constraints));
        }
        specs
    }

    pub(crate) fn convert_where_clause(
        &self,
        clauses: &[WhereClause],
        scope: &TypeScope,
    ) -> Vec<WhereConstraintSpec> {
        clauses
            .iter()
            .map(|clause| WhereConstraintSpec {
                type_param: clause.type_param.name.clone(),
                constraints: clause
                    .constraints
                    .iter()
                    .map(|constraint| self.resolve_type_expr(constraint, scope))
                    .collect(),
            })
            .collect()
    }

    /// Signature of an interface method. Obligations are not attached.
    pub(crate) fn interface_method_signature(
        &self,
        sig: &FunctionSignature,
        base: &TypeScope,
    ) -> FunctionType {
        self.signature_from_parts(
            &sig.generics,
            &sig.params,
            sig.return_type.as_ref(),
            &sig.where_clause,
            false,
            base,
        )
    }

    /// Signature of a function definition, without obligations.
    pub(crate) fn definition_signature(&self, def: &FunctionDef, base: &TypeScope) -> FunctionType {
        self.signature_from_parts(
            &def.generics,
            &def.params,
            def.return_type.as_ref(),
            &def.where_clause,
            def.is_method_shorthand,
            base,
        )
    }

    fn signature_from_parts(
        &self,
        generics: &[GenericParam],
        params: &[Param],
        return_type: Option<&TypeExpr>,
        where_clause: &[WhereClause],
        shorthand_receiver: bool,
        base: &TypeScope,
    ) -> FunctionType {
        let mut scope = base.clone();
        let type_params = self.convert_generic_params(generics, &mut scope);
        let self_type = scope.get("Self").cloned();

        let mut param_types = Vec::with_capacity(params.len() + 1);
        if shorthand_receiver {
            param_types.push(self_type.clone().unwrap_or(Type::Unknown));
        }
        for param in params {
            param_types.push(self.parameter_type(param, self_type.as_ref(), &scope));
        }

        FunctionType {
            params: param_types,
            ret: Box::new(self.resolve_annotation(return_type, &scope)),
            type_params,
            where_clause: self.convert_where_clause(where_clause, &scope),
            obligations: Vec::new(),
        }
    }

    /// An unannotated `self` parameter takes the enclosing `Self`.
    fn parameter_type(&self, param: &Param, self_type: Option<&Type>, scope: &TypeScope) -> Type {
        match (&param.ty, self_type) {
            (Some(ty), _) => self.resolve_type_expr(ty, scope),
            (None, Some(self_type)) if param.name() == Some("self") => self_type.clone(),
            (None, _) => Type::Unknown,
        }
    }
}
