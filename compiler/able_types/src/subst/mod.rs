//! Substitution engine.
//!
//! Pure structural rewriting of `TypeParameter` leaves through a
//! name-to-type map. Used for generic instantiation at call sites and for
//! projecting interface and implementation signatures onto a receiver.

use rustc_hash::FxHashMap;

use crate::obligation::{ConstraintObligation, WhereConstraintSpec};
use crate::types::{FunctionType, StructInstanceType, Type};

/// Type parameter bindings.
pub type Subst = FxHashMap<String, Type>;

/// Rewrite every bound `TypeParameter` in `ty`.
///
/// Declaration-level payloads (`Struct`, `Interface`, `Union`) are left
/// alone; their parameters are scoped to the declaration.
pub fn substitute(ty: &Type, subst: &Subst) -> Type {
    if subst.is_empty() {
        return ty.clone();
    }
    match ty {
        Type::TypeParameter(name) => subst.get(name).cloned().unwrap_or_else(|| ty.clone()),
        Type::Array(inner) => Type::array(substitute(inner, subst)),
        Type::Nullable(inner) => Type::nullable(substitute(inner, subst)),
        Type::Range(inner) => Type::range(substitute(inner, subst)),
        Type::Proc(inner) => Type::proc(substitute(inner, subst)),
        Type::Future(inner) => Type::future(substitute(inner, subst)),
        Type::Applied { base, args } => Type::applied(
            substitute(base, subst),
            args.iter().map(|arg| substitute(arg, subst)).collect(),
        ),
        Type::UnionLiteral(members) => {
            Type::UnionLiteral(members.iter().map(|m| substitute(m, subst)).collect())
        }
        Type::Function(fn_type) => Type::from_function(substitute_function(fn_type, subst)),
        Type::StructInstance(inst) => Type::StructInstance(StructInstanceType {
            name: inst.name.clone(),
            fields: inst
                .fields
                .iter()
                .map(|(name, field)| (name.clone(), substitute(field, subst)))
                .collect(),
            positional: inst.positional.iter().map(|ty| substitute(ty, subst)).collect(),
            type_args: inst.type_args.iter().map(|arg| substitute(arg, subst)).collect(),
        }),
        Type::Primitive(_)
        | Type::Integer(_)
        | Type::Float(_)
        | Type::Struct(_)
        | Type::Interface(_)
        | Type::Union(_)
        | Type::Package(_)
        | Type::Unknown => ty.clone(),
    }
}

/// Substitute through a function signature.
///
/// Type parameters bound by `subst` are dropped from the signature, as are
/// where-clauses on them; their obligations carry the substituted subject.
pub fn substitute_function(fn_type: &FunctionType, subst: &Subst) -> FunctionType {
    if subst.is_empty() {
        return fn_type.clone();
    }
    FunctionType {
        params: fn_type
            .params
            .iter()
            .map(|param| substitute(param, subst))
            .collect(),
        ret: Box::new(substitute(&fn_type.ret, subst)),
        type_params: fn_type
            .type_params
            .iter()
            .filter(|param| !subst.contains_key(&param.name))
            .cloned()
            .collect(),
        where_clause: substitute_where(&fn_type.where_clause, subst),
        obligations: substitute_obligations(&fn_type.obligations, subst),
    }
}

/// Drop clauses on bound parameters and substitute the rest.
pub fn substitute_where(clauses: &[WhereConstraintSpec], subst: &Subst) -> Vec<WhereConstraintSpec> {
    clauses
        .iter()
        .filter(|clause| !subst.contains_key(&clause.type_param))
        .map(|clause| WhereConstraintSpec {
            type_param: clause.type_param.clone(),
            constraints: clause
                .constraints
                .iter()
                .map(|c| substitute(c, subst))
                .collect(),
        })
        .collect()
}

/// Substitute subjects and constraints.
///
/// An `Unknown` subject is filled from its own type parameter's binding.
pub fn substitute_obligations(
    obligations: &[ConstraintObligation],
    subst: &Subst,
) -> Vec<ConstraintObligation> {
    obligations
        .iter()
        .map(|ob| {
            let subject = if ob.subject.is_unknown() {
                subst.get(&ob.type_param).cloned().unwrap_or(Type::Unknown)
            } else {
                substitute(&ob.subject, subst)
            };
            ConstraintObligation {
                subject,
                constraint: substitute(&ob.constraint, subst),
                ..ob.clone()
            }
        })
        .collect()
}

/// Fill placeholder subjects with a concrete receiver.
pub fn populate_obligation_subjects(
    obligations: &[ConstraintObligation],
    subject: &Type,
) -> Vec<ConstraintObligation> {
    if subject.is_unknown() {
        return obligations.to_vec();
    }
    obligations
        .iter()
        .map(|ob| {
            let mut ob = ob.clone();
            if ob.subject.is_unknown() {
                ob.subject = subject.clone();
            }
            ob
        })
        .collect()
}

/// Build a substitution from parallel name and argument lists.
///
/// Extra names map to `Unknown`; extra arguments are ignored.
pub fn zip_subst<'a>(names: impl IntoIterator<Item = &'a str>, args: &[Type]) -> Subst {
    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            (
                name.to_string(),
                args.get(i).cloned().unwrap_or(Type::Unknown),
            )
        })
        .collect()
}
