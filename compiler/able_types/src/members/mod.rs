//! Member access and method lookup.
//!
//! Struct fields win over methods. Methods come from two pools: explicit
//! implementations and inherent method sets. Each pool keeps its most
//! specific candidate by target score; across pools the implementation
//! wins unless the method set scored strictly higher.

use std::collections::BTreeMap;

use able_diagnostic::Diagnostic;
use able_ir::ast::MemberKey;
use able_ir::Span;

use crate::obligation::ConstraintObligation;
use crate::registry::describe_target;
use crate::relate::same_type;
use crate::state::ModuleState;
use crate::subst::{
    populate_obligation_subjects, substitute, substitute_function, substitute_obligations,
    zip_subst, Subst,
};
use crate::types::{FunctionType, Type};
use crate::unify::{match_method_target, receiver_name};

/// A method found in one pool, with its target specificity.
struct Candidate {
    method: FunctionType,
    score: usize,
}

fn keep_best(best: &mut Option<Candidate>, candidate: Candidate) {
    let better = match best {
        Some(current) => candidate.score > current.score,
        None => true,
    };
    if better {
        *best = Some(candidate);
    }
}

/// Field tables of a struct-like value, with its type arguments applied.
#[derive(Default)]
pub(crate) struct StructView {
    pub fields: BTreeMap<String, Type>,
    pub positional: Vec<Type>,
}

impl ModuleState {
    /// Type of `object.member`.
    ///
    /// `Err` carries the diagnostic; the caller continues with `Unknown`.
    pub(crate) fn resolve_member(
        &self,
        object: &Type,
        member: &MemberKey,
        span: Span,
    ) -> Result<Type, Diagnostic> {
        match member {
            MemberKey::Name(ident) => self.named_member(object, ident.as_str(), span),
            MemberKey::Index { value, .. } => self.positional_member(object, *value as usize, span),
        }
    }

    fn named_member(&self, object: &Type, name: &str, span: Span) -> Result<Type, Diagnostic> {
        if let Some((iface, args)) = object.as_interface() {
            let Some(method) = iface.methods.get(name) else {
                return Err(Diagnostic::reference(
                    span,
                    format!("typechecker: interface '{}' has no method '{name}'", iface.name),
                ));
            };
            let mut subst = zip_subst(iface.type_params.iter().map(|p| p.name.as_str()), args);
            subst.retain(|_, ty| !ty.is_unknown());
            subst.insert("Self".to_string(), object.clone());
            return Ok(substitute_function(method, &subst).bind_receiver().into());
        }

        match object {
            Type::Unknown => Ok(Type::Unknown),
            Type::Struct(_) | Type::StructInstance(_) | Type::Applied { .. }
                if object.struct_name().is_some() =>
            {
                if let Some(field) = self.struct_view(object).fields.remove(name) {
                    return Ok(field);
                }
                self.lookup_method(object, name).map(Type::from).ok_or_else(|| {
                    Diagnostic::reference(
                        span,
                        format!(
                            "typechecker: struct '{}' has no member '{name}'",
                            object.struct_name().unwrap_or_default()
                        ),
                    )
                })
            }
            Type::Proc(result) => handle_member("proc handle", name, result, true, span),
            Type::Future(result) => handle_member("future handle", name, result, false, span),
            Type::Package(pkg) => Ok(pkg.symbols.get(name).cloned().unwrap_or(Type::Unknown)),
            Type::TypeParameter(param) => self
                .lookup_type_param_method(param, name)
                .map(Type::from)
                .ok_or_else(|| {
                    Diagnostic::reference(
                        span,
                        format!("typechecker: cannot access member '{name}' on type parameter {param}"),
                    )
                }),
            _ => self.lookup_method(object, name).map(Type::from).ok_or_else(|| {
                Diagnostic::reference(
                    span,
                    format!("typechecker: cannot access member '{name}' on type {object}"),
                )
            }),
        }
    }

    fn positional_member(&self, object: &Type, index: usize, span: Span) -> Result<Type, Diagnostic> {
        let unsupported = |what: &str| -> Result<Type, Diagnostic> {
            Err(Diagnostic::reference(
                span,
                format!("typechecker: positional member access not supported on {what}"),
            ))
        };
        match object {
            Type::Unknown => Ok(Type::Unknown),
            _ if object.struct_name().is_some() => self
                .struct_view(object)
                .positional
                .get(index)
                .cloned()
                .ok_or_else(|| {
                    Diagnostic::reference(
                        span,
                        format!(
                            "typechecker: struct '{}' has no positional member {index}",
                            object.struct_name().unwrap_or_default()
                        ),
                    )
                }),
            _ if object.as_interface().is_some() => unsupported("interfaces"),
            Type::Proc(_) => unsupported("proc handles"),
            Type::Future(_) => unsupported("futures"),
            Type::Package(_) => unsupported("packages"),
            Type::TypeParameter(_) => unsupported("type parameters"),
            Type::Applied { .. } => unsupported("this type"),
            _ => Err(Diagnostic::reference(
                span,
                format!("typechecker: cannot access positional member {index} on type {object}"),
            )),
        }
    }

    /// Fields of a struct value. Literal shapes report their own fields;
    /// declared and applied structs go through the declaration.
    pub(crate) fn struct_view(&self, object: &Type) -> StructView {
        let (args, name) = match object {
            Type::StructInstance(inst) => {
                if !inst.fields.is_empty() || !inst.positional.is_empty() {
                    return StructView {
                        fields: inst.fields.clone(),
                        positional: inst.positional.clone(),
                    };
                }
                (inst.type_args.as_slice(), inst.name.as_str())
            }
            Type::Applied { args, .. } => (args.as_slice(), object.struct_name().unwrap_or_default()),
            Type::Struct(st) if !st.is_placeholder() => {
                return StructView {
                    fields: st.fields.clone(),
                    positional: st.positional.clone(),
                };
            }
            _ => (&[][..], object.struct_name().unwrap_or_default()),
        };

        let declared = match object {
            Type::Applied { base, .. } => match base.as_ref() {
                Type::Struct(st) if !st.is_placeholder() => Some(st.as_ref()),
                _ => self.lookup_struct(name),
            },
            _ => self.lookup_struct(name),
        };
        let Some(declared) = declared else {
            return StructView::default();
        };
        let subst = zip_subst(declared.type_params.iter().map(|p| p.name.as_str()), args);
        let subst: Subst = subst.into_iter().filter(|(_, ty)| !ty.is_unknown()).collect();
        StructView {
            fields: declared
                .fields
                .iter()
                .map(|(field, ty)| (field.clone(), substitute(ty, &subst)))
                .collect(),
            positional: declared
                .positional
                .iter()
                .map(|ty| substitute(ty, &subst))
                .collect(),
        }
    }

    /// Find `name` on `object` among implementations and method sets,
    /// projected onto the object and bound when it takes a receiver.
    pub(crate) fn lookup_method(&self, object: &Type, name: &str) -> Option<FunctionType> {
        let from_sets = self.method_set_candidate(object, name);
        let from_impls = self.implementation_candidate(object, name);
        let chosen = match (from_sets, from_impls) {
            (Some(set), Some(imp)) => {
                if imp.score >= set.score {
                    imp
                } else {
                    set
                }
            }
            (set, imp) => imp.or(set)?,
        };
        tracing::trace!(object = %object, method = name, score = chosen.score, "method resolved");
        Some(chosen.method)
    }

    fn method_set_candidate(&self, object: &Type, name: &str) -> Option<Candidate> {
        let mut best = None;
        for spec in &self.method_sets {
            let Some(matched) = match_method_target(object, &spec.target, &spec.type_params) else {
                continue;
            };
            let mut subst = matched.subst;
            subst.insert("Self".to_string(), object.clone());

            let mut method = if let Some(method) = spec.methods.get(name) {
                let mut method = substitute_function(method, &subst);
                if !spec.obligations.is_empty() {
                    let owner = format!(
                        "methods for {}::{name}",
                        describe_target(if object.is_unknown() { &spec.target } else { object })
                    );
                    let carried = substitute_obligations(
                        &populate_obligation_subjects(&spec.obligations, object),
                        &subst,
                    );
                    method
                        .obligations
                        .extend(carried.into_iter().map(|ob| qualify_owner(ob, &owner)));
                }
                method
            } else if let Some(method) = self.method_from_constraints(&spec.obligations, &subst, name)
            {
                method
            } else {
                continue;
            };

            if should_bind_self_param(&method, object) {
                method = method.bind_receiver();
            }
            keep_best(&mut best, Candidate { method, score: matched.score });
        }
        best
    }

    /// A method-set may reach a method through an interface it requires.
    fn method_from_constraints(
        &self,
        obligations: &[ConstraintObligation],
        subst: &Subst,
        name: &str,
    ) -> Option<FunctionType> {
        obligations.iter().find_map(|ob| {
            let resolved = self.resolve_constraint(&substitute(&ob.constraint, subst)).ok()?;
            let method = resolved.iface.methods.get(name)?;
            let mut replacement = subst.clone();
            for (idx, param) in resolved.iface.type_params.iter().enumerate() {
                let arg = resolved.args.get(idx).cloned().unwrap_or(Type::Unknown);
                replacement.insert(param.name.clone(), arg);
            }
            Some(substitute_function(method, &replacement))
        })
    }

    fn implementation_candidate(&self, object: &Type, name: &str) -> Option<Candidate> {
        let mut best = None;
        for spec in &self.implementations {
            let Some(matched) = match_method_target(object, &spec.target, &spec.type_params) else {
                continue;
            };
            let Some(method) = spec.methods.get(name) else {
                continue;
            };
            let mut subst = matched.subst;
            subst.insert("Self".to_string(), object.clone());
            if let Ok(iface) = self.interface_from_name(&spec.interface_name) {
                for (idx, param) in iface.type_params.iter().enumerate() {
                    let arg = spec
                        .interface_args
                        .get(idx)
                        .map_or(Type::Unknown, |arg| substitute(arg, &subst));
                    subst.insert(param.name.clone(), arg);
                }
            }

            let mut method = substitute_function(method, &subst);
            if should_bind_self_param(&method, object) {
                method = method.bind_receiver();
            }
            keep_best(&mut best, Candidate { method, score: matched.score });
        }
        best
    }

    /// Resolve a method on a type parameter through the constraints in
    /// scope. `Self` is projected to the parameter itself.
    pub(crate) fn lookup_type_param_method(&self, param: &str, name: &str) -> Option<FunctionType> {
        self.type_param_constraints(param)?
            .iter()
            .find_map(|constraint| {
                let resolved = self.resolve_constraint(constraint).ok()?;
                let method = resolved.iface.methods.get(name)?;
                let mut subst = Subst::default();
                subst.insert("Self".to_string(), Type::param(param));
                for (idx, spec) in resolved.iface.type_params.iter().enumerate() {
                    let arg = resolved.args.get(idx).cloned().unwrap_or(Type::Unknown);
                    subst.insert(spec.name.clone(), arg);
                }
                Some(substitute_function(method, &subst).bind_receiver())
            })
    }
}

fn qualify_owner(mut ob: ConstraintObligation, owner: &str) -> ConstraintObligation {
    if !ob.owner.contains("::") {
        ob.owner = owner.to_string();
    }
    ob
}

/// Whether the first parameter is the receiver for `subject`.
fn should_bind_self_param(method: &FunctionType, subject: &Type) -> bool {
    let Some(first) = method.params.first() else {
        return false;
    };
    match first {
        Type::TypeParameter(name) => name == "Self",
        _ => {
            receiver_name(first).is_some_and(|name| receiver_name(subject) == Some(name))
                || same_type(first, subject)
        }
    }
}

/// Members of `proc` and `spawn` handles.
fn handle_member(
    label: &str,
    name: &str,
    result: &Type,
    cancellable: bool,
    span: Span,
) -> Result<Type, Diagnostic> {
    match name {
        "status" => Ok(Type::function(Vec::new(), Type::nominal("ProcStatus"))),
        "value" => Ok(Type::function(
            Vec::new(),
            Type::UnionLiteral(vec![result.clone(), Type::nominal("ProcError")]),
        )),
        "cancel" if cancellable => Ok(Type::function(Vec::new(), Type::nil())),
        "cancel" => Err(Diagnostic::context(
            span,
            "typechecker: future handles do not support cancel()",
        )),
        _ => Err(Diagnostic::reference(
            span,
            format!("typechecker: {label} has no member '{name}'"),
        )),
    }
}

#[cfg(test)]
mod tests;
