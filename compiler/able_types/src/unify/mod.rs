//! Call-site unification.
//!
//! Walks each declared parameter type against its argument type in
//! lock-step, binding free type parameters. A second, incompatible binding
//! for the same parameter is a diagnostic; the first binding is kept.

mod target;

pub(crate) use target::{match_method_target, receiver_name};

use able_diagnostic::Diagnostic;
use able_ir::Span;

use crate::relate::{type_assignable, types_equivalent_for_signature};
use crate::state::ModuleState;
use crate::subst::{substitute, substitute_function, Subst};
use crate::types::{FunctionType, StructInstanceType, StructType, Type};

/// Outcome of instantiating a generic signature for one call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Instantiation {
    pub signature: FunctionType,
    pub diagnostics: Vec<Diagnostic>,
}

impl ModuleState {
    /// Infer type arguments for a call and substitute them through the
    /// signature. Explicit type arguments are applied first.
    ///
    /// `arg_spans` parallels `arg_types`; missing entries fall back to
    /// `call_span`.
    pub(crate) fn instantiate_call(
        &self,
        fn_type: &FunctionType,
        explicit: &[Type],
        arg_types: &[Type],
        arg_spans: &[Span],
        call_span: Span,
    ) -> Instantiation {
        let mut subst = Subst::default();
        let mut diagnostics = Vec::new();

        for (param, ty) in fn_type.type_params.iter().zip(explicit) {
            if let Some(existing) = subst.get(&param.name) {
                if !types_equivalent_for_signature(existing, ty) {
                    diagnostics.push(Diagnostic::compatibility(
                        call_span,
                        format!(
                            "typechecker: type argument '{}' provided multiple times with incompatible types ({existing} vs {ty})",
                            param.name
                        ),
                    ));
                }
                continue;
            }
            subst.insert(param.name.clone(), ty.clone());
        }

        for (index, (expected, actual)) in fn_type.params.iter().zip(arg_types).enumerate() {
            let span = arg_spans.get(index).copied().unwrap_or(call_span);
            let mut binder = Binder {
                state: self,
                subst: &mut subst,
                diagnostics: &mut diagnostics,
                span,
                index,
            };
            binder.infer(expected, actual);
        }

        tracing::trace!(bindings = subst.len(), "call instantiated");
        Instantiation {
            signature: substitute_function(fn_type, &subst),
            diagnostics,
        }
    }

    /// Infer the type arguments of a generic struct from a literal's
    /// field values. Conflicts leave the first binding in place.
    pub(crate) fn infer_struct_literal_arguments(
        &self,
        declared: &StructType,
        instance: &StructInstanceType,
        span: Span,
    ) -> Vec<Type> {
        let mut subst = Subst::default();
        let mut discarded = Vec::new();
        let mut binder = Binder {
            state: self,
            subst: &mut subst,
            diagnostics: &mut discarded,
            span,
            index: 0,
        };
        binder.infer_struct_fields(declared, &[], instance);
        declared
            .type_params
            .iter()
            .map(|param| subst.get(&param.name).cloned().unwrap_or(Type::Unknown))
            .collect()
    }
}

/// Lock-step walker for one argument position.
struct Binder<'s, 'a> {
    state: &'s ModuleState,
    subst: &'a mut Subst,
    diagnostics: &'a mut Vec<Diagnostic>,
    span: Span,
    /// Zero-based argument position, reported one-based.
    index: usize,
}

impl Binder<'_, '_> {
    fn infer(&mut self, expected: &Type, actual: &Type) {
        if expected.is_unknown() || actual.is_unknown() {
            return;
        }
        match expected {
            Type::TypeParameter(name) => self.bind(name, actual),
            Type::Array(element) => {
                if let Some(actual_element) = actual.array_element() {
                    self.infer(element, &actual_element);
                }
            }
            Type::Nullable(inner) => match actual {
                Type::Nullable(actual_inner) => self.infer(inner, actual_inner),
                _ => self.infer(inner, actual),
            },
            Type::Applied { base, args } => self.infer_applied(base, args, actual),
            Type::Function(expected_fn) => {
                if let Type::Function(actual_fn) = actual {
                    for (param, actual_param) in expected_fn.params.iter().zip(&actual_fn.params) {
                        self.infer(param, actual_param);
                    }
                    self.infer(&expected_fn.ret, &actual_fn.ret);
                }
            }
            Type::Proc(result) => {
                if let Type::Proc(actual_result) = actual {
                    self.infer(result, actual_result);
                }
            }
            Type::Future(result) => {
                if let Type::Future(actual_result) = actual {
                    self.infer(result, actual_result);
                }
            }
            Type::Range(element) => {
                if let Type::Range(actual_element) = actual {
                    self.infer(element, actual_element);
                }
            }
            Type::Primitive(_)
            | Type::Integer(_)
            | Type::Float(_)
            | Type::Struct(_)
            | Type::StructInstance(_)
            | Type::Interface(_)
            | Type::Union(_)
            | Type::UnionLiteral(_)
            | Type::Package(_)
            | Type::Unknown => {}
        }
    }

    fn infer_applied(&mut self, base: &Type, args: &[Type], actual: &Type) {
        match actual {
            Type::Applied {
                base: actual_base,
                args: actual_args,
            } => {
                self.infer(base, actual_base);
                for (arg, actual_arg) in args.iter().zip(actual_args) {
                    self.infer(arg, actual_arg);
                }
            }
            Type::StructInstance(instance) => {
                let Some(name) = base.struct_name() else {
                    return;
                };
                if !instance.name.is_empty() && instance.name != name {
                    return;
                }
                let declared = match base {
                    Type::Struct(st) if !st.is_placeholder() => Some(st.as_ref()),
                    _ => self.state.lookup_struct(name),
                };
                if let Some(declared) = declared {
                    self.infer_struct_fields(declared, args, instance);
                }
            }
            Type::Array(element) if base.struct_name() == Some("Array") => {
                if let Some(arg) = args.first() {
                    self.infer(arg, element);
                }
            }
            _ => {}
        }
    }

    /// Recurse through the declared struct's fields, scoped by its own
    /// parameters mapped to `args`.
    fn infer_struct_fields(
        &mut self,
        declared: &StructType,
        args: &[Type],
        instance: &StructInstanceType,
    ) {
        let scope: Subst = declared
            .type_params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                let arg = args.get(i).cloned().unwrap_or(Type::Unknown);
                (param.name.clone(), arg)
            })
            .collect();
        let scoped = |ty: &Type| {
            if args.is_empty() {
                ty.clone()
            } else {
                substitute(ty, &scope)
            }
        };

        for (name, field_type) in &declared.fields {
            if let Some(actual) = instance.fields.get(name) {
                self.infer(&scoped(field_type), actual);
            }
        }
        if declared.fields.is_empty() {
            for (field_type, actual) in declared.positional.iter().zip(&instance.positional) {
                self.infer(&scoped(field_type), actual);
            }
        }
    }

    fn bind(&mut self, name: &str, actual: &Type) {
        let Some(existing) = self.subst.get(name) else {
            self.subst.insert(name.to_string(), actual.clone());
            return;
        };
        if types_equivalent_for_signature(existing, actual)
            || (type_assignable(existing, actual) && type_assignable(actual, existing))
        {
            return;
        }
        self.diagnostics.push(Diagnostic::compatibility(
            self.span,
            format!(
                "typechecker: type parameter {name} inferred as {existing} but argument {} has type {actual}",
                self.index + 1
            ),
        ));
    }
}

#[cfg(test)]
mod tests;
