//! Implementation validation.
//!
//! Every implementation declared by the module is compared against its
//! interface after obligations are solved. The interface signature is
//! projected onto the target (`Self`) and the implementation's interface
//! arguments before comparison; arguments left open stay as the
//! interface's own parameters, which match any type parameter.

use able_diagnostic::Diagnostic;

use crate::registry::ImplementationSpec;
use crate::relate::types_equivalent_for_signature;
use crate::state::ModuleState;
use crate::subst::{substitute_function, Subst};
use crate::types::{FunctionType, InterfaceType, Type};

impl ModuleState {
    #[tracing::instrument(level = "debug", skip_all, fields(implementations = self.module_implementations().len()))]
    pub(crate) fn validate_implementations(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for spec in self.module_implementations() {
            // Unresolvable interfaces were reported during collection.
            let Some(Type::Interface(iface)) = self.global.lookup(&spec.interface_name) else {
                continue;
            };
            validate_implementation(spec, iface, &mut diagnostics);
        }
        tracing::debug!(failures = diagnostics.len(), "implementations validated");
        diagnostics
    }
}

fn validate_implementation(
    spec: &ImplementationSpec,
    iface: &InterfaceType,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let subst = implementation_subst(spec, iface);
    let label = spec.label();
    for (name, required) in &iface.methods {
        let expected = substitute_function(required, &subst);
        let Some(actual) = spec.methods.get(name) else {
            diagnostics.push(
                Diagnostic::compatibility(
                    spec.span,
                    format!("typechecker: {label} missing method '{name}'"),
                )
                .with_note(required_note(spec, name, &expected)),
            );
            continue;
        };
        compare_signature(&label, name, &expected, actual, spec, diagnostics);
    }
}

fn implementation_subst(spec: &ImplementationSpec, iface: &InterfaceType) -> Subst {
    let mut subst = Subst::default();
    subst.insert("Self".to_string(), spec.target.clone());
    for (idx, param) in iface.type_params.iter().enumerate() {
        let replacement = match spec.interface_args.get(idx) {
            Some(arg) if !arg.is_unknown() => arg.clone(),
            _ => Type::param(&param.name),
        };
        subst.insert(param.name.clone(), replacement);
    }
    subst
}

fn compare_signature(
    label: &str,
    name: &str,
    expected: &FunctionType,
    actual: &FunctionType,
    spec: &ImplementationSpec,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let span = spec.method_span(name);
    let mut mismatch = |message: String| {
        diagnostics.push(
            Diagnostic::compatibility(
                span,
                format!("typechecker: {label} method '{name}' {message}"),
            )
            .with_label(spec.span, format!("in {label}"))
            .with_note(required_note(spec, name, expected)),
        );
    };

    if expected.type_params.len() != actual.type_params.len() {
        mismatch(format!(
            "expects {} generic parameter(s), got {}",
            expected.type_params.len(),
            actual.type_params.len()
        ));
    }

    if expected.params.len() == actual.params.len() {
        for (idx, (want, got)) in expected.params.iter().zip(&actual.params).enumerate() {
            if !types_equivalent_for_signature(want, got) {
                mismatch(format!("parameter {} expected {want}, got {got}", idx + 1));
            }
        }
    } else {
        mismatch(format!(
            "expects {} parameter(s), got {}",
            expected.params.len(),
            actual.params.len()
        ));
    }

    if !types_equivalent_for_signature(&expected.ret, &actual.ret) {
        mismatch(format!(
            "return type expected {}, got {}",
            expected.ret, actual.ret
        ));
    }
}

fn required_note(spec: &ImplementationSpec, name: &str, expected: &FunctionType) -> String {
    format!("{} requires '{name}' as {expected}", spec.interface_name)
}
