//! Constraint obligation solving.
//!
//! Runs once per module after collection and statement checking. Each
//! obligation's constraint is resolved to an interface plus arguments, then
//! the subject is tried, in order, against:
//!
//! 1. the interface itself (an interface value satisfies its own interface)
//! 2. an explicit implementation whose target pattern matches
//! 3. a method set that structurally provides every interface method
//!
//! `Nullable` and union-literal subjects distribute: an implementation for
//! the whole sum is tried first, then every alternative must satisfy the
//! constraint on its own.
//!
//! Solving only reads module state, so re-running it over the same
//! snapshot yields the same diagnostics.

use std::sync::Arc;

use able_diagnostic::Diagnostic;

use crate::obligation::ConstraintObligation;
use crate::registry::{method_set_label, MethodSetSpec};
use crate::relate::{function_signatures_compatible, types_equivalent_for_signature};
use crate::state::ModuleState;
use crate::subst::{
    populate_obligation_subjects, substitute, substitute_function, substitute_obligations, Subst,
};
use crate::types::{interface_label, InterfaceType, Type};
use crate::unify::match_method_target;

/// A constraint resolved to its interface and supplied arguments.
#[derive(Clone, Debug)]
pub(crate) struct ResolvedConstraint {
    pub iface: Arc<InterfaceType>,
    pub args: Vec<Type>,
}

/// Subject/interface pairs currently being proven, innermost last.
///
/// A pair met again while still on the stack is assumed to hold, so
/// self-referential method-set constraints terminate.
type ProofStack = Vec<(String, String)>;

/// How a method set measures up against an interface.
enum MethodSetFit {
    /// Every method is present and compatible; carried obligations remain.
    Provides(Vec<ConstraintObligation>),
    Lacks(String),
    /// Either side declares no methods.
    Vacuous,
}

impl ModuleState {
    /// Discharge every queued obligation.
    #[tracing::instrument(level = "debug", skip_all, fields(obligations = self.obligations.len()))]
    pub(crate) fn solve_obligations(&self) -> Vec<Diagnostic> {
        let diagnostics = self.evaluate_obligations(&self.obligations);
        tracing::debug!(failures = diagnostics.len(), "obligations solved");
        diagnostics
    }

    /// Check `obligations` against the registered implementations and
    /// method sets, returning one diagnostic per failure.
    pub(crate) fn evaluate_obligations(
        &self,
        obligations: &[ConstraintObligation],
    ) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for ob in obligations {
            tracing::trace!(
                owner = %ob.owner,
                type_param = %ob.type_param,
                subject = %ob.subject,
                constraint = %ob.constraint,
                "obligation"
            );
            if let Some(diagnostic) = self.evaluate_obligation(ob) {
                diagnostics.push(diagnostic);
            }
        }
        diagnostics
    }

    fn evaluate_obligation(&self, ob: &ConstraintObligation) -> Option<Diagnostic> {
        let prefix = format!(
            "typechecker: {} constraint on {}{}",
            ob.owner,
            ob.type_param,
            context_suffix(ob.context.as_deref())
        );

        let resolved = match self.resolve_constraint(&ob.constraint) {
            Ok(resolved) => resolved,
            Err(reason) => {
                return Some(Diagnostic::reference(ob.span, format!("{prefix} {reason}")));
            }
        };

        let expected = resolved.iface.type_params.len();
        let provided = resolved.args.len();
        if expected > 0 && provided == 0 {
            return Some(Diagnostic::arity(
                ob.span,
                format!(
                    "{prefix} requires {expected} type argument(s) for interface '{}'",
                    resolved.iface.name
                ),
            ));
        }
        if provided != 0 && provided != expected {
            return Some(Diagnostic::arity(
                ob.span,
                format!(
                    "{prefix} expected {expected} type argument(s) for interface '{}', got {provided}",
                    resolved.iface.name
                ),
            ));
        }

        let detail = self
            .obligation_satisfied(&ob.subject, &resolved, &mut ProofStack::new())
            .err()?;
        let reason = if detail.is_empty() {
            String::new()
        } else {
            format!(": {detail}")
        };
        Some(Diagnostic::obligation(
            ob.span,
            format!(
                "{prefix} is not satisfied: {} does not implement {}{reason}",
                ob.subject,
                interface_label(&resolved.iface.name, &resolved.args)
            ),
        ))
    }

    /// Resolve a constraint to an interface plus arguments.
    pub(crate) fn resolve_constraint(&self, constraint: &Type) -> Result<ResolvedConstraint, String> {
        match constraint {
            Type::Interface(iface) => Ok(ResolvedConstraint {
                iface: Arc::clone(iface),
                args: Vec::new(),
            }),
            Type::Applied { base, args } => {
                let base = self.resolve_constraint(base)?;
                Ok(ResolvedConstraint {
                    iface: base.iface,
                    args: args.clone(),
                })
            }
            Type::Struct(_) | Type::StructInstance(_) => {
                let name = constraint.struct_name().unwrap_or_default();
                self.interface_from_name(name).map(|iface| ResolvedConstraint {
                    iface,
                    args: Vec::new(),
                })
            }
            _ => Err(format!("must reference an interface (got {constraint})")),
        }
    }

    /// Look up an interface declaration by name in module scope.
    pub(crate) fn interface_from_name(&self, name: &str) -> Result<Arc<InterfaceType>, String> {
        if name.is_empty() {
            return Err("must reference an interface (got <unknown>)".to_string());
        }
        match self.global.lookup(name) {
            Some(Type::Interface(iface)) => Ok(Arc::clone(iface)),
            Some(_) => Err(format!("references '{name}' which is not an interface")),
            None => Err(format!("references unknown interface '{name}'")),
        }
    }

    /// Immediate check used where a value flows into an interface-typed slot.
    pub(crate) fn satisfies_constraint(&self, subject: &Type, constraint: &Type) -> bool {
        self.resolve_constraint(constraint).is_ok_and(|resolved| {
            self.obligation_satisfied(subject, &resolved, &mut ProofStack::new())
                .is_ok()
        })
    }

    /// `Err` carries the failure detail, which may be empty.
    fn obligation_satisfied(
        &self,
        subject: &Type,
        resolved: &ResolvedConstraint,
        stack: &mut ProofStack,
    ) -> Result<(), String> {
        if subject.is_deferred() {
            return Ok(());
        }
        let key = (
            subject.to_string(),
            interface_label(&resolved.iface.name, &resolved.args),
        );
        if stack.contains(&key) {
            return Ok(());
        }
        stack.push(key);
        let outcome = self.type_implements_interface(subject, &resolved.iface, &resolved.args, stack);
        stack.pop();
        outcome
    }

    fn type_implements_interface(
        &self,
        subject: &Type,
        iface: &InterfaceType,
        args: &[Type],
        stack: &mut ProofStack,
    ) -> Result<(), String> {
        match subject {
            Type::Nullable(inner) => {
                if self.implementation_provides_interface(subject, iface, args) {
                    return Ok(());
                }
                return self.type_implements_interface(inner, iface, args, stack);
            }
            Type::UnionLiteral(members) => {
                if self.implementation_provides_interface(subject, iface, args) {
                    return Ok(());
                }
                for member in members {
                    self.type_implements_interface(member, iface, args, stack)?;
                }
                return Ok(());
            }
            _ => {}
        }

        if subject_matches_interface(subject, iface, args)
            || self.implementation_provides_interface(subject, iface, args)
        {
            return Ok(());
        }
        self.method_set_provides_interface(subject, iface, args, stack)
    }

    fn implementation_provides_interface(
        &self,
        subject: &Type,
        iface: &InterfaceType,
        args: &[Type],
    ) -> bool {
        self.implementations.iter().any(|spec| {
            if spec.interface_name != iface.name {
                return false;
            }
            let Some(matched) = match_method_target(subject, &spec.target, &spec.type_params) else {
                return false;
            };
            if spec.interface_args.is_empty() {
                return args.is_empty();
            }
            if spec.interface_args.len() != args.len() {
                return false;
            }
            let actual: Vec<Type> = spec
                .interface_args
                .iter()
                .map(|arg| substitute(arg, &matched.subst))
                .collect();
            let provides = interface_args_compatible(&actual, args);
            tracing::trace!(candidate = %spec.label(), provides, "implementation candidate");
            provides
        })
    }

    /// Try every method set whose target matches; the failure detail of
    /// the highest-scoring candidate is reported.
    fn method_set_provides_interface(
        &self,
        subject: &Type,
        iface: &InterfaceType,
        args: &[Type],
        stack: &mut ProofStack,
    ) -> Result<(), String> {
        let mut best: Option<(usize, String)> = None;
        let mut consider = |score: usize, detail: String| {
            let better = match &best {
                None => true,
                Some((best_score, best_detail)) => {
                    score > *best_score || (score == *best_score && detail.len() > best_detail.len())
                }
            };
            if better {
                best = Some((score, detail));
            }
        };

        for spec in &self.method_sets {
            let Some(matched) = match_method_target(subject, &spec.target, &spec.type_params) else {
                continue;
            };
            let label = projected_label(spec, subject, &matched.subst);
            match method_set_satisfies_interface(spec, iface, args, subject, &matched.subst) {
                MethodSetFit::Vacuous => {}
                MethodSetFit::Lacks(detail) => {
                    tracing::trace!(candidate = %label, %detail, "method set rejected");
                    consider(matched.score, annotate(&label, &detail));
                }
                MethodSetFit::Provides(obligations) => {
                    match self.obligation_set_satisfied(&obligations, stack) {
                        Ok(()) => return Ok(()),
                        Err((detail, owner)) => {
                            let label = if owner.is_empty() { label } else { owner };
                            consider(matched.score, annotate(&label, &detail));
                        }
                    }
                }
            }
        }

        Err(best.map(|(_, detail)| detail).unwrap_or_default())
    }

    /// Solve obligations carried by a method set. On failure, returns the
    /// detail and the owner of the failing obligation.
    fn obligation_set_satisfied(
        &self,
        obligations: &[ConstraintObligation],
        stack: &mut ProofStack,
    ) -> Result<(), (String, String)> {
        for ob in obligations {
            let context = ob.context.as_deref();
            let resolved = self
                .resolve_constraint(&ob.constraint)
                .map_err(|reason| (append_context(&reason, context), ob.owner.clone()))?;
            self.obligation_satisfied(&ob.subject, &resolved, stack)
                .map_err(|detail| (append_context(&detail, context), ob.owner.clone()))?;
        }
        Ok(())
    }
}

/// An interface value satisfies its own interface.
fn subject_matches_interface(subject: &Type, iface: &InterfaceType, args: &[Type]) -> bool {
    match subject {
        Type::Interface(own) => own.name == iface.name,
        Type::Applied { base, args: own_args } => match base.as_ref() {
            Type::Interface(own) if own.name == iface.name => {
                args.is_empty() || interface_args_compatible(own_args, args)
            }
            _ => false,
        },
        _ => false,
    }
}

/// Positional equivalence, skipping `Unknown` on either side.
fn interface_args_compatible(actual: &[Type], expected: &[Type]) -> bool {
    if expected.is_empty() {
        return true;
    }
    actual.len() == expected.len()
        && actual.iter().zip(expected).all(|(a, b)| {
            a.is_unknown() || b.is_unknown() || types_equivalent_for_signature(a, b)
        })
}

fn method_set_satisfies_interface(
    spec: &MethodSetSpec,
    iface: &InterfaceType,
    args: &[Type],
    subject: &Type,
    subst: &Subst,
) -> MethodSetFit {
    if spec.methods.is_empty() || iface.methods.is_empty() {
        return MethodSetFit::Vacuous;
    }

    // Method-set view: its own bindings, Self, and known interface arguments.
    let mut combined = subst.clone();
    combined.insert("Self".to_string(), subject.clone());
    // Interface view: unknown arguments stay as the interface's parameters.
    let mut iface_subst = Subst::default();
    iface_subst.insert("Self".to_string(), subject.clone());
    for (idx, param) in iface.type_params.iter().enumerate() {
        match args.get(idx) {
            Some(arg) if !arg.is_unknown() => {
                combined.insert(param.name.clone(), arg.clone());
                iface_subst.insert(param.name.clone(), arg.clone());
            }
            _ => {
                iface_subst.insert(param.name.clone(), Type::param(&param.name));
            }
        }
    }

    let mut obligations = Vec::new();
    for (name, required) in &iface.methods {
        let expected = substitute_function(required, &iface_subst);
        let Some(actual) = spec.methods.get(name) else {
            return MethodSetFit::Lacks(format!("method '{name}' not provided by methods block"));
        };
        let actual = substitute_function(actual, &combined);
        if !function_signatures_compatible(&expected, &actual) {
            return MethodSetFit::Lacks(format!("method '{name}' has incompatible signature"));
        }
        let carried: Vec<ConstraintObligation> =
            populate_obligation_subjects(&actual.obligations, subject)
                .into_iter()
                .map(|ob| ob.with_context(format!("via method '{name}'")))
                .collect();
        obligations.extend(substitute_obligations(&carried, &combined));
    }

    let carried: Vec<ConstraintObligation> = populate_obligation_subjects(&spec.obligations, subject)
        .into_iter()
        .map(|ob| {
            if ob.context.is_some() {
                ob
            } else {
                ob.with_context("via method set")
            }
        })
        .collect();
    obligations.extend(substitute_obligations(&carried, &combined));

    MethodSetFit::Provides(obligations)
}

/// `methods for <target>`, with the target projected onto the subject.
fn projected_label(spec: &MethodSetSpec, subject: &Type, subst: &Subst) -> String {
    let mut target = substitute(&spec.target, subst);
    if target.is_unknown() && !subject.is_unknown() {
        target = subject.clone();
    }
    method_set_label(&target)
}

fn annotate(label: &str, detail: &str) -> String {
    let detail = detail.trim();
    if detail.is_empty() {
        label.to_string()
    } else if detail.starts_with(label) {
        detail.to_string()
    } else {
        format!("{label}: {detail}")
    }
}

fn append_context(detail: &str, context: Option<&str>) -> String {
    match context {
        None | Some("") => detail.to_string(),
        Some(context) if detail.is_empty() => context.to_string(),
        Some(context) => format!("{detail} ({context})"),
    }
}

fn context_suffix(context: Option<&str>) -> String {
    match context {
        Some(context) if !context.is_empty() => format!(" ({context})"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests;
