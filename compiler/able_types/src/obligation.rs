//! Generic parameter specs and deferred constraint obligations.

use able_ir::Span;

use crate::types::Type;

/// A declared generic parameter with its inline constraints: `T: Display`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericParamSpec {
    pub name: String,
    pub constraints: Vec<Type>,
}

impl GenericParamSpec {
    pub fn new(name: impl Into<String>, constraints: Vec<Type>) -> Self {
        GenericParamSpec {
            name: name.into(),
            constraints,
        }
    }
}

/// One `where T: A + B` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhereConstraintSpec {
    pub type_param: String,
    pub constraints: Vec<Type>,
}

/// Deferred proof that `subject` satisfies `constraint`.
///
/// Created with a `TypeParameter` subject at declaration time and re-created
/// with a concrete subject at each instantiation site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstraintObligation {
    /// Human-readable declaration label, e.g. `fn useDisplay`.
    pub owner: String,
    pub type_param: String,
    /// An interface or applied interface.
    pub constraint: Type,
    pub subject: Type,
    /// Provenance, e.g. `via method 'format'`.
    pub context: Option<String>,
    pub span: Span,
}

impl ConstraintObligation {
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Build one obligation per constraint on `params` and `where_clause`.
///
/// Each subject is the parameter's own placeholder. Unresolved constraints
/// (`Unknown`) are skipped; they were already diagnosed during resolution.
pub fn obligations_from_specs(
    owner: &str,
    params: &[GenericParamSpec],
    where_clause: &[WhereConstraintSpec],
    span: Span,
) -> Vec<ConstraintObligation> {
    let mut out = Vec::new();
    let mut push = |type_param: &str, constraint: &Type| {
        if constraint.is_unknown() {
            return;
        }
        out.push(ConstraintObligation {
            owner: owner.to_string(),
            type_param: type_param.to_string(),
            constraint: constraint.clone(),
            subject: Type::param(type_param),
            context: None,
            span,
        });
    };
    for param in params {
        for constraint in &param.constraints {
            push(&param.name, constraint);
        }
    }
    for clause in where_clause {
        for constraint in &clause.constraints {
            push(&clause.type_param, constraint);
        }
    }
    out
}
