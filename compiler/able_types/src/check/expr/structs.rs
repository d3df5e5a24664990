//! Struct literals and functional update.

use able_diagnostic::Diagnostic;
use able_ir::ast::StructFieldInit;
use able_ir::{Expr, Ident, Span, TypeExpr};
use rustc_hash::FxHashSet;

use crate::env::TypeEnv;
use crate::state::ModuleState;
use crate::subst::{substitute, zip_subst, Subst};
use crate::types::{StructInstanceType, StructType, Type};

/// Borrowed parts of a struct literal expression.
pub(super) struct StructLiteral<'a> {
    pub name: Option<&'a Ident>,
    pub type_args: &'a [TypeExpr],
    pub fields: &'a [StructFieldInit],
    pub positional: bool,
    pub update_sources: &'a [Expr],
}

impl ModuleState {
    pub(super) fn check_struct_literal(
        &mut self,
        literal: &StructLiteral<'_>,
        span: Span,
        env: &TypeEnv,
    ) -> Type {
        let name = literal.name.map_or("", Ident::as_str);
        let declared = if name.is_empty() {
            None
        } else {
            let declared = self.lookup_struct(name).cloned();
            if declared.is_none() {
                self.report(Diagnostic::reference(
                    span,
                    format!("typechecker: unknown struct '{name}'"),
                ));
            }
            declared
        };

        let explicit: Vec<Type> = literal
            .type_args
            .iter()
            .map(|ty| self.resolve_local(ty))
            .collect();
        let mut subst = Subst::default();
        if let Some(declared) = &declared {
            let expected = declared.type_params.len();
            if expected > 0 && !explicit.is_empty() && explicit.len() != expected {
                self.report(Diagnostic::arity(
                    span,
                    format!(
                        "typechecker: struct '{name}' expects {expected} type argument(s), got {}",
                        explicit.len()
                    ),
                ));
            }
            subst = zip_subst(declared.type_params.iter().map(|p| p.name.as_str()), &explicit);
        }

        let mut instance = StructInstanceType {
            name: name.to_string(),
            ..StructInstanceType::default()
        };
        for source in literal.update_sources {
            self.apply_update_source(source, name, &mut instance, env);
        }
        self.check_literal_fields(literal, declared.as_ref(), &subst, &mut instance, env);

        if let Some(declared) = &declared {
            if !declared.type_params.is_empty() {
                instance.type_args = if explicit.is_empty() {
                    self.infer_struct_literal_arguments(declared, &instance, span)
                } else {
                    explicit
                };
                subst = zip_subst(
                    declared.type_params.iter().map(|p| p.name.as_str()),
                    &instance.type_args,
                );
            }
            complete_shape(declared, &subst, &mut instance);
        }
        Type::StructInstance(instance)
    }

    /// Copy the fields of a `...source` into the literal's shape.
    fn apply_update_source(
        &mut self,
        source: &Expr,
        name: &str,
        instance: &mut StructInstanceType,
        env: &TypeEnv,
    ) {
        let source_type = self.check_expr(source, env);
        if source_type.is_deferred() {
            return;
        }
        match source_type.struct_name() {
            Some(found) if name.is_empty() || found == name => {
                let view = self.struct_view(&source_type);
                instance.fields.extend(view.fields);
                if !view.positional.is_empty() {
                    instance.positional = view.positional;
                }
            }
            Some(_) => self.report(Diagnostic::compatibility(
                source.span,
                format!("typechecker: functional update expects struct {name}, got {source_type}"),
            )),
            None if name.is_empty() => self.report(Diagnostic::compatibility(
                source.span,
                format!("typechecker: functional update source must be a struct (got {source_type})"),
            )),
            None => self.report(Diagnostic::compatibility(
                source.span,
                format!("typechecker: functional update expects struct {name}, got {source_type}"),
            )),
        }
    }

    fn check_literal_fields(
        &mut self,
        literal: &StructLiteral<'_>,
        declared: Option<&StructType>,
        subst: &Subst,
        instance: &mut StructInstanceType,
        env: &TypeEnv,
    ) {
        let mut seen = FxHashSet::default();
        for (index, field) in literal.fields.iter().enumerate() {
            let field_name = field.name.as_ref().map(Ident::as_str);
            if let Some(field_name) = field_name {
                if !seen.insert(field_name) {
                    self.report(Diagnostic::structural(
                        field.span,
                        format!("typechecker: duplicate struct field '{field_name}'"),
                    ));
                    continue;
                }
            } else if !literal.positional {
                self.report(Diagnostic::structural(
                    field.span,
                    "typechecker: struct field requires a name",
                ));
                continue;
            }

            let value = self.check_expr(&field.value, env);
            let expected = match declared {
                Some(declared) => self.declared_field(declared, field_name, index, field.span),
                None => Type::Unknown,
            };
            let expected = substitute(&expected, subst);
            if !expected.is_deferred() && !value.is_unknown() && !self.accepts(&value, &expected) {
                let label = field_name.map_or_else(|| format!("#{index}"), str::to_string);
                self.report(Diagnostic::compatibility(
                    field.value.span,
                    format!("typechecker: struct field '{label}' expects {expected}, got {value}"),
                ));
            }

            let chosen = if expected.is_deferred() { value } else { expected };
            match field_name {
                Some(field_name) => {
                    instance.fields.insert(field_name.to_string(), chosen);
                }
                None => {
                    if instance.positional.len() <= index {
                        instance.positional.resize(index + 1, Type::Unknown);
                    }
                    instance.positional[index] = chosen;
                }
            }
        }
    }

    fn declared_field(
        &mut self,
        declared: &StructType,
        field_name: Option<&str>,
        index: usize,
        span: Span,
    ) -> Type {
        let found = match field_name {
            Some(field_name) => declared.fields.get(field_name),
            None => declared.positional.get(index),
        };
        if let Some(ty) = found {
            return ty.clone();
        }
        let message = match field_name {
            Some(field_name) => format!(
                "typechecker: struct '{}' has no field '{field_name}'",
                declared.name
            ),
            None => format!(
                "typechecker: positional field {index} out of range for struct '{}'",
                declared.name
            ),
        };
        self.report(Diagnostic::reference(span, message));
        Type::Unknown
    }
}

/// Fill the fields a literal left out from the declaration, so the shape
/// answers every member the struct declares.
fn complete_shape(declared: &StructType, subst: &Subst, instance: &mut StructInstanceType) {
    for (name, ty) in &declared.fields {
        instance
            .fields
            .entry(name.clone())
            .or_insert_with(|| substitute(ty, subst));
    }
    let given = instance.positional.len();
    instance.positional.extend(
        declared
            .positional
            .iter()
            .skip(given)
            .map(|ty| substitute(ty, subst)),
    );
}
