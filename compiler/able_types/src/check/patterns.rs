//! Pattern binding against a subject type.

use std::sync::Arc;

use able_diagnostic::Diagnostic;
use able_ir::ast::StructPatternField;
use able_ir::{Pattern, PatternKind};

use crate::env::TypeEnv;
use crate::state::ModuleState;
use crate::types::Type;

impl ModuleState {
    /// Bind the names in `pattern` for a value of type `subject`.
    ///
    /// Literal patterns never fail here; whether they can match is a
    /// run-time question.
    pub(crate) fn bind_pattern(&mut self, pattern: &Pattern, subject: &Type, env: &mut TypeEnv) {
        self.record(pattern.span, subject);
        match &pattern.kind {
            PatternKind::Identifier(ident) => env.define(ident.as_str(), subject.clone()),
            PatternKind::Wildcard | PatternKind::Literal(_) => {}
            PatternKind::Typed { pattern: inner, ty } => {
                let annotated = self.resolve_local(ty);
                if !subject.is_unknown()
                    && !annotated.is_unknown()
                    && !self.accepts(subject, &annotated)
                {
                    self.report(Diagnostic::compatibility(
                        pattern.span,
                        format!("typechecker: pattern expected type {annotated}, got {subject}"),
                    ));
                }
                self.bind_pattern(inner, &annotated, env);
            }
            PatternKind::Struct {
                struct_name,
                fields,
                positional,
            } => {
                let name = struct_name.as_ref().map(|ident| ident.as_str());
                let Some(matched) = self.struct_pattern_subject(name, subject, pattern) else {
                    self.bind_unknown(fields.iter().map(|field| &field.pattern), env);
                    return;
                };
                self.bind_struct_fields(&matched, fields, *positional, env);
            }
            PatternKind::Array { elements, rest } => {
                let element = match subject {
                    Type::Unknown | Type::TypeParameter(_) => Type::Unknown,
                    _ => match subject.array_element() {
                        Some(element) => element,
                        None => {
                            self.report(Diagnostic::compatibility(
                                pattern.span,
                                format!("typechecker: array pattern cannot match type {subject}"),
                            ));
                            Type::Unknown
                        }
                    },
                };
                for element_pattern in elements {
                    self.bind_pattern(element_pattern, &element, env);
                }
                if let Some(rest) = rest {
                    env.define(rest.as_str(), Type::array(element));
                }
            }
        }
    }

    /// The struct type a struct pattern destructures, or `None` when
    /// nothing is known about its fields.
    fn struct_pattern_subject(
        &mut self,
        name: Option<&str>,
        subject: &Type,
        pattern: &Pattern,
    ) -> Option<Type> {
        if let Some(name) = name {
            if subject.struct_name() == Some(name) {
                return Some(subject.clone());
            }
            return match self.lookup_struct(name).cloned() {
                // Narrowing a union or unknown subject to one variant.
                Some(declared) => Some(Type::Struct(Arc::new(declared))),
                None => {
                    self.report(Diagnostic::reference(
                        pattern.span,
                        format!("typechecker: unknown struct '{name}'"),
                    ));
                    None
                }
            };
        }
        match subject {
            Type::Unknown | Type::TypeParameter(_) => None,
            _ if subject.struct_name().is_some() => Some(subject.clone()),
            _ => {
                self.report(Diagnostic::compatibility(
                    pattern.span,
                    format!("typechecker: struct pattern cannot match type {subject}"),
                ));
                None
            }
        }
    }

    fn bind_struct_fields(
        &mut self,
        matched: &Type,
        fields: &[StructPatternField],
        positional: bool,
        env: &mut TypeEnv,
    ) {
        let view = self.struct_view(matched);
        for (index, field) in fields.iter().enumerate() {
            let field_type = match (&field.field, positional) {
                (Some(name), false) => match view.fields.get(name.as_str()) {
                    Some(ty) => ty.clone(),
                    None => {
                        self.report(Diagnostic::reference(
                            field.span,
                            format!(
                                "typechecker: struct pattern field '{}' not found",
                                name.as_str()
                            ),
                        ));
                        Type::Unknown
                    }
                },
                _ => view.positional.get(index).cloned().unwrap_or(Type::Unknown),
            };
            self.bind_pattern(&field.pattern, &field_type, env);
        }
    }

    fn bind_unknown<'p>(&mut self, patterns: impl Iterator<Item = &'p Pattern>, env: &mut TypeEnv) {
        for pattern in patterns {
            self.bind_pattern(pattern, &Type::Unknown, env);
        }
    }
}
