//! Implementation and method-set records.
//!
//! Both pools are scanned linearly on every lookup; a module holds few
//! enough of them that an index would not pay for itself.

use std::collections::BTreeMap;

use able_ir::Span;

use crate::obligation::{ConstraintObligation, GenericParamSpec, WhereConstraintSpec};
use crate::types::{FunctionType, Type};

/// `impl Iface<args> for Target { ... }`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImplementationSpec {
    pub impl_name: Option<String>,
    pub interface_name: String,
    pub type_params: Vec<GenericParamSpec>,
    /// Receiver pattern; may contain the implementation's type parameters.
    pub target: Type,
    pub interface_args: Vec<Type>,
    pub methods: BTreeMap<String, FunctionType>,
    pub where_clause: Vec<WhereConstraintSpec>,
    pub obligations: Vec<ConstraintObligation>,
    /// Span of each method definition, for signature diagnostics.
    pub method_spans: BTreeMap<String, Span>,
    pub span: Span,
}

impl ImplementationSpec {
    /// `impl Display for Wrapper`.
    pub fn label(&self) -> String {
        implementation_label(&self.interface_name, &self.target)
    }

    pub fn method_span(&self, name: &str) -> Span {
        self.method_spans.get(name).copied().unwrap_or(self.span)
    }
}

/// Inherent `methods Target { ... }` block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSetSpec {
    pub type_params: Vec<GenericParamSpec>,
    pub target: Type,
    pub methods: BTreeMap<String, FunctionType>,
    pub where_clause: Vec<WhereConstraintSpec>,
    pub obligations: Vec<ConstraintObligation>,
    pub span: Span,
}

impl MethodSetSpec {
    /// `methods for Wrapper`.
    pub fn label(&self) -> String {
        method_set_label(&self.target)
    }
}

/// Owner label of an implementation, used in diagnostics and obligations.
pub(crate) fn implementation_label(interface: &str, target: &Type) -> String {
    format!("impl {interface} for {}", describe_target(target))
}

/// Owner label of a method set.
pub(crate) fn method_set_label(target: &Type) -> String {
    format!("methods for {}", describe_target(target))
}

/// Render an implementation target, tolerating unresolved ones.
pub fn describe_target(target: &Type) -> String {
    if target.is_unknown() {
        "<unknown>".to_string()
    } else {
        target.to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn spec(target: Type) -> ImplementationSpec {
        ImplementationSpec {
            impl_name: None,
            interface_name: "Display".into(),
            type_params: Vec::new(),
            target,
            interface_args: Vec::new(),
            methods: BTreeMap::new(),
            where_clause: Vec::new(),
            obligations: Vec::new(),
            method_spans: BTreeMap::new(),
            span: Span::default(),
        }
    }

    #[test]
    fn labels_render_targets_once() {
        let boxed = Type::applied(Type::nominal("Box"), vec![Type::param("T")]);
        assert_eq!(spec(boxed.clone()).label(), "impl Display for Box<T>");
        assert_eq!(
            spec(boxed.clone()).label(),
            implementation_label("Display", &boxed)
        );
        assert_eq!(spec(Type::Unknown).label(), "impl Display for <unknown>");

        let set = MethodSetSpec {
            type_params: Vec::new(),
            target: boxed,
            methods: BTreeMap::new(),
            where_clause: Vec::new(),
            obligations: Vec::new(),
            span: Span::default(),
        };
        assert_eq!(set.label(), "methods for Box<T>");
        assert_eq!(method_set_label(&Type::Unknown), "methods for <unknown>");
    }
}
