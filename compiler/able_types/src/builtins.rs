//! Built-in scope: runtime functions and the `Display`/`Clone` interfaces.
//!
//! The builtin scope is the parent of every module's global scope unless a
//! prelude replaces it. Primitive implementations of the builtin
//! interfaces are registered ahead of the module's own.

use std::collections::BTreeMap;
use std::sync::Arc;

use able_ir::Span;

use crate::env::TypeEnv;
use crate::registry::ImplementationSpec;
use crate::types::{FloatSuffix, FunctionType, IntegerSuffix, InterfaceType, Type};

pub(crate) const DISPLAY: &str = "Display";
pub(crate) const CLONE: &str = "Clone";

/// Functions whose legality depends on the surrounding async context.
pub(crate) const PROC_YIELD: &str = "proc_yield";
pub(crate) const PROC_CANCELLED: &str = "proc_cancelled";
pub(crate) const PROC_FLUSH: &str = "proc_flush";

/// Scope holding the runtime's functions and, when enabled, the builtin
/// interfaces.
pub(crate) fn builtin_env(with_interfaces: bool) -> TypeEnv {
    let mut env = TypeEnv::new();
    env.define("print", Type::function(vec![Type::Unknown], Type::nil()));
    env.define(PROC_YIELD, Type::function(Vec::new(), Type::nil()));
    env.define(PROC_CANCELLED, Type::function(Vec::new(), Type::bool()));
    env.define(PROC_FLUSH, Type::function(Vec::new(), Type::nil()));
    env.define("true", Type::bool());
    env.define("false", Type::bool());

    if with_interfaces {
        env.define(DISPLAY, Type::Interface(Arc::new(display_interface())));
        env.define(CLONE, Type::Interface(Arc::new(clone_interface())));
    }
    env
}

fn display_interface() -> InterfaceType {
    InterfaceType {
        name: DISPLAY.to_string(),
        methods: BTreeMap::from([(
            "to_string".to_string(),
            FunctionType::new(vec![Type::param("Self")], Type::string()),
        )]),
        ..InterfaceType::default()
    }
}

fn clone_interface() -> InterfaceType {
    InterfaceType {
        name: CLONE.to_string(),
        methods: BTreeMap::from([(
            "clone".to_string(),
            FunctionType::new(vec![Type::param("Self")], Type::param("Self")),
        )]),
        ..InterfaceType::default()
    }
}

fn primitive_targets() -> Vec<Type> {
    let mut targets = vec![Type::bool(), Type::string(), Type::char()];
    targets.extend(IntegerSuffix::ALL.into_iter().map(Type::Integer));
    targets.extend([FloatSuffix::F32, FloatSuffix::F64].map(Type::Float));
    targets
}

/// `Display` and `Clone` for every primitive type, skipping any interface
/// for which `shadowed` returns true.
pub(crate) fn builtin_implementations(shadowed: impl Fn(&str) -> bool) -> Vec<ImplementationSpec> {
    let mut specs = Vec::new();
    for target in primitive_targets() {
        if !shadowed(DISPLAY) {
            let to_string = FunctionType::new(vec![target.clone()], Type::string());
            specs.push(primitive_impl(DISPLAY, "to_string", to_string, &target));
        }
        if !shadowed(CLONE) {
            let clone = FunctionType::new(vec![target.clone()], target.clone());
            specs.push(primitive_impl(CLONE, "clone", clone, &target));
        }
    }
    specs
}

fn primitive_impl(
    interface: &str,
    method: &str,
    signature: FunctionType,
    target: &Type,
) -> ImplementationSpec {
    ImplementationSpec {
        impl_name: None,
        interface_name: interface.to_string(),
        type_params: Vec::new(),
        target: target.clone(),
        interface_args: Vec::new(),
        methods: BTreeMap::from([(method.to_string(), signature)]),
        where_clause: Vec::new(),
        obligations: Vec::new(),
        method_spans: BTreeMap::new(),
        span: Span::DUMMY,
    }
}
