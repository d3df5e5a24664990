//! Whole-module checks: collection, statement checking, solving, and
//! implementation validation together.

use std::sync::Once;

use able_diagnostic::{Diagnostic, DiagnosticKind};
use able_ir::ast::build::{
    block, call, expr_stmt, field, fn_def, generic_param, generic_ty, impl_def, int,
    interface_def, member, methods_def, module, param, signature, string, struct_def,
    struct_literal, ty, untyped_param, var,
};
use able_ir::ast::FunctionDef;
use able_ir::{Expr, Stmt};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::Checker;

static TRACING_INIT: Once = Once::new();

/// Route checker traces to stderr when `RUST_LOG` is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_test_writer())
                .with(EnvFilter::from_default_env())
                .try_init();
        }
    });
}

fn check(body: Vec<Stmt>) -> Vec<Diagnostic> {
    init_tracing();
    let Ok(diagnostics) = Checker::new().check_module(&module(body)) else {
        panic!("module should be well formed");
    };
    diagnostics
}

fn messages(body: Vec<Stmt>) -> Vec<String> {
    check(body).into_iter().map(|d| d.message).collect()
}

fn display_interface() -> Stmt {
    interface_def(
        "Display",
        Vec::new(),
        vec![signature("show", vec![untyped_param("self")], Some(ty("string")))],
    )
    .into()
}

fn wrapper() -> Stmt {
    struct_def("Wrapper", Vec::new(), vec![field("value", ty("string"))]).into()
}

fn show(ret: &str, body: Expr) -> FunctionDef {
    fn_def(
        "show",
        Vec::new(),
        vec![untyped_param("self")],
        Some(ty(ret)),
        body,
    )
}

fn show_value() -> FunctionDef {
    show("string", member(var("self"), "value"))
}

fn use_display() -> Stmt {
    fn_def(
        "useDisplay",
        vec![generic_param("T", vec![ty("Display")])],
        vec![param("value", ty("T"))],
        Some(ty("T")),
        var("value"),
    )
    .into()
}

fn call_use_display() -> Stmt {
    expr_stmt(call(
        var("useDisplay"),
        vec![struct_literal("Wrapper", vec![("value", string("hi"))])],
    ))
}

// Generic call whose constraint has no implementation.

#[test]
fn unsatisfied_constraint_at_call_site() {
    let diagnostics = check(vec![
        display_interface(),
        wrapper(),
        use_display(),
        call_use_display(),
    ]);
    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::Obligation);
    assert!(diagnostic.mentions("Display"));
    assert!(diagnostic.mentions("Wrapper"));
    assert_eq!(
        diagnostic.message,
        "typechecker: fn useDisplay constraint on T is not satisfied: Wrapper does not implement Display"
    );
}

#[test]
fn implementation_satisfies_call_site_constraint() {
    let diagnostics = messages(vec![
        display_interface(),
        wrapper(),
        impl_def("Display", Vec::new(), ty("Wrapper"), vec![show_value()]).into(),
        use_display(),
        call_use_display(),
    ]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn method_set_satisfies_call_site_constraint() {
    let diagnostics = messages(vec![
        display_interface(),
        wrapper(),
        methods_def(ty("Wrapper"), vec![show_value()]).into(),
        use_display(),
        call_use_display(),
    ]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn method_set_with_the_wrong_signature_does_not_satisfy() {
    let describe = fn_def(
        "describe",
        Vec::new(),
        vec![untyped_param("self")],
        Some(ty("string")),
        member(var("self"), "value"),
    );
    let diagnostics = check(vec![
        display_interface(),
        wrapper(),
        methods_def(ty("Wrapper"), vec![describe]).into(),
        use_display(),
        call_use_display(),
    ]);
    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
    assert!(diagnostics[0].mentions("does not implement Display"));
}

#[test]
fn builtin_display_covers_primitives() {
    let diagnostics = messages(vec![
        fn_def(
            "render",
            vec![generic_param("T", vec![ty("Display")])],
            vec![param("value", ty("T"))],
            None,
            block(Vec::new()),
        )
        .into(),
        expr_stmt(call(var("render"), vec![int(1)])),
        expr_stmt(call(var("render"), vec![string("s")])),
    ]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

// A module's own interface wins over the builtin of the same name, even
// when it is declared after its uses.

#[test]
fn later_module_interface_shadows_builtin_for_constraints() {
    let diagnostics = messages(vec![
        use_display(),
        call_use_display(),
        methods_def(ty("Wrapper"), vec![show_value()]).into(),
        display_interface(),
        wrapper(),
    ]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let diagnostics = messages(vec![
        use_display(),
        call_use_display(),
        impl_def("Display", Vec::new(), ty("Wrapper"), vec![show_value()]).into(),
        display_interface(),
        wrapper(),
    ]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn later_module_interface_shadows_builtin_for_members() {
    let render: Stmt = fn_def(
        "render",
        Vec::new(),
        vec![param("value", ty("Display"))],
        Some(ty("string")),
        call(member(var("value"), "show"), Vec::new()),
    )
    .into();
    let diagnostics = messages(vec![render, display_interface()]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

// Obligations report the substituted constraint.

#[test]
fn obligation_shows_substituted_interface_arguments() {
    let iterable: Stmt = interface_def("Iterable", vec![generic_param("T", Vec::new())], Vec::new())
        .into();
    let constraint = generic_ty("Iterable", vec![generic_ty("Array", vec![ty("T")])]);
    let use_iterable: Stmt = fn_def(
        "useIterable",
        vec![generic_param("T", vec![constraint])],
        vec![param("value", ty("T"))],
        None,
        block(Vec::new()),
    )
    .into();

    let diagnostics = messages(vec![
        iterable,
        use_iterable,
        expr_stmt(call(var("useIterable"), vec![int(5)])),
    ]);
    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
    assert!(diagnostics[0].contains("Iterable<Array<i32>>"), "{diagnostics:?}");
    assert!(!diagnostics[0].contains("Iterable<Array<T>>"), "{diagnostics:?}");
}

// Conflicting inference for one type parameter.

#[test]
fn conflicting_type_parameter_bindings() {
    let pair: Stmt = fn_def(
        "pair",
        vec![generic_param("T", Vec::new())],
        vec![param("a", ty("T")), param("b", ty("T"))],
        None,
        block(Vec::new()),
    )
    .into();
    let diagnostics = messages(vec![
        pair,
        expr_stmt(call(var("pair"), vec![int(1), string("x")])),
    ]);
    assert!(
        diagnostics.contains(
            &"typechecker: type parameter T inferred as i32 but argument 2 has type string"
                .to_string()
        ),
        "{diagnostics:?}"
    );
}

// Member access on interface-typed values.

#[test]
fn interface_member_access() {
    let show_access = member(var("value"), "show");
    let show_span = show_access.span;
    let inspect: Stmt = fn_def(
        "inspect",
        Vec::new(),
        vec![param("value", ty("Display"))],
        None,
        block(vec![
            expr_stmt(show_access),
            expr_stmt(member(var("value"), "missing")),
        ]),
    )
    .into();

    let mut checker = Checker::new();
    let Ok(diagnostics) = checker.check_module(&module(vec![display_interface(), inspect])) else {
        panic!("module should be well formed");
    };
    let diagnostics: Vec<String> = diagnostics.into_iter().map(|d| d.message).collect();
    assert_eq!(
        diagnostics,
        vec!["typechecker: interface 'Display' has no method 'missing'"]
    );
    let shown = checker
        .inferred_type(show_span)
        .map(ToString::to_string)
        .unwrap_or_default();
    assert_eq!(shown, "fn() -> string");
}

#[test]
fn constrained_type_parameter_members() {
    let render: Stmt = fn_def(
        "render",
        vec![generic_param("T", vec![ty("Display")])],
        vec![param("value", ty("T"))],
        Some(ty("string")),
        call(member(var("value"), "show"), Vec::new()),
    )
    .into();
    let diagnostics = messages(vec![display_interface(), render]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

// Implementation validation.

#[test]
fn implementation_return_type_mismatch() {
    let diagnostics = messages(vec![
        display_interface(),
        wrapper(),
        impl_def(
            "Display",
            Vec::new(),
            ty("Wrapper"),
            vec![show("i32", block(Vec::new()))],
        )
        .into(),
    ]);
    assert_eq!(
        diagnostics,
        vec!["typechecker: impl Display for Wrapper method 'show' return type expected string, got i32"]
    );
}

#[test]
fn implementation_bodies_are_checked() {
    let diagnostics = messages(vec![
        display_interface(),
        wrapper(),
        impl_def(
            "Display",
            Vec::new(),
            ty("Wrapper"),
            vec![show("string", member(var("self"), "size"))],
        )
        .into(),
    ]);
    assert_eq!(
        diagnostics,
        vec!["typechecker: struct 'Wrapper' has no member 'size'"]
    );
}

// Cross-module prelude.

#[test]
fn prelude_carries_exports_into_the_next_module() {
    let helper: Stmt = fn_def(
        "helper",
        Vec::new(),
        Vec::new(),
        Some(ty("i32")),
        int(1),
    )
    .into();
    let uses_helper = || module(vec![expr_stmt(call(var("helper"), Vec::new()))]);

    let mut dependency = Checker::new();
    let Ok(first) = dependency.check_module(&module(vec![helper])) else {
        panic!("dependency should be well formed");
    };
    assert!(first.is_empty(), "{first:?}");

    let mut dependent = Checker::new();
    dependent.set_prelude(
        dependency.global_env().clone(),
        dependency.module_implementations().to_vec(),
        dependency.module_method_sets().to_vec(),
    );
    let Ok(second) = dependent.check_module(&uses_helper()) else {
        panic!("dependent should be well formed");
    };
    assert!(second.is_empty(), "{second:?}");

    let Ok(isolated) = Checker::new().check_module(&uses_helper()) else {
        panic!("module should be well formed");
    };
    assert_eq!(isolated.len(), 1);
}

// Checking is a pure function of the module.

fn call_site_module(calls: &[bool]) -> Vec<Stmt> {
    let mut body = vec![
        display_interface(),
        wrapper(),
        impl_def("Display", Vec::new(), ty("Wrapper"), vec![show_value()]).into(),
        use_display(),
    ];
    for &with_struct in calls {
        let arg = if with_struct {
            struct_literal("Wrapper", vec![("value", string("hi"))])
        } else {
            int(1)
        };
        body.push(expr_stmt(call(var("useDisplay"), vec![arg])));
    }
    body
}

proptest! {
    #[test]
    fn rechecking_yields_identical_diagnostics(calls in prop::collection::vec(any::<bool>(), 0..6)) {
        let mut checker = Checker::new();
        let module = module(call_site_module(&calls));
        let first = checker.check_module(&module);
        let second = checker.check_module(&module);
        prop_assert!(first.is_ok());
        prop_assert_eq!(&first, &second);

        let failures = first.map(|d| d.len()).unwrap_or_default();
        prop_assert_eq!(failures, calls.iter().filter(|&&with_struct| !with_struct).count());
    }
}
