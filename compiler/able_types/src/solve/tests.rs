use able_ir::ast::build::{
    block, field, fn_def, generic_param, generic_ty, impl_def, interface_def, methods_def,
    module, signature, struct_def, ty, untyped_param, where_clause,
};
use able_ir::ast::FunctionDef;
use able_ir::{Span, Stmt};
use pretty_assertions::assert_eq;

use crate::config::LookupMode;
use crate::env::TypeEnv;
use crate::obligation::ConstraintObligation;
use crate::state::ModuleState;
use crate::types::Type;

fn display_interface() -> Stmt {
    interface_def(
        "Display",
        Vec::new(),
        vec![signature("show", vec![untyped_param("self")], Some(ty("string")))],
    )
    .into()
}

fn show_method() -> FunctionDef {
    fn_def(
        "show",
        Vec::new(),
        vec![untyped_param("self")],
        Some(ty("string")),
        block(Vec::new()),
    )
}

fn wrapper() -> Stmt {
    struct_def("Wrapper", Vec::new(), vec![field("value", ty("string"))]).into()
}

fn collected(body: Vec<Stmt>) -> ModuleState {
    let mut state = ModuleState::new(TypeEnv::new().child(), LookupMode::Strict);
    state.collect_declarations(&module(body));
    assert!(state.diagnostics.is_empty(), "{:?}", state.diagnostics);
    state
}

fn named(state: &ModuleState, name: &str) -> Type {
    state.global.lookup(name).cloned().unwrap_or(Type::Unknown)
}

fn obligation(subject: Type, constraint: Type) -> ConstraintObligation {
    ConstraintObligation {
        owner: "fn use".into(),
        type_param: "T".into(),
        constraint,
        subject,
        context: None,
        span: Span::DUMMY,
    }
}

fn solve(state: &ModuleState, obligations: &[ConstraintObligation]) -> Vec<String> {
    state
        .evaluate_obligations(obligations)
        .into_iter()
        .map(|d| d.message)
        .collect()
}

#[test]
fn constraint_must_name_an_interface() {
    let state = collected(vec![display_interface(), wrapper()]);
    let messages = solve(
        &state,
        &[
            obligation(Type::i32(), Type::nominal("Missing")),
            obligation(Type::i32(), named(&state, "Wrapper")),
            obligation(Type::i32(), Type::string()),
        ],
    );
    assert_eq!(
        messages,
        vec![
            "typechecker: fn use constraint on T references unknown interface 'Missing'",
            "typechecker: fn use constraint on T references 'Wrapper' which is not an interface",
            "typechecker: fn use constraint on T must reference an interface (got string)",
        ]
    );
}

#[test]
fn interface_argument_counts() {
    let iterable = interface_def(
        "Iterable",
        vec![generic_param("T", Vec::new())],
        vec![signature("each", vec![untyped_param("self")], Some(ty("T")))],
    );
    let state = collected(vec![iterable.into()]);
    let iface = named(&state, "Iterable");
    let messages = solve(
        &state,
        &[
            obligation(Type::string(), iface.clone()),
            obligation(
                Type::string(),
                Type::applied(iface, vec![Type::i32(), Type::bool()]),
            ),
        ],
    );
    assert_eq!(
        messages,
        vec![
            "typechecker: fn use constraint on T requires 1 type argument(s) for interface 'Iterable'",
            "typechecker: fn use constraint on T expected 1 type argument(s) for interface 'Iterable', got 2",
        ]
    );
}

#[test]
fn deferred_subjects_are_satisfied() {
    let state = collected(vec![display_interface()]);
    let display = named(&state, "Display");
    let messages = solve(
        &state,
        &[
            obligation(Type::param("T"), display.clone()),
            obligation(Type::Unknown, display),
        ],
    );
    assert!(messages.is_empty());
}

#[test]
fn explicit_implementation_satisfies() {
    let state = collected(vec![
        display_interface(),
        wrapper(),
        impl_def("Display", Vec::new(), ty("Wrapper"), vec![show_method()]).into(),
    ]);
    let display = named(&state, "Display");
    let subject = named(&state, "Wrapper");
    assert!(solve(&state, &[obligation(subject, display.clone())]).is_empty());

    let messages = solve(&state, &[obligation(Type::bool(), display)]);
    assert_eq!(
        messages,
        vec!["typechecker: fn use constraint on T is not satisfied: bool does not implement Display"]
    );
}

#[test]
fn interface_values_satisfy_their_own_interface() {
    let state = collected(vec![display_interface()]);
    let display = named(&state, "Display");
    assert!(solve(&state, &[obligation(display.clone(), display)]).is_empty());
}

#[test]
fn method_sets_satisfy_structurally() {
    let state = collected(vec![
        display_interface(),
        wrapper(),
        methods_def(ty("Wrapper"), vec![show_method()]).into(),
    ]);
    let display = named(&state, "Display");
    assert!(solve(&state, &[obligation(named(&state, "Wrapper"), display)]).is_empty());
}

#[test]
fn method_set_failures_carry_detail() {
    let describe = fn_def(
        "describe",
        Vec::new(),
        vec![untyped_param("self")],
        Some(ty("string")),
        block(Vec::new()),
    );
    let wrong = fn_def(
        "show",
        Vec::new(),
        vec![untyped_param("self")],
        Some(ty("i32")),
        block(Vec::new()),
    );
    let state = collected(vec![
        display_interface(),
        wrapper(),
        struct_def("Other", Vec::new(), vec![field("value", ty("string"))]).into(),
        methods_def(ty("Wrapper"), vec![describe]).into(),
        methods_def(ty("Other"), vec![wrong]).into(),
    ]);
    let display = named(&state, "Display");
    let messages = solve(
        &state,
        &[
            obligation(named(&state, "Wrapper"), display.clone()),
            obligation(named(&state, "Other"), display),
        ],
    );
    assert_eq!(
        messages,
        vec![
            "typechecker: fn use constraint on T is not satisfied: Wrapper does not implement Display: methods for Wrapper: method 'show' not provided by methods block",
            "typechecker: fn use constraint on T is not satisfied: Other does not implement Display: methods for Other: method 'show' has incompatible signature",
        ]
    );
}

#[test]
fn generic_method_sets_carry_their_constraints() {
    let mut block_def = methods_def(generic_ty("Box", vec![ty("T")]), vec![show_method()]);
    block_def.generics = vec![generic_param("T", vec![ty("Display")])];
    let state = collected(vec![
        display_interface(),
        struct_def("Box", vec![generic_param("T", Vec::new())], vec![field("value", ty("T"))])
            .into(),
        impl_def("Display", Vec::new(), ty("i32"), vec![show_method()]).into(),
        block_def.into(),
    ]);
    let display = named(&state, "Display");
    let boxed = named(&state, "Box");
    let box_of = |arg| Type::applied(boxed.clone(), vec![arg]);

    assert!(solve(&state, &[obligation(box_of(Type::i32()), display.clone())]).is_empty());
    let messages = solve(&state, &[obligation(box_of(Type::bool()), display)]);
    assert_eq!(
        messages,
        vec!["typechecker: fn use constraint on T is not satisfied: Box<bool> does not implement Display: methods for Box<T>: via method set"]
    );
}

#[test]
fn nullable_and_union_subjects_distribute() {
    let state = collected(vec![
        display_interface(),
        impl_def("Display", Vec::new(), ty("i32"), vec![show_method()]).into(),
        impl_def("Display", Vec::new(), ty("string"), vec![show_method()]).into(),
    ]);
    let display = named(&state, "Display");
    let satisfied = solve(
        &state,
        &[
            obligation(Type::nullable(Type::i32()), display.clone()),
            obligation(
                Type::UnionLiteral(vec![Type::i32(), Type::string()]),
                display.clone(),
            ),
        ],
    );
    assert!(satisfied.is_empty());

    let messages = solve(
        &state,
        &[obligation(
            Type::UnionLiteral(vec![Type::i32(), Type::bool()]),
            display,
        )],
    );
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Union[i32 | bool] does not implement Display"));
}

#[test]
fn self_referential_method_set_terminates() {
    let mut block_def = methods_def(ty("Wrapper"), vec![show_method()]);
    block_def.where_clause = vec![where_clause("Self", vec![ty("Display")])];
    let state = collected(vec![display_interface(), wrapper(), block_def.into()]);
    let display = named(&state, "Display");
    assert!(solve(&state, &[obligation(named(&state, "Wrapper"), display)]).is_empty());
}

#[test]
fn context_is_rendered_after_the_parameter() {
    let state = collected(vec![display_interface()]);
    let display = named(&state, "Display");
    let ob = obligation(Type::bool(), display).with_context("via method 'show'");
    assert_eq!(
        solve(&state, &[ob]),
        vec!["typechecker: fn use constraint on T (via method 'show') is not satisfied: bool does not implement Display"]
    );
}

#[test]
fn solving_is_repeatable() {
    let mut state = collected(vec![
        display_interface(),
        wrapper(),
        methods_def(ty("Wrapper"), Vec::new()).into(),
    ]);
    let display = named(&state, "Display");
    state.obligations = vec![
        obligation(named(&state, "Wrapper"), display.clone()),
        obligation(Type::bool(), display.clone()),
        obligation(Type::i32(), Type::nominal("Missing")),
    ];
    let first = state.solve_obligations();
    let second = state.solve_obligations();
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}
