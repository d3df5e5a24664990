use std::collections::BTreeMap;
use std::sync::Arc;

use able_ir::ast::build::{
    block, field, fn_def, generic_param, generic_ty, ident, impl_def, interface_def, methods_def,
    module, param, positional_field, signature, struct_def, ty, untyped_param, where_clause,
};
use able_ir::ast::MemberKey;
use able_ir::ast::FunctionDef;
use able_ir::{Span, Stmt};
use pretty_assertions::assert_eq;

use crate::config::LookupMode;
use crate::env::TypeEnv;
use crate::state::{GenericScope, ModuleState};
use crate::types::{FunctionType, PackageType, StructInstanceType, Type};

fn collected(body: Vec<Stmt>) -> ModuleState {
    let mut state = ModuleState::new(TypeEnv::new().child(), LookupMode::Strict);
    state.collect_declarations(&module(body));
    assert!(state.diagnostics.is_empty(), "{:?}", state.diagnostics);
    state
}

fn named(state: &ModuleState, name: &str) -> Type {
    state.global.lookup(name).cloned().unwrap_or(Type::Unknown)
}

fn name(member: &str) -> MemberKey {
    MemberKey::Name(ident(member))
}

fn position(value: u32) -> MemberKey {
    MemberKey::Index {
        value,
        span: Span::DUMMY,
    }
}

/// Rendered member type, or the diagnostic message.
fn access(state: &ModuleState, object: &Type, member: &MemberKey) -> String {
    match state.resolve_member(object, member, Span::DUMMY) {
        Ok(ty) => ty.to_string(),
        Err(diagnostic) => diagnostic.message,
    }
}

fn display_interface() -> Stmt {
    interface_def(
        "Display",
        Vec::new(),
        vec![signature("show", vec![untyped_param("self")], Some(ty("string")))],
    )
    .into()
}

fn method(name: &str, ret: &str) -> FunctionDef {
    fn_def(
        name,
        Vec::new(),
        vec![untyped_param("self")],
        Some(ty(ret)),
        block(Vec::new()),
    )
}

fn wrapper() -> Stmt {
    struct_def("Wrapper", Vec::new(), vec![field("value", ty("string"))]).into()
}

#[test]
fn interface_members() {
    let state = collected(vec![display_interface()]);
    let display = named(&state, "Display");
    assert_eq!(access(&state, &display, &name("show")), "fn() -> string");
    assert_eq!(
        access(&state, &display, &name("missing")),
        "typechecker: interface 'Display' has no method 'missing'"
    );
    assert_eq!(
        access(&state, &display, &position(0)),
        "typechecker: positional member access not supported on interfaces"
    );
}

#[test]
fn applied_interface_members_take_arguments() {
    let iterable = interface_def(
        "Iterable",
        vec![generic_param("T", Vec::new())],
        vec![signature("first", vec![untyped_param("self")], Some(ty("T")))],
    );
    let state = collected(vec![iterable.into()]);
    let applied = Type::applied(named(&state, "Iterable"), vec![Type::char()]);
    assert_eq!(access(&state, &applied, &name("first")), "fn() -> char");
}

#[test]
fn struct_fields_and_positions() {
    let state = collected(vec![
        wrapper(),
        struct_def(
            "Pair",
            Vec::new(),
            vec![positional_field(ty("i32")), positional_field(ty("bool"))],
        )
        .into(),
    ]);
    let wrapper = named(&state, "Wrapper");
    assert_eq!(access(&state, &wrapper, &name("value")), "string");
    assert_eq!(
        access(&state, &wrapper, &name("missing")),
        "typechecker: struct 'Wrapper' has no member 'missing'"
    );

    let pair = named(&state, "Pair");
    assert_eq!(access(&state, &pair, &position(1)), "bool");
    assert_eq!(
        access(&state, &pair, &position(2)),
        "typechecker: struct 'Pair' has no positional member 2"
    );
}

#[test]
fn generic_struct_fields_are_instantiated() {
    let state = collected(vec![struct_def(
        "Box",
        vec![generic_param("T", Vec::new())],
        vec![field("value", ty("T"))],
    )
    .into()]);
    let applied = Type::applied(named(&state, "Box"), vec![Type::string()]);
    assert_eq!(access(&state, &applied, &name("value")), "string");

    let literal = Type::StructInstance(StructInstanceType {
        name: "Box".into(),
        type_args: vec![Type::i32()],
        ..StructInstanceType::default()
    });
    assert_eq!(access(&state, &literal, &name("value")), "i32");

    let shaped = Type::StructInstance(StructInstanceType {
        name: "Box".into(),
        fields: BTreeMap::from([("value".to_string(), Type::bool())]),
        ..StructInstanceType::default()
    });
    assert_eq!(access(&state, &shaped, &name("value")), "bool");
}

#[test]
fn implementation_methods_bind_the_receiver() {
    let state = collected(vec![
        display_interface(),
        wrapper(),
        impl_def("Display", Vec::new(), ty("Wrapper"), vec![method("show", "string")]).into(),
        impl_def("Display", Vec::new(), ty("i32"), vec![method("show", "string")]).into(),
    ]);
    assert_eq!(
        access(&state, &named(&state, "Wrapper"), &name("show")),
        "fn() -> string"
    );
    assert_eq!(access(&state, &Type::i32(), &name("show")), "fn() -> string");
    assert_eq!(
        access(&state, &Type::bool(), &name("show")),
        "typechecker: cannot access member 'show' on type bool"
    );
}

#[test]
fn implementation_wins_an_exact_tie() {
    let state = collected(vec![
        display_interface(),
        wrapper(),
        methods_def(ty("Wrapper"), vec![method("show", "i32")]).into(),
        impl_def("Display", Vec::new(), ty("Wrapper"), vec![method("show", "string")]).into(),
    ]);
    assert_eq!(
        access(&state, &named(&state, "Wrapper"), &name("show")),
        "fn() -> string"
    );
}

#[test]
fn more_specific_method_set_wins() {
    let mut generic_block = methods_def(
        generic_ty("Box", vec![ty("T")]),
        vec![method("describe", "T")],
    );
    generic_block.generics = vec![generic_param("T", Vec::new())];
    let state = collected(vec![
        struct_def("Box", vec![generic_param("T", Vec::new())], vec![field("value", ty("T"))])
            .into(),
        methods_def(ty("Box"), vec![method("describe", "string")]).into(),
        generic_block.into(),
    ]);
    let applied = Type::applied(named(&state, "Box"), vec![Type::i32()]);
    assert_eq!(access(&state, &applied, &name("describe")), "fn() -> i32");
}

#[test]
fn method_set_constraints_travel_with_the_method() {
    let mut block_def = methods_def(generic_ty("Box", vec![ty("T")]), vec![method("get", "T")]);
    block_def.generics = vec![generic_param("T", vec![ty("Display")])];
    let state = collected(vec![
        display_interface(),
        struct_def("Box", vec![generic_param("T", Vec::new())], vec![field("value", ty("T"))])
            .into(),
        block_def.into(),
    ]);
    let applied = Type::applied(named(&state, "Box"), vec![Type::i32()]);
    let Some(get) = state.lookup_method(&applied, "get") else {
        panic!("get should resolve on Box<i32>");
    };
    assert!(get.params.is_empty());
    assert_eq!(*get.ret, Type::i32());
    let owners: Vec<(&str, String)> = get
        .obligations
        .iter()
        .map(|ob| (ob.owner.as_str(), ob.subject.to_string()))
        .collect();
    assert_eq!(owners, vec![("methods for Box<i32>::get", "i32".to_string())]);
}

#[test]
fn method_sets_reach_methods_through_their_constraints() {
    let mut block_def = methods_def(ty("Wrapper"), vec![method("describe", "string")]);
    block_def.where_clause = vec![where_clause("Self", vec![ty("Display")])];
    let state = collected(vec![display_interface(), wrapper(), block_def.into()]);
    assert_eq!(
        access(&state, &named(&state, "Wrapper"), &name("show")),
        "fn() -> string"
    );
}

#[test]
fn non_receiver_methods_stay_unbound() {
    let make = fn_def(
        "make",
        Vec::new(),
        vec![param("value", ty("string"))],
        Some(ty("Wrapper")),
        block(Vec::new()),
    );
    let state = collected(vec![wrapper(), methods_def(ty("Wrapper"), vec![make]).into()]);
    assert_eq!(
        access(&state, &named(&state, "Wrapper"), &name("make")),
        "fn(string) -> Wrapper"
    );
}

#[test]
fn type_parameters_resolve_through_constraints() {
    let mut state = collected(vec![display_interface()]);
    assert_eq!(
        access(&state, &Type::param("T"), &name("show")),
        "typechecker: cannot access member 'show' on type parameter T"
    );

    let mut scope = GenericScope::default();
    scope.types.insert("T".into(), Type::param("T"));
    scope
        .constraints
        .insert("T".into(), vec![named(&state, "Display")]);
    state.generic_stack.push(scope);
    assert_eq!(access(&state, &Type::param("T"), &name("show")), "fn() -> string");
    assert_eq!(
        access(&state, &Type::param("T"), &name("other")),
        "typechecker: cannot access member 'other' on type parameter T"
    );
}

#[test]
fn proc_and_future_handles() {
    let state = collected(Vec::new());
    let proc = Type::proc(Type::i32());
    let future = Type::future(Type::string());

    assert_eq!(access(&state, &proc, &name("status")), "fn() -> ProcStatus");
    assert_eq!(
        access(&state, &proc, &name("value")),
        "fn() -> Union[i32 | ProcError]"
    );
    assert_eq!(access(&state, &proc, &name("cancel")), "fn() -> nil");
    assert_eq!(
        access(&state, &proc, &name("join")),
        "typechecker: proc handle has no member 'join'"
    );

    assert_eq!(
        access(&state, &future, &name("value")),
        "fn() -> Union[string | ProcError]"
    );
    assert_eq!(
        access(&state, &future, &name("cancel")),
        "typechecker: future handles do not support cancel()"
    );
    assert_eq!(
        access(&state, &future, &name("join")),
        "typechecker: future handle has no member 'join'"
    );
}

#[test]
fn package_members_defer_when_unknown() {
    let state = collected(Vec::new());
    let pkg = Type::Package(Arc::new(PackageType {
        name: "io".into(),
        symbols: BTreeMap::from([(
            "read".to_string(),
            Type::from(FunctionType::new(Vec::new(), Type::string())),
        )]),
    }));
    assert_eq!(access(&state, &pkg, &name("read")), "fn() -> string");
    assert_eq!(access(&state, &pkg, &name("write")), "Unknown");
    assert_eq!(access(&state, &Type::Unknown, &name("anything")), "Unknown");
}

#[test]
fn positional_access_on_other_types() {
    let state = collected(Vec::new());
    assert_eq!(
        access(&state, &Type::string(), &position(0)),
        "typechecker: cannot access positional member 0 on type string"
    );
    assert_eq!(
        access(&state, &Type::param("T"), &position(0)),
        "typechecker: positional member access not supported on type parameters"
    );
}
