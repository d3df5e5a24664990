use std::collections::BTreeMap;
use std::sync::Arc;

use able_ir::Span;
use pretty_assertions::assert_eq;

use crate::config::LookupMode;
use crate::env::TypeEnv;
use crate::obligation::{ConstraintObligation, GenericParamSpec};
use crate::state::ModuleState;
use crate::types::{FunctionType, StructInstanceType, StructType, Type};

fn state() -> ModuleState {
    let mut global = TypeEnv::new();
    global.define("Box", Type::Struct(boxed()));
    ModuleState::new(global, LookupMode::Strict)
}

fn boxed() -> Arc<StructType> {
    Arc::new(StructType {
        name: "Box".into(),
        type_params: vec![GenericParamSpec::new("T", Vec::new())],
        fields: BTreeMap::from([("value".to_string(), Type::param("T"))]),
        positional: vec![Type::param("T")],
        where_clause: Vec::new(),
    })
}

fn generic(params: &[&str], args: Vec<Type>, ret: Type) -> FunctionType {
    FunctionType {
        type_params: params
            .iter()
            .map(|name| GenericParamSpec::new(*name, Vec::new()))
            .collect(),
        ..FunctionType::new(args, ret)
    }
}

fn instance(fields: &[(&str, Type)]) -> Type {
    Type::StructInstance(StructInstanceType {
        name: "Box".into(),
        fields: fields
            .iter()
            .map(|(name, ty)| ((*name).to_string(), ty.clone()))
            .collect(),
        ..StructInstanceType::default()
    })
}

#[test]
fn binds_parameters_and_substitutes_return() {
    let identity = generic(&["T"], vec![Type::param("T")], Type::param("T"));
    let inst = state().instantiate_call(&identity, &[], &[Type::string()], &[], Span::DUMMY);
    assert!(inst.diagnostics.is_empty());
    assert_eq!(*inst.signature.ret, Type::string());
    assert!(inst.signature.type_params.is_empty());
}

#[test]
fn conflicting_bindings_are_diagnosed() {
    let pair = generic(&["T"], vec![Type::param("T"), Type::param("T")], Type::nil());
    let inst = state().instantiate_call(
        &pair,
        &[],
        &[Type::i32(), Type::string()],
        &[],
        Span::DUMMY,
    );
    let messages: Vec<&str> = inst.diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["typechecker: type parameter T inferred as i32 but argument 2 has type string"]
    );
    assert_eq!(inst.signature.params, vec![Type::i32(), Type::i32()]);
}

#[test]
fn explicit_arguments_win_over_inference() {
    let identity = generic(&["T"], vec![Type::param("T")], Type::param("T"));
    let inst = state().instantiate_call(
        &identity,
        &[Type::i32()],
        &[Type::string()],
        &[],
        Span::DUMMY,
    );
    assert_eq!(inst.diagnostics.len(), 1);
    assert!(inst.diagnostics[0].mentions("inferred as i32 but argument 1 has type string"));
    assert_eq!(*inst.signature.ret, Type::i32());
}

#[test]
fn unknown_arguments_leave_parameters_free() {
    let identity = generic(&["T"], vec![Type::param("T")], Type::param("T"));
    let inst = state().instantiate_call(&identity, &[], &[Type::Unknown], &[], Span::DUMMY);
    assert!(inst.diagnostics.is_empty());
    assert_eq!(*inst.signature.ret, Type::param("T"));
    assert_eq!(inst.signature.type_params.len(), 1);
}

#[test]
fn structural_positions_bind() {
    let first = generic(&["T"], vec![Type::array(Type::param("T"))], Type::param("T"));
    let inst = state().instantiate_call(
        &first,
        &[],
        &[Type::array(Type::f64())],
        &[],
        Span::DUMMY,
    );
    assert_eq!(*inst.signature.ret, Type::f64());

    let unwrap = generic(&["T"], vec![Type::nullable(Type::param("T"))], Type::param("T"));
    let inst = state().instantiate_call(&unwrap, &[], &[Type::string()], &[], Span::DUMMY);
    assert_eq!(*inst.signature.ret, Type::string());

    let apply = generic(
        &["A", "B"],
        vec![Type::function(vec![Type::param("A")], Type::param("B"))],
        Type::param("B"),
    );
    let callback = Type::function(vec![Type::i32()], Type::bool());
    let inst = state().instantiate_call(&apply, &[], &[callback], &[], Span::DUMMY);
    assert_eq!(*inst.signature.ret, Type::bool());

    let await_fn = generic(&["T"], vec![Type::proc(Type::param("T"))], Type::param("T"));
    let inst = state().instantiate_call(
        &await_fn,
        &[],
        &[Type::proc(Type::char())],
        &[],
        Span::DUMMY,
    );
    assert_eq!(*inst.signature.ret, Type::char());
}

#[test]
fn struct_literal_fields_drive_inference() {
    let unbox = generic(
        &["T"],
        vec![Type::applied(Type::Struct(boxed()), vec![Type::param("T")])],
        Type::param("T"),
    );
    let inst = state().instantiate_call(
        &unbox,
        &[],
        &[instance(&[("value", Type::i32())])],
        &[],
        Span::DUMMY,
    );
    assert!(inst.diagnostics.is_empty());
    assert_eq!(*inst.signature.ret, Type::i32());
}

#[test]
fn struct_literal_arguments_from_fields() {
    let state = state();
    let Type::StructInstance(literal) = instance(&[("value", Type::string())]) else {
        unreachable!();
    };
    let args = state.infer_struct_literal_arguments(&boxed(), &literal, Span::DUMMY);
    assert_eq!(args, vec![Type::string()]);

    let empty = StructInstanceType {
        name: "Box".into(),
        ..StructInstanceType::default()
    };
    let args = state.infer_struct_literal_arguments(&boxed(), &empty, Span::DUMMY);
    assert_eq!(args, vec![Type::Unknown]);
}

#[test]
fn obligations_take_concrete_subjects() {
    let mut show = generic(&["T"], vec![Type::param("T")], Type::nil());
    show.obligations = vec![ConstraintObligation {
        owner: "fn show".into(),
        type_param: "T".into(),
        constraint: Type::nominal("Display"),
        subject: Type::param("T"),
        context: None,
        span: Span::DUMMY,
    }];
    let inst = state().instantiate_call(&show, &[], &[Type::i32()], &[], Span::DUMMY);
    assert_eq!(inst.signature.obligations[0].subject, Type::i32());
}
