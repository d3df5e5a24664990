use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::types::{InterfaceType, StructInstanceType};

fn instance(name: &str) -> Type {
    Type::StructInstance(StructInstanceType {
        name: name.into(),
        ..StructInstanceType::default()
    })
}

#[test]
fn unknown_matches_everything_in_signatures() {
    assert!(types_equivalent_for_signature(&Type::Unknown, &Type::i32()));
    assert!(types_equivalent_for_signature(&Type::string(), &Type::Unknown));
}

#[test]
fn type_parameters_are_renaming_insensitive() {
    assert!(types_equivalent_for_signature(
        &Type::param("T"),
        &Type::param("U")
    ));
    assert!(!types_equivalent_for_signature(&Type::param("T"), &Type::i32()));
    assert!(types_equivalent_for_signature(
        &Type::function(vec![Type::param("A")], Type::array(Type::param("A"))),
        &Type::function(vec![Type::param("B")], Type::array(Type::param("C")))
    ));
}

#[test]
fn structs_compare_by_name_in_signatures() {
    assert!(types_equivalent_for_signature(
        &Type::nominal("Wrapper"),
        &instance("Wrapper")
    ));
    assert!(!types_equivalent_for_signature(
        &Type::nominal("Wrapper"),
        &instance("Other")
    ));
    assert!(types_equivalent_for_signature(
        &Type::applied(Type::nominal("Box"), vec![Type::i32()]),
        &Type::nominal("Box")
    ));
}

#[test]
fn signature_shapes_must_agree() {
    assert!(!types_equivalent_for_signature(
        &Type::array(Type::i32()),
        &Type::nullable(Type::i32())
    ));
    assert!(!types_equivalent_for_signature(
        &Type::function(vec![Type::i32()], Type::nil()),
        &Type::function(Vec::new(), Type::nil())
    ));
    assert!(!types_equivalent_for_signature(&Type::string(), &Type::i32()));
}

#[test]
fn void_is_a_universal_sink() {
    assert!(type_assignable(&Type::i32(), &Type::void()));
    assert!(type_assignable(&Type::nominal("Wrapper"), &Type::void()));
}

#[test]
fn assignability_is_covariant() {
    assert!(type_assignable(
        &Type::array(instance("Point")),
        &Type::array(Type::nominal("Point"))
    ));
    assert!(!type_assignable(
        &Type::array(Type::i32()),
        &Type::array(Type::string())
    ));
    assert!(type_assignable(
        &Type::range(Type::i32()),
        &Type::range(Type::i32())
    ));
    assert!(type_assignable(&Type::i32(), &Type::nullable(Type::i32())));
    assert!(type_assignable(
        &Type::nullable(Type::i32()),
        &Type::nullable(Type::i32())
    ));
}

#[test]
fn union_targets_accept_any_member() {
    let target = Type::UnionLiteral(vec![Type::i32(), Type::string()]);
    assert!(type_assignable(&Type::string(), &target));
    assert!(!type_assignable(&Type::bool(), &target));
    assert!(type_assignable(
        &Type::UnionLiteral(vec![Type::string(), Type::i32()]),
        &target
    ));
    assert!(!type_assignable(
        &Type::UnionLiteral(vec![Type::string(), Type::bool()]),
        &target
    ));
}

#[test]
fn union_sources_need_every_member() {
    let source = Type::UnionLiteral(vec![Type::i32(), Type::i32()]);
    assert!(type_assignable(&source, &Type::i32()));
    let mixed = Type::UnionLiteral(vec![Type::i32(), Type::string()]);
    assert!(!type_assignable(&mixed, &Type::i32()));
}

#[test]
fn applied_assignability_checks_arguments() {
    let boxed_i32 = Type::applied(Type::nominal("Box"), vec![Type::i32()]);
    let boxed_str = Type::applied(Type::nominal("Box"), vec![Type::string()]);
    assert!(type_assignable(&boxed_i32, &boxed_i32));
    assert!(!type_assignable(&boxed_i32, &boxed_str));
    assert!(type_assignable(&instance("Box"), &boxed_str));
}

#[test]
fn interfaces_compare_by_name() {
    let display = Type::Interface(Arc::new(InterfaceType {
        name: "Display".into(),
        ..InterfaceType::default()
    }));
    assert!(type_assignable(&display, &display));
    assert!(!type_assignable(&Type::i32(), &display));
}

#[test]
fn build_union_flattens_and_dedups() {
    let nested = Type::UnionLiteral(vec![Type::i32(), Type::string()]);
    let built = build_union([&Type::i32(), &nested, &Type::Unknown, &Type::bool()]);
    assert_eq!(built.to_string(), "Union[i32 | string | bool]");
    assert_eq!(build_union([&Type::i32(), &Type::i32()]), Type::i32());
    assert_eq!(build_union([&Type::Unknown]), Type::Unknown);
}

#[test]
fn branch_merge_agrees_or_defers() {
    assert_eq!(
        merge_branch_types([&Type::Unknown, &Type::i32(), &Type::i32()]),
        Type::i32()
    );
    assert_eq!(
        merge_branch_types([&Type::i32(), &Type::string()]),
        Type::Unknown
    );
}

#[test]
fn same_type_ignores_unknown() {
    assert!(!same_type(&Type::Unknown, &Type::Unknown));
    assert!(same_type(&Type::array(Type::i32()), &Type::array(Type::i32())));
    assert!(!same_type(&Type::array(Type::i32()), &Type::array(Type::bool())));
}

#[test]
fn signatures_compare_generic_arity() {
    let mut expected = FunctionType::new(vec![Type::nominal("Wrapper")], Type::string());
    let actual = expected.clone();
    assert!(function_signatures_compatible(&expected, &actual));
    expected
        .type_params
        .push(crate::obligation::GenericParamSpec::new("T", Vec::new()));
    assert!(!function_signatures_compatible(&expected, &actual));
}

fn arb_type() -> impl Strategy<Value = Type> {
    let leaf = prop_oneof![
        Just(Type::i32()),
        Just(Type::f64()),
        Just(Type::string()),
        Just(Type::nil()),
        Just(Type::Unknown),
        "[A-Z]".prop_map(Type::param),
        "[A-Z][a-z]{1,5}".prop_map(Type::nominal),
    ];
    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(Type::array),
            inner.clone().prop_map(Type::nullable),
            prop::collection::vec(inner.clone(), 1..3).prop_map(Type::UnionLiteral),
            (inner.clone(), prop::collection::vec(inner, 1..3))
                .prop_map(|(base, args)| Type::applied(base, args)),
        ]
    })
}

proptest! {
    #[test]
    fn unknown_is_assignable_both_ways(ty in arb_type()) {
        prop_assert!(type_assignable(&Type::Unknown, &ty));
        prop_assert!(type_assignable(&ty, &Type::Unknown));
    }

    #[test]
    fn signature_equivalence_is_reflexive(ty in arb_type()) {
        prop_assert!(types_equivalent_for_signature(&ty, &ty));
    }
}
