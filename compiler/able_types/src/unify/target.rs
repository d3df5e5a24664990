//! Receiver-pattern matching for implementations and method sets.
//!
//! A candidate's target is a pattern that may mention the candidate's own
//! type parameters (`Box<T>`). Matching it against a concrete object
//! yields bindings for those parameters and a specificity score: one point
//! per parameter slot bound to a known type.

use std::slice;

use crate::obligation::GenericParamSpec;
use crate::relate::types_equivalent_for_signature;
use crate::subst::Subst;
use crate::types::Type;

/// Successful match of a receiver pattern.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TargetMatch {
    /// Every declared parameter is bound; unmatched ones to `Unknown`.
    pub subst: Subst,
    pub score: usize,
}

/// Nominal view of a receiver: name, arguments, and flavor.
struct NominalInfo<'a> {
    name: &'a str,
    args: &'a [Type],
    is_union: bool,
    is_nullable: bool,
}

const NULLABLE_LABEL: &str = "<nullable>";

static UNKNOWN: Type = Type::Unknown;

fn nominal_info(ty: &Type) -> Option<NominalInfo<'_>> {
    let info = match ty {
        Type::Struct(st) => NominalInfo {
            name: &st.name,
            args: &[],
            is_union: false,
            is_nullable: false,
        },
        Type::StructInstance(inst) => NominalInfo {
            name: &inst.name,
            args: &inst.type_args,
            is_union: false,
            is_nullable: false,
        },
        Type::Union(un) => NominalInfo {
            name: &un.name,
            args: &[],
            is_union: true,
            is_nullable: false,
        },
        Type::Nullable(inner) => NominalInfo {
            name: NULLABLE_LABEL,
            args: slice::from_ref(inner.as_ref()),
            is_union: false,
            is_nullable: true,
        },
        Type::Array(element) => NominalInfo {
            name: "Array",
            args: slice::from_ref(element.as_ref()),
            is_union: false,
            is_nullable: false,
        },
        Type::Applied { base, args } => match base.as_ref() {
            Type::Struct(st) => NominalInfo {
                name: &st.name,
                args,
                is_union: false,
                is_nullable: false,
            },
            Type::Union(un) => NominalInfo {
                name: &un.name,
                args,
                is_union: true,
                is_nullable: false,
            },
            _ => return None,
        },
        _ => return None,
    };
    (!info.name.is_empty()).then_some(info)
}

/// Nominal receiver name: struct, union, `Array`, or the nullable marker.
pub(crate) fn receiver_name(ty: &Type) -> Option<&str> {
    nominal_info(ty).map(|info| info.name)
}

/// Match `object` against a receiver pattern declared with `params`.
pub(crate) fn match_method_target(
    object: &Type,
    target: &Type,
    params: &[GenericParamSpec],
) -> Option<TargetMatch> {
    match (object, target) {
        (Type::Primitive(a), Type::Primitive(b)) if a == b => return Some(TargetMatch::default()),
        (Type::Integer(a), Type::Integer(b)) if a == b => return Some(TargetMatch::default()),
        (Type::Float(a), Type::Float(b)) if a == b => return Some(TargetMatch::default()),
        _ => {}
    }

    let object_info = nominal_info(object)?;
    let target_info = nominal_info(target)?;
    if object_info.name != target_info.name
        || object_info.is_union != target_info.is_union
        || object_info.is_nullable != target_info.is_nullable
    {
        return None;
    }

    let mut subst = Subst::default();
    let mut score = 0;
    for (idx, pattern) in target_info.args.iter().enumerate() {
        let actual = object_info.args.get(idx).unwrap_or(&UNKNOWN);
        score += match_type_argument(actual, pattern, &mut subst)?;
    }
    for param in params {
        subst.entry(param.name.clone()).or_insert(Type::Unknown);
    }
    Some(TargetMatch { subst, score })
}

/// Match one argument slot, binding pattern parameters into `subst`.
fn match_type_argument(actual: &Type, pattern: &Type, subst: &mut Subst) -> Option<usize> {
    if pattern.is_unknown() || actual.is_unknown() {
        return Some(0);
    }
    match pattern {
        Type::TypeParameter(name) => {
            if let Some(existing) = subst.get(name) {
                return types_equivalent_for_signature(existing, actual).then_some(0);
            }
            subst.insert(name.clone(), actual.clone());
            Some(1)
        }
        Type::Nullable(inner) => match actual {
            Type::Nullable(actual_inner) => match_type_argument(actual_inner, inner, subst),
            _ => None,
        },
        Type::Array(element) => {
            let actual_element = actual.array_element()?;
            match_type_argument(&actual_element, element, subst)
        }
        Type::Applied { base, args } => {
            let actual_args = match actual {
                Type::Applied {
                    base: actual_base,
                    args: actual_args,
                } if nominal_bases_compatible(actual_base, base) => actual_args,
                Type::StructInstance(inst) if nominal_bases_compatible(actual, base) => {
                    &inst.type_args
                }
                _ => return None,
            };
            if args.len() != actual_args.len() {
                return None;
            }
            let mut score = 0;
            for (actual_arg, pattern_arg) in actual_args.iter().zip(args) {
                score += match_type_argument(actual_arg, pattern_arg, subst)?;
            }
            Some(score)
        }
        Type::Union(un) => (actual.union_name() == Some(un.name.as_str())).then_some(0),
        Type::Struct(_) | Type::StructInstance(_) => {
            (actual.struct_name().is_some() && actual.struct_name() == pattern.struct_name())
                .then_some(0)
        }
        Type::UnionLiteral(members) => match actual {
            Type::UnionLiteral(actual_members) if actual_members.len() == members.len() => {
                let mut score = 0;
                for (actual_member, member) in actual_members.iter().zip(members) {
                    score += match_type_argument(actual_member, member, subst)?;
                }
                Some(score)
            }
            Type::UnionLiteral(_) => None,
            _ => types_equivalent_for_signature(actual, pattern).then_some(0),
        },
        _ => types_equivalent_for_signature(actual, pattern).then_some(0),
    }
}

fn nominal_bases_compatible(actual: &Type, pattern: &Type) -> bool {
    match pattern {
        Type::Struct(st) => actual.struct_name() == Some(st.name.as_str()),
        Type::StructInstance(inst) => actual.struct_name() == Some(inst.name.as_str()),
        Type::Union(un) => actual.union_name() == Some(un.name.as_str()),
        Type::Interface(iface) => {
            matches!(actual, Type::Interface(actual_iface) if actual_iface.name == iface.name)
        }
        _ => types_equivalent_for_signature(actual, pattern),
    }
}
