//! Type relations: signature equivalence, assignability, branch merging.

use crate::types::{FunctionType, Type};

/// Structural equality for comparing method signatures.
///
/// `Unknown` matches anything and any two type parameters match each
/// other regardless of name.
pub fn types_equivalent_for_signature(a: &Type, b: &Type) -> bool {
    if a.is_unknown() || b.is_unknown() {
        return true;
    }
    match (a, b) {
        (Type::TypeParameter(_), _) => b.is_type_parameter(),
        (
            Type::Struct(_) | Type::StructInstance(_),
            Type::Struct(_) | Type::StructInstance(_),
        ) => a.struct_name() == b.struct_name(),
        (Type::StructInstance(_), Type::Applied { base, .. }) => {
            types_equivalent_for_signature(a, base)
        }
        (Type::Applied { base: a_base, args: a_args }, Type::Applied { base: b_base, args: b_args }) => {
            types_equivalent_for_signature(a_base, b_base) && all_equivalent(a_args, b_args)
        }
        (Type::Applied { base, .. }, Type::Struct(_) | Type::StructInstance(_)) => {
            types_equivalent_for_signature(base, b)
        }
        (Type::Applied { .. }, _) => false,
        (Type::Array(x), Type::Array(y))
        | (Type::Nullable(x), Type::Nullable(y))
        | (Type::Range(x), Type::Range(y))
        | (Type::Proc(x), Type::Proc(y))
        | (Type::Future(x), Type::Future(y)) => types_equivalent_for_signature(x, y),
        (Type::UnionLiteral(xs), Type::UnionLiteral(ys)) => all_equivalent(xs, ys),
        (Type::Function(x), Type::Function(y)) => {
            all_equivalent(&x.params, &y.params) && types_equivalent_for_signature(&x.ret, &y.ret)
        }
        (Type::Function(_), _) => false,
        _ => a.to_string() == b.to_string(),
    }
}

fn all_equivalent(xs: &[Type], ys: &[Type]) -> bool {
    xs.len() == ys.len()
        && xs
            .iter()
            .zip(ys)
            .all(|(x, y)| types_equivalent_for_signature(x, y))
}

/// Directional compatibility for arguments, returns, and fields.
///
/// Deliberately permissive: `Unknown` and type parameters are accepted on
/// either side so later passes can refine them, and `void` accepts
/// everything.
pub fn type_assignable(from: &Type, to: &Type) -> bool {
    if to.is_void() || to.is_deferred() || from.is_deferred() {
        return true;
    }
    match to {
        Type::Struct(_) | Type::StructInstance(_) => {
            return from.struct_name().is_some() && from.struct_name() == to.struct_name();
        }
        Type::Array(target) => {
            return from
                .array_element()
                .is_some_and(|element| type_assignable(&element, target));
        }
        Type::Range(target) => {
            return matches!(from, Type::Range(element) if type_assignable(element, target));
        }
        Type::Nullable(target) => {
            return match from {
                Type::Nullable(inner) => type_assignable(inner, target),
                _ => type_assignable(from, target),
            };
        }
        Type::UnionLiteral(members) => return union_assignable(from, members),
        Type::Applied { base, args } => {
            return match from {
                Type::Applied {
                    base: from_base,
                    args: from_args,
                } => applied_assignable(from_base, from_args, base, args),
                Type::StructInstance(inst) if !inst.type_args.is_empty() => {
                    base.struct_name() == Some(inst.name.as_str())
                        && args_assignable(&inst.type_args, args)
                }
                _ => match (from.struct_name(), base.as_ref()) {
                    (Some(name), Type::Struct(st)) => st.name == name,
                    _ => false,
                },
            };
        }
        _ => {}
    }

    match from {
        Type::Struct(_) | Type::StructInstance(_) if to.struct_name().is_some() => {
            from.struct_name() == to.struct_name()
        }
        Type::Applied { base, .. } if to.struct_name().is_some() => {
            matches!(base.as_ref(), Type::Struct(st) if Some(st.name.as_str()) == to.struct_name())
        }
        Type::Array(element) => match to.array_element() {
            Some(target) => type_assignable(element, &target),
            None => false,
        },
        Type::Nullable(inner) => type_assignable(inner, to),
        Type::UnionLiteral(members) => members.iter().all(|m| type_assignable(m, to)),
        _ => from.to_string() == to.to_string(),
    }
}

fn applied_assignable(from_base: &Type, from_args: &[Type], to_base: &Type, to_args: &[Type]) -> bool {
    type_assignable(from_base, to_base) && args_assignable(from_args, to_args)
}

fn args_assignable(from_args: &[Type], to_args: &[Type]) -> bool {
    from_args.len() == to_args.len()
        && from_args
            .iter()
            .zip(to_args)
            .all(|(f, t)| type_assignable(f, t))
}

fn union_assignable(from: &Type, members: &[Type]) -> bool {
    match from {
        Type::UnionLiteral(sources) => sources
            .iter()
            .all(|source| assignable_to_any(source, members)),
        _ => assignable_to_any(from, members),
    }
}

fn assignable_to_any(from: &Type, targets: &[Type]) -> bool {
    targets.iter().any(|target| type_assignable(from, target))
}

/// Name-level identity used for union de-duplication.
///
/// `Unknown` is never the same as anything.
pub fn same_type(a: &Type, b: &Type) -> bool {
    if a.is_unknown() || b.is_unknown() {
        return false;
    }
    if a.to_string() == b.to_string() {
        return true;
    }
    match (a, b) {
        (Type::Applied { base: a_base, args: a_args }, Type::Applied { base: b_base, args: b_args }) => {
            same_type(a_base, b_base)
                && a_args.len() == b_args.len()
                && a_args.iter().zip(b_args).all(|(x, y)| same_type(x, y))
        }
        (Type::Array(x), Type::Array(y))
        | (Type::Range(x), Type::Range(y))
        | (Type::Nullable(x), Type::Nullable(y)) => same_type(x, y),
        (Type::UnionLiteral(xs), Type::UnionLiteral(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_type(x, y))
        }
        _ => false,
    }
}

/// Merge the result types of alternative branches.
///
/// `Unknown` branches are ignored; two branches that disagree yield `Unknown`.
pub fn merge_branch_types<'a>(types: impl IntoIterator<Item = &'a Type>) -> Type {
    let mut result = Type::Unknown;
    for ty in types {
        if ty.is_unknown() {
            continue;
        }
        if result.is_unknown() {
            result = ty.clone();
        } else if result.to_string() != ty.to_string() {
            return Type::Unknown;
        }
    }
    result
}

/// Build a flattened, de-duplicated union of `types`.
///
/// Collapses to the single member when only one remains.
pub fn build_union<'a>(types: impl IntoIterator<Item = &'a Type>) -> Type {
    let mut members: Vec<Type> = Vec::new();
    for ty in types {
        append_union_member(&mut members, ty);
    }
    match members.len() {
        0 => Type::Unknown,
        1 => members.pop().unwrap_or(Type::Unknown),
        _ => Type::UnionLiteral(members),
    }
}

fn append_union_member(members: &mut Vec<Type>, candidate: &Type) {
    match candidate {
        Type::Unknown => {}
        Type::UnionLiteral(inner) => {
            for member in inner {
                append_union_member(members, member);
            }
        }
        _ => {
            if !members.iter().any(|m| same_type(m, candidate)) {
                members.push(candidate.clone());
            }
        }
    }
}

/// Compare two method signatures for structural compatibility.
pub fn function_signatures_compatible(expected: &FunctionType, actual: &FunctionType) -> bool {
    expected.type_params.len() == actual.type_params.len()
        && all_equivalent(&expected.params, &actual.params)
        && types_equivalent_for_signature(&expected.ret, &actual.ret)
}

#[cfg(test)]
mod tests;
