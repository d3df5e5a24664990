//! Unary and binary operators.
//!
//! Mixed integer widths promote to the smallest type holding both
//! operands; a float on either side makes the result a float.

use able_diagnostic::Diagnostic;
use able_ir::ast::{BinaryOp, UnaryOp};
use able_ir::{Expr, Span};

use crate::env::TypeEnv;
use crate::relate::merge_branch_types;
use crate::state::ModuleState;
use crate::types::{FloatSuffix, IntegerSuffix, Type};

impl ModuleState {
    pub(super) fn check_unary(
        &mut self,
        op: UnaryOp,
        operand: &Expr,
        span: Span,
        env: &TypeEnv,
    ) -> Type {
        let operand = self.check_expr(operand, env);
        let (accepted, requirement) = match op {
            UnaryOp::Not => return Type::bool(),
            UnaryOp::Negate => (operand.is_numeric(), "numeric"),
            UnaryOp::BitNot => (operand.is_integer(), "integer"),
        };
        if operand.is_deferred() {
            return Type::Unknown;
        }
        if !accepted {
            self.report(Diagnostic::compatibility(
                span,
                format!(
                    "typechecker: unary '{}' requires {requirement} operand (got {operand})",
                    op.as_str()
                ),
            ));
            return Type::Unknown;
        }
        operand
    }

    pub(super) fn check_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        span: Span,
        env: &TypeEnv,
    ) -> Type {
        let left = self.check_expr(left, env);
        let right = self.check_expr(right, env);

        let resolved = match op {
            BinaryOp::And | BinaryOp::Or => Ok(merge_branch_types([&left, &right])),
            BinaryOp::Eq | BinaryOp::NotEq => Ok(Type::bool()),
            BinaryOp::Add if left.is_string() && right.is_string() => Ok(Type::string()),
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => numeric_result(&left, &right),
            BinaryOp::Div => division_result(&left, &right),
            BinaryOp::Mod
            | BinaryOp::BitAnd
            | BinaryOp::BitOr
            | BinaryOp::BitXor
            | BinaryOp::Shl
            | BinaryOp::Shr => integer_result(&left, &right),
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                if left.is_string() && right.is_string() {
                    Ok(Type::bool())
                } else {
                    numeric_result(&left, &right).map(|_| Type::bool())
                }
            }
        };

        resolved.unwrap_or_else(|detail| {
            self.report(Diagnostic::compatibility(
                span,
                format!("typechecker: '{}' {detail}", op.as_str()),
            ));
            // Comparisons stay bool so conditions do not cascade.
            match op {
                BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => Type::bool(),
                _ => Type::Unknown,
            }
        })
    }
}

fn numeric_result(left: &Type, right: &Type) -> Result<Type, String> {
    if left.is_deferred() || right.is_deferred() {
        return Ok(Type::Unknown);
    }
    if !left.is_numeric() || !right.is_numeric() {
        return Err(format!(
            "requires numeric operands (got {left} and {right})"
        ));
    }
    if left.is_float() || right.is_float() {
        return Ok(float_result(left, right));
    }
    integer_result(left, right)
}

/// Integer division widens to `f64`.
fn division_result(left: &Type, right: &Type) -> Result<Type, String> {
    match numeric_result(left, right)? {
        Type::Integer(_) => Ok(Type::f64()),
        other => Ok(other),
    }
}

fn float_result(left: &Type, right: &Type) -> Type {
    let wide = [left, right]
        .iter()
        .any(|ty| matches!(ty, Type::Float(FloatSuffix::F64)));
    Type::Float(if wide { FloatSuffix::F64 } else { FloatSuffix::F32 })
}

fn integer_result(left: &Type, right: &Type) -> Result<Type, String> {
    if left.is_deferred() || right.is_deferred() {
        return Ok(Type::Unknown);
    }
    let (Type::Integer(l), Type::Integer(r)) = (left, right) else {
        return Err(format!(
            "requires integer operands (got {left} and {right})"
        ));
    };
    promote(*l, *r).map(Type::Integer)
}

/// Bit width and signedness; `isize`/`usize` count as 64-bit.
fn width(suffix: IntegerSuffix) -> (u32, bool) {
    match suffix {
        IntegerSuffix::I8 => (8, true),
        IntegerSuffix::I16 => (16, true),
        IntegerSuffix::I32 => (32, true),
        IntegerSuffix::I64 | IntegerSuffix::Isize => (64, true),
        IntegerSuffix::I128 => (128, true),
        IntegerSuffix::U8 => (8, false),
        IntegerSuffix::U16 => (16, false),
        IntegerSuffix::U32 => (32, false),
        IntegerSuffix::U64 | IntegerSuffix::Usize => (64, false),
        IntegerSuffix::U128 => (128, false),
    }
}

fn smallest(bits: u32, signed: bool) -> Option<IntegerSuffix> {
    let ladder = if signed {
        [
            IntegerSuffix::I8,
            IntegerSuffix::I16,
            IntegerSuffix::I32,
            IntegerSuffix::I64,
            IntegerSuffix::I128,
        ]
    } else {
        [
            IntegerSuffix::U8,
            IntegerSuffix::U16,
            IntegerSuffix::U32,
            IntegerSuffix::U64,
            IntegerSuffix::U128,
        ]
    };
    ladder.into_iter().find(|suffix| width(*suffix).0 >= bits)
}

/// Smallest integer type holding every value of both operands.
///
/// Mixed signedness needs a signed type one bit wider than the wider
/// operand; past 128 bits the wider unsigned operand is kept.
fn promote(left: IntegerSuffix, right: IntegerSuffix) -> Result<IntegerSuffix, String> {
    if left == right {
        return Ok(left);
    }
    let (l_bits, l_signed) = width(left);
    let (r_bits, r_signed) = width(right);
    let exceeded = |bits: u32| {
        format!(
            "integer operands {} and {} require {bits} bits, exceeding available widths",
            left.as_str(),
            right.as_str()
        )
    };

    if l_signed == r_signed {
        let bits = l_bits.max(r_bits);
        return smallest(bits, l_signed).ok_or_else(|| exceeded(bits));
    }
    let needed = l_bits.max(r_bits) + 1;
    if let Some(suffix) = smallest(needed, true) {
        return Ok(suffix);
    }
    let unsigned = if l_signed { (right, r_bits) } else { (left, l_bits) };
    if unsigned.1 >= l_bits.max(r_bits) {
        return Ok(unsigned.0);
    }
    Err(exceeded(needed))
}
