//! Expressions.

use std::fmt;
use std::str::FromStr;

use super::{GenericParam, Ident, Param, Pattern, Stmt, TypeExpr};
use crate::{Span, Spanned};

/// Expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Identifier(Ident),
    /// `[a, b, c]`
    Array(Vec<Expr>),
    /// `do { ... }`; the value is that of the last expression statement.
    Block(Vec<Stmt>),
    /// `if c { .. } or d { .. } or { .. }`
    If {
        condition: Box<Expr>,
        body: Box<Expr>,
        or_clauses: Vec<OrClause>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `{ x: i32 => x + 1 }`
    Lambda {
        generics: Vec<GenericParam>,
        params: Vec<Param>,
        return_type: Option<TypeExpr>,
        body: Box<Expr>,
    },
    /// `callee<T>(args)`
    Call {
        callee: Box<Expr>,
        type_args: Vec<TypeExpr>,
        args: Vec<Expr>,
    },
    /// `object.name` or `object.0`
    Member {
        object: Box<Expr>,
        member: MemberKey,
    },
    /// `object[index]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// `Point { x: 1, y: 2 }`, `Pair { 1, "a" }`, `Point { ...base, x: 3 }`
    StructLiteral {
        name: Option<Ident>,
        type_args: Vec<TypeExpr>,
        fields: Vec<StructFieldInit>,
        positional: bool,
        update_sources: Vec<Expr>,
    },
    /// `subject match { case p if g => body, ... }`
    Match {
        subject: Box<Expr>,
        clauses: Vec<MatchClause>,
    },
    /// `a..b` / `a...b`
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
        inclusive: bool,
    },
    /// `` `x = ${x}` ``
    Interpolation(Vec<InterpolationPart>),
    /// `proc expr`
    Proc(Box<Expr>),
    /// `spawn expr`
    Spawn(Box<Expr>),
    /// `expr!`
    Propagate(Box<Expr>),
}

/// Literal values.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Integer {
        value: i128,
        suffix: Option<IntegerSuffix>,
    },
    Float {
        value: f64,
        suffix: Option<FloatSuffix>,
    },
    Bool(bool),
    String(String),
    Char(char),
    Nil,
}

/// `or` branch of an `if` chain; a missing condition is the final else.
#[derive(Clone, Debug, PartialEq)]
pub struct OrClause {
    pub condition: Option<Expr>,
    pub body: Expr,
    pub span: Span,
}

/// Member selector after a dot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberKey {
    Name(Ident),
    Index { value: u32, span: Span },
}

impl MemberKey {
    pub fn span(&self) -> Span {
        match self {
            MemberKey::Name(ident) => ident.span,
            MemberKey::Index { span, .. } => *span,
        }
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKey::Name(ident) => f.write_str(ident.as_str()),
            MemberKey::Index { value, .. } => write!(f, "{value}"),
        }
    }
}

/// Field initializer inside a struct literal. Positional literals leave
/// `name` empty; `Point { x }` is shorthand for `Point { x: x }`.
#[derive(Clone, Debug, PartialEq)]
pub struct StructFieldInit {
    pub name: Option<Ident>,
    pub value: Expr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchClause {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: Expr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InterpolationPart {
    Text(String),
    Expr(Expr),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-x`
    Negate,
    /// `!x`
    Not,
    /// `~x`
    BitNot,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Width suffix on an integer literal or integer type name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntegerSuffix {
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
}

impl IntegerSuffix {
    pub const ALL: [IntegerSuffix; 12] = [
        IntegerSuffix::I8,
        IntegerSuffix::I16,
        IntegerSuffix::I32,
        IntegerSuffix::I64,
        IntegerSuffix::I128,
        IntegerSuffix::Isize,
        IntegerSuffix::U8,
        IntegerSuffix::U16,
        IntegerSuffix::U32,
        IntegerSuffix::U64,
        IntegerSuffix::U128,
        IntegerSuffix::Usize,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IntegerSuffix::I8 => "i8",
            IntegerSuffix::I16 => "i16",
            IntegerSuffix::I32 => "i32",
            IntegerSuffix::I64 => "i64",
            IntegerSuffix::I128 => "i128",
            IntegerSuffix::Isize => "isize",
            IntegerSuffix::U8 => "u8",
            IntegerSuffix::U16 => "u16",
            IntegerSuffix::U32 => "u32",
            IntegerSuffix::U64 => "u64",
            IntegerSuffix::U128 => "u128",
            IntegerSuffix::Usize => "usize",
        }
    }
}

impl FromStr for IntegerSuffix {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntegerSuffix::ALL
            .into_iter()
            .find(|suffix| suffix.as_str() == s)
            .ok_or(())
    }
}

/// Width suffix on a float literal or float type name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FloatSuffix {
    F32,
    F64,
}

impl FloatSuffix {
    pub fn as_str(self) -> &'static str {
        match self {
            FloatSuffix::F32 => "f32",
            FloatSuffix::F64 => "f64",
        }
    }
}

impl FromStr for FloatSuffix {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "f32" => Ok(FloatSuffix::F32),
            "f64" => Ok(FloatSuffix::F64),
            _ => Err(()),
        }
    }
}
