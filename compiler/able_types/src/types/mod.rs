//! Semantic type representation.
//!
//! [`Type`] is a closed sum: every consumer matches it exhaustively, so a
//! new case is a compile-time-checked change.
//!
//! # Sharing
//!
//! Declaration-level payloads ([`StructType`], [`InterfaceType`],
//! [`UnionType`], [`PackageType`]) are behind `Arc` because every
//! reference site clones them. Composite constructors own their
//! components.
//!
//! # Determinism
//!
//! Field and method tables are `BTreeMap`, so iterating them (and any
//! diagnostics derived from that iteration) is stable across runs.

mod format;

pub use format::interface_label;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use able_ir::ast::{FloatSuffix, IntegerSuffix};

use crate::obligation::{ConstraintObligation, GenericParamSpec, WhereConstraintSpec};

/// Non-numeric built-in types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Bool,
    String,
    Char,
    Nil,
    /// Universal sink: every type is assignable to `void`.
    Void,
}

impl PrimitiveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::String => "string",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Nil => "nil",
            PrimitiveKind::Void => "void",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(PrimitiveKind::Bool),
            "string" => Some(PrimitiveKind::String),
            "char" => Some(PrimitiveKind::Char),
            "nil" => Some(PrimitiveKind::Nil),
            "void" => Some(PrimitiveKind::Void),
            _ => None,
        }
    }
}

/// A semantic type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    Primitive(PrimitiveKind),
    Integer(IntegerSuffix),
    Float(FloatSuffix),
    /// Opaque named slot, resolved only through a substitution map.
    TypeParameter(String),
    /// Declared struct.
    Struct(Arc<StructType>),
    /// Shape of a struct literal value; may carry inferred field types.
    StructInstance(StructInstanceType),
    Interface(Arc<InterfaceType>),
    Union(Arc<UnionType>),
    Function(Box<FunctionType>),
    Proc(Box<Type>),
    Future(Box<Type>),
    /// Generic instantiation of a declaration-level `base`.
    ///
    /// Never constructed with zero arguments; see [`Type::applied`].
    Applied {
        base: Box<Type>,
        args: Vec<Type>,
    },
    Nullable(Box<Type>),
    /// Ad hoc sum of concrete types: `i32 | string`.
    UnionLiteral(Vec<Type>),
    Array(Box<Type>),
    Range(Box<Type>),
    Package(Arc<PackageType>),
    /// Absorbing placeholder for anything not yet inferred.
    Unknown,
}

/// Declared struct: `struct Box T { value: T }`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct StructType {
    pub name: String,
    pub type_params: Vec<GenericParamSpec>,
    pub fields: BTreeMap<String, Type>,
    /// Field types in declaration order; the only table for tuple structs.
    pub positional: Vec<Type>,
    pub where_clause: Vec<WhereConstraintSpec>,
}

impl StructType {
    /// Nominal placeholder for a name that has no declaration in scope.
    pub fn nominal(name: impl Into<String>) -> Self {
        StructType {
            name: name.into(),
            ..StructType::default()
        }
    }

    /// Check whether this is a bare placeholder with no declared shape.
    pub fn is_placeholder(&self) -> bool {
        self.type_params.is_empty() && self.fields.is_empty() && self.positional.is_empty()
    }
}

/// Struct literal shape.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct StructInstanceType {
    pub name: String,
    pub fields: BTreeMap<String, Type>,
    pub positional: Vec<Type>,
    /// Explicit or inferred type arguments, one per struct type parameter.
    pub type_args: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct InterfaceType {
    pub name: String,
    pub type_params: Vec<GenericParamSpec>,
    pub where_clause: Vec<WhereConstraintSpec>,
    /// Required method signatures; receivers are typed `Self`.
    pub methods: BTreeMap<String, FunctionType>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct UnionType {
    pub name: String,
    pub type_params: Vec<GenericParamSpec>,
    pub where_clause: Vec<WhereConstraintSpec>,
    pub variants: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PackageType {
    pub name: String,
    pub symbols: BTreeMap<String, Type>,
}

/// Function signature plus the constraints it carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub ret: Box<Type>,
    pub type_params: Vec<GenericParamSpec>,
    pub where_clause: Vec<WhereConstraintSpec>,
    /// One obligation per constrained type parameter, proven at call sites.
    pub obligations: Vec<ConstraintObligation>,
}

impl FunctionType {
    pub fn new(params: Vec<Type>, ret: Type) -> Self {
        FunctionType {
            params,
            ret: Box::new(ret),
            type_params: Vec::new(),
            where_clause: Vec::new(),
            obligations: Vec::new(),
        }
    }

    /// Strip the receiver parameter, producing the bound-method view.
    #[must_use]
    pub fn bind_receiver(mut self) -> Self {
        if !self.params.is_empty() {
            self.params.remove(0);
        }
        self
    }
}

impl Default for FunctionType {
    fn default() -> Self {
        FunctionType::new(Vec::new(), Type::Unknown)
    }
}

impl Type {
    pub fn bool() -> Self {
        Type::Primitive(PrimitiveKind::Bool)
    }

    pub fn string() -> Self {
        Type::Primitive(PrimitiveKind::String)
    }

    pub fn char() -> Self {
        Type::Primitive(PrimitiveKind::Char)
    }

    pub fn nil() -> Self {
        Type::Primitive(PrimitiveKind::Nil)
    }

    pub fn void() -> Self {
        Type::Primitive(PrimitiveKind::Void)
    }

    pub fn i32() -> Self {
        Type::Integer(IntegerSuffix::I32)
    }

    pub fn f64() -> Self {
        Type::Float(FloatSuffix::F64)
    }

    pub fn param(name: impl Into<String>) -> Self {
        Type::TypeParameter(name.into())
    }

    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn nullable(inner: Type) -> Self {
        Type::Nullable(Box::new(inner))
    }

    pub fn range(element: Type) -> Self {
        Type::Range(Box::new(element))
    }

    pub fn proc(result: Type) -> Self {
        Type::Proc(Box::new(result))
    }

    pub fn future(result: Type) -> Self {
        Type::Future(Box::new(result))
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        Type::Function(Box::new(FunctionType::new(params, ret)))
    }

    pub fn from_function(fn_type: FunctionType) -> Self {
        Type::Function(Box::new(fn_type))
    }

    pub fn nominal(name: impl Into<String>) -> Self {
        Type::Struct(Arc::new(StructType::nominal(name)))
    }

    /// Apply `base` to `args`, collapsing an empty argument list to `base`.
    pub fn applied(base: Type, args: Vec<Type>) -> Self {
        if args.is_empty() {
            base
        } else {
            Type::Applied {
                base: Box::new(base),
                args,
            }
        }
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    #[inline]
    pub fn is_type_parameter(&self) -> bool {
        matches!(self, Type::TypeParameter(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveKind::Void))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveKind::Bool))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveKind::String))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Integer(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::Float(_))
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Unknown or still-generic: a subject that can only be proven later.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Type::Unknown | Type::TypeParameter(_))
    }

    /// Nominal struct name of a declared struct, literal, or applied struct.
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            Type::Struct(st) => Some(&st.name),
            Type::StructInstance(inst) => Some(&inst.name),
            Type::Applied { base, .. } => match base.as_ref() {
                Type::Struct(st) => Some(&st.name),
                _ => None,
            },
            _ => None,
        }
    }

    /// Nominal union name of a declared or applied union.
    pub fn union_name(&self) -> Option<&str> {
        match self {
            Type::Union(un) => Some(&un.name),
            Type::Applied { base, .. } => match base.as_ref() {
                Type::Union(un) => Some(&un.name),
                _ => None,
            },
            _ => None,
        }
    }

    /// Element type of an array, including `Array` spelled as a nominal struct.
    pub fn array_element(&self) -> Option<Type> {
        match self {
            Type::Array(element) => Some(element.as_ref().clone()),
            Type::Struct(_) | Type::StructInstance(_) if self.struct_name() == Some("Array") => {
                Some(Type::Unknown)
            }
            Type::Applied { args, .. } if self.struct_name() == Some("Array") => {
                Some(args.first().cloned().unwrap_or(Type::Unknown))
            }
            _ => None,
        }
    }

    /// Element produced by iterating over this type, if it is iterable.
    pub fn iterable_element(&self) -> Option<Type> {
        match self {
            Type::Unknown => Some(Type::Unknown),
            Type::Range(element) => Some(element.as_ref().clone()),
            _ => self.array_element(),
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(fn_type) => Some(fn_type),
            _ => None,
        }
    }

    /// Interface and its arguments when this type is an interface or an
    /// applied interface.
    pub fn as_interface(&self) -> Option<(&Arc<InterfaceType>, &[Type])> {
        match self {
            Type::Interface(iface) => Some((iface, &[])),
            Type::Applied { base, args } => match base.as_ref() {
                Type::Interface(iface) => Some((iface, args)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Visit every type parameter name reachable from this type.
    pub fn for_each_type_parameter(&self, f: &mut impl FnMut(&str)) {
        match self {
            Type::TypeParameter(name) => f(name),
            Type::Array(inner)
            | Type::Nullable(inner)
            | Type::Range(inner)
            | Type::Proc(inner)
            | Type::Future(inner) => inner.for_each_type_parameter(f),
            Type::Applied { base, args } => {
                base.for_each_type_parameter(f);
                for arg in args {
                    arg.for_each_type_parameter(f);
                }
            }
            Type::UnionLiteral(members) => {
                for member in members {
                    member.for_each_type_parameter(f);
                }
            }
            Type::Function(fn_type) => {
                for param in &fn_type.params {
                    param.for_each_type_parameter(f);
                }
                fn_type.ret.for_each_type_parameter(f);
            }
            Type::StructInstance(inst) => {
                for arg in &inst.type_args {
                    arg.for_each_type_parameter(f);
                }
            }
            Type::Primitive(_)
            | Type::Integer(_)
            | Type::Float(_)
            | Type::Struct(_)
            | Type::Interface(_)
            | Type::Union(_)
            | Type::Package(_)
            | Type::Unknown => {}
        }
    }
}

impl From<FunctionType> for Type {
    fn from(fn_type: FunctionType) -> Self {
        Type::from_function(fn_type)
    }
}
