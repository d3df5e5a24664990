//! Declarations: structs, unions, interfaces, functions, implementations,
//! and inherent method blocks.

use super::{Expr, Ident, Pattern, TypeExpr};
use crate::{Span, Spanned};

/// Generic parameter with optional interface constraints: `T`, `T: Display + Clone`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericParam {
    pub name: Ident,
    /// Each constraint names an interface, possibly applied (`Iterable<T>`).
    pub constraints: Vec<TypeExpr>,
    pub span: Span,
}

/// Where clause entry: `where T: Display, U: Iterable<T>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhereClause {
    pub type_param: Ident,
    pub constraints: Vec<TypeExpr>,
    pub span: Span,
}

/// Shape of a struct declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StructKind {
    /// `struct Point { x: i32, y: i32 }`
    Named,
    /// `struct Pair i32 string`
    Positional,
    /// `struct Empty`
    Singleton,
}

/// A struct field. Positional fields have no name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: Option<Ident>,
    pub ty: TypeExpr,
    pub span: Span,
}

/// Struct declaration.
///
/// ```able
/// struct Box T { value: T }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructDef {
    pub name: Ident,
    pub kind: StructKind,
    pub generics: Vec<GenericParam>,
    pub fields: Vec<FieldDef>,
    pub where_clause: Vec<WhereClause>,
    pub is_private: bool,
    pub span: Span,
}

/// Union declaration: `union Shape = Circle | Square`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnionDef {
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub variants: Vec<TypeExpr>,
    pub where_clause: Vec<WhereClause>,
    pub is_private: bool,
    pub span: Span,
}

/// Method signature inside an interface body.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionSignature {
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeExpr>,
    pub where_clause: Vec<WhereClause>,
    pub span: Span,
}

/// Interface declaration.
///
/// ```able
/// interface Display for T {
///     fn show(self: Self) -> string
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceDef {
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub signatures: Vec<FunctionSignature>,
    pub where_clause: Vec<WhereClause>,
    pub is_private: bool,
    pub span: Span,
}

/// Function parameter. The type annotation is optional for lambdas.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub pattern: Pattern,
    pub ty: Option<TypeExpr>,
    pub span: Span,
}

impl Param {
    /// Name of an identifier-pattern parameter.
    pub fn name(&self) -> Option<&str> {
        self.pattern.identifier_name()
    }
}

/// Function definition: named top-level function, method, or impl member.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeExpr>,
    pub where_clause: Vec<WhereClause>,
    pub body: Expr,
    /// Declared with shorthand `fn #method` receiver syntax.
    pub is_method_shorthand: bool,
    pub is_private: bool,
    pub span: Span,
}

/// `impl Display for Wrapper { ... }`, optionally named:
/// `Fancy = impl Display for Wrapper { ... }`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImplementationDef {
    pub impl_name: Option<Ident>,
    pub interface: Ident,
    pub interface_args: Vec<TypeExpr>,
    pub target: TypeExpr,
    pub generics: Vec<GenericParam>,
    pub where_clause: Vec<WhereClause>,
    pub definitions: Vec<FunctionDef>,
    pub is_private: bool,
    pub span: Span,
}

/// Inherent method block: `methods Wrapper { fn show(self: Self) -> string { ... } }`.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodsDef {
    pub target: TypeExpr,
    pub generics: Vec<GenericParam>,
    pub where_clause: Vec<WhereClause>,
    pub definitions: Vec<FunctionDef>,
    pub span: Span,
}

macro_rules! impl_spanned {
    ($($ty:ty),* $(,)?) => {
        $(impl Spanned for $ty {
            fn span(&self) -> Span {
                self.span
            }
        })*
    };
}

impl_spanned!(
    GenericParam,
    WhereClause,
    FieldDef,
    StructDef,
    UnionDef,
    FunctionSignature,
    InterfaceDef,
    Param,
    FunctionDef,
    ImplementationDef,
    MethodsDef,
);
