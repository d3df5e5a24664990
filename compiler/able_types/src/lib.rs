//! Static semantic core of Able.
//!
//! Resolves declarations, instantiates generics at call sites, and decides
//! whether concrete types satisfy interface constraints.
//!
//! # Passes
//!
//! ```text
//! collect   declarations -> global scope, impls, method sets, obligations
//! check     statements and expressions; call sites queue obligations
//! solve     every obligation, exactly once
//! validate  implementations against their interfaces
//! ```
//!
//! Collection finishes before anything is solved, so declarations may be
//! referenced ahead of their textual position.
//!
//! # Usage
//!
//! ```ignore
//! use able_types::Checker;
//!
//! let mut checker = Checker::new();
//! let diagnostics = checker.check_module(&module)?;
//! for export in checker.exported_symbols() {
//!     println!("{}: {}", export.name, export.ty);
//! }
//! ```

mod builtins;
mod check;
mod collect;
mod config;
mod env;
mod error;
mod members;
mod obligation;
mod registry;
mod relate;
mod solve;
mod state;
mod subst;
mod types;
mod unify;
mod validate;

pub use check::{check_module, Checker, ExportedSymbol};
pub use config::{CheckerConfig, LookupMode};
pub use env::TypeEnv;
pub use error::CheckError;
pub use obligation::{
    obligations_from_specs, ConstraintObligation, GenericParamSpec, WhereConstraintSpec,
};
pub use registry::{ImplementationSpec, MethodSetSpec};
pub use relate::{
    build_union, function_signatures_compatible, merge_branch_types, same_type, type_assignable,
    types_equivalent_for_signature,
};
pub use subst::{
    populate_obligation_subjects, substitute, substitute_function, substitute_obligations,
    substitute_where, zip_subst, Subst,
};
pub use types::{
    interface_label, FloatSuffix, FunctionType, IntegerSuffix, InterfaceType, PackageType,
    PrimitiveKind, StructInstanceType, StructType, Type, UnionType,
};
