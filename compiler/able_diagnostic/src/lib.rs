//! Diagnostics for the Able type checker.
//!
//! A [`Diagnostic`] is a message, a [`DiagnosticKind`] from the checker's
//! error taxonomy, and the span of the offending node. Semantic problems
//! never abort checking; they accumulate as diagnostics and are returned
//! together at the end of a module.

mod diagnostic;
mod kind;

pub use diagnostic::{sort_by_position, Diagnostic, Label};
pub use kind::DiagnosticKind;
