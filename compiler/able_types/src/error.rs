//! Fatal checker errors.
//!
//! Semantic problems are reported as diagnostics; these are reserved for
//! input the checker cannot interpret at all.

use able_ir::Span;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("typechecker: declaration at {span} has an empty name")]
    EmptyDeclarationName { span: Span },
    #[error("typechecker: import at {span} has an empty path")]
    EmptyImportPath { span: Span },
}
