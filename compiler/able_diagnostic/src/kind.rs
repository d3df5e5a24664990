use std::fmt;

/// Category of a checker diagnostic.
///
/// Messages are matched by substring, so the kind is a coarse grouping
/// rather than a unique code.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum DiagnosticKind {
    /// Duplicate declaration, method, or field.
    Structural,
    /// Undefined identifier, unknown interface or struct, name that is not an interface.
    Reference,
    /// Wrong number of type arguments or call arguments.
    Arity,
    /// Argument, return, pattern, or implementation signature mismatch.
    Compatibility,
    /// Interface constraint not satisfied by its subject.
    Obligation,
    /// Construct used outside its required surrounding context.
    Context,
}

impl DiagnosticKind {
    pub const ALL: [DiagnosticKind; 6] = [
        DiagnosticKind::Structural,
        DiagnosticKind::Reference,
        DiagnosticKind::Arity,
        DiagnosticKind::Compatibility,
        DiagnosticKind::Obligation,
        DiagnosticKind::Context,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::Structural => "structural",
            DiagnosticKind::Reference => "reference",
            DiagnosticKind::Arity => "arity",
            DiagnosticKind::Compatibility => "compatibility",
            DiagnosticKind::Obligation => "obligation",
            DiagnosticKind::Context => "context",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
