use std::fmt;

use able_ir::Span;

use crate::DiagnosticKind;

/// A secondary location with a message, e.g. the interface method an
/// implementation disagrees with.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl Label {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
        }
    }
}

/// A checker diagnostic.
///
/// `span` is the primary location; `labels` and `notes` add context.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            message: message.into(),
            span,
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn structural(span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Structural, span, message)
    }

    pub fn reference(span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Reference, span, message)
    }

    pub fn arity(span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Arity, span, message)
    }

    pub fn compatibility(span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Compatibility, span, message)
    }

    pub fn obligation(span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Obligation, span, message)
    }

    pub fn context(span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Context, span, message)
    }

    /// Add a secondary label.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::new(span, message));
        self
    }

    /// Add a note providing additional context.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Check whether the message contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.message.contains(needle)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error[{}]: {}", self.kind, self.message)?;
        write!(f, "\n  --> {:?}", self.span)?;

        for label in &self.labels {
            write!(f, "\n      {:?}: {}", label.span, label.message)?;
        }

        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }

        Ok(())
    }
}

/// Sort diagnostics by primary span, then by message, for stable display.
pub fn sort_by_position(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| a.span.cmp(&b.span).then_with(|| a.message.cmp(&b.message)));
}

#[cfg(test)]
mod tests;
