//! Non-fatal generation diagnostics.
//!
//! A diagnostic records a place where output was degraded instead of failing:
//! a skipped declaration, a type that fell back to `any`, and so on.

use serde::Serialize;
use std::fmt;

/// Category of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A non-record type declaration was left out
    SkippedType,
    /// A named type did not resolve to a known record
    UnresolvedType,
    /// A type the model cannot describe was mapped to `any`
    OpaqueType,
    /// The package declares the reserved entry point itself
    ReservedEntryPoint,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SkippedType => "skipped type",
            Self::UnresolvedType => "unresolved type",
            Self::OpaqueType => "opaque type",
            Self::ReservedEntryPoint => "reserved entry point",
        })
    }
}

/// A single diagnostic.
///
/// # Examples
///
/// ```
/// use wasmbind_core::{Diagnostic, DiagnosticKind};
///
/// let d = Diagnostic::new(DiagnosticKind::UnresolvedType, "Order.When", "time.Time is not a record");
/// assert_eq!(d.to_string(), "unresolved type: Order.When: time.Time is not a record");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Category
    pub kind: DiagnosticKind,
    /// Declaration the diagnostic is about (e.g. `Type.Field`)
    pub subject: String,
    /// Human readable detail
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic.
    #[must_use]
    pub fn new(kind: DiagnosticKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.kind, self.subject, self.message)
    }
}
