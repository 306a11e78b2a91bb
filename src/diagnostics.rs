//! # Diagnostics
//!
//! Recoverable conditions found while resolving a document. Each record names
//! the entity being resolved when it was found (a component or operation
//! pointer) so callers can report it precisely or filter it by `code`.
//!
//! Every record is also mirrored to `tracing` at the matching level, so a
//! binary with a subscriber installed sees them without extra wiring.
//!
//! ## Codes
//!
//! | Code | Severity |
//! |------|----------|
//! | `unsupported-enum-value` | Warning |
//! | `unsupported-security-scheme` | Warning |
//! | `excluded-reference` | Warning |
//! | `malformed-schema` | Warning |
//! | `duplicate-operation-id` | Info |

use serde::Serialize;
use std::fmt;

/// An enum literal of a type the IR cannot carry was dropped.
pub const UNSUPPORTED_ENUM_VALUE: &str = "unsupported-enum-value";
/// A security scheme of an unsupported type was skipped.
pub const UNSUPPORTED_SECURITY_SCHEME: &str = "unsupported-security-scheme";
/// An included entity references a component removed by the filters.
pub const EXCLUDED_REFERENCE: &str = "excluded-reference";
/// A schema declared an unknown `type`, or a keyword of the wrong shape, and degraded.
pub const MALFORMED_SCHEMA: &str = "malformed-schema";
/// An explicit `operationId` collided and was suffixed.
pub const DUPLICATE_OPERATION_ID: &str = "duplicate-operation-id";

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Output for this entity is known to be wrong
    Error,
    /// Output was degraded to a conservative shape
    Warning,
    /// Output was adjusted deterministically
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A single recorded condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity of the condition
    pub severity: Severity,
    /// Stable machine-readable code (see the module docs)
    pub code: &'static str,
    /// Component or operation pointer, e.g. `#/paths/pets/get`
    pub pointer: String,
    /// Human-readable description
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(
        severity: Severity,
        code: &'static str,
        pointer: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            severity,
            code,
            pointer: pointer.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.severity, self.pointer, self.code, self.message
        )
    }
}

/// Accumulating sink owned by one resolution run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Record a diagnostic and mirror it to the log.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => tracing::error!(
                code = diagnostic.code,
                pointer = %diagnostic.pointer,
                "{}",
                diagnostic.message
            ),
            Severity::Warning => tracing::warn!(
                code = diagnostic.code,
                pointer = %diagnostic.pointer,
                "{}",
                diagnostic.message
            ),
            Severity::Info => tracing::info!(
                code = diagnostic.code,
                pointer = %diagnostic.pointer,
                "{}",
                diagnostic.message
            ),
        }
        self.entries.push(diagnostic);
    }

    /// Record a warning.
    pub fn warn(&mut self, code: &'static str, pointer: &str, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Warning, code, pointer, message));
    }

    /// Record an informational note.
    pub fn info(&mut self, code: &'static str, pointer: &str, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Info, code, pointer, message));
    }

    /// All records in the order they were found.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Records carrying `code`.
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.entries.iter().filter(move |d| d.code == code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of records at `severity`.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity == severity).count()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
