//! Fatal resolution errors.
//!
//! Anything that can be degraded (an unknown schema `type`, an unsupported
//! enum literal, a security scheme this crate cannot express) is recorded in
//! [`Diagnostics`](crate::diagnostics::Diagnostics) instead. A
//! [`ResolveError`] always aborts the run and names the offending pointer.

use crate::broadcast::EventKind;

/// Errors that abort a resolution run.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A `$ref` points at a location that does not exist in the bundled document.
    #[error("dangling reference `{pointer}`")]
    DanglingReference {
        /// The pointer as written in the document
        pointer: String,
    },

    /// A `$ref` resolves, but the target cannot be read as the expected object.
    #[error("reference `{pointer}` does not point at a valid {expected}: {source}")]
    UnexpectedShape {
        /// The pointer as written in the document
        pointer: String,
        /// What the referencing site expected (e.g. "parameter")
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The document declares neither `swagger: 2.0` nor an `openapi: 3.0.x`/`3.1.x` version.
    #[error("unsupported document version `{found}`")]
    UnsupportedVersion {
        /// The declared version, or `<missing>`
        found: String,
    },

    /// The document text or structure could not be read at all.
    #[error("invalid document at `{pointer}`: {message}")]
    InvalidDocument {
        /// Deepest node the parser reached, `#` for unparseable text
        pointer: String,
        /// Parser message
        message: String,
    },

    /// An include/exclude filter or pagination keyword failed to compile.
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A broadcast consumer returned an error; the remaining events were not delivered.
    #[error("consumer failed on `{event}` event: {message}")]
    Consumer {
        /// The event being delivered when the consumer failed
        event: EventKind,
        /// The consumer's error, rendered with its causes
        message: String,
    },
}

impl ResolveError {
    /// Pointer associated with the error, if any.
    #[must_use]
    pub fn pointer(&self) -> Option<&str> {
        match self {
            ResolveError::DanglingReference { pointer }
            | ResolveError::UnexpectedShape { pointer, .. }
            | ResolveError::InvalidDocument { pointer, .. } => Some(pointer),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dangling_reference_names_pointer() {
        let err = ResolveError::DanglingReference {
            pointer: "#/components/schemas/Missing".to_string(),
        };
        assert_eq!(err.to_string(), "dangling reference `#/components/schemas/Missing`");
        assert_eq!(err.pointer(), Some("#/components/schemas/Missing"));
    }

    #[test]
    fn test_invalid_document_names_pointer() {
        let err = ResolveError::InvalidDocument {
            pointer: "#/paths/~1pets/get/parameters/0".to_string(),
            message: "missing field `name`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid document at `#/paths/~1pets/get/parameters/0`: missing field `name`"
        );
        assert_eq!(err.pointer(), Some("#/paths/~1pets/get/parameters/0"));
    }

    #[test]
    fn test_consumer_error_names_event() {
        let err = ResolveError::Consumer {
            event: EventKind::Operation,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "consumer failed on `operation` event: boom");
        assert!(err.pointer().is_none());
    }
}
