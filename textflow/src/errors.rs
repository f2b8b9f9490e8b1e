//! Error types for the textflow engine.
//!
//! Per-step failures (`BackendError`, `UnknownStepKindError`) are captured
//! as data inside a [`crate::core::StepResult`] and never escape the
//! executors. Only persistence failures surface to the caller, as a
//! distinct terminal event, so a consumer knows whether the run record was
//! durably written.

use thiserror::Error;

/// The main error type for textflow operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A step referenced a kind outside the closed enumeration.
    #[error("{0}")]
    UnknownStepKind(#[from] UnknownStepKindError),

    /// The transformation backend failed.
    #[error("{0}")]
    Backend(#[from] BackendError),

    /// The durable run record could not be written.
    #[error("{0}")]
    Persistence(#[from] PersistenceError),

    /// A workflow definition failed validation.
    #[error("{0}")]
    Validation(#[from] WorkflowValidationError),
}

/// Error raised when parsing a step kind that is not part of the closed
/// enumeration.
///
/// This is surfaced at the deserialization boundary, before any backend
/// dispatch happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown step kind: {kind}")]
pub struct UnknownStepKindError {
    /// The unrecognized kind string.
    pub kind: String,
}

impl UnknownStepKindError {
    /// Creates a new unknown step kind error.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

/// Errors reported by the transformation backend.
///
/// A backend call either fully succeeds or fails with one of these; there
/// is no partial success in buffered mode.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The request never produced a response (network, timeout, DNS).
    #[error("backend transport error: {0}")]
    Transport(String),

    /// The backend answered but refused the request (quota, auth, bad
    /// request).
    #[error("backend rejected the request: {0}")]
    Rejected(String),

    /// The backend answered with a payload the adapter could not use.
    #[error("backend returned an invalid response: {0}")]
    InvalidResponse(String),

    /// The backend adapter is missing required configuration.
    #[error("backend configuration error: {0}")]
    Configuration(String),
}

impl BackendError {
    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a rejected-request error.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Creates an invalid-response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }
}

/// Error raised when the durable write of a run record fails.
///
/// Distinct from per-step failures: the computed results exist but were not
/// recorded, so the caller may want to retry the whole run.
#[derive(Debug, Clone, Error)]
#[error("failed to persist run record: {message}")]
pub struct PersistenceError {
    /// Description of the storage failure.
    pub message: String,
}

impl PersistenceError {
    /// Creates a new persistence error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error raised when a workflow definition fails validation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct WorkflowValidationError {
    /// The validation failure message.
    pub message: String,
}

impl WorkflowValidationError {
    /// Creates a new workflow validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_step_kind_message() {
        let err = UnknownStepKindError::new("reverse_text");
        assert_eq!(err.to_string(), "unknown step kind: reverse_text");
    }

    #[test]
    fn test_backend_error_messages() {
        let err = BackendError::transport("connection reset");
        assert_eq!(err.to_string(), "backend transport error: connection reset");

        let err = BackendError::rejected("quota exceeded");
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_engine_error_from_conversions() {
        let err: EngineError = PersistenceError::new("disk full").into();
        assert!(matches!(err, EngineError::Persistence(_)));

        let err: EngineError = UnknownStepKindError::new("x").into();
        assert!(matches!(err, EngineError::UnknownStepKind(_)));
    }
}
