//! Error types for the churn prediction core

use thiserror::Error;

/// The single notice shown to a user when a submission fails.
pub const USER_NOTICE: &str = "Something went wrong. Check your inputs and try again.";

/// Errors raised while building a feature schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Schema must declare at least one field")]
    Empty,

    #[error("Categorical field '{field}' declares no options")]
    MissingOptions { field: String },

    #[error("Categorical field '{field}' lists option '{option}' more than once")]
    DuplicateOption { field: String, option: String },

    #[error("Field '{field}' is declared more than once")]
    DuplicateField { field: String },
}

/// Errors raised by form state mutation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Index outside the schema bounds. A caller bug, not a user error.
    #[error("Field index {index} is out of bounds for a form of {len} fields")]
    InvalidIndex { index: usize, len: usize },

    #[error("Prefill vector has {actual} values, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// What went wrong while calling the prediction service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// Connection, DNS, TLS or timeout failure
    Transport(String),
    /// The service answered with a non-success status
    Status { status: u16, body: String },
    /// The response body was not an object with a numeric `prediction`
    MalformedResponse(String),
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCause::Transport(reason) => write!(f, "transport failure: {reason}"),
            FailureCause::Status { status, body } if body.is_empty() => {
                write!(f, "service returned status {status}")
            }
            FailureCause::Status { status, body } => {
                write!(f, "service returned status {status}: {body}")
            }
            FailureCause::MalformedResponse(reason) => write!(f, "malformed response: {reason}"),
        }
    }
}

/// A prediction call failed. Every failure mode collapses into this one
/// condition; the cause is kept for logs only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Prediction failed: {cause}")]
pub struct PredictionFailed {
    pub cause: FailureCause,
}

impl PredictionFailed {
    pub fn transport(reason: impl Into<String>) -> Self {
        Self {
            cause: FailureCause::Transport(reason.into()),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            cause: FailureCause::Status {
                status,
                body: body.into(),
            },
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            cause: FailureCause::MalformedResponse(reason.into()),
        }
    }

    /// Text to show the user in place of the technical cause
    pub fn user_notice(&self) -> &'static str {
        USER_NOTICE
    }
}

impl From<serde_json::Error> for PredictionFailed {
    fn from(err: serde_json::Error) -> Self {
        PredictionFailed::malformed(err.to_string())
    }
}

/// Errors surfaced by a prediction session
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error("Unknown field: {name}")]
    UnknownField { name: String },

    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error("Submission is not the one in flight on this session")]
    UnmatchedSubmission,

    #[error(transparent)]
    PredictionFailed(#[from] PredictionFailed),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
