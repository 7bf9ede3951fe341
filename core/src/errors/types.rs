//! Token and background task error types

use thiserror::Error;

use super::DomainError;

/// Session token failures
///
/// `Invalid` and `Expired` are kept apart because callers answer them with
/// different client-facing messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is invalid")]
    Invalid,

    #[error("token has expired")]
    Expired,

    #[error("invalid key size: must be exactly {expected} bytes, got {actual}")]
    KeyConfiguration { expected: usize, actual: usize },

    /// Requested lifetime reaches past the representable time range
    #[error("token duration out of range")]
    DurationOutOfRange,
}

/// Outcome of a failed background task
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Permanent failure; the task is archived without another attempt
    #[error("skip retry: {0}")]
    SkipRetry(String),

    /// Transient failure; the task is rescheduled with backoff
    #[error("{0}")]
    Retryable(String),
}

impl TaskError {
    pub fn skip_retry(message: impl Into<String>) -> Self {
        TaskError::SkipRetry(message.into())
    }

    pub fn retryable(message: impl Into<String>) -> Self {
        TaskError::Retryable(message.into())
    }

    pub fn is_skip_retry(&self) -> bool {
        matches!(self, TaskError::SkipRetry(_))
    }
}

impl From<DomainError> for TaskError {
    fn from(err: DomainError) -> Self {
        TaskError::Retryable(err.to_string())
    }
}
