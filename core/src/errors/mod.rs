//! Domain-specific error types and error handling.

mod types;

pub use types::{TaskError, TokenError};

use thiserror::Error;

/// Core domain errors
///
/// Each variant is one kind of the error taxonomy. The HTTP layer maps kinds to
/// status codes; the message carried by `Dependency` and `InternalInvariant`
/// is operational detail and must never reach a client.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Dependency failure: {message}")]
    Dependency { message: String },

    #[error("Internal invariant violated: {message}")]
    InternalInvariant { message: String },

    // Bridge to token errors (invalid, expired, key configuration)
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation { message: message.into() }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        DomainError::NotFound { resource: resource.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        DomainError::Conflict { message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        DomainError::Unauthorized { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        DomainError::Forbidden { message: message.into() }
    }

    pub fn dependency(message: impl Into<String>) -> Self {
        DomainError::Dependency { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::InternalInvariant { message: message.into() }
    }

    /// Whether the error originates from an unavailable collaborator
    pub fn is_dependency(&self) -> bool {
        matches!(self, DomainError::Dependency { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }
}
