//! Shared error types

/// Error raised while loading configuration from the environment
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable was not set
    #[error("{variable} is not set")]
    Missing { variable: String },
    /// A variable was set to a value that cannot be used
    #[error("{variable} is invalid: {detail}")]
    Invalid { variable: String, detail: String },
}

impl ConfigError {
    pub fn missing(variable: impl Into<String>) -> Self {
        Self::Missing {
            variable: variable.into(),
        }
    }

    pub fn invalid(variable: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Invalid {
            variable: variable.into(),
            detail: detail.into(),
        }
    }

    /// Name of the offending environment variable
    pub fn variable(&self) -> &str {
        match self {
            Self::Missing { variable } | Self::Invalid { variable, .. } => variable,
        }
    }
}
