//! Common validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

/// Minimum accepted password length in characters
pub const MIN_PASSWORD_LEN: usize = 8;

/// bcrypt only looks at the first 72 bytes of its input
pub const MAX_PASSWORD_BYTES: usize = 72;

static EMAIL_RX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$")
        .expect("email regex is valid")
});

/// Validation error with field-level details
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Collection of validation errors
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Record `message` against `field` unless `ok` holds
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn to_field_errors(&self) -> HashMap<String, Vec<String>> {
        let mut field_errors: HashMap<String, Vec<String>> = HashMap::new();
        for error in &self.errors {
            field_errors
                .entry(error.field.clone())
                .or_default()
                .push(error.message.clone());
        }
        field_errors
    }

    /// Single line rendering, e.g. `page: must be between 1 and 10000000`
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Common validation functions
pub mod validators {
    use super::{EMAIL_RX, MAX_PASSWORD_BYTES, MIN_PASSWORD_LEN};

    /// Check if a string is not empty
    pub fn not_empty(value: &str) -> bool {
        !value.trim().is_empty()
    }

    /// Check if an email address is syntactically valid
    pub fn is_valid_email(email: &str) -> bool {
        EMAIL_RX.is_match(email)
    }

    /// Check if a password satisfies the length policy
    pub fn is_valid_password(password: &str) -> bool {
        password.chars().count() >= MIN_PASSWORD_LEN && password.len() <= MAX_PASSWORD_BYTES
    }
}

#[cfg(test)]
mod tests {
    use super::validators::*;
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("jane@"));
        assert!(!is_valid_email("example.com"));
        assert!(!is_valid_email("jane@localhost"));
    }

    #[test]
    fn test_password_policy() {
        assert!(is_valid_password("secret123"));
        assert!(!is_valid_password("short"));
        assert!(!is_valid_password(&"x".repeat(73)));
    }

    #[test]
    fn test_field_errors_summary() {
        let mut errors = FieldErrors::new();
        errors.check(true, "page", "unused");
        errors.check(false, "page_size", "must be between 1 and 20");
        errors.add("sort", "invalid sort value");

        assert_eq!(errors.errors().len(), 2);
        assert_eq!(
            errors.summary(),
            "page_size: must be between 1 and 20; sort: invalid sort value"
        );
        assert_eq!(errors.to_field_errors()["sort"], vec!["invalid sort value"]);
    }
}
