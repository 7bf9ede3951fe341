//! Outbound email
//!
//! The [`Mailer`] trait is the only seam to the mail provider. Templates for
//! the verification and reset-password emails live next to it.

mod mock;
mod templates;

pub use mock::MockMailer;
pub use templates::{encode_query_component, reset_password_email, verify_email_email, LinkBuilder};

use std::path::PathBuf;

use async_trait::async_trait;

use crate::errors::DomainError;

/// A single outbound email
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub html_body: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    /// Files read from disk and attached as-is
    pub attachments: Vec<PathBuf>,
}

impl EmailMessage {
    pub fn new(subject: impl Into<String>, html_body: impl Into<String>, to: Vec<String>) -> Self {
        Self {
            subject: subject.into(),
            html_body: html_body.into(),
            to,
            ..Default::default()
        }
    }

    /// Reject a message with no primary recipient
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.to.iter().all(|r| r.trim().is_empty()) {
            return Err(DomainError::validation("email has no recipients"));
        }
        Ok(())
    }
}

/// Mail delivery capability
///
/// A failed send is a transient error; task handlers retry it.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), DomainError>;

    /// Short provider name for logs
    fn provider_name(&self) -> &str;
}
