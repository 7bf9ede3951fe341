//! Mailer that only writes to the log

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use kk_core::errors::DomainError;
use kk_core::services::mailer::{EmailMessage, Mailer};
use tracing::info;

/// Development mailer; message bodies carry secret links and are never logged
#[derive(Clone, Default)]
pub struct LogMailer {
    sent: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl LogMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), DomainError> {
        message.validate()?;
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::dependency("log mailer set to fail"));
        }

        let count = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            subject = %message.subject,
            recipients = message.to.len(),
            attachments = message.attachments.len(),
            sent = count,
            "email delivered to log"
        );
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "log"
    }
}
