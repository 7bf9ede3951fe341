//! Recording mailer for tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{EmailMessage, Mailer};
use crate::errors::DomainError;

/// Mailer that keeps every delivered message in memory
#[derive(Clone, Default)]
pub struct MockMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    attempts: Arc<Mutex<usize>>,
    failing: Arc<AtomicBool>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail with a dependency error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Send attempts, including failed ones
    pub fn attempts(&self) -> usize {
        self.attempts.lock().map(|a| *a).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), DomainError> {
        message.validate()?;
        if let Ok(mut attempts) = self.attempts.lock() {
            *attempts += 1;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::dependency("mail server unavailable"));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.clone());
        }
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
