//! Outbound email delivery

mod log_mailer;
mod smtp_mailer;

use std::sync::Arc;

use kk_core::services::mailer::Mailer;
use kk_shared::{MailConfig, MailerProvider};

pub use log_mailer::LogMailer;
pub use smtp_mailer::SmtpMailer;

use crate::InfrastructureError;

/// Build the mailer selected by `MAILER_PROVIDER`
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, InfrastructureError> {
    match config.provider {
        MailerProvider::Smtp => Ok(Arc::new(SmtpMailer::new(config)?)),
        MailerProvider::Log => Ok(Arc::new(LogMailer::new())),
    }
}
