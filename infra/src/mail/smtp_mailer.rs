//! SMTP delivery through lettre with STARTTLS

use std::path::Path;

use async_trait::async_trait;
use kk_core::errors::DomainError;
use kk_core::services::mailer::{EmailMessage, Mailer};
use kk_shared::MailConfig;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use crate::InfrastructureError;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, InfrastructureError> {
        let from: Mailbox = config
            .from_header()
            .parse()
            .map_err(|e| InfrastructureError::Config(format!("invalid sender address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.sender_address.clone(),
                config.sender_password.clone(),
            ))
            .build();

        info!(host = %config.smtp_host, port = config.smtp_port, "configured SMTP mailer");
        Ok(Self { transport, from })
    }

    fn mailbox(address: &str) -> Result<Mailbox, DomainError> {
        address
            .trim()
            .parse()
            .map_err(|e| DomainError::validation(format!("invalid recipient {:?}: {}", address, e)))
    }

    async fn attachment(path: &Path) -> Result<SinglePart, DomainError> {
        let body = tokio::fs::read(path).await.map_err(|e| {
            DomainError::validation(format!("failed to read attachment {}: {}", path.display(), e))
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let content_type = ContentType::parse("application/octet-stream")
            .map_err(|e| DomainError::internal(format!("invalid attachment content type: {}", e)))?;
        Ok(Attachment::new(filename).body(body, content_type))
    }

    async fn build(&self, message: &EmailMessage) -> Result<Message, DomainError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(message.subject.clone());
        for to in &message.to {
            builder = builder.to(Self::mailbox(to)?);
        }
        for cc in &message.cc {
            builder = builder.cc(Self::mailbox(cc)?);
        }
        for bcc in &message.bcc {
            builder = builder.bcc(Self::mailbox(bcc)?);
        }

        let mut body = MultiPart::mixed().singlepart(SinglePart::html(message.html_body.clone()));
        for path in &message.attachments {
            body = body.singlepart(Self::attachment(path).await?);
        }

        builder
            .multipart(body)
            .map_err(|e| InfrastructureError::from(e).into())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), DomainError> {
        message.validate()?;
        let email = self.build(message).await?;

        self.transport
            .send(email)
            .await
            .map_err(InfrastructureError::from)?;
        debug!(recipients = message.to.len(), subject = %message.subject, "sent email");
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "smtp"
    }
}
