//! Handlers for the account email tasks

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use tracing::info;
use uuid::Uuid;

use super::envelope::TaskEnvelope;
use super::payload::{PayloadSendResetPasswordEmail, PayloadSendVerifyEmail};
use super::processor::TaskHandler;
use crate::domain::entities::{NewSession, SessionScope};
use crate::errors::{DomainError, TaskError};
use crate::repositories::{SessionRepository, UserRepository};
use crate::services::mailer::{reset_password_email, verify_email_email, LinkBuilder, Mailer};
use crate::services::token::{token_fragment, TokenService};

/// Creates a `verify_email` session and mails its link
pub struct SendVerifyEmailHandler {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    tokens: Arc<TokenService>,
    mailer: Arc<dyn Mailer>,
    links: LinkBuilder,
    link_duration: Duration,
}

impl SendVerifyEmailHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        tokens: Arc<TokenService>,
        mailer: Arc<dyn Mailer>,
        links: LinkBuilder,
        link_duration: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            tokens,
            mailer,
            links,
            link_duration,
        }
    }
}

#[async_trait]
impl TaskHandler for SendVerifyEmailHandler {
    async fn process(&self, task: &TaskEnvelope) -> Result<(), TaskError> {
        let payload: PayloadSendVerifyEmail = task.decode()?;

        let user = self.users.get_user(payload.user_id).await?;
        let (token, token_payload) = self
            .tokens
            .create(self.link_duration, user.id)
            .map_err(DomainError::from)?;

        let session = self
            .sessions
            .create_session(NewSession {
                id: Uuid::new_v4(),
                user_id: user.id,
                token: token_fragment(&token).to_string(),
                scope: SessionScope::VerifyEmail,
                client_ip: payload.client_ip,
                user_agent: payload.user_agent,
                is_blocked: false,
                expires_at: token_payload.expires_at,
            })
            .await
            .map_err(|e| TaskError::retryable(format!("failed to create verify email session: {}", e)))?;

        let verify_url = self.links.verify_email(&user.email, &session.token);
        self.mailer
            .send_email(&verify_email_email(&user.full_name, &user.email, &verify_url))
            .await
            .map_err(|e| TaskError::retryable(format!("failed to send verify email: {}", e)))?;

        info!(
            task_type = %task.task_type,
            user_id = user.id,
            provider = self.mailer.provider_name(),
            "processed task"
        );
        Ok(())
    }
}

/// Mails the link of an existing `reset_password` session
pub struct SendResetPasswordEmailHandler {
    sessions: Arc<dyn SessionRepository>,
    mailer: Arc<dyn Mailer>,
    links: LinkBuilder,
}

impl SendResetPasswordEmailHandler {
    pub fn new(sessions: Arc<dyn SessionRepository>, mailer: Arc<dyn Mailer>, links: LinkBuilder) -> Self {
        Self {
            sessions,
            mailer,
            links,
        }
    }
}

#[async_trait]
impl TaskHandler for SendResetPasswordEmailHandler {
    async fn process(&self, task: &TaskEnvelope) -> Result<(), TaskError> {
        let payload: PayloadSendResetPasswordEmail = task.decode()?;

        let session = self
            .sessions
            .get_session(payload.session_id)
            .await
            .map_err(|e| TaskError::retryable(format!("failed to get reset password record: {}", e)))?;
        if session.scope != SessionScope::ResetPassword {
            return Err(TaskError::skip_retry(format!(
                "session {} has scope {}",
                session.id, session.scope
            )));
        }

        let reset_url = self.links.reset_password(&session.token);
        self.mailer
            .send_email(&reset_password_email(&payload.user_email, &reset_url))
            .await
            .map_err(|e| TaskError::retryable(format!("failed to send reset password email: {}", e)))?;

        info!(
            task_type = %task.task_type,
            user_id = session.user_id,
            provider = self.mailer.provider_name(),
            "processed task"
        );
        Ok(())
    }
}
