//! Application state wired to the in-memory collaborators of kk_core

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::web;
use async_trait::async_trait;
use kk_api::AppState;
use kk_core::domain::entities::{ClientInfo, SessionScope};
use kk_core::errors::DomainError;
use kk_core::repositories::{MockReminderRepository, MockSessionRepository, MockUserRepository};
use kk_core::services::auth::{
    AccountService, AccountServiceConfig, OAuthLogin, OAuthProfile, OAuthProvider, RegisterUser,
    RequestAuthenticator,
};
use kk_core::services::mailer::{LinkBuilder, MockMailer};
use kk_core::services::revocation::MockRevocationCache;
use kk_core::services::tasks::{
    BrokerTaskDistributor, MockTaskBroker, PayloadSendVerifyEmail, SendVerifyEmailHandler, TaskHandler, QUEUE_CRITICAL,
    TASK_SEND_VERIFY_EMAIL,
};
use kk_core::services::{ReminderService, TokenService};
use kk_shared::config::{CorsConfig, Environment};

pub const PASSWORD: &str = "password123";
pub const GOOGLE_STATE: &str = "random-state-string";

/// Google stand-in returning a fixed profile
pub struct FakeGoogle {
    pub email: String,
}

#[async_trait]
impl OAuthProvider for FakeGoogle {
    fn authorize_url(&self, state: &str) -> String {
        format!("https://accounts.example.test/o/oauth2/auth?state={}", state)
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthProfile, DomainError> {
        if code != "good-code" {
            return Err(DomainError::unauthorized("invalid authorization code"));
        }
        Ok(OAuthProfile {
            email: self.email.clone(),
            name: "Grace Hopper".to_string(),
            given_name: "Grace".to_string(),
            family_name: "Hopper".to_string(),
            email_verified: true,
        })
    }
}

pub struct TestState {
    pub state: web::Data<AppState>,
    pub users: Arc<MockUserRepository>,
    pub sessions: Arc<MockSessionRepository>,
    pub revocation: Arc<MockRevocationCache>,
    pub broker: Arc<MockTaskBroker>,
    pub mailer: Arc<MockMailer>,
    pub tokens: Arc<TokenService>,
}

impl TestState {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// State with Google sign-in answering for `email`
    pub fn with_google(email: &str) -> Self {
        let provider = FakeGoogle {
            email: email.to_string(),
        };
        Self::build(Some(Arc::new(OAuthLogin::new(Arc::new(provider), GOOGLE_STATE))))
    }

    fn build(oauth: Option<Arc<OAuthLogin>>) -> Self {
        let users = Arc::new(MockUserRepository::new());
        let sessions = Arc::new(MockSessionRepository::new());
        let revocation = Arc::new(MockRevocationCache::new());
        let broker = Arc::new(MockTaskBroker::new());
        let tokens = Arc::new(TokenService::new(b"12345678901234567890123456789012").unwrap());

        let accounts = Arc::new(AccountService::new(
            users.clone(),
            sessions.clone(),
            revocation.clone(),
            tokens.clone(),
            Arc::new(BrokerTaskDistributor::new(broker.clone())),
            AccountServiceConfig {
                bcrypt_cost: 4,
                ..AccountServiceConfig::default()
            },
        ));

        let state = web::Data::new(AppState {
            accounts,
            reminders: Arc::new(ReminderService::new(Arc::new(MockReminderRepository::new()))),
            authenticator: RequestAuthenticator::new(tokens.clone(), revocation.clone()),
            oauth,
            environment: Environment::Development,
            cors: CorsConfig::default(),
        });

        Self {
            state,
            users,
            sessions,
            revocation,
            broker,
            mailer: Arc::new(MockMailer::new()),
            tokens,
        }
    }

    pub async fn register(&self, email: &str) -> i64 {
        self.state
            .accounts
            .register(
                RegisterUser {
                    first_name: "Grace".to_string(),
                    last_name: "Hopper".to_string(),
                    email: email.to_string(),
                    password: PASSWORD.to_string(),
                    profile_image_url: None,
                },
                ClientInfo::new("192.0.2.1", "test-agent"),
            )
            .await
            .unwrap()
            .id
    }

    /// Run the newest queued verification task and return the emailed code
    pub async fn deliver_verification(&self) -> String {
        let task = self
            .broker
            .pending(QUEUE_CRITICAL)
            .into_iter()
            .rev()
            .find(|t| t.task_type == TASK_SEND_VERIFY_EMAIL)
            .unwrap();
        let handler = SendVerifyEmailHandler::new(
            self.users.clone(),
            self.sessions.clone(),
            self.tokens.clone(),
            self.mailer.clone(),
            LinkBuilder::new("localhost:8080", false),
            chrono::Duration::minutes(25),
        );
        handler.process(&task).await.unwrap();

        let payload: PayloadSendVerifyEmail = task.decode().unwrap();
        self.latest_session_token(payload.user_id, SessionScope::VerifyEmail).await
    }

    pub async fn latest_session_token(&self, user_id: i64, scope: SessionScope) -> String {
        self.sessions
            .all()
            .await
            .into_iter()
            .filter(|s| s.user_id == user_id && s.scope == scope)
            .max_by_key(|s| s.created_at)
            .unwrap()
            .token
    }

    pub async fn verified_user(&self, email: &str) -> i64 {
        let id = self.register(email).await;
        let code = self.deliver_verification().await;
        self.state.accounts.verify_email(email, &code).await.unwrap();
        id
    }

    /// Verified user plus a login token
    pub async fn logged_in(&self, email: &str) -> (i64, String) {
        let id = self.verified_user(email).await;
        let outcome = self
            .state
            .accounts
            .login(email, PASSWORD, ClientInfo::new("192.0.2.1", "test-agent"))
            .await
            .unwrap();
        (id, outcome.access_token)
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
