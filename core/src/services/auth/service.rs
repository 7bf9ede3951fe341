//! Account workflows
//!
//! Every operation that consumes a token emailed to the user (verification,
//! password reset) follows the same order: the fragment must exist in the
//! session store, the token must verify, and its payload must not be
//! revoked. After use the payload is revoked for the rest of its lifetime.

use std::sync::Arc;

use chrono::Utc;
use kk_shared::validation::{validators, FieldErrors};
use tracing::{info, warn};
use uuid::Uuid;

use super::config::{reset_password_task_options, verify_email_task_options, AccountServiceConfig};
use super::password::PasswordHasher;
use crate::domain::entities::{
    ClientInfo, NewSession, NewUser, SessionScope, TokenPayload, User, UserUpdate,
};
use crate::errors::DomainError;
use crate::repositories::{AfterCreate, SessionRepository, UserRepository};
use crate::services::revocation::{revoke_payload, RevocationCache};
use crate::services::tasks::{PayloadSendResetPasswordEmail, PayloadSendVerifyEmail, TaskDistributor};
use crate::services::token::{token_fragment, token_from_fragment, TokenService};

/// Registration input after request validation
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub profile_image_url: Option<String>,
}

impl RegisterUser {
    /// Re-check the fields the HTTP layer validates, for callers that bypass it
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut problems = FieldErrors::new();
        problems.check(validators::not_empty(&self.first_name), "first_name", "must be provided");
        problems.check(validators::not_empty(&self.last_name), "last_name", "must be provided");
        problems.check(validators::is_valid_email(&self.email), "email", "must be a valid email address");
        problems.check(
            validators::is_valid_password(&self.password),
            "password",
            "must be between 8 and 72 bytes long",
        );
        if problems.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(problems.summary()))
        }
    }
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub payload: TokenPayload,
}

/// Registration, verification, login and password management
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    revocation: Arc<dyn RevocationCache>,
    tokens: Arc<TokenService>,
    distributor: Arc<dyn TaskDistributor>,
    hasher: PasswordHasher,
    config: AccountServiceConfig,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        revocation: Arc<dyn RevocationCache>,
        tokens: Arc<TokenService>,
        distributor: Arc<dyn TaskDistributor>,
        config: AccountServiceConfig,
    ) -> Self {
        Self {
            users,
            sessions,
            revocation,
            tokens,
            distributor,
            hasher: PasswordHasher::new(config.bcrypt_cost),
            config,
        }
    }

    /// Create a user and enqueue its verification email
    ///
    /// The enqueue runs inside the user insert transaction; when it fails
    /// the user row is rolled back and the error is returned.
    pub async fn register(&self, input: RegisterUser, client: ClientInfo) -> Result<User, DomainError> {
        input.validate()?;
        let hashed = self.hasher.hash_blocking(&input.password).await?;
        let params = NewUser::new(&input.first_name, &input.last_name, &input.email, hashed)
            .with_profile_image(input.profile_image_url);

        let distributor = Arc::clone(&self.distributor);
        let after_create: AfterCreate = Box::new(move |user: User| {
            Box::pin(async move {
                let payload = PayloadSendVerifyEmail {
                    user_id: user.id,
                    client_ip: client.client_ip,
                    user_agent: client.user_agent,
                };
                distributor
                    .distribute_send_verify_email(&payload, verify_email_task_options())
                    .await
            })
        });

        let user = self.users.create_user_tx(params, after_create).await?;
        info!(user_id = user.id, "registered user");
        Ok(user)
    }

    /// Enqueue another verification email for `user_id`
    pub async fn resend_verification(&self, user_id: i64, client: ClientInfo) -> Result<(), DomainError> {
        let user = self.users.get_user(user_id).await?;
        self.enqueue_verification(&user, client).await
    }

    async fn enqueue_verification(&self, user: &User, client: ClientInfo) -> Result<(), DomainError> {
        let payload = PayloadSendVerifyEmail {
            user_id: user.id,
            client_ip: client.client_ip,
            user_agent: client.user_agent,
        };
        self.distributor
            .distribute_send_verify_email(&payload, verify_email_task_options())
            .await
    }

    /// Verify an emailed token given by its fragment
    ///
    /// The fragment must belong to a session of `scope`.
    async fn consume_link_token(
        &self,
        fragment: &str,
        scope: SessionScope,
        invalid: &str,
    ) -> Result<TokenPayload, DomainError> {
        if fragment.is_empty() || !self.sessions.check_token_exists(fragment, scope).await? {
            return Err(DomainError::validation(invalid));
        }

        let payload = self.tokens.verify(&token_from_fragment(fragment))?;
        self.ensure_not_revoked(&payload).await?;
        Ok(payload)
    }

    async fn ensure_not_revoked(&self, payload: &TokenPayload) -> Result<(), DomainError> {
        match self.revocation.is_blacklisted(&payload.id.to_string()).await {
            Ok(false) => Ok(()),
            Ok(true) => Err(DomainError::unauthorized("invalid token")),
            Err(e) => {
                warn!(error = %e, user_id = payload.user_id, "revocation lookup failed");
                Err(DomainError::unauthorized("invalid token"))
            }
        }
    }

    async fn revoke(&self, payload: &TokenPayload) -> Result<(), DomainError> {
        revoke_payload(
            self.revocation.as_ref(),
            payload,
            Utc::now(),
            self.config.revocation_skew_allowance,
        )
        .await
    }

    /// Mark the account behind an emailed verification link as verified
    pub async fn verify_email(&self, email: &str, secret_code: &str) -> Result<User, DomainError> {
        let payload = self
            .consume_link_token(secret_code, SessionScope::VerifyEmail, "invalid secret code")
            .await?;

        let user = self.users.get_user(payload.user_id).await?;
        if !user.email.eq_ignore_ascii_case(email) {
            return Err(DomainError::validation("invalid secret code"));
        }

        let user = self
            .users
            .update_user(UserUpdate::new(user.id).email_verified(true).active(true))
            .await?;
        self.revoke(&payload).await?;

        info!(user_id = user.id, "verified user email");
        Ok(user)
    }

    async fn open_login_session(&self, user: User, client: ClientInfo) -> Result<LoginOutcome, DomainError> {
        let (access_token, payload) = self.tokens.create(self.config.session_duration, user.id)?;
        self.sessions
            .create_session(NewSession {
                id: Uuid::new_v4(),
                user_id: user.id,
                token: token_fragment(&access_token).to_string(),
                scope: SessionScope::Login,
                client_ip: client.client_ip,
                user_agent: client.user_agent,
                is_blocked: false,
                expires_at: payload.expires_at,
            })
            .await?;

        info!(user_id = user.id, "user logged in");
        Ok(LoginOutcome {
            user,
            access_token,
            payload,
        })
    }

    /// Password login
    ///
    /// An unverified account gets a fresh verification email and is refused.
    pub async fn login(&self, email: &str, password: &str, client: ClientInfo) -> Result<LoginOutcome, DomainError> {
        let user = self.users.get_user_by_email(email).await?;

        if !user.is_email_verified {
            self.enqueue_verification(&user, client).await?;
            return Err(DomainError::forbidden("email not verified"));
        }
        if !user.is_active {
            return Err(DomainError::forbidden("user is not activated"));
        }
        if !self.hasher.verify_blocking(password, &user.hashed_password).await? {
            return Err(DomainError::unauthorized("Invalid login credentials"));
        }

        self.open_login_session(user, client).await
    }

    /// Login for an identity already proven by an OAuth provider
    pub async fn login_with_profile(&self, email: &str, client: ClientInfo) -> Result<LoginOutcome, DomainError> {
        let user = self.users.get_user_by_email(email).await?;
        if !user.is_active {
            return Err(DomainError::forbidden("user is not activated"));
        }
        self.open_login_session(user, client).await
    }

    pub async fn logout(&self, auth: &TokenPayload) -> Result<(), DomainError> {
        self.revoke(auth).await?;
        info!(user_id = auth.user_id, "user logged out");
        Ok(())
    }

    /// Record a reset-password session and enqueue its email
    pub async fn forgot_password(&self, email: &str, client: ClientInfo) -> Result<(), DomainError> {
        let user = self.users.get_user_by_email(email).await?;
        let (token, payload) = self.tokens.create(self.config.email_link_duration, user.id)?;

        let session = self
            .sessions
            .create_session(NewSession {
                id: Uuid::new_v4(),
                user_id: user.id,
                token: token_fragment(&token).to_string(),
                scope: SessionScope::ResetPassword,
                client_ip: client.client_ip,
                user_agent: client.user_agent,
                is_blocked: false,
                expires_at: payload.expires_at,
            })
            .await?;

        let task = PayloadSendResetPasswordEmail {
            session_id: session.id,
            user_email: user.email,
        };
        self.distributor
            .distribute_send_reset_password_email(&task, reset_password_task_options())
            .await
    }

    /// Set a new password from an emailed reset link
    pub async fn reset_password(&self, reset_token: &str, new_password: &str) -> Result<(), DomainError> {
        let payload = self
            .consume_link_token(reset_token, SessionScope::ResetPassword, "invalid reset token")
            .await?;

        let hashed = self.hasher.hash_blocking(new_password).await?;
        self.users
            .update_user(UserUpdate::new(payload.user_id).password(hashed, Utc::now()))
            .await?;
        self.revoke(&payload).await?;

        info!(user_id = payload.user_id, "reset user password");
        Ok(())
    }

    fn ensure_owner(auth: &TokenPayload, user_id: i64) -> Result<(), DomainError> {
        if auth.user_id != user_id {
            return Err(DomainError::unauthorized("mismatched user"));
        }
        Ok(())
    }

    pub async fn get_user(&self, auth: &TokenPayload, user_id: i64) -> Result<User, DomainError> {
        Self::ensure_owner(auth, user_id)?;
        self.users.get_user(user_id).await
    }

    /// Deactivate the caller's account and revoke the token used
    pub async fn deactivate(
        &self,
        auth: &TokenPayload,
        user_id: i64,
        email: &str,
        password: &str,
    ) -> Result<(), DomainError> {
        Self::ensure_owner(auth, user_id)?;

        let user = self.users.get_user_by_email(email).await?;
        if user.id != auth.user_id {
            return Err(DomainError::unauthorized("mismatched user"));
        }
        if !self.hasher.verify_blocking(password, &user.hashed_password).await? {
            return Err(DomainError::unauthorized("Invalid login credentials"));
        }

        self.users.update_user(UserUpdate::new(user.id).active(false)).await?;
        self.revoke(auth).await?;

        info!(user_id = user.id, "deactivated user");
        Ok(())
    }

    pub async fn change_password(
        &self,
        auth: &TokenPayload,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<User, DomainError> {
        Self::ensure_owner(auth, user_id)?;

        let user = self.users.get_user(user_id).await?;
        if !self.hasher.verify_blocking(current_password, &user.hashed_password).await? {
            return Err(DomainError::unauthorized("Invalid login credentials"));
        }

        let hashed = self.hasher.hash_blocking(new_password).await?;
        let user = self
            .users
            .update_user(UserUpdate::new(user.id).password(hashed, Utc::now()))
            .await?;

        info!(user_id = user.id, "changed user password");
        Ok(user)
    }
}
