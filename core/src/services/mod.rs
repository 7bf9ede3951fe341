//! Business services containing domain logic and use cases.

pub mod auth;
pub mod background;
pub mod mailer;
pub mod reminder;
pub mod revocation;
pub mod session;
pub mod tasks;
pub mod token;

// Re-export commonly used types
pub use auth::{
    AccountService, AccountServiceConfig, AuthRejection, LoginOutcome, OAuthLogin, OAuthProfile, OAuthProvider,
    PasswordHasher, RegisterUser, RequestAuthenticator,
};
pub use background::BackgroundTasks;
pub use mailer::{EmailMessage, LinkBuilder, Mailer, MockMailer};
pub use reminder::ReminderService;
pub use revocation::{revoke_payload, MockRevocationCache, RevocationCache};
pub use session::{CleanupResult, SessionCleanupConfig, SessionCleanupJob};
pub use tasks::{
    BrokerTaskDistributor, MockTaskBroker, ProcessorConfig, ProcessorHandle, SendResetPasswordEmailHandler,
    SendVerifyEmailHandler, TaskBroker, TaskDistributor, TaskEnvelope, TaskHandler, TaskProcessor,
};
pub use token::TokenService;
