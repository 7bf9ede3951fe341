//! Authentication and account workflows
//!
//! - [`RequestAuthenticator`]: per-request bearer token check
//! - [`AccountService`]: registration, email verification, login, logout,
//!   password reset and account management
//! - [`OAuthLogin`]: Google sign-in through an [`OAuthProvider`]
//! - [`PasswordHasher`]: bcrypt hashing

mod config;
mod guard;
mod oauth;
mod password;
mod service;

#[cfg(test)]
mod tests;

pub use config::{reset_password_task_options, verify_email_task_options, AccountServiceConfig};
pub use guard::{extract_bearer_token, AuthRejection, RequestAuthenticator};
pub use oauth::{OAuthLogin, OAuthProfile, OAuthProvider};
pub use password::PasswordHasher;
pub use service::{AccountService, LoginOutcome, RegisterUser};
