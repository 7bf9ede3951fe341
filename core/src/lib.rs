//! # KeyKeeper Core
//!
//! Core business logic and domain layer for the KeyKeeper backend.
//! This crate contains the domain entities, the error taxonomy, repository,
//! cache, broker and mailer interfaces (with in-memory implementations),
//! the session token service, the background task runtime and the account
//! workflows that the HTTP layer drives.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    ClientInfo, ListRemindersQuery, NewReminder, NewSession, NewUser, Reminder, Session, SessionScope, TokenPayload,
    User, UserUpdate,
};
pub use domain::value_objects::{IntervalUnit, ReminderInterval};
pub use errors::{DomainError, TaskError, TokenError};
pub use repositories::{
    MockReminderRepository, MockSessionRepository, MockUserRepository, ReminderRepository, SessionRepository,
    UserRepository,
};
pub use services::{AccountService, ReminderService, RequestAuthenticator, TaskProcessor, TokenService};
