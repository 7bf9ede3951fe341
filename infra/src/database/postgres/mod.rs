//! Postgres implementations of the repository traits

mod reminder_repository_impl;
mod session_repository_impl;
mod user_repository_impl;

pub use reminder_repository_impl::PgReminderRepository;
pub use session_repository_impl::PgSessionRepository;
pub use user_repository_impl::PgUserRepository;

use kk_core::errors::DomainError;

use crate::InfrastructureError;

/// Map a query error, turning "no rows" into `NotFound(resource)`
pub(crate) fn query_error(resource: &str, err: sqlx::Error) -> DomainError {
    match err {
        sqlx::Error::RowNotFound => DomainError::not_found(resource),
        other => InfrastructureError::Database(other).into(),
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
