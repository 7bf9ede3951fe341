//! Database module - Postgres implementations using SQLx
//!
//! - Connection pool management and migrations
//! - Repository implementations for users, sessions and reminders

pub mod connection;
pub mod postgres;

pub use connection::DatabasePool;
pub use postgres::{PgReminderRepository, PgSessionRepository, PgUserRepository};
