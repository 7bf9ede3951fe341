//! Domain entities representing core business objects.

pub mod reminder;
pub mod session;
pub mod token;
pub mod user;

// Re-export commonly used types
pub use reminder::{ListRemindersQuery, NewReminder, Reminder, REMINDER_SORT_SAFELIST};
pub use session::{ClientInfo, NewSession, Session, SessionScope};
pub use token::{TokenPayload, TOKEN_HEADER};
pub use user::{NewUser, User, UserUpdate};

#[cfg(test)]
mod tests;
