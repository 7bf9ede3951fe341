pub mod reminder;
pub mod session;
pub mod user;

pub use reminder::{MockReminderRepository, ReminderRepository};
pub use session::{MockSessionRepository, SessionRepository};
pub use user::{AfterCreate, BoxFuture, MockUserRepository, UserRepository};
