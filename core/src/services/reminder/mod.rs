//! Password reminders owned by a user

mod service;

pub use service::ReminderService;
