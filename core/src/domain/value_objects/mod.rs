//! Value objects representing immutable domain concepts.

pub mod interval;

// Re-export commonly used types
pub use interval::{IntervalUnit, ReminderInterval};
