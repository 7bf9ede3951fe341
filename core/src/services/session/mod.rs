//! Session maintenance

mod cleanup;

pub use cleanup::{CleanupResult, SessionCleanupConfig, SessionCleanupJob};
