//! Account registration, verification and self-service endpoints

pub mod account;
pub mod register;
pub mod verification;

pub use account::{change_password, deactivate, get_user};
pub use register::register;
pub use verification::{resend_verification, verify_email};
