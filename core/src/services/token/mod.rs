//! Session token module
//!
//! This module issues and verifies the opaque session tokens handed to
//! clients and embedded in emailed links:
//! - AES-256-GCM authenticated encryption of a [`TokenPayload`]
//! - Distinct invalid and expired failures
//! - Token fragments stored by the session store in place of full tokens
//!
//! [`TokenPayload`]: crate::domain::entities::TokenPayload

mod fragment;
mod service;

#[cfg(test)]
mod tests;

pub use fragment::{token_fragment, token_from_fragment};
pub use service::{TokenService, KEY_SIZE};
