//! Token revocation (blacklist)
//!
//! Logout, email verification, password reset and deactivation revoke a
//! still-valid token by recording its payload id in a fast cache. Entries
//! expire with the token, so the cache never outgrows the set of live tokens.

mod cache;
mod mock;


pub use cache::{revocation_ttl, revoke_payload, RevocationCache};
pub use mock::MockRevocationCache;
