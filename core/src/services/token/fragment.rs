//! Conversion between full tokens and their stored fragments.
//!
//! A fragment is the token with its public header removed. It is what the
//! session store keeps and what emailed links carry; turning it back into a
//! usable token only restores the header, so a fragment never yields a token
//! that was not issued under the process secret.

use crate::domain::entities::TOKEN_HEADER;

/// Strip the public header from a token
pub fn token_fragment(token: &str) -> &str {
    token.strip_prefix(TOKEN_HEADER).unwrap_or(token)
}

/// Restore the full token string from a fragment
pub fn token_from_fragment(fragment: &str) -> String {
    format!("{}{}", TOKEN_HEADER, fragment)
}
