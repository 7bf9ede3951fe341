//! OAuth2 providers

mod google;

pub use google::GoogleOAuthProvider;
