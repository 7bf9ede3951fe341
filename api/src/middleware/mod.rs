pub mod auth;
pub mod cors;

pub use auth::{AuthContext, AuthError, RequireAuth};
pub use cors::create_cors;
