//! Login, Google sign-in and logout endpoints

pub mod google;
pub mod login;
pub mod logout;

pub use google::{google_callback, google_login};
pub use login::login;
pub use logout::logout;
