//! Request and response bodies

pub mod oauth;
pub mod reminder;
pub mod user;

pub use oauth::GoogleCallbackQuery;
pub use reminder::{CreateReminderRequest, ListRemindersParams, ReminderBody, ReminderListBody};
pub use user::{
    ChangePasswordRequest, DeactivateRequest, ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
    ResendVerificationQuery, ResetPasswordQuery, ResetPasswordRequest, UserBody, UserResponse, VerifyEmailQuery,
};
