use chrono::{DateTime, Utc};
use kk_core::domain::entities::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 500, message = "must be provided"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 500, message = "must be provided"))]
    pub last_name: String,

    #[validate(length(min = 8, max = 72, message = "must be between 8 and 72 characters"))]
    pub password: String,

    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    #[validate(url(message = "must be a valid URL"))]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 8, max = 72, message = "must be between 8 and 72 characters"))]
    pub password: String,
}

/// Confirmation required before an account is deactivated
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeactivateRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 8, max = 72, message = "must be between 8 and 72 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "must be provided"))]
    pub current_password: String,

    #[validate(length(min = 8, max = 72, message = "must be between 8 and 72 characters"))]
    pub new_password: String,

    #[validate(must_match(other = "new_password", message = "must match new_password"))]
    pub confirm_new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 8, max = 72, message = "must be between 8 and 72 characters"))]
    pub new_password: String,

    #[validate(must_match(other = "new_password", message = "must match new_password"))]
    pub confirm_new_password: String,
}

/// Query of the link sent in verification emails
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyEmailQuery {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "must be provided"))]
    pub secret_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendVerificationQuery {
    pub user_id: i64,
}

/// Query of the link sent in reset password emails
///
/// Older links carried the token as `id`; both names are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResetPasswordQuery {
    pub reset_token: Option<String>,
    pub id: Option<String>,
}

impl ResetPasswordQuery {
    pub fn token(&self) -> Option<&str> {
        self.reset_token
            .as_deref()
            .or(self.id.as_deref())
            .filter(|token| !token.is_empty())
    }
}

/// Public view of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub password_changed_at: DateTime<Utc>,
    pub is_active: bool,
    pub is_email_verified: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        let (first_name, last_name) = user.name_parts();
        Self {
            user_id: user.id,
            first_name,
            last_name,
            email: user.email.clone(),
            profile_image_url: user.profile_image_url.clone(),
            created_at: user.created_at,
            password_changed_at: user.password_changed_at,
            is_active: user.is_active,
            is_email_verified: user.is_email_verified,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBody {
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let request = RegisterRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: "short".to_string(),
            email: "not-an-email".to_string(),
            profile_image_url: None,
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("email"));
        assert!(!fields.contains_key("first_name"));
    }

    #[test]
    fn test_confirm_password_must_match() {
        let request = ResetPasswordRequest {
            new_password: "password123".to_string(),
            confirm_new_password: "password124".to_string(),
        };
        assert!(request.validate().unwrap_err().field_errors().contains_key("confirm_new_password"));
    }

    #[test]
    fn test_reset_query_prefers_reset_token() {
        let query = ResetPasswordQuery {
            reset_token: Some("abc".to_string()),
            id: Some("legacy".to_string()),
        };
        assert_eq!(query.token(), Some("abc"));

        let legacy = ResetPasswordQuery {
            id: Some("legacy".to_string()),
            ..ResetPasswordQuery::default()
        };
        assert_eq!(legacy.token(), Some("legacy"));
        assert_eq!(ResetPasswordQuery::default().token(), None);
    }
}
