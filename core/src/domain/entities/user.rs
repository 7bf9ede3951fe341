//! User entity representing a registered KeyKeeper account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity as stored in the users table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// "First Last" as entered at registration
    pub full_name: String,

    /// bcrypt hash; never serialized
    #[serde(skip_serializing, default)]
    pub hashed_password: String,

    pub email: String,

    pub profile_image_url: Option<String>,

    pub password_changed_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,

    /// Cleared when the account is deactivated
    pub is_active: bool,

    pub is_email_verified: bool,
}

impl User {
    /// Splits `full_name` into a first name and the remainder.
    ///
    /// A single-word name yields an empty last name.
    pub fn name_parts(&self) -> (String, String) {
        let mut words = self.full_name.split_whitespace();
        let first = words.next().unwrap_or_default().to_string();
        let last = words.collect::<Vec<_>>().join(" ");
        (first, last)
    }
}

/// Parameters for inserting a new user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub full_name: String,
    pub hashed_password: String,
    pub email: String,
    pub profile_image_url: Option<String>,
}

impl NewUser {
    pub fn new(first_name: &str, last_name: &str, email: &str, hashed_password: String) -> Self {
        Self {
            full_name: format!("{} {}", first_name.trim(), last_name.trim()),
            hashed_password,
            email: email.to_string(),
            profile_image_url: None,
        }
    }

    pub fn with_profile_image(mut self, url: Option<String>) -> Self {
        self.profile_image_url = url.filter(|u| !u.is_empty());
        self
    }
}

/// Partial update of a user row; `None` leaves a column untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub id: i64,
    pub hashed_password: Option<String>,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub is_email_verified: Option<bool>,
    pub email: Option<String>,
}

impl UserUpdate {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Sets a new password hash and stamps `password_changed_at`
    pub fn password(mut self, hashed_password: String, changed_at: DateTime<Utc>) -> Self {
        self.hashed_password = Some(hashed_password);
        self.password_changed_at = Some(changed_at);
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn email_verified(mut self, verified: bool) -> Self {
        self.is_email_verified = Some(verified);
        self
    }

    /// Applies the set fields onto `user`
    pub fn apply(&self, user: &mut User) {
        if let Some(hash) = &self.hashed_password {
            user.hashed_password = hash.clone();
        }
        if let Some(at) = self.password_changed_at {
            user.password_changed_at = at;
        }
        if let Some(active) = self.is_active {
            user.is_active = active;
        }
        if let Some(verified) = self.is_email_verified {
            user.is_email_verified = verified;
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
    }
}
