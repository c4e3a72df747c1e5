//! User model and the requests that create or modify users.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_NAME_LENGTH: usize = 150;
pub const MAX_EMAIL_LENGTH: usize = 254;

/// A registered user. Email is the login identity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Opaque reference to the avatar blob
    pub avatar: Option<String>,
    pub date_joined: String,
}

/// A user as seen by a particular viewer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    /// Whether the viewer follows this user (always false for anonymous viewers)
    pub is_subscribed: bool,
}

/// Request body for registering a new user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let email = self.email.trim();
        if email.is_empty() || email.len() > MAX_EMAIL_LENGTH || !email.contains('@') {
            return Err(AppError::InvalidOperation(
                "A valid email address is required".to_string(),
            ));
        }
        if !is_valid_username(&self.username) {
            return Err(AppError::InvalidOperation(
                "Username may only contain letters, digits and @/./+/-/_".to_string(),
            ));
        }
        for (field, value) in [("First name", &self.first_name), ("Last name", &self.last_name)] {
            if value.trim().is_empty() || value.chars().count() > MAX_NAME_LENGTH {
                return Err(AppError::InvalidOperation(format!(
                    "{} must be 1 to {} characters",
                    field, MAX_NAME_LENGTH
                )));
            }
        }
        validate_password(&self.password)
    }
}

pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.chars().count() <= MAX_NAME_LENGTH
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::InvalidOperation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Request body for changing the caller's password.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Request body for replacing the caller's avatar.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAvatarRequest {
    pub avatar: String,
}

/// Request body for token login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued authentication token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    pub auth_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateUserRequest {
        CreateUserRequest {
            email: "cook@example.com".to_string(),
            username: "cook.book+1".to_string(),
            first_name: "Ann".to_string(),
            last_name: "Cook".to_string(),
            password: "long-enough".to_string(),
        }
    }

    #[test]
    fn test_valid_user() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_invalid_fields() {
        let mut req = request();
        req.email = "not-an-email".to_string();
        assert!(req.validate().is_err());

        let mut req = request();
        req.username = "has space".to_string();
        assert!(req.validate().is_err());

        let mut req = request();
        req.password = "short".to_string();
        assert!(req.validate().is_err());

        let mut req = request();
        req.last_name = " ".to_string();
        assert!(req.validate().is_err());
    }
}
