//! User accounts and authentication tokens.

use sqlx::Row;

use super::repository::{now, new_id, user_from_row, Repository, USER_COLUMNS};
use crate::auth::{generate_token, hash_password, verify_password};
use crate::errors::AppError;
use crate::models::{
    validate_password, CreateUserRequest, SetPasswordRequest, User, UserProfile,
};

impl Repository {
    /// Register a new user.
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User, AppError> {
        request.validate()?;

        let id = new_id();
        let now = now();
        let password_hash = hash_password(&request.password)?;
        let email = request.email.trim().to_lowercase();

        sqlx::query(
            "INSERT INTO users (id, email, username, first_name, last_name, password_hash, avatar, date_joined) VALUES (?, ?, ?, ?, ?, ?, NULL, ?)",
        )
        .bind(&id)
        .bind(&email)
        .bind(&request.username)
        .bind(request.first_name.trim())
        .bind(request.last_name.trim())
        .bind(&password_hash)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::from(e)
                .or_already_exists("A user with this email or username already exists")
        })?;

        tracing::info!(user_id = %id, username = %request.username, "User registered");

        Ok(User {
            id,
            email,
            username: request.username.clone(),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            avatar: None,
            date_joined: now,
        })
    }

    /// List all users.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY date_joined, username",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Attach the viewer-relative subscription flag to a user.
    pub async fn profile(&self, viewer: Option<&str>, user: User) -> Result<UserProfile, AppError> {
        let is_subscribed = match viewer {
            Some(viewer_id) => self.is_subscribed(viewer_id, &user.id).await?,
            None => false,
        };
        Ok(UserProfile {
            user,
            is_subscribed,
        })
    }

    /// Change a user's password after checking the current one.
    pub async fn set_password(
        &self,
        user_id: &str,
        request: &SetPasswordRequest,
    ) -> Result<(), AppError> {
        let stored: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        let stored =
            stored.ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        if !verify_password(&request.current_password, &stored)? {
            return Err(AppError::InvalidOperation(
                "Current password is incorrect".to_string(),
            ));
        }
        validate_password(&request.new_password)?;

        let password_hash = hash_password(&request.new_password)?;
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(&password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Replace or clear a user's avatar reference.
    pub async fn set_avatar(&self, user_id: &str, avatar: Option<&str>) -> Result<User, AppError> {
        let result = sqlx::query("UPDATE users SET avatar = ? WHERE id = ?")
            .bind(avatar)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    // ==================== TOKEN OPERATIONS ====================

    /// Exchange email and password for a new token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let row = sqlx::query("SELECT id, password_hash FROM users WHERE email = ?")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AppError::Unauthenticated("Invalid credentials".to_string()));
        };
        let user_id: String = row.get("id");
        let stored: String = row.get("password_hash");

        if !verify_password(password, &stored)? {
            return Err(AppError::Unauthenticated("Invalid credentials".to_string()));
        }

        let key = generate_token();
        sqlx::query("INSERT INTO auth_tokens (key, user_id, created_at) VALUES (?, ?, ?)")
            .bind(&key)
            .bind(&user_id)
            .bind(now())
            .execute(&self.pool)
            .await?;

        tracing::info!(user_id = %user_id, "Token issued");
        Ok(key)
    }

    /// Revoke a token.
    pub async fn logout(&self, key: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Unauthenticated("Invalid token".to_string()));
        }
        Ok(())
    }

    /// Resolve a token to its user.
    pub async fn user_by_token(&self, key: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(
            "SELECT u.id, u.email, u.username, u.first_name, u.last_name, u.avatar, u.date_joined FROM auth_tokens t JOIN users u ON u.id = t.user_id WHERE t.key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }
}
