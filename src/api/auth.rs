//! Token login and logout.

use axum::{extract::State, http::HeaderMap};

use super::{success, ApiJson, ApiResult};
use crate::auth::{token_from_headers, CurrentUser};
use crate::errors::AppError;
use crate::models::{AuthToken, LoginRequest};
use crate::AppState;

/// POST /api/auth/token/login - Exchange credentials for a token.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<AuthToken> {
    let auth_token = state.repo.login(&request.email, &request.password).await?;
    success(AuthToken { auth_token })
}

/// POST /api/auth/token/logout - Revoke the presented token.
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    headers: HeaderMap,
) -> ApiResult<()> {
    let key = token_from_headers(&headers)
        .ok_or_else(|| AppError::Unauthenticated("Missing token".to_string()))?;
    state.repo.logout(&key).await?;

    tracing::info!(user_id = %user.id, "Token revoked");
    success(())
}
