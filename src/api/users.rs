//! User, avatar and subscription endpoints.

use axum::extract::{Path, State};

use super::{created, success, ApiJson, ApiQuery, ApiResult};
use crate::auth::{Actor, CurrentUser};
use crate::errors::AppError;
use crate::models::{
    CreateUserRequest, SetAvatarRequest, SetPasswordRequest, Subscription, SubscriptionQuery,
    User, UserProfile,
};
use crate::AppState;

/// GET /api/users - List all users.
pub async fn list_users(State(state): State<AppState>, actor: Actor) -> ApiResult<Vec<UserProfile>> {
    let users = state.repo.list_users().await?;

    let mut profiles = Vec::with_capacity(users.len());
    for user in users {
        profiles.push(state.repo.profile(actor.user_id(), user).await?);
    }
    success(profiles)
}

/// POST /api/users - Register a new user.
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> ApiResult<User> {
    created(state.repo.create_user(&request).await?)
}

/// GET /api/users/me - The signed-in user.
pub async fn get_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<UserProfile> {
    let viewer = user.id.clone();
    success(state.repo.profile(Some(&viewer), user).await?)
}

/// GET /api/users/:id - Get a user.
pub async fn get_user(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<UserProfile> {
    let user = state
        .repo
        .get_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

    success(state.repo.profile(actor.user_id(), user).await?)
}

/// POST /api/users/set_password - Change the signed-in user's password.
pub async fn set_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<SetPasswordRequest>,
) -> ApiResult<()> {
    state.repo.set_password(&user.id, &request).await?;
    success(())
}

/// PUT /api/users/me/avatar - Replace the avatar.
pub async fn set_avatar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<SetAvatarRequest>,
) -> ApiResult<User> {
    let avatar = request.avatar.trim();
    if avatar.is_empty() {
        return Err(AppError::InvalidOperation(
            "Avatar must not be empty".to_string(),
        ));
    }
    success(state.repo.set_avatar(&user.id, Some(avatar)).await?)
}

/// DELETE /api/users/me/avatar - Clear the avatar.
pub async fn delete_avatar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<User> {
    success(state.repo.set_avatar(&user.id, None).await?)
}

/// GET /api/users/subscriptions - Followed authors with recipe previews.
pub async fn list_subscriptions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<SubscriptionQuery>,
) -> ApiResult<Vec<Subscription>> {
    success(
        state
            .repo
            .list_subscriptions(&user.id, query.recipes_limit)
            .await?,
    )
}

/// POST /api/users/:id/subscribe - Follow an author.
pub async fn subscribe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(author_id): Path<String>,
    ApiQuery(query): ApiQuery<SubscriptionQuery>,
) -> ApiResult<Subscription> {
    created(
        state
            .repo
            .subscribe(&user.id, &author_id, query.recipes_limit)
            .await?,
    )
}

/// DELETE /api/users/:id/subscribe - Stop following an author.
pub async fn unsubscribe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(author_id): Path<String>,
) -> ApiResult<()> {
    state.repo.unsubscribe(&user.id, &author_id).await?;
    success(())
}
