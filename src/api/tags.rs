//! Tag API endpoints.

use axum::extract::{Path, State};

use super::{created, success, ApiJson, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateTagRequest, Tag};
use crate::AppState;

/// GET /api/tags - List all tags.
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Vec<Tag>> {
    success(state.repo.list_tags().await?)
}

/// GET /api/tags/:id - Get a tag.
pub async fn get_tag(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Tag> {
    let tag = state
        .repo
        .get_tag(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tag {} not found", id)))?;
    success(tag)
}

/// POST /api/admin/tags - Create a new tag.
pub async fn create_tag(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateTagRequest>,
) -> ApiResult<Tag> {
    created(state.repo.create_tag(&request).await?)
}

/// DELETE /api/admin/tags/:id - Delete a tag.
pub async fn delete_tag(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete_tag(&id).await?;
    success(())
}
