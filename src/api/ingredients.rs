//! Ingredient API endpoints.

use axum::extract::{Path, State};
use serde::Deserialize;

use super::{success, ApiJson, ApiQuery, ApiResult};
use crate::errors::AppError;
use crate::models::{ImportIngredientsRequest, ImportSummary, Ingredient};
use crate::AppState;

/// Query parameters for ingredient listing.
#[derive(Debug, Deserialize)]
pub struct IngredientQuery {
    pub name: Option<String>,
}

/// GET /api/ingredients - List ingredients, optionally filtered by name.
pub async fn list_ingredients(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<IngredientQuery>,
) -> ApiResult<Vec<Ingredient>> {
    success(state.repo.list_ingredients(query.name.as_deref()).await?)
}

/// GET /api/ingredients/:id - Get an ingredient.
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Ingredient> {
    let ingredient = state
        .repo
        .get_ingredient(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ingredient {} not found", id)))?;
    success(ingredient)
}

/// POST /api/admin/ingredients/import - Bulk get-or-create.
pub async fn import_ingredients(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ImportIngredientsRequest>,
) -> ApiResult<ImportSummary> {
    success(state.repo.import_ingredients(&request.ingredients).await?)
}
