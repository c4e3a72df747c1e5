//! Recipe API endpoints, including favorites and the shopping cart.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use super::{created, success, ApiJson, ApiQuery, ApiResult};
use crate::auth::{Actor, CurrentUser};
use crate::db::RelationKind;
use crate::errors::AppError;
use crate::models::{Recipe, RecipeFilter, RecipeLink, RecipeRequest, RecipeSummary};
use crate::shopping_list::{self, ShoppingList};
use crate::AppState;

/// GET /api/recipes - List recipes with optional filters.
pub async fn list_recipes(
    State(state): State<AppState>,
    actor: Actor,
    ApiQuery(filter): ApiQuery<RecipeFilter>,
) -> ApiResult<Vec<Recipe>> {
    success(state.repo.list_recipes(&filter, actor.user_id()).await?)
}

/// GET /api/users/:id/recipes - Recipes by one author.
pub async fn list_user_recipes(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<Vec<Recipe>> {
    if state.repo.get_user(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("User {} not found", id)));
    }

    let filter = RecipeFilter {
        author: Some(id),
        ..Default::default()
    };
    success(state.repo.list_recipes(&filter, actor.user_id()).await?)
}

/// POST /api/recipes - Create a recipe.
pub async fn create_recipe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<RecipeRequest>,
) -> ApiResult<Recipe> {
    created(state.repo.create_recipe(&user.id, &request).await?)
}

/// GET /api/recipes/:id - Get a recipe.
pub async fn get_recipe(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<Recipe> {
    let recipe = state
        .repo
        .get_recipe(&id, actor.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Recipe {} not found", id)))?;
    success(recipe)
}

/// GET /api/recipes/slug/:slug - Get a recipe by its slug.
pub async fn get_recipe_by_slug(
    State(state): State<AppState>,
    actor: Actor,
    Path(slug): Path<String>,
) -> ApiResult<Recipe> {
    let recipe = state
        .repo
        .get_recipe_by_slug(&slug, actor.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Recipe '{}' not found", slug)))?;
    success(recipe)
}

/// PUT /api/recipes/:id - Replace a recipe (author only).
pub async fn update_recipe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<RecipeRequest>,
) -> ApiResult<Recipe> {
    success(state.repo.update_recipe(&user.id, &id, &request).await?)
}

/// DELETE /api/recipes/:id - Delete a recipe (author only).
pub async fn delete_recipe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_recipe(&user.id, &id).await?;
    success(())
}

/// GET /api/recipes/:id/get-link - Short link to a recipe.
pub async fn get_recipe_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<RecipeLink> {
    let recipe = state
        .repo
        .get_recipe(&id, None)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Recipe {} not found", id)))?;

    success(RecipeLink {
        short_link: format!("/api/recipes/slug/{}", recipe.slug),
    })
}

/// POST /api/recipes/:id/favorite
pub async fn add_favorite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<RecipeSummary> {
    created(
        state
            .repo
            .add_recipe_relation(RelationKind::Favorite, &user.id, &id)
            .await?,
    )
}

/// DELETE /api/recipes/:id/favorite
pub async fn remove_favorite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state
        .repo
        .remove_recipe_relation(RelationKind::Favorite, &user.id, &id)
        .await?;
    success(())
}

/// POST /api/recipes/:id/shopping_cart
pub async fn add_to_shopping_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<RecipeSummary> {
    created(
        state
            .repo
            .add_recipe_relation(RelationKind::ShoppingCart, &user.id, &id)
            .await?,
    )
}

/// DELETE /api/recipes/:id/shopping_cart
pub async fn remove_from_shopping_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state
        .repo
        .remove_recipe_relation(RelationKind::ShoppingCart, &user.id, &id)
        .await?;
    success(())
}

/// GET /api/favorites - The caller's favorite recipes.
pub async fn list_favorites(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<Recipe>> {
    success(
        state
            .repo
            .list_related_recipes(RelationKind::Favorite, &user.id)
            .await?,
    )
}

/// GET /api/shopping_cart - Recipes in the caller's cart.
pub async fn list_shopping_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<Recipe>> {
    success(
        state
            .repo
            .list_related_recipes(RelationKind::ShoppingCart, &user.id)
            .await?,
    )
}

/// GET /api/recipes/download_shopping_cart - Aggregated list as a text file.
///
/// An empty cart yields an empty file.
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let list = ShoppingList::aggregate(state.repo.cart_lines(&user.id).await?);

    tracing::debug!(user_id = %user.id, lines = list.len(), "Shopping list rendered");

    Ok((
        [
            (header::CONTENT_TYPE, shopping_list::CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", shopping_list::FILENAME),
            ),
        ],
        list.render(),
    ))
}
