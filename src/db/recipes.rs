//! Recipes and their tag/ingredient links.
//!
//! Create, update and delete each run in a single transaction. Links are never
//! patched: every write deletes the recipe's join rows and bulk-inserts the
//! requested set.

use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqliteConnection};

use super::relations::RelationKind;
use super::repository::{
    author_from_row, exists, new_id, now, summary_from_row, tag_from_row, Repository,
};
use crate::errors::AppError;
use crate::models::{Recipe, RecipeFilter, RecipeIngredient, RecipeRequest, RecipeSummary, Tag};
use crate::slug::{is_valid_slug, unique_recipe_slug};

const RECIPE_SELECT: &str = r#"SELECT r.id, r.name, r.text, r.cooking_time, r.image, r.slug, r.creation_date,
       u.id AS author_id, u.email AS author_email, u.username AS author_username,
       u.first_name AS author_first_name, u.last_name AS author_last_name,
       u.avatar AS author_avatar, u.date_joined AS author_date_joined
FROM recipes r
JOIN users u ON u.id = r.author_id"#;

impl Repository {
    // ==================== RECIPE OPERATIONS ====================

    /// List recipes matching the filter, newest first.
    ///
    /// The favorite and cart filters only apply to signed-in viewers.
    pub async fn list_recipes(
        &self,
        filter: &RecipeFilter,
        viewer: Option<&str>,
    ) -> Result<Vec<Recipe>, AppError> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(RECIPE_SELECT);
        query.push(" WHERE 1 = 1");

        if let Some(author) = &filter.author {
            query.push(" AND r.author_id = ").push_bind(author.clone());
        }

        let slugs = filter.tag_slugs();
        if !slugs.is_empty() {
            query.push(
                " AND r.id IN (SELECT rt.recipe_id FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id WHERE t.slug IN (",
            );
            let mut separated = query.separated(", ");
            for slug in slugs {
                separated.push_bind(slug);
            }
            separated.push_unseparated("))");
        }

        if let Some(viewer_id) = viewer {
            if filter.is_favorited == Some(1) {
                query
                    .push(" AND r.id IN (SELECT recipe_id FROM favorites WHERE user_id = ")
                    .push_bind(viewer_id.to_string())
                    .push(")");
            }
            if filter.is_in_shopping_cart == Some(1) {
                query
                    .push(" AND r.id IN (SELECT recipe_id FROM shopping_cart WHERE user_id = ")
                    .push_bind(viewer_id.to_string())
                    .push(")");
            }
        }

        query.push(" ORDER BY r.creation_date DESC, r.rowid DESC");

        let rows = query.build().fetch_all(&self.pool).await?;

        let mut recipes = Vec::with_capacity(rows.len());
        for row in &rows {
            recipes.push(self.hydrate_recipe(row, viewer).await?);
        }
        Ok(recipes)
    }

    /// Get a recipe by ID as seen by `viewer`.
    pub async fn get_recipe(
        &self,
        id: &str,
        viewer: Option<&str>,
    ) -> Result<Option<Recipe>, AppError> {
        let row = sqlx::query(&format!("{} WHERE r.id = ?", RECIPE_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate_recipe(&row, viewer).await?)),
            None => Ok(None),
        }
    }

    /// Get a recipe by slug as seen by `viewer`.
    pub async fn get_recipe_by_slug(
        &self,
        slug: &str,
        viewer: Option<&str>,
    ) -> Result<Option<Recipe>, AppError> {
        let row = sqlx::query(&format!("{} WHERE r.slug = ?", RECIPE_SELECT))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate_recipe(&row, viewer).await?)),
            None => Ok(None),
        }
    }

    /// Short form of a recipe; `NotFound` if it does not exist.
    pub async fn recipe_summary(&self, id: &str) -> Result<RecipeSummary, AppError> {
        let row = sqlx::query("SELECT id, name, image, cooking_time FROM recipes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(summary_from_row)
            .ok_or_else(|| AppError::NotFound(format!("Recipe {} not found", id)))
    }

    /// Tags attached to a recipe, by name.
    pub async fn recipe_tags(&self, recipe_id: &str) -> Result<Vec<Tag>, AppError> {
        let rows = sqlx::query(
            "SELECT t.id, t.name, t.slug, t.color FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id WHERE rt.recipe_id = ? ORDER BY t.name",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(tag_from_row).collect())
    }

    /// Ingredient lines of a recipe in insertion order.
    pub async fn recipe_ingredients(
        &self,
        recipe_id: &str,
    ) -> Result<Vec<RecipeIngredient>, AppError> {
        let rows = sqlx::query(
            "SELECT i.id, i.name, i.unit, ri.amount FROM recipe_ingredients ri JOIN ingredients i ON i.id = ri.ingredient_id WHERE ri.recipe_id = ? ORDER BY ri.id",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| RecipeIngredient {
                id: row.get("id"),
                name: row.get("name"),
                unit: row.get("unit"),
                amount: row.get("amount"),
            })
            .collect())
    }

    /// Create a recipe authored by `author_id`.
    pub async fn create_recipe(
        &self,
        author_id: &str,
        request: &RecipeRequest,
    ) -> Result<Recipe, AppError> {
        request.validate()?;

        let id = new_id();
        let mut tx = self.begin_write().await?;

        let slug = match request.slug.as_deref() {
            Some(slug) if !is_valid_slug(slug) => {
                return Err(AppError::InvalidOperation(format!(
                    "Slug '{}' may only contain lowercase letters, digits, '-' and '_'",
                    slug
                )));
            }
            Some(slug) => slug.to_string(),
            None => unique_recipe_slug(&mut tx, &request.name).await?,
        };

        sqlx::query(
            "INSERT INTO recipes (id, name, text, cooking_time, image, author_id, slug, creation_date) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(request.name.trim())
        .bind(&request.text)
        .bind(request.cooking_time)
        .bind(&request.image)
        .bind(author_id)
        .bind(&slug)
        .bind(now())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::from(e).or_already_exists(format!("Slug '{}' is already taken", slug))
        })?;

        replace_links(&mut tx, &id, request).await?;

        tx.commit().await?;

        tracing::info!(recipe_id = %id, slug = %slug, author_id = %author_id, "Recipe created");

        self.get_recipe(&id, Some(author_id))
            .await?
            .ok_or_else(|| AppError::Internal(format!("Recipe {} vanished after create", id)))
    }

    /// Replace a recipe's fields, tags and ingredients. Only the author may do this.
    ///
    /// The slug is kept; the image is only replaced when one is supplied.
    pub async fn update_recipe(
        &self,
        actor_id: &str,
        recipe_id: &str,
        request: &RecipeRequest,
    ) -> Result<Recipe, AppError> {
        let mut tx = self.begin_write().await?;

        check_author(&mut tx, actor_id, recipe_id).await?;
        request.validate()?;

        sqlx::query(
            "UPDATE recipes SET name = ?, text = ?, cooking_time = ?, image = COALESCE(?, image) WHERE id = ?",
        )
        .bind(request.name.trim())
        .bind(&request.text)
        .bind(request.cooking_time)
        .bind(&request.image)
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;

        replace_links(&mut tx, recipe_id, request).await?;

        tx.commit().await?;

        tracing::info!(recipe_id = %recipe_id, "Recipe updated");

        self.get_recipe(recipe_id, Some(actor_id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Recipe {} not found", recipe_id)))
    }

    /// Delete a recipe. Only the author may do this; links, favorites and
    /// cart entries go with it.
    pub async fn delete_recipe(&self, actor_id: &str, recipe_id: &str) -> Result<(), AppError> {
        let mut tx = self.begin_write().await?;

        check_author(&mut tx, actor_id, recipe_id).await?;

        sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(recipe_id = %recipe_id, "Recipe deleted");
        Ok(())
    }

    async fn hydrate_recipe(&self, row: &SqliteRow, viewer: Option<&str>) -> Result<Recipe, AppError> {
        let id: String = row.get("id");
        let author = self.profile(viewer, author_from_row(row)).await?;
        let tags = self.recipe_tags(&id).await?;
        let ingredients = self.recipe_ingredients(&id).await?;

        let (is_favorited, is_in_shopping_cart) = match viewer {
            Some(viewer_id) => (
                self.has_recipe_relation(RelationKind::Favorite, viewer_id, &id)
                    .await?,
                self.has_recipe_relation(RelationKind::ShoppingCart, viewer_id, &id)
                    .await?,
            ),
            None => (false, false),
        };

        Ok(Recipe {
            id,
            name: row.get("name"),
            text: row.get("text"),
            cooking_time: row.get("cooking_time"),
            image: row.get("image"),
            slug: row.get("slug"),
            creation_date: row.get("creation_date"),
            author,
            tags,
            ingredients,
            is_favorited,
            is_in_shopping_cart,
        })
    }
}

/// `NotFound` if the recipe is missing, `Unauthorized` if `actor_id` is not its author.
async fn check_author(
    conn: &mut SqliteConnection,
    actor_id: &str,
    recipe_id: &str,
) -> Result<(), AppError> {
    let author_id: Option<String> =
        sqlx::query_scalar("SELECT author_id FROM recipes WHERE id = ?")
            .bind(recipe_id)
            .fetch_optional(&mut *conn)
            .await?;

    match author_id {
        None => Err(AppError::NotFound(format!("Recipe {} not found", recipe_id))),
        Some(author_id) if author_id != actor_id => {
            tracing::warn!(recipe_id = %recipe_id, actor_id = %actor_id, "Non-author attempted to modify recipe");
            Err(AppError::Unauthorized(
                "Only the author may modify this recipe".to_string(),
            ))
        }
        Some(_) => Ok(()),
    }
}

/// Replace the tag set and ingredient rows of a recipe with the requested ones.
async fn replace_links(
    conn: &mut SqliteConnection,
    recipe_id: &str,
    request: &RecipeRequest,
) -> Result<(), AppError> {
    let tags = request.unique_tags();
    for tag_id in &tags {
        if !exists(&mut *conn, "tags", tag_id).await? {
            return Err(AppError::NotFound(format!("Tag {} not found", tag_id)));
        }
    }
    for entry in &request.ingredients {
        if !exists(&mut *conn, "ingredients", &entry.id).await? {
            return Err(AppError::NotFound(format!(
                "Ingredient {} not found",
                entry.id
            )));
        }
    }

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    if !tags.is_empty() {
        let mut insert: QueryBuilder<Sqlite> =
            QueryBuilder::new("INSERT INTO recipe_tags (recipe_id, tag_id) ");
        insert.push_values(&tags, |mut row, tag_id| {
            row.push_bind(recipe_id).push_bind(*tag_id);
        });
        insert.build().execute(&mut *conn).await?;
    }

    if !request.ingredients.is_empty() {
        let mut insert: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) ",
        );
        insert.push_values(&request.ingredients, |mut row, entry| {
            row.push_bind(recipe_id)
                .push_bind(&entry.id)
                .push_bind(entry.amount);
        });
        insert.build().execute(&mut *conn).await?;
    }

    Ok(())
}
