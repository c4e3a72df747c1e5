//! Favorites, shopping cart entries and subscriptions.
//!
//! Each relation is a unique pair enforced by the schema. The strict
//! operations report `AlreadyExists` / `NotFound`; the idempotent variants
//! report what changed instead. A unique violation raised by a concurrent
//! writer is reported exactly like a duplicate add.

use sqlx::Row;

use super::repository::{
    exists, now, summary_from_row, user_from_row, Repository, USER_COLUMNS,
};
use crate::errors::AppError;
use crate::models::{Recipe, RecipeSummary, Subscription, User, UserProfile};
use crate::shopping_list::CartLine;

/// A (user, recipe) relation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Favorite,
    ShoppingCart,
}

impl RelationKind {
    fn table(self) -> &'static str {
        match self {
            RelationKind::Favorite => "favorites",
            RelationKind::ShoppingCart => "shopping_cart",
        }
    }

    fn label(self) -> &'static str {
        match self {
            RelationKind::Favorite => "favorites",
            RelationKind::ShoppingCart => "the shopping cart",
        }
    }
}

impl Repository {
    // ==================== RECIPE RELATIONS ====================

    /// Add a recipe to a user's favorites or cart; `AlreadyExists` if present.
    pub async fn add_recipe_relation(
        &self,
        kind: RelationKind,
        user_id: &str,
        recipe_id: &str,
    ) -> Result<RecipeSummary, AppError> {
        let summary = self.recipe_summary(recipe_id).await?;

        sqlx::query(&format!(
            "INSERT INTO {} (user_id, recipe_id, created_at) VALUES (?, ?, ?)",
            kind.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .bind(now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::from(e).or_already_exists(format!(
                "Recipe {} is already in {}",
                recipe_id,
                kind.label()
            ))
        })?;

        tracing::debug!(?kind, user_id = %user_id, recipe_id = %recipe_id, "Relation added");
        Ok(summary)
    }

    /// Get-or-create variant of [`Repository::add_recipe_relation`].
    ///
    /// Returns `true` if a row was created.
    pub async fn ensure_recipe_relation(
        &self,
        kind: RelationKind,
        user_id: &str,
        recipe_id: &str,
    ) -> Result<bool, AppError> {
        self.recipe_summary(recipe_id).await?;

        let result = sqlx::query(&format!(
            "INSERT OR IGNORE INTO {} (user_id, recipe_id, created_at) VALUES (?, ?, ?)",
            kind.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .bind(now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a recipe from a user's favorites or cart; `NotFound` if absent.
    pub async fn remove_recipe_relation(
        &self,
        kind: RelationKind,
        user_id: &str,
        recipe_id: &str,
    ) -> Result<(), AppError> {
        self.recipe_summary(recipe_id).await?;

        if self.discard_recipe_relation(kind, user_id, recipe_id).await? == 0 {
            return Err(AppError::NotFound(format!(
                "Recipe {} is not in {}",
                recipe_id,
                kind.label()
            )));
        }

        tracing::debug!(?kind, user_id = %user_id, recipe_id = %recipe_id, "Relation removed");
        Ok(())
    }

    /// Delete-if-exists variant of [`Repository::remove_recipe_relation`].
    ///
    /// Returns the number of deleted rows.
    pub async fn discard_recipe_relation(
        &self,
        kind: RelationKind,
        user_id: &str,
        recipe_id: &str,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE user_id = ? AND recipe_id = ?",
            kind.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Whether the pair exists.
    pub async fn has_recipe_relation(
        &self,
        kind: RelationKind,
        user_id: &str,
        recipe_id: &str,
    ) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar(&format!(
            "SELECT 1 FROM {} WHERE user_id = ? AND recipe_id = ?",
            kind.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    /// Recipes in a user's favorites or cart, most recently added first.
    pub async fn list_related_recipes(
        &self,
        kind: RelationKind,
        user_id: &str,
    ) -> Result<Vec<Recipe>, AppError> {
        let ids: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT recipe_id FROM {} WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
            kind.table()
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut recipes = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(recipe) = self.get_recipe(&id, Some(user_id)).await? {
                recipes.push(recipe);
            }
        }
        Ok(recipes)
    }

    /// Every ingredient line of every recipe in the user's cart.
    pub async fn cart_lines(&self, user_id: &str) -> Result<Vec<CartLine>, AppError> {
        let rows = sqlx::query(
            r#"SELECT i.name, i.unit, ri.amount
               FROM shopping_cart c
               JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
               JOIN ingredients i ON i.id = ri.ingredient_id
               WHERE c.user_id = ?
               ORDER BY c.created_at, ri.id"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| CartLine {
                name: row.get("name"),
                unit: row.get("unit"),
                amount: row.get("amount"),
            })
            .collect())
    }

    // ==================== SUBSCRIPTIONS ====================

    /// Follow an author; `InvalidOperation` on self, `AlreadyExists` if following.
    pub async fn subscribe(
        &self,
        subscriber_id: &str,
        author_id: &str,
        recipes_limit: usize,
    ) -> Result<Subscription, AppError> {
        self.check_subscription_target(subscriber_id, author_id)
            .await?;

        sqlx::query(
            "INSERT INTO subscriptions (author_id, subscriber_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(author_id)
        .bind(subscriber_id)
        .bind(now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::from(e)
                .or_already_exists(format!("Already subscribed to user {}", author_id))
        })?;

        tracing::info!(subscriber_id = %subscriber_id, author_id = %author_id, "Subscribed");
        self.subscription_for(subscriber_id, author_id, recipes_limit)
            .await
    }

    /// Get-or-create variant of [`Repository::subscribe`]; returns `true` if created.
    pub async fn ensure_subscription(
        &self,
        subscriber_id: &str,
        author_id: &str,
    ) -> Result<bool, AppError> {
        self.check_subscription_target(subscriber_id, author_id)
            .await?;

        let result = sqlx::query(
            "INSERT OR IGNORE INTO subscriptions (author_id, subscriber_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(author_id)
        .bind(subscriber_id)
        .bind(now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stop following an author; `NotFound` if not following.
    pub async fn unsubscribe(&self, subscriber_id: &str, author_id: &str) -> Result<(), AppError> {
        let result =
            sqlx::query("DELETE FROM subscriptions WHERE author_id = ? AND subscriber_id = ?")
                .bind(author_id)
                .bind(subscriber_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Not subscribed to user {}",
                author_id
            )));
        }

        tracing::info!(subscriber_id = %subscriber_id, author_id = %author_id, "Unsubscribed");
        Ok(())
    }

    /// Whether `subscriber_id` follows `author_id`.
    pub async fn is_subscribed(&self, subscriber_id: &str, author_id: &str) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM subscriptions WHERE author_id = ? AND subscriber_id = ?",
        )
        .bind(author_id)
        .bind(subscriber_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    /// Authors followed by a user, each with a preview of their latest recipes.
    pub async fn list_subscriptions(
        &self,
        subscriber_id: &str,
        recipes_limit: usize,
    ) -> Result<Vec<Subscription>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users WHERE id IN (SELECT author_id FROM subscriptions WHERE subscriber_id = ?) ORDER BY username",
            USER_COLUMNS
        ))
        .bind(subscriber_id)
        .fetch_all(&self.pool)
        .await?;

        let mut subscriptions = Vec::with_capacity(rows.len());
        for row in &rows {
            let author = user_from_row(row);
            subscriptions.push(self.feed_entry(author, true, recipes_limit).await?);
        }
        Ok(subscriptions)
    }

    async fn check_subscription_target(
        &self,
        subscriber_id: &str,
        author_id: &str,
    ) -> Result<(), AppError> {
        if subscriber_id == author_id {
            return Err(AppError::InvalidOperation(
                "Cannot subscribe to yourself".to_string(),
            ));
        }
        let mut conn = self.pool.acquire().await?;
        if !exists(&mut conn, "users", author_id).await? {
            return Err(AppError::NotFound(format!("User {} not found", author_id)));
        }
        Ok(())
    }

    async fn subscription_for(
        &self,
        subscriber_id: &str,
        author_id: &str,
        recipes_limit: usize,
    ) -> Result<Subscription, AppError> {
        let author = self
            .get_user(author_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", author_id)))?;
        let is_subscribed = self.is_subscribed(subscriber_id, author_id).await?;
        self.feed_entry(author, is_subscribed, recipes_limit).await
    }

    async fn feed_entry(
        &self,
        author: User,
        is_subscribed: bool,
        recipes_limit: usize,
    ) -> Result<Subscription, AppError> {
        let recipes_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE author_id = ?")
                .bind(&author.id)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query(
            "SELECT id, name, image, cooking_time FROM recipes WHERE author_id = ? ORDER BY creation_date DESC, rowid DESC LIMIT ?",
        )
        .bind(&author.id)
        .bind(i64::try_from(recipes_limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(Subscription {
            author: UserProfile {
                user: author,
                is_subscribed,
            },
            recipes: rows.iter().map(summary_from_row).collect(),
            recipes_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::{CreateUserRequest, RecipeRequest};
    use tempfile::TempDir;

    async fn setup() -> (TempDir, Repository, String, String, String) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("relations.sqlite"))
            .await
            .unwrap();
        let repo = Repository::new(pool);

        let mut ids = Vec::new();
        for username in ["ann", "ben"] {
            let user = repo
                .create_user(&CreateUserRequest {
                    email: format!("{}@example.com", username),
                    username: username.to_string(),
                    first_name: "First".to_string(),
                    last_name: "Last".to_string(),
                    password: "password123".to_string(),
                })
                .await
                .unwrap();
            ids.push(user.id);
        }

        let recipe = repo
            .create_recipe(
                &ids[0],
                &RecipeRequest {
                    name: "Stew".to_string(),
                    text: "Simmer".to_string(),
                    cooking_time: 90,
                    image: None,
                    slug: None,
                    tags: vec![],
                    ingredients: vec![],
                },
            )
            .await
            .unwrap();

        let ben = ids.pop().unwrap();
        let ann = ids.pop().unwrap();
        (temp_dir, repo, ann, ben, recipe.id)
    }

    #[tokio::test]
    async fn test_ensure_relation_is_idempotent() {
        let (_dir, repo, _, ben, recipe) = setup().await;

        assert!(repo
            .ensure_recipe_relation(RelationKind::Favorite, &ben, &recipe)
            .await
            .unwrap());
        assert!(!repo
            .ensure_recipe_relation(RelationKind::Favorite, &ben, &recipe)
            .await
            .unwrap());
        assert_eq!(
            repo.list_related_recipes(RelationKind::Favorite, &ben)
                .await
                .unwrap()
                .len(),
            1
        );

        let err = repo
            .add_recipe_relation(RelationKind::Favorite, &ben, &recipe)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));

        assert_eq!(
            repo.discard_recipe_relation(RelationKind::Favorite, &ben, &recipe)
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            repo.discard_recipe_relation(RelationKind::Favorite, &ben, &recipe)
                .await
                .unwrap(),
            0
        );
        assert!(!repo
            .has_recipe_relation(RelationKind::Favorite, &ben, &recipe)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_relation_kinds_are_independent() {
        let (_dir, repo, _, ben, recipe) = setup().await;

        repo.add_recipe_relation(RelationKind::ShoppingCart, &ben, &recipe)
            .await
            .unwrap();

        assert!(repo
            .has_recipe_relation(RelationKind::ShoppingCart, &ben, &recipe)
            .await
            .unwrap());
        assert!(!repo
            .has_recipe_relation(RelationKind::Favorite, &ben, &recipe)
            .await
            .unwrap());
        assert!(matches!(
            repo.remove_recipe_relation(RelationKind::Favorite, &ben, &recipe)
                .await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_ensure_subscription() {
        let (_dir, repo, ann, ben, _) = setup().await;

        assert!(repo.ensure_subscription(&ben, &ann).await.unwrap());
        assert!(!repo.ensure_subscription(&ben, &ann).await.unwrap());
        assert!(repo.is_subscribed(&ben, &ann).await.unwrap());
        assert!(!repo.is_subscribed(&ann, &ben).await.unwrap());

        assert!(matches!(
            repo.ensure_subscription(&ann, &ann).await,
            Err(AppError::InvalidOperation(_))
        ));
        assert!(!repo.is_subscribed(&ann, &ann).await.unwrap());

        let feed = repo.list_subscriptions(&ben, 3).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].recipes_count, 1);
        assert_eq!(feed[0].recipes[0].name, "Stew");
    }

    #[tokio::test]
    async fn test_feed_limit_bounds() {
        let (_dir, repo, ann, ben, _) = setup().await;
        repo.subscribe(&ben, &ann, 3).await.unwrap();

        let feed = repo.list_subscriptions(&ben, usize::MAX).await.unwrap();
        assert_eq!(feed[0].recipes.len(), 1);

        let feed = repo.list_subscriptions(&ben, 0).await.unwrap();
        assert!(feed[0].recipes.is_empty());
        assert_eq!(feed[0].recipes_count, 1);
    }
}
