//! Tags and ingredients.

use super::repository::{ingredient_from_row, new_id, tag_from_row, Repository};
use crate::errors::AppError;
use crate::models::{CreateTagRequest, ImportSummary, Ingredient, NewIngredient, Tag};
use crate::slug::is_valid_slug;

impl Repository {
    // ==================== TAG OPERATIONS ====================

    /// List all tags.
    pub async fn list_tags(&self) -> Result<Vec<Tag>, AppError> {
        let rows = sqlx::query("SELECT id, name, slug, color FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(tag_from_row).collect())
    }

    /// Get a tag by ID.
    pub async fn get_tag(&self, id: &str) -> Result<Option<Tag>, AppError> {
        let row = sqlx::query("SELECT id, name, slug, color FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(tag_from_row))
    }

    /// Create a new tag.
    pub async fn create_tag(&self, request: &CreateTagRequest) -> Result<Tag, AppError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidOperation(
                "Tag name is required".to_string(),
            ));
        }
        if !is_valid_slug(&request.slug) {
            return Err(AppError::InvalidOperation(format!(
                "Tag slug '{}' may only contain lowercase letters, digits, '-' and '_'",
                request.slug
            )));
        }
        if !is_hex_color(&request.color) {
            return Err(AppError::InvalidOperation(format!(
                "Tag color '{}' must be in #RRGGBB form",
                request.color
            )));
        }

        let id = new_id();
        let color = request.color.to_uppercase();

        sqlx::query("INSERT INTO tags (id, name, slug, color) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(name)
            .bind(&request.slug)
            .bind(&color)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::from(e).or_already_exists("A tag with this name or slug already exists")
            })?;

        tracing::info!(tag_id = %id, slug = %request.slug, "Tag created");

        Ok(Tag {
            id,
            name: name.to_string(),
            slug: request.slug.clone(),
            color,
        })
    }

    /// Delete a tag. Recipes lose the tag, nothing else.
    pub async fn delete_tag(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Tag {} not found", id)));
        }

        tracing::info!(tag_id = %id, "Tag deleted");
        Ok(())
    }

    // ==================== INGREDIENT OPERATIONS ====================

    /// List ingredients, optionally filtered by a case-insensitive name fragment.
    ///
    /// With a filter, names starting with the fragment come before names that
    /// merely contain it.
    pub async fn list_ingredients(&self, name: Option<&str>) -> Result<Vec<Ingredient>, AppError> {
        let rows = sqlx::query("SELECT id, name, unit FROM ingredients ORDER BY name, unit")
            .fetch_all(&self.pool)
            .await?;
        let ingredients = rows.iter().map(ingredient_from_row);

        let needle = name.map(str::trim).unwrap_or_default().to_lowercase();
        if needle.is_empty() {
            return Ok(ingredients.collect());
        }

        let (mut prefixed, contained): (Vec<_>, Vec<_>) = ingredients
            .filter_map(|i| {
                let lowered = i.name.to_lowercase();
                lowered.contains(&needle).then(|| (lowered.starts_with(&needle), i))
            })
            .partition(|(prefix, _)| *prefix);
        prefixed.extend(contained);

        Ok(prefixed.into_iter().map(|(_, i)| i).collect())
    }

    /// Get an ingredient by ID.
    pub async fn get_ingredient(&self, id: &str) -> Result<Option<Ingredient>, AppError> {
        let row = sqlx::query("SELECT id, name, unit FROM ingredients WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(ingredient_from_row))
    }

    /// Get or create an ingredient keyed on (name, unit).
    ///
    /// Returns the row and whether it was created by this call.
    pub async fn get_or_create_ingredient(
        &self,
        name: &str,
        unit: &str,
    ) -> Result<(Ingredient, bool), AppError> {
        let result =
            sqlx::query("INSERT OR IGNORE INTO ingredients (id, name, unit) VALUES (?, ?, ?)")
                .bind(new_id())
                .bind(name)
                .bind(unit)
                .execute(&self.pool)
                .await?;

        let row = sqlx::query("SELECT id, name, unit FROM ingredients WHERE name = ? AND unit = ?")
            .bind(name)
            .bind(unit)
            .fetch_one(&self.pool)
            .await?;

        Ok((ingredient_from_row(&row), result.rows_affected() > 0))
    }

    /// Bulk get-or-create. Entries with an empty name or unit are skipped.
    pub async fn import_ingredients(
        &self,
        entries: &[NewIngredient],
    ) -> Result<ImportSummary, AppError> {
        let mut summary = ImportSummary::default();
        let mut tx = self.begin_write().await?;

        for entry in entries {
            let name = entry.name.trim();
            let unit = entry.unit.trim();
            if name.is_empty() || unit.is_empty() {
                tracing::warn!(name = %entry.name, unit = %entry.unit, "Skipping malformed ingredient");
                summary.skipped += 1;
                continue;
            }

            let result =
                sqlx::query("INSERT OR IGNORE INTO ingredients (id, name, unit) VALUES (?, ?, ?)")
                    .bind(new_id())
                    .bind(name)
                    .bind(unit)
                    .execute(&mut *tx)
                    .await?;

            if result.rows_affected() > 0 {
                summary.created += 1;
            } else {
                summary.existing += 1;
            }
        }

        tx.commit().await?;

        tracing::info!(
            created = summary.created,
            existing = summary.existing,
            skipped = summary.skipped,
            "Ingredients imported"
        );
        Ok(summary)
    }
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#FFFFFF"));
        assert!(is_hex_color("#a1b2c3"));
        assert!(!is_hex_color("FFFFFF"));
        assert!(!is_hex_color("#FFF"));
        assert!(!is_hex_color("#GGGGGG"));
    }
}
