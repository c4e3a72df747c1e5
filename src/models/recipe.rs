//! Recipe model, its join rows and the create/update request.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Tag, UserProfile};
use crate::errors::AppError;

pub const MAX_RECIPE_NAME_LENGTH: usize = 256;
pub const MIN_COOKING_TIME: i64 = 1;
pub const MAX_COOKING_TIME: i64 = 1440;
pub const MIN_AMOUNT: i64 = 1;
pub const MAX_AMOUNT: i64 = 10_000;

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    /// Ingredient id
    pub id: String,
    pub name: String,
    pub unit: String,
    pub amount: i64,
}

/// A recipe as seen by a particular viewer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
    pub image: Option<String>,
    pub slug: String,
    pub creation_date: String,
    pub author: UserProfile,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Short recipe form used in feeds and toggle responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i64,
}

/// Ingredient reference inside a create/update request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientAmount {
    pub id: String,
    pub amount: i64,
}

/// Request body for creating or updating a recipe.
///
/// Tags and ingredients are always full replacement sets.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRequest {
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
    #[serde(default)]
    pub image: Option<String>,
    /// Explicit slug; generated from the name when absent. Ignored on update.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<IngredientAmount>,
}

impl RecipeRequest {
    /// Check field bounds and reject duplicate ingredient ids.
    pub fn validate(&self) -> Result<(), AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidOperation(
                "Recipe name is required".to_string(),
            ));
        }
        if name.chars().count() > MAX_RECIPE_NAME_LENGTH {
            return Err(AppError::InvalidOperation(format!(
                "Recipe name must be at most {} characters",
                MAX_RECIPE_NAME_LENGTH
            )));
        }
        if self.text.trim().is_empty() {
            return Err(AppError::InvalidOperation(
                "Recipe text is required".to_string(),
            ));
        }
        if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&self.cooking_time) {
            return Err(AppError::InvalidOperation(format!(
                "Cooking time must be between {} and {} minutes",
                MIN_COOKING_TIME, MAX_COOKING_TIME
            )));
        }

        let mut seen = HashSet::new();
        for entry in &self.ingredients {
            if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&entry.amount) {
                return Err(AppError::InvalidOperation(format!(
                    "Amount for ingredient {} must be between {} and {}",
                    entry.id, MIN_AMOUNT, MAX_AMOUNT
                )));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(AppError::InvalidOperation(format!(
                    "Ingredient {} is listed more than once",
                    entry.id
                )));
            }
        }

        Ok(())
    }

    /// Tag ids with duplicates removed, first occurrence wins.
    pub fn unique_tags(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.tags
            .iter()
            .map(String::as_str)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// Recipe listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeFilter {
    /// Author user id
    #[serde(default)]
    pub author: Option<String>,
    /// Comma-separated tag slugs; a recipe matches if it carries any of them
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub is_favorited: Option<u8>,
    #[serde(default)]
    pub is_in_shopping_cart: Option<u8>,
}

impl RecipeFilter {
    pub fn tag_slugs(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Short link to a recipe.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLink {
    pub short_link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(cooking_time: i64, ingredients: Vec<(&str, i64)>) -> RecipeRequest {
        RecipeRequest {
            name: "Pancakes".to_string(),
            text: "Mix and fry".to_string(),
            cooking_time,
            image: None,
            slug: None,
            tags: vec![],
            ingredients: ingredients
                .into_iter()
                .map(|(id, amount)| IngredientAmount {
                    id: id.to_string(),
                    amount,
                })
                .collect(),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request(30, vec![("a", 1), ("b", 10_000)]).validate().is_ok());
        assert!(request(1440, vec![]).validate().is_ok());
    }

    #[test]
    fn test_cooking_time_bounds() {
        assert!(matches!(
            request(0, vec![]).validate(),
            Err(AppError::InvalidOperation(_))
        ));
        assert!(matches!(
            request(1441, vec![]).validate(),
            Err(AppError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_amount_bounds() {
        assert!(request(10, vec![("a", 0)]).validate().is_err());
        assert!(request(10, vec![("a", 10_001)]).validate().is_err());
    }

    #[test]
    fn test_duplicate_ingredient_rejected() {
        let err = request(10, vec![("a", 5), ("a", 7)]).validate().unwrap_err();
        assert!(matches!(err, AppError::InvalidOperation(m) if m.contains("more than once")));
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut req = request(10, vec![]);
        req.name = "   ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_unique_tags_keeps_first_occurrence() {
        let mut req = request(10, vec![]);
        req.tags = vec!["b".into(), "a".into(), "b".into()];
        assert_eq!(req.unique_tags(), vec!["b", "a"]);
    }

    #[test]
    fn test_filter_tag_slugs() {
        let filter = RecipeFilter {
            tags: Some("breakfast, ,lunch".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.tag_slugs(), vec!["breakfast", "lunch"]);
        assert!(RecipeFilter::default().tag_slugs().is_empty());
    }
}
