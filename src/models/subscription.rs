//! Subscription feed model.

use serde::{Deserialize, Serialize};

use super::{RecipeSummary, UserProfile};

/// Default number of recipes shown per followed author.
pub const DEFAULT_RECIPES_LIMIT: usize = 3;

/// A followed author together with a preview of their recipes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub author: UserProfile,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: i64,
}

/// Query parameters for the subscription feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionQuery {
    #[serde(default = "default_recipes_limit")]
    pub recipes_limit: usize,
}

fn default_recipes_limit() -> usize {
    DEFAULT_RECIPES_LIMIT
}
