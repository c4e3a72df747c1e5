//! Tag reference data.

use serde::{Deserialize, Serialize};

/// A reusable tag for categorizing recipes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub slug: String,
    /// Hex color in `#RRGGBB` form
    pub color: String,
}

/// Request body for creating a new tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagRequest {
    pub name: String,
    pub slug: String,
    #[serde(default = "default_color")]
    pub color: String,
}

pub fn default_color() -> String {
    "#FFFFFF".to_string()
}
