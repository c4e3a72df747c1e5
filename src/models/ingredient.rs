//! Ingredient reference data.

use serde::{Deserialize, Serialize};

/// An ingredient with its unit of measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub unit: String,
}

/// A single (name, unit) pair submitted for import.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIngredient {
    pub name: String,
    pub unit: String,
}

/// Request body for the admin bulk import.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportIngredientsRequest {
    pub ingredients: Vec<NewIngredient>,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Rows that did not exist before the import
    pub created: usize,
    /// Rows that were already present
    pub existing: usize,
    /// Input entries rejected as malformed
    pub skipped: usize,
}
