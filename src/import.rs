//! Ingredient bulk loader.
//!
//! Reads a headerless `name,unit` file. The last comma on a line separates
//! the unit, so names may themselves contain commas.

use std::path::Path;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{ImportSummary, NewIngredient};

/// Parse one line; `None` for blank lines, lines without a comma and lines with an empty name.
pub fn parse_ingredient_line(line: &str) -> Option<NewIngredient> {
    let (name, unit) = line.trim().rsplit_once(',')?;
    let name = clean_field(name);
    if name.is_empty() {
        return None;
    }

    Some(NewIngredient {
        name: name.to_string(),
        unit: clean_field(unit).to_string(),
    })
}

fn clean_field(field: &str) -> &str {
    field.trim().trim_matches('"').trim()
}

/// Load every ingredient from `path`, creating the ones that are missing.
pub async fn load_ingredients_file(
    repo: &Repository,
    path: &Path,
) -> Result<ImportSummary, AppError> {
    tracing::info!("Reading ingredients from {:?}", path);
    let contents = tokio::fs::read_to_string(path).await?;

    let mut entries = Vec::new();
    let mut skipped = 0;
    for (index, line) in contents.lines().enumerate() {
        match parse_ingredient_line(line) {
            Some(entry) => entries.push(entry),
            None => {
                tracing::warn!(line = index + 1, "Skipping malformed ingredient line");
                skipped += 1;
            }
        }
    }

    let mut summary = repo.import_ingredients(&entries).await?;
    summary.skipped += skipped;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    #[test]
    fn test_parse_plain_line() {
        let entry = parse_ingredient_line("абрикосовое варенье,г").unwrap();
        assert_eq!(entry.name, "абрикосовое варенье");
        assert_eq!(entry.unit, "г");
    }

    #[test]
    fn test_parse_quoted_name_with_comma() {
        let entry = parse_ingredient_line("\"salt, sea\", g ").unwrap();
        assert_eq!(entry.name, "salt, sea");
        assert_eq!(entry.unit, "g");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_ingredient_line("").is_none());
        assert!(parse_ingredient_line("   ").is_none());
        assert!(parse_ingredient_line("no unit here").is_none());
        assert!(parse_ingredient_line(" ,g").is_none());
    }

    #[tokio::test]
    async fn test_load_file_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("import.sqlite"))
            .await
            .unwrap();
        let repo = Repository::new(pool);

        let path = temp_dir.path().join("ingredients.csv");
        std::fs::write(&path, "flour,g\nmilk,ml\n\nbroken line\nflour,g\nflour,kg\n").unwrap();

        let first = load_ingredients_file(&repo, &path).await.unwrap();
        assert_eq!(
            first,
            ImportSummary {
                created: 3,
                existing: 1,
                skipped: 2,
            }
        );

        let second = load_ingredients_file(&repo, &path).await.unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.existing, 4);

        assert_eq!(repo.list_ingredients(Some("FLO")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("import.sqlite"))
            .await
            .unwrap();
        let repo = Repository::new(pool);

        let result = load_ingredients_file(&repo, &temp_dir.path().join("missing.csv")).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
