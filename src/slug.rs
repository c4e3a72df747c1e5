//! Recipe slug generation.
//!
//! Titles are transliterated to ASCII with `deunicode`, then reduced to
//! lowercase words joined by hyphens. A collision with an existing recipe slug is resolved by appending
//! `-1`, `-2`, ... until a free candidate is found.

use deunicode::deunicode;
use sqlx::SqliteConnection;

use crate::errors::AppError;

/// Slug used when a title contains nothing sluggable.
const FALLBACK_SLUG: &str = "recipe";

/// Reduce arbitrary text to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    let mut out = String::new();
    let mut prev_dash = true;
    for c in deunicode(text).chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            prev_dash = false;
        } else if (c.is_whitespace() || c == '-' || c == '_') && !prev_dash {
            out.push('-');
            prev_dash = true;
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Whether a client-supplied slug can be stored as-is.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// The n-th candidate for a base slug; `0` is the base itself.
pub fn candidate(base: &str, n: u64) -> String {
    if n == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, n)
    }
}

/// Find the first free slug for `title` on the given connection.
///
/// Must run on the same transaction as the insert that claims it.
pub async fn unique_recipe_slug(
    conn: &mut SqliteConnection,
    title: &str,
) -> Result<String, AppError> {
    let base = slugify(title);
    let mut n = 0;
    loop {
        let slug = candidate(&base, n);
        let taken: Option<i64> = sqlx::query_scalar("SELECT 1 FROM recipes WHERE slug = ?")
            .bind(&slug)
            .fetch_optional(&mut *conn)
            .await?;
        if taken.is_none() {
            return Ok(slug);
        }
        n += 1;
    }
}
