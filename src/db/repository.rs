//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity. Operations
//! are split by concern across the sibling modules; every one of them takes
//! the acting user explicitly.

use chrono::{SecondsFormat, Utc};
use sqlx::{sqlite::SqliteRow, Row, Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::errors::AppError;
use crate::models::{Ingredient, RecipeSummary, Tag, User};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pub(super) pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a transaction that holds the write lock from its first statement.
    ///
    /// Required for any transaction that reads before it writes.
    pub(super) async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, AppError> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }
}

/// Current time as a fixed-width RFC 3339 string, so text ordering matches time ordering.
pub(super) fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(super) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Check that a row with the given id exists in `table`.
pub(super) async fn exists(
    conn: &mut SqliteConnection,
    table: &'static str,
    id: &str,
) -> Result<bool, AppError> {
    let found: Option<i64> = sqlx::query_scalar(&format!("SELECT 1 FROM {} WHERE id = ?", table))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(found.is_some())
}

// Helper functions for row conversion

pub(super) const USER_COLUMNS: &str =
    "id, email, username, first_name, last_name, avatar, date_joined";

pub(super) fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        username: row.get("username"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        avatar: row.get("avatar"),
        date_joined: row.get("date_joined"),
    }
}

/// Author columns selected with an `author_` prefix alongside recipe columns.
pub(super) fn author_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("author_id"),
        email: row.get("author_email"),
        username: row.get("author_username"),
        first_name: row.get("author_first_name"),
        last_name: row.get("author_last_name"),
        avatar: row.get("author_avatar"),
        date_joined: row.get("author_date_joined"),
    }
}

pub(super) fn tag_from_row(row: &SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        color: row.get("color"),
    }
}

pub(super) fn ingredient_from_row(row: &SqliteRow) -> Ingredient {
    Ingredient {
        id: row.get("id"),
        name: row.get("name"),
        unit: row.get("unit"),
    }
}

pub(super) fn summary_from_row(row: &SqliteRow) -> RecipeSummary {
    RecipeSummary {
        id: row.get("id"),
        name: row.get("name"),
        image: row.get("image"),
        cooking_time: row.get("cooking_time"),
    }
}
