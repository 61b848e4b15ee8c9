//! Briefing persistence
//!
//! Every briefing belongs to exactly one user. Reads and deletes distinguish
//! "no such briefing" from "someone else's briefing" so callers can answer
//! 404 and 403 respectively.

use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::{debug, info};

use crate::briefing::BriefingRecord;
use crate::normalize::{normalize_str, NormalizedContent};
use crate::{time, uuid_utils};

/// Persistence failure
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to save briefing: {0}")]
    WriteFailed(String),

    #[error("Briefing not found: {0}")]
    NotFound(String),

    #[error("Briefing {0} belongs to another user")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl PersistenceError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            PersistenceError::WriteFailed(_) => "write-failed",
            PersistenceError::NotFound(_) => "not-found",
            PersistenceError::Forbidden(_) => "forbidden",
            PersistenceError::Database(_) => "database",
        }
    }
}

/// A persisted briefing with its content normalized for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredBriefing {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: NormalizedContent,
    pub created_at: String,
}

fn from_row(row: &SqliteRow) -> StoredBriefing {
    let content: String = row.get("content");
    StoredBriefing {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        content: normalize_str(&content),
        created_at: row.get("created_at"),
    }
}

/// Persist a generated briefing in the canonical content encoding
///
/// When `input_text` is empty the record's `texto_original` is used instead.
/// `texto_original` itself is not duplicated into the stored result.
pub async fn insert_briefing(
    pool: &SqlitePool,
    user_id: &str,
    input_text: &str,
    record: &BriefingRecord,
) -> Result<StoredBriefing, PersistenceError> {
    let input_text = if input_text.trim().is_empty() {
        record.texto_original.clone().unwrap_or_default()
    } else {
        input_text.to_string()
    };

    let mut result = record.clone();
    result.texto_original = None;

    let stored = StoredBriefing {
        id: uuid_utils::generate(),
        user_id: user_id.to_string(),
        title: result.derive_title(&input_text),
        content: NormalizedContent::from_record(input_text, &result),
        created_at: time::now_rfc3339(),
    };

    let outcome = sqlx::query(
        r#"
        INSERT INTO briefings (id, user_id, title, content, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&stored.id)
    .bind(&stored.user_id)
    .bind(&stored.title)
    .bind(stored.content.to_value().to_string())
    .bind(&stored.created_at)
    .execute(pool)
    .await
    .map_err(|e| PersistenceError::WriteFailed(e.to_string()))?;

    if outcome.rows_affected() != 1 {
        return Err(PersistenceError::WriteFailed(format!(
            "expected 1 row inserted, got {}",
            outcome.rows_affected()
        )));
    }

    info!(user_id = %stored.user_id, briefing_id = %stored.id, "Briefing saved");

    Ok(stored)
}

/// List a user's briefings, newest first
pub async fn list_briefings(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<StoredBriefing>, PersistenceError> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, title, content, created_at
        FROM briefings
        WHERE user_id = ?
        ORDER BY created_at DESC, rowid DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    debug!(user_id = %user_id, count = rows.len(), "Listed briefings");

    Ok(rows.iter().map(from_row).collect())
}

/// Count a user's briefings
pub async fn count_briefings(pool: &SqlitePool, user_id: &str) -> Result<i64, PersistenceError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM briefings WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(total)
}

/// Load one briefing owned by `user_id`
pub async fn get_briefing(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<StoredBriefing, PersistenceError> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, title, content, created_at
        FROM briefings
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let stored = row
        .as_ref()
        .map(from_row)
        .ok_or_else(|| PersistenceError::NotFound(id.to_string()))?;

    if stored.user_id != user_id {
        return Err(PersistenceError::Forbidden(id.to_string()));
    }

    Ok(stored)
}

/// Delete one briefing owned by `user_id`
pub async fn delete_briefing(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<(), PersistenceError> {
    // Ownership check first so another user's id answers Forbidden
    get_briefing(pool, user_id, id).await?;

    let outcome = sqlx::query("DELETE FROM briefings WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(|e| PersistenceError::WriteFailed(e.to_string()))?;

    if outcome.rows_affected() == 0 {
        return Err(PersistenceError::NotFound(id.to_string()));
    }

    info!(user_id = %user_id, briefing_id = %id, "Briefing deleted");

    Ok(())
}
