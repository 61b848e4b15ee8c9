//! Database schema migrations
//!
//! Versioned, idempotent migrations tracked in the `schema_version` table.
//! Never modify an existing migration; add a new one and bump
//! [`CURRENT_SCHEMA_VERSION`].

use crate::briefing::BriefingRecord;
use crate::normalize::{is_canonical, normalize_str, NormalizedContent};
use crate::Result;
use serde_json::Value;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

/// Current schema version
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Get current schema version from database (0 when none recorded)
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("Migration v2 completed");
    }

    Ok(())
}

/// Migration v1: index for per-user newest-first listing
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_briefings_user_created ON briefings(user_id, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Migration v2: rewrite legacy content payloads in the canonical encoding
///
/// Besides the wrapped encodings the normalizer understands, rows may hold the
/// bare briefing object with no `briefing_result` wrapper. Those are wrapped,
/// taking `input_text` from `texto_original`. Rows whose payload does not
/// decode to anything are left untouched; the read path still degrades them
/// to empty content.
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    let rows = sqlx::query("SELECT id, content FROM briefings")
        .fetch_all(pool)
        .await?;

    let mut rewritten = 0usize;
    let mut skipped = 0usize;

    for row in rows {
        let id: String = row.get("id");
        let content: String = row.get("content");

        if is_canonical(&content) {
            continue;
        }

        let normalized = match bare_briefing(&content) {
            Some(record) => {
                let input_text = record.texto_original.clone().unwrap_or_default();
                let result = BriefingRecord {
                    texto_original: None,
                    ..record
                };
                NormalizedContent::from_record(input_text, &result)
            }
            None => normalize_str(&content),
        };
        if normalized.is_empty() {
            skipped += 1;
            continue;
        }

        sqlx::query("UPDATE briefings SET content = ? WHERE id = ?")
            .bind(normalized.to_value().to_string())
            .bind(&id)
            .execute(pool)
            .await?;
        rewritten += 1;
    }

    if skipped > 0 {
        warn!("Migration v2: {} undecodable briefing payloads left as-is", skipped);
    }
    info!("Migration v2: rewrote {} legacy briefing payloads", rewritten);

    Ok(())
}

/// A stored payload that is the briefing object itself, unwrapped
///
/// Accepts the object directly or as a JSON string literal holding it.
fn bare_briefing(stored: &str) -> Option<BriefingRecord> {
    let value = match serde_json::from_str::<Value>(stored).ok()? {
        Value::String(inner) => serde_json::from_str::<Value>(&inner).ok()?,
        other => other,
    };

    let unwrapped = matches!(&value, Value::Object(map) if !map.contains_key("briefing_result"));
    if !unwrapped {
        return None;
    }

    BriefingRecord::from_value(value).ok()
}
