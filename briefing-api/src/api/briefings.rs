//! Stored briefing endpoints: save, list, view, export, delete
//!
//! All routes are scoped by the `user_id` they carry. A briefing owned by
//! another user answers 403; an unknown id answers 404.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use briefing_common::db::{self, PersistenceError, StoredBriefing};
use briefing_common::render::render_text;
use briefing_common::uuid_utils::is_valid_id;
use briefing_common::BriefingRecord;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, PAGE_SIZE};
use crate::AppState;

/// Body of `POST /briefings`
#[derive(Debug, Deserialize)]
pub struct SaveBriefingRequest {
    pub user_id: String,
    /// A previously generated briefing
    pub briefing: Value,
    /// Conversation the briefing came from; defaults to `briefing.texto_original`
    #[serde(default)]
    pub input_text: String,
}

/// Query parameters for listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

/// One page of a user's briefings
#[derive(Debug, Serialize)]
pub struct BriefingListResponse {
    pub briefings: Vec<StoredBriefing>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_more: bool,
}

fn require_user_id(user_id: &str) -> ApiResult<()> {
    if user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("user_id must not be empty".to_string()));
    }
    Ok(())
}

/// Ids are UUIDs; anything else cannot exist
fn require_briefing_id(id: &str) -> ApiResult<()> {
    if !is_valid_id(id) {
        return Err(PersistenceError::NotFound(id.to_string()).into());
    }
    Ok(())
}

/// POST /briefings
///
/// Persists a generated briefing. The briefing must satisfy the full schema.
pub async fn save_briefing(
    State(state): State<AppState>,
    payload: Result<Json<SaveBriefingRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    require_user_id(&request.user_id)?;

    let record = BriefingRecord::from_value(request.briefing)
        .map_err(|e| ApiError::BadRequest(format!("invalid briefing: {}", e)))?;

    let has_text = !request.input_text.trim().is_empty()
        || record
            .texto_original
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty());
    if !has_text {
        return Err(ApiError::BadRequest(
            "input_text is required when the briefing has no texto_original".to_string(),
        ));
    }

    let stored = db::insert_briefing(&state.db, &request.user_id, &request.input_text, &record).await?;

    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /briefings/:user_id?page=N
///
/// Newest first, [`PAGE_SIZE`] per page.
pub async fn list_briefings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<BriefingListResponse>> {
    let Query(query) = query?;
    require_user_id(&user_id)?;

    let total = db::count_briefings(&state.db, &user_id).await?;
    let pagination = calculate_pagination(total, query.page);

    let briefings = db::list_briefings(&state.db, &user_id, PAGE_SIZE, pagination.offset).await?;

    debug!(
        user_id = %user_id,
        page = pagination.page,
        total,
        "Listing briefings"
    );

    Ok(Json(BriefingListResponse {
        briefings,
        page: pagination.page,
        page_size: PAGE_SIZE,
        total,
        total_pages: pagination.total_pages,
        has_more: pagination.has_more,
    }))
}

/// GET /briefings/:user_id/:id
pub async fn get_briefing(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, String)>,
) -> ApiResult<Json<StoredBriefing>> {
    require_briefing_id(&id)?;
    let stored = db::get_briefing(&state.db, &user_id, &id).await?;
    Ok(Json(stored))
}

/// GET /briefings/:user_id/:id/export
///
/// Plain-text rendering offered as a `briefing.txt` download.
pub async fn export_briefing(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    require_briefing_id(&id)?;
    let stored = db::get_briefing(&state.db, &user_id, &id).await?;
    let text = render_text(&stored.title, &stored.created_at, &stored.content);

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"briefing.txt\""),
        ],
        text,
    ))
}

/// DELETE /briefings/:user_id/:id
pub async fn delete_briefing(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    require_briefing_id(&id)?;
    db::delete_briefing(&state.db, &user_id, &id).await?;
    Ok(Json(json!({ "success": true })))
}
