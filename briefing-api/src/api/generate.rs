//! Briefing generation endpoint

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use briefing_common::briefing::BriefingRequest;
use briefing_common::BriefingRecord;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /generate-briefing
///
/// Extracts a briefing from the submitted conversation. The reply carries the
/// conversation back as `texto_original`. Nothing is persisted; clients save
/// through `POST /briefings`.
pub async fn generate_briefing(
    State(state): State<AppState>,
    payload: Result<Json<BriefingRequest>, JsonRejection>,
) -> ApiResult<Json<BriefingRecord>> {
    let Json(request) = payload?;

    if request.conversation.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "conversation must not be empty".to_string(),
        ));
    }
    if request.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("user_id must not be empty".to_string()));
    }

    info!(
        user_id = %request.user_id,
        conversation_len = request.conversation.len(),
        "Generating briefing"
    );

    let record = state.extractor.extract(&request.conversation).await?;

    Ok(Json(record.with_original_text(request.conversation)))
}
