//! briefing-api library - HTTP service for the briefing generator
//!
//! Generates structured briefings from client conversations and stores them
//! per user.

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use briefing_common::Extractor;
use sqlx::SqlitePool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod api;
pub mod error;
pub mod pagination;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Briefing extractor (owns the completion client)
    pub extractor: Extractor,
}

impl AppState {
    pub fn new(db: SqlitePool, extractor: Extractor) -> Self {
        Self { db, extractor }
    }
}

/// Build application router
///
/// `cors_origins` lists the browser origins allowed to call the API.
/// Entries that are not valid header values are skipped with a warning.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    use axum::routing::{get, post};

    let briefings = Router::new()
        .route("/generate-briefing", post(api::generate_briefing))
        .route("/briefings", post(api::save_briefing))
        .route("/briefings/:user_id", get(api::list_briefings))
        .route(
            "/briefings/:user_id/:id",
            get(api::get_briefing).delete(api::delete_briefing),
        )
        .route("/briefings/:user_id/:id/export", get(api::export_briefing));

    Router::new()
        .merge(briefings)
        .merge(api::health_routes())
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}
