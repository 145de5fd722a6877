//! Router configuration for the web server.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Uploaded decks can be large; the axum default of 2 MB is far too small.
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Upload and slide serving
        .route("/upload", post(handlers::upload_deck))
        .route("/static/slides/*path", get(handlers::serve_slide))
        // Commentary
        .route("/save_commentary", post(handlers::save_commentary))
        .route(
            "/get_commentary/:deck_id/:slide_number",
            get(handlers::get_commentary),
        )
        // Audio recordings
        .route("/upload_audio", post(handlers::upload_audio))
        // Lifecycle and status API
        .route("/api/decks/:deck_id", delete(handlers::delete_deck))
        .route("/api/status", get(handlers::api_status))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
