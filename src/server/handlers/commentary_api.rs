//! Commentary API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::super::AppState;
use crate::commentary::CommentaryError;

/// Save commentary request. All fields are required; they are optional here
/// so a missing field yields a 400 with a message instead of a bare reject.
#[derive(Debug, Deserialize)]
pub struct SaveCommentaryRequest {
    pub slide_number: Option<u32>,
    pub commentary: Option<String>,
    pub unique_id: Option<String>,
}

/// Set the commentary for one slide of one deck.
pub async fn save_commentary(
    State(state): State<AppState>,
    Json(body): Json<SaveCommentaryRequest>,
) -> Response {
    let (slide, commentary, deck_id) = match (
        body.slide_number,
        body.commentary.as_deref(),
        body.unique_id.as_deref(),
    ) {
        (Some(slide), Some(commentary), Some(deck_id))
            if slide >= 1 && !commentary.is_empty() && !deck_id.is_empty() =>
        {
            (slide, commentary, deck_id)
        }
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "Slide number, commentary or unique_id is missing"
                })),
            )
                .into_response();
        }
    };

    match state.commentary.save(deck_id, slide, commentary).await {
        Ok(()) => Json(serde_json::json!({ "message": "Commentary saved successfully" }))
            .into_response(),
        Err(CommentaryError::InvalidDeckId(_)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Invalid unique_id" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(deck_id, slide, error = %e, "Failed to save commentary");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Failed to save commentary" })),
            )
                .into_response()
        }
    }
}

/// Fetch the commentary for one slide. An unannotated slide is a normal
/// `{"commentary": null}` response, not an error.
pub async fn get_commentary(
    State(state): State<AppState>,
    Path((deck_id, slide_number)): Path<(String, u32)>,
) -> Response {
    match state.commentary.get(&deck_id, slide_number).await {
        Ok(text) => Json(serde_json::json!({ "commentary": text })).into_response(),
        Err(CommentaryError::InvalidDeckId(_)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Invalid deck id" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(deck_id = %deck_id, slide_number, error = %e, "Failed to read commentary");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Failed to read commentary file" })),
            )
                .into_response()
        }
    }
}
