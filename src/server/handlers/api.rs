//! Status and lifecycle API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::super::AppState;
use crate::config::resolve_tool;
use crate::services;
use crate::storage::is_valid_token;

/// Report external tool availability and the active storage layout.
pub async fn api_status(State(state): State<AppState>) -> impl IntoResponse {
    let soffice = resolve_tool(&state.settings.soffice_path);
    let pdftoppm = resolve_tool(&state.settings.pdftoppm_path);

    Json(serde_json::json!({
        "tools": {
            "soffice": {
                "configured": state.settings.soffice_path,
                "resolved": soffice.as_ref().map(|p| p.display().to_string()),
                "available": soffice.is_some(),
            },
            "pdftoppm": {
                "configured": state.settings.pdftoppm_path,
                "resolved": pdftoppm.as_ref().map(|p| p.display().to_string()),
                "available": pdftoppm.is_some(),
            },
        },
        "data_dir": state.settings.data_dir.display().to_string(),
        "retention_ttl_days": state.settings.retention_ttl_days,
    }))
}

/// Delete every artifact of one deck: upload, slide images, commentary.
/// Idempotent; deleting an unknown deck reports zero removals.
pub async fn delete_deck(State(state): State<AppState>, Path(deck_id): Path<String>) -> Response {
    if !is_valid_token(&deck_id) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Invalid deck id" })),
        )
            .into_response();
    }

    match services::delete_deck(&state.settings, &deck_id) {
        Ok(report) => Json(serde_json::json!({
            "deleted": true,
            "removed": report,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(deck_id = %deck_id, error = %e, "Failed to delete deck");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Failed to delete deck" })),
            )
                .into_response()
        }
    }
}
