//! Deck upload handler.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::super::AppState;
use crate::services::DeckError;
use crate::storage::IntakeError;

/// Accept a deck upload (multipart field `file`), convert it, and return the
/// ordered slide image paths.
///
/// Validation problems get specific 400 messages; every external-tool
/// failure collapses into one generic 500 so callers cannot distinguish a
/// missing converter from a crashed one.
pub async fn upload_deck(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut file: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({ "error": format!("Invalid multipart body: {}", e) })),
                )
                    .into_response();
            }
        };

        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = match field.bytes().await {
                Ok(bytes) => bytes,
                Err(e) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(serde_json::json!({ "error": format!("Failed to read upload: {}", e) })),
                    )
                        .into_response();
                }
            };
            file = Some((filename, bytes.to_vec()));
        }
    }

    let Some((filename, bytes)) = file else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "No file part" })),
        )
            .into_response();
    };
    if filename.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "No selected file" })),
        )
            .into_response();
    }

    match state.decks.process(&filename, &bytes).await {
        Ok(processed) => Json(serde_json::json!({
            "deck_id": processed.deck_id,
            "slides": processed.slides.iter().map(|s| s.rel_path.as_str()).collect::<Vec<_>>(),
            "count": processed.slides.len(),
        }))
        .into_response(),
        Err(DeckError::Rejected(IntakeError::UnsupportedType(_))) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "File type not allowed. Please upload a .pptx or .pdf file"
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(filename = %filename, error = %e, "Failed to process uploaded deck");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Failed to process file" })),
            )
                .into_response()
        }
    }
}
