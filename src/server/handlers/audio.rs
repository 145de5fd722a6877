//! Audio recording upload handler.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::super::AppState;
use crate::storage::{store_audio, IntakeError};

/// Accept an audio recording (multipart field `audio`) and store it under
/// the audio directory, keeping the client's (sanitized) filename.
///
/// The filename is the only linkage to a deck or slide; a same-named upload
/// overwrites the previous recording.
pub async fn upload_audio(State(state): State<AppState>, mut multipart: Multipart) -> Response {
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

        if field.name() == Some("audio") {
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
            Json(serde_json::json!({ "error": "No audio file" })),
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

    match store_audio(&state.settings.audio_dir(), &filename, &bytes) {
        Ok(stored) => Json(serde_json::json!({
            "message": "Audio saved successfully",
            "filename": stored,
        }))
        .into_response(),
        Err(IntakeError::EmptyFilename) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Invalid filename" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(filename = %filename, error = %e, "Failed to store audio recording");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Server error" })),
            )
                .into_response()
        }
    }
}
