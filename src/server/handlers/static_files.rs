//! Slide image serving.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use super::super::AppState;
use crate::storage::is_valid_token;

/// Serve a generated slide image addressed as `<deck_id>/slide_<n>.png`.
///
/// Only the two-segment layout the rasterizer produces is served: the first
/// segment must be a deck token, the second a `slide_<n>.png` name. Nothing
/// else under the slides root is reachable.
pub async fn serve_slide(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    let Some((deck_id, filename)) = split_slide_path(&path) else {
        return (StatusCode::NOT_FOUND, "File not found").into_response();
    };

    let file_path = state.settings.slides_dir().join(deck_id).join(filename);
    let content = match tokio::fs::read(&file_path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return (StatusCode::NOT_FOUND, "File not found").into_response();
        }
        Err(_) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read file").into_response();
        }
    };

    let mime = mime_guess::from_path(&file_path)
        .first_or_octet_stream()
        .to_string();

    ([(header::CONTENT_TYPE, mime)], content).into_response()
}

/// Split `<deck_id>/slide_<n>.png` into its segments, rejecting anything
/// that is not a deck token followed by a rasterizer output name.
fn split_slide_path(path: &str) -> Option<(&str, &str)> {
    let (deck_id, filename) = path.split_once('/')?;
    if !is_valid_token(deck_id) {
        return None;
    }
    let n = filename.strip_prefix("slide_")?.strip_suffix(".png")?;
    if n.is_empty() || !n.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((deck_id, filename))
}
