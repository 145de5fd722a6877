//! Web server for deck upload, slide serving, and commentary.
//!
//! Exposes the upload pipeline and the commentary store over HTTP:
//! - `POST /upload` — deck intake, conversion, rasterization
//! - `GET /static/slides/*path` — rendered slide images
//! - `POST /save_commentary`, `GET /get_commentary/:deck_id/:n`
//! - `POST /upload_audio` — per-slide audio recordings
//! - `DELETE /api/decks/:deck_id`, `GET /api/status`

mod handlers;
mod routes;

pub use routes::create_router;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::commentary::CommentaryStore;
use crate::config::Settings;
use crate::services::{spawn_sweeper, DeckService};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub decks: Arc<DeckService>,
    pub commentary: Arc<CommentaryStore>,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        settings.ensure_dirs()?;
        Ok(Self {
            decks: Arc::new(DeckService::new(&settings)),
            commentary: Arc::new(CommentaryStore::new(settings.commentary_dir())),
            settings: Arc::new(settings),
        })
    }
}

/// Start the web server.
///
/// External tools are validated up front: with `require_tools` set a missing
/// binary aborts startup, otherwise it is a warning and uploads will fail
/// per-request instead.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let state = AppState::new(settings.clone())?;

    if let Err(e) = state.decks.verify_tools() {
        if settings.require_tools {
            anyhow::bail!("external tool check failed: {}", e);
        }
        tracing::warn!(error = %e, "External tool missing; uploads will fail until installed");
    }

    let sweeper = spawn_sweeper(settings.clone());
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Ctrl-C terminates promptly; there is no in-flight drain phase.
    tokio::select! {
        result = axum::serve(listener, app).into_future() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down server");
        }
    }

    if let Some(handle) = sweeper {
        handle.abort();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tempfile::tempdir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "deckscribe-test-boundary";

    fn setup_test_app() -> (axum::Router, tempfile::TempDir, Settings) {
        let dir = tempdir().unwrap();
        let settings = Settings {
            data_dir: dir.path().to_path_buf(),
            // Tests never shell out; point tools into the void
            soffice_path: "/nonexistent/bin/soffice".to_string(),
            pdftoppm_path: "/nonexistent/bin/pdftoppm".to_string(),
            ..Settings::default()
        };
        let state = AppState::new(settings.clone()).unwrap();
        (create_router(state), dir, settings)
    }

    fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\r\n",
                field, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn multipart_request(uri: &str, field: &str, filename: &str, content: &[u8]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(field, filename, content)))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_upload_rejects_disallowed_extension() {
        let (app, _dir, settings) = setup_test_app();

        let response = app
            .oneshot(multipart_request("/upload", "file", "notes.docx", b"data"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("not allowed"));
        // No storage side effect
        assert_eq!(
            std::fs::read_dir(settings.uploads_dir())
                .unwrap()
                .filter(|e| e.as_ref().unwrap().path().is_file())
                .count(),
            0
        );
    }

    #[tokio::test]
    async fn test_upload_without_file_part() {
        let (app, _dir, _settings) = setup_test_app();

        let response = app
            .oneshot(multipart_request("/upload", "other", "deck.pdf", b"data"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "No file part");
    }

    #[tokio::test]
    async fn test_upload_empty_filename() {
        let (app, _dir, _settings) = setup_test_app();

        let response = app
            .oneshot(multipart_request("/upload", "file", "", b"data"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "No selected file");
    }

    #[tokio::test]
    async fn test_upload_tool_failure_collapses_to_generic_error() {
        let (app, _dir, _settings) = setup_test_app();

        // Valid extension, but the rasterizer binary does not exist
        let response = app
            .oneshot(multipart_request("/upload", "file", "deck.pdf", b"%PDF-1.4"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to process file");
    }

    #[tokio::test]
    async fn test_save_then_get_commentary() {
        let (app, _dir, _settings) = setup_test_app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/save_commentary")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"slide_number": 2, "commentary": "intro", "unique_id": "deck"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Commentary saved successfully");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/get_commentary/deck/2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["commentary"], "intro");

        // A never-saved slide is null, not an error
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/get_commentary/deck/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["commentary"].is_null());
    }

    #[tokio::test]
    async fn test_save_commentary_missing_fields() {
        let (app, _dir, _settings) = setup_test_app();

        for body in [
            r#"{"commentary": "x", "unique_id": "deck"}"#,
            r#"{"slide_number": 1, "unique_id": "deck"}"#,
            r#"{"slide_number": 1, "commentary": "x"}"#,
            r#"{"slide_number": 0, "commentary": "x", "unique_id": "deck"}"#,
            r#"{"slide_number": 1, "commentary": "", "unique_id": "deck"}"#,
        ] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/save_commentary")
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from(body))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        }
    }

    #[tokio::test]
    async fn test_save_commentary_trims_text() {
        let (app, _dir, settings) = setup_test_app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/save_commentary")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"slide_number": 1, "commentary": "  padded  ", "unique_id": "deck"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let raw =
            std::fs::read_to_string(settings.commentary_dir().join("commentary_deck.txt")).unwrap();
        assert_eq!(raw, "1 - padded\n");
    }

    #[tokio::test]
    async fn test_get_commentary_invalid_deck_id() {
        let (app, _dir, _settings) = setup_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/get_commentary/..%2Fescape/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_serve_slide() {
        let (app, _dir, settings) = setup_test_app();

        let deck_dir = settings.slides_dir().join("deck123");
        std::fs::create_dir_all(&deck_dir).unwrap();
        std::fs::write(deck_dir.join("slide_1.png"), b"\x89PNG fake").unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/static/slides/deck123/slide_1.png")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        assert!(content_type.contains("image/png"));
    }

    #[tokio::test]
    async fn test_serve_slide_only_rasterizer_output() {
        let (app, _dir, settings) = setup_test_app();

        // A stray non-slide file inside a deck directory is not served
        let deck_dir = settings.slides_dir().join("deck123");
        std::fs::create_dir_all(&deck_dir).unwrap();
        std::fs::write(deck_dir.join("notes.txt"), b"private").unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/static/slides/deck123/notes.txt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serve_slide_traversal_blocked() {
        let (app, _dir, settings) = setup_test_app();

        // A real file outside the slides root
        std::fs::write(settings.data_dir.join("secret.txt"), b"secret").unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/static/slides/..%2F..%2Fsecret.txt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_audio_roundtrip() {
        let (app, _dir, settings) = setup_test_app();

        let response = app
            .oneshot(multipart_request(
                "/upload_audio",
                "audio",
                "slide_1_recording.wav",
                b"RIFF fake wav",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["filename"], "slide_1_recording.wav");
        assert!(settings.audio_dir().join("slide_1_recording.wav").exists());
    }

    #[tokio::test]
    async fn test_upload_audio_missing_field() {
        let (app, _dir, _settings) = setup_test_app();

        let response = app
            .oneshot(multipart_request("/upload_audio", "file", "rec.wav", b"x"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "No audio file");
    }

    #[tokio::test]
    async fn test_delete_deck_removes_artifacts() {
        let (app, _dir, settings) = setup_test_app();

        std::fs::write(settings.uploads_dir().join("deck1.pdf"), b"pdf").unwrap();
        let slide_dir = settings.slides_dir().join("deck1");
        std::fs::create_dir_all(&slide_dir).unwrap();
        std::fs::write(slide_dir.join("slide_1.png"), b"png").unwrap();
        std::fs::write(
            settings.commentary_dir().join("commentary_deck1.txt"),
            "1 - note\n",
        )
        .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/decks/deck1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["deleted"], true);
        assert!(!settings.uploads_dir().join("deck1.pdf").exists());
        assert!(!slide_dir.exists());
        assert!(!settings
            .commentary_dir()
            .join("commentary_deck1.txt")
            .exists());
    }

    #[tokio::test]
    async fn test_api_status_reports_missing_tools() {
        let (app, _dir, _settings) = setup_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["tools"]["soffice"]["available"], false);
        assert_eq!(json["tools"]["pdftoppm"]["available"], false);
    }
}
