//! Storage helpers for uploaded files on disk.
//!
//! Intake validates only the filename extension (no content sniffing) and
//! stores originals as `<uuid>.<ext>` under the uploads directory. Audio
//! recordings keep their client-chosen filename, sanitized, and overwrite
//! same-named files.

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;

use crate::models::{DeckFormat, UploadedDeck};

/// Errors raised during file intake.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("File type not allowed: {0}")]
    UnsupportedType(String),

    #[error("Filename has no usable name")]
    EmptyFilename,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Extract the lowercased extension if it is in the allowed set.
pub fn allowed_extension(filename: &str) -> Option<String> {
    let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
    DeckFormat::from_extension(&ext).map(|f| f.extension().to_string())
}

/// Persist an uploaded deck under `uploads_dir` and assign it a token.
///
/// Rejects disallowed extensions before touching the filesystem.
pub fn store_upload(
    uploads_dir: &Path,
    original_filename: &str,
    bytes: &[u8],
) -> Result<UploadedDeck, IntakeError> {
    let ext = allowed_extension(original_filename)
        .ok_or_else(|| IntakeError::UnsupportedType(original_filename.to_string()))?;
    // allowed_extension only returns extensions DeckFormat knows about
    let format = DeckFormat::from_extension(&ext)
        .ok_or_else(|| IntakeError::UnsupportedType(ext.clone()))?;

    let id = uuid::Uuid::new_v4().to_string();
    let file_path = uploads_dir.join(format!("{}.{}", id, ext));

    std::fs::create_dir_all(uploads_dir)?;
    std::fs::write(&file_path, bytes)?;
    tracing::info!(deck_id = %id, path = %file_path.display(), "Stored uploaded deck");

    Ok(UploadedDeck {
        id,
        format,
        file_path,
        uploaded_at: Utc::now(),
    })
}

/// Persist an audio recording under `audio_dir`, keeping the (sanitized)
/// client filename. Returns the stored filename.
///
/// Overwrites an existing file of the same name; the client-side naming
/// convention (`slide_<n>_recording.wav`) is the only deck linkage.
pub fn store_audio(
    audio_dir: &Path,
    original_filename: &str,
    bytes: &[u8],
) -> Result<String, IntakeError> {
    let filename = sanitize_filename(original_filename).ok_or(IntakeError::EmptyFilename)?;
    let save_path = audio_dir.join(&filename);

    std::fs::create_dir_all(audio_dir)?;
    std::fs::write(&save_path, bytes)?;
    tracing::info!(path = %save_path.display(), "Stored audio recording");

    Ok(filename)
}

/// Strip path components and replace filesystem-hostile characters.
///
/// Returns `None` when nothing usable remains.
pub fn sanitize_filename(name: &str) -> Option<String> {
    // Keep only the final path component, whichever separator the client used
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);

    let sanitized: String = base
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = sanitized.trim().trim_matches('.').trim_matches('_');
    if trimmed.is_empty() {
        return None;
    }
    Some(truncate_chars(trimmed, 100))
}

/// Cut a string to at most `max` bytes without splitting a multi-byte char.
fn truncate_chars(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let end = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|i| *i <= max)
        .last()
        .unwrap_or(0);
    s[..end].to_string()
}

/// Path to a deck's commentary file.
pub fn commentary_path(commentary_dir: &Path, deck_id: &str) -> PathBuf {
    commentary_dir.join(format!("commentary_{}.txt", deck_id))
}

/// Deck tokens are uuids we generated. Anything outside that alphabet came
/// from a caller and must not reach a filename.
pub fn is_valid_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
