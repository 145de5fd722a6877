//! Per-deck commentary storage.
//!
//! Each deck gets one flat text file, `commentary_<deck_id>.txt`, with one
//! line per annotated slide in the form `"<n> - <text>"`, sorted by slide
//! number. Every save loads the whole file, updates the entry in memory,
//! and rewrites the file. Malformed lines are skipped with a warning rather
//! than aborting the read.
//!
//! All access to one deck's file is serialized through a per-deck async
//! mutex, and the rewrite lands via temp-file-and-rename, so concurrent
//! saves cannot clobber each other and readers never observe a partially
//! written file. Different decks do not contend.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::storage::commentary_path;

/// Errors raised by the commentary store.
#[derive(Debug, Error)]
pub enum CommentaryError {
    #[error("Invalid deck id: {0}")]
    InvalidDeckId(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Flat-file commentary store rooted at one directory.
pub struct CommentaryStore {
    dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CommentaryStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Path to a deck's commentary file.
    pub fn path_for(&self, deck_id: &str) -> PathBuf {
        commentary_path(&self.dir, deck_id)
    }

    /// Set (or overwrite) the commentary for one slide.
    ///
    /// Text is trimmed before storage. A pre-existing unreadable file is
    /// treated as empty and overwritten; only the final write can fail.
    pub async fn save(
        &self,
        deck_id: &str,
        slide: u32,
        text: &str,
    ) -> Result<(), CommentaryError> {
        validate_deck_id(deck_id)?;
        let lock = self.lock_for(deck_id).await;
        let _guard = lock.lock().await;

        let path = self.path_for(deck_id);
        let mut entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => parse_commentary(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(deck_id, error = %e, "Unreadable commentary file; starting fresh");
                BTreeMap::new()
            }
        };

        entries.insert(slide, text.trim().to_string());
        // Write-then-rename keeps the file whole for readers at all times
        let tmp = path.with_extension("txt.tmp");
        tokio::fs::write(&tmp, render_commentary(&entries)).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::info!(deck_id, slide, "Saved commentary");
        Ok(())
    }

    /// Fetch the commentary for one slide, if any.
    ///
    /// A missing file or an unannotated slide is `Ok(None)`; an existing
    /// file that cannot be read is an error.
    pub async fn get(
        &self,
        deck_id: &str,
        slide: u32,
    ) -> Result<Option<String>, CommentaryError> {
        validate_deck_id(deck_id)?;
        let lock = self.lock_for(deck_id).await;
        let _guard = lock.lock().await;

        let path = self.path_for(deck_id);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                tracing::error!(deck_id, error = %e, "Failed to read commentary file");
                return Err(e.into());
            }
        };
        Ok(parse_commentary(&raw).remove(&slide))
    }

    /// All entries for a deck, sorted by slide number.
    pub async fn all(&self, deck_id: &str) -> Result<BTreeMap<u32, String>, CommentaryError> {
        validate_deck_id(deck_id)?;
        let lock = self.lock_for(deck_id).await;
        let _guard = lock.lock().await;

        let path = self.path_for(deck_id);
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(parse_commentary(&raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn lock_for(&self, deck_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(deck_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Deck ids come from URLs and JSON bodies and are interpolated into a
/// filename; restrict them to the token alphabet we generate.
fn validate_deck_id(deck_id: &str) -> Result<(), CommentaryError> {
    if crate::storage::is_valid_token(deck_id) {
        Ok(())
    } else {
        Err(CommentaryError::InvalidDeckId(deck_id.to_string()))
    }
}

/// Parse the line format, skipping lines without a separator or with a
/// non-numeric slide number.
fn parse_commentary(raw: &str) -> BTreeMap<u32, String> {
    let mut entries = BTreeMap::new();
    for line in raw.lines() {
        let Some((page, text)) = line.split_once('-') else {
            if !line.trim().is_empty() {
                tracing::warn!(line, "Skipping malformed commentary line");
            }
            continue;
        };
        match page.trim().parse::<u32>() {
            Ok(n) => {
                entries.insert(n, text.trim().to_string());
            }
            Err(_) => {
                tracing::warn!(line, "Skipping commentary line with non-numeric slide");
            }
        }
    }
    entries
}

/// Render entries back to the line format, ascending by slide number.
fn render_commentary(entries: &BTreeMap<u32, String>) -> String {
    let mut out = String::new();
    for (page, text) in entries {
        out.push_str(&format!("{} - {}\n", page, text));
    }
    out
}
