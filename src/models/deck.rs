//! Deck and slide models.
//!
//! A deck is identified by a single uuid token assigned at intake. The same
//! token names the uploaded original, the slide image directory, and the
//! commentary file, so every artifact of one upload shares one key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckFormat {
    Pptx,
    Pdf,
}

impl DeckFormat {
    /// Map a lowercased file extension to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pptx" => Some(Self::Pptx),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pptx => "pptx",
            Self::Pdf => "pdf",
        }
    }
}

/// An uploaded deck as stored at intake time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedDeck {
    /// Generated uuid token; keys all artifacts of this upload.
    pub id: String,
    /// Detected format (from the filename extension only).
    pub format: DeckFormat,
    /// Where the raw upload was written.
    pub file_path: PathBuf,
    /// When the upload was accepted.
    pub uploaded_at: DateTime<Utc>,
}

/// One rendered slide, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideImage {
    /// 1-based slide index, matching document page order.
    pub index: u32,
    /// Path relative to the slides directory: `<deck_id>/slide_<n>.png`.
    pub rel_path: String,
}

/// Result of a full intake-convert-rasterize run.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDeck {
    pub deck_id: String,
    pub slides: Vec<SlideImage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DeckFormat::from_extension("pptx"), Some(DeckFormat::Pptx));
        assert_eq!(DeckFormat::from_extension("pdf"), Some(DeckFormat::Pdf));
        assert_eq!(DeckFormat::from_extension("ppt"), None);
        assert_eq!(DeckFormat::from_extension("docx"), None);
        assert_eq!(DeckFormat::from_extension(""), None);
    }

    #[test]
    fn test_format_roundtrip() {
        for fmt in [DeckFormat::Pptx, DeckFormat::Pdf] {
            assert_eq!(DeckFormat::from_extension(fmt.extension()), Some(fmt));
        }
    }
}
