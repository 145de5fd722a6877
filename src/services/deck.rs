//! The upload pipeline: intake, optional office conversion, rasterization.

use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use thiserror::Error;

use crate::config::Settings;
use crate::convert::{ConvertError, OfficeConverter, Rasterizer};
use crate::models::{DeckFormat, ProcessedDeck};
use crate::storage::{store_upload, IntakeError};

/// Errors from the upload pipeline.
///
/// `Rejected` is a client problem; everything else is logged in detail and
/// collapsed into one generic failure at the HTTP boundary.
#[derive(Debug, Error)]
pub enum DeckError {
    #[error(transparent)]
    Rejected(#[from] IntakeError),

    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// Orchestrates one upload from raw bytes to a directory of slide images.
pub struct DeckService {
    uploads_dir: PathBuf,
    slides_dir: PathBuf,
    converter: OfficeConverter,
    rasterizer: Rasterizer,
}

impl DeckService {
    pub fn new(settings: &Settings) -> Self {
        Self {
            uploads_dir: settings.uploads_dir(),
            slides_dir: settings.slides_dir(),
            converter: OfficeConverter::new(
                settings.soffice_path.clone(),
                Duration::from_secs(settings.convert_timeout_secs),
            ),
            rasterizer: Rasterizer::new(settings.pdftoppm_path.clone(), settings.raster_dpi),
        }
    }

    /// Validate external tools, naming the missing one.
    pub fn verify_tools(&self) -> Result<(), ConvertError> {
        self.converter.verify()?;
        self.rasterizer.verify()?;
        Ok(())
    }

    /// Run the full pipeline for one uploaded file.
    ///
    /// The deck id assigned at intake also names the slide image directory,
    /// so image paths and commentary keys share one identifier.
    pub async fn process(
        &self,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<ProcessedDeck, DeckError> {
        let deck = store_upload(&self.uploads_dir, original_filename, bytes)?;
        let out_dir = self.slides_dir.join(&deck.id);

        let slides = match deck.format {
            DeckFormat::Pdf => {
                self.rasterizer
                    .rasterize(&deck.file_path, &out_dir, &deck.id)
                    .await?
            }
            DeckFormat::Pptx => {
                // Work dir for the intermediate PDF; removed on drop whether
                // or not conversion succeeds.
                let work_dir = TempDir::new().map_err(ConvertError::Io)?;
                let pdf = self
                    .converter
                    .convert_to_pdf(&deck.file_path, work_dir.path())
                    .await?;
                self.rasterizer.rasterize(&pdf, &out_dir, &deck.id).await?
            }
        };

        tracing::info!(deck_id = %deck.id, slides = slides.len(), "Processed deck");
        Ok(ProcessedDeck {
            deck_id: deck.id,
            slides,
        })
    }
}
