//! External-tool orchestration for deck conversion.
//!
//! Converts decks using:
//! - soffice (LibreOffice) for pptx → pdf, bounded by a timeout
//! - pdftoppm (Poppler) for pdf → per-page PNG images
//!
//! Both tools run as child processes. A missing binary is reported as its
//! own error variant so startup validation can name the tool to install.

mod office;
mod raster;

pub use office::OfficeConverter;
pub use raster::Rasterizer;

use thiserror::Error;

/// Errors from external conversion tools.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Conversion failed: {0}")]
    Failed(String),

    #[error("Conversion timed out after {0}s")]
    TimedOut(u64),

    #[error("Converter produced no output: {0}")]
    MissingOutput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Map a spawn error to a tool-specific error.
fn spawn_error(e: std::io::Error, tool: &str) -> ConvertError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ConvertError::ToolNotFound(tool.to_string())
    } else {
        ConvertError::Io(e)
    }
}
