//! PDF rasterization via pdftoppm.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use super::{spawn_error, ConvertError};
use crate::config::resolve_tool;
use crate::models::SlideImage;

/// Renders each PDF page to `slide_<n>.png` by shelling out to pdftoppm.
pub struct Rasterizer {
    pdftoppm: String,
    dpi: u32,
}

impl Rasterizer {
    pub fn new(pdftoppm: impl Into<String>, dpi: u32) -> Self {
        Self {
            pdftoppm: pdftoppm.into(),
            dpi,
        }
    }

    /// Check that the rasterizer binary exists, returning its resolved path.
    pub fn verify(&self) -> Result<PathBuf, ConvertError> {
        resolve_tool(&self.pdftoppm)
            .ok_or_else(|| ConvertError::ToolNotFound(self.pdftoppm.clone()))
    }

    /// Render every page of `pdf` into `out_dir` as `slide_<n>.png` (1-based,
    /// page order). Returns slide paths relative to the slides root, prefixed
    /// with `deck_id`.
    ///
    /// A PDF that yields zero pages is treated as a failed conversion, not an
    /// empty success.
    pub async fn rasterize(
        &self,
        pdf: &Path,
        out_dir: &Path,
        deck_id: &str,
    ) -> Result<Vec<SlideImage>, ConvertError> {
        std::fs::create_dir_all(out_dir)?;
        let prefix = out_dir.join("page");

        tracing::info!(pdf = %pdf.display(), out_dir = %out_dir.display(), "Rasterizing PDF");

        let child = Command::new(&self.pdftoppm)
            .arg("-png")
            .args(["-r", &self.dpi.to_string()])
            .arg(pdf)
            .arg(&prefix)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(e, &self.pdftoppm))?;

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(pdf = %pdf.display(), %stderr, "pdftoppm failed");
            return Err(ConvertError::Failed(format!(
                "pdftoppm exited with {}: {}",
                output.status, stderr
            )));
        }

        let slides = collect_pages(out_dir, deck_id)?;
        if slides.is_empty() {
            tracing::error!(pdf = %pdf.display(), "pdftoppm produced no pages");
            return Err(ConvertError::MissingOutput(format!(
                "no pages rendered from {}",
                pdf.display()
            )));
        }

        tracing::info!(pdf = %pdf.display(), pages = slides.len(), "Rasterization complete");
        Ok(slides)
    }
}

/// Rename pdftoppm output (`page-01.png`, `page-02.png`, ...) to the final
/// `slide_<n>.png` names and return them in page order.
fn collect_pages(out_dir: &Path, deck_id: &str) -> Result<Vec<SlideImage>, ConvertError> {
    let mut pages: Vec<(u32, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(out_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(n) = parse_page_number(name) {
            pages.push((n, entry.path()));
        }
    }
    pages.sort_by_key(|(n, _)| *n);

    let mut slides = Vec::with_capacity(pages.len());
    for (n, path) in pages {
        let final_name = format!("slide_{}.png", n);
        std::fs::rename(&path, out_dir.join(&final_name))?;
        slides.push(SlideImage {
            index: n,
            rel_path: format!("{}/{}", deck_id, final_name),
        });
    }
    Ok(slides)
}

/// Extract the page number from a pdftoppm output name (`page-NN.png`).
/// pdftoppm zero-pads to the total page count's width.
fn parse_page_number(name: &str) -> Option<u32> {
    name.strip_prefix("page-")?
        .strip_suffix(".png")?
        .parse()
        .ok()
}
