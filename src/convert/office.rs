//! Office document conversion via headless LibreOffice.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use super::{spawn_error, ConvertError};
use crate::config::resolve_tool;

/// Converts slide decks to PDF by shelling out to `soffice --headless`.
pub struct OfficeConverter {
    soffice: String,
    timeout: Duration,
}

impl OfficeConverter {
    pub fn new(soffice: impl Into<String>, timeout: Duration) -> Self {
        Self {
            soffice: soffice.into(),
            timeout,
        }
    }

    /// Check that the converter binary exists, returning its resolved path.
    pub fn verify(&self) -> Result<PathBuf, ConvertError> {
        resolve_tool(&self.soffice).ok_or_else(|| ConvertError::ToolNotFound(self.soffice.clone()))
    }

    /// Convert `source` to PDF, writing into `out_dir`.
    ///
    /// Returns the path of the generated PDF (`<stem>.pdf` under `out_dir`).
    /// The child is killed if it outlives the timeout.
    pub async fn convert_to_pdf(
        &self,
        source: &Path,
        out_dir: &Path,
    ) -> Result<PathBuf, ConvertError> {
        let source = source.canonicalize()?;
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConvertError::Failed(format!("bad source path: {}", source.display())))?;
        let expected = out_dir.join(format!("{}.pdf", stem));

        tracing::info!(
            source = %source.display(),
            out_dir = %out_dir.display(),
            "Converting deck to PDF"
        );

        let child = Command::new(&self.soffice)
            .args(["--headless", "--convert-to", "pdf"])
            .arg(&source)
            .arg("--outdir")
            .arg(out_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(e, &self.soffice))?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                // Dropping the timed-out future kills the child (kill_on_drop)
                tracing::error!(
                    source = %source.display(),
                    timeout_secs = self.timeout.as_secs(),
                    "Office conversion timed out"
                );
                return Err(ConvertError::TimedOut(self.timeout.as_secs()));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(source = %source.display(), %stderr, "Office conversion failed");
            return Err(ConvertError::Failed(format!(
                "soffice exited with {}: {}",
                output.status, stderr
            )));
        }

        if !expected.exists() {
            tracing::error!(expected = %expected.display(), "Converted PDF not found");
            return Err(ConvertError::MissingOutput(expected.display().to_string()));
        }

        tracing::info!(pdf = %expected.display(), "Office conversion complete");
        Ok(expected)
    }
}
