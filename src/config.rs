//! Configuration management for deckscribe.
//!
//! Settings are resolved in three layers: built-in defaults, an optional
//! TOML config file, then `DECKSCRIBE_*` environment variables. External
//! tool locations are validated at startup rather than per-request.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default converter timeout in seconds.
pub const DEFAULT_CONVERT_TIMEOUT_SECS: u64 = 60;

/// Default rasterization resolution in DPI.
pub const DEFAULT_RASTER_DPI: u32 = 150;

/// Runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base data directory. Uploads, slides, and commentary live under it.
    pub data_dir: PathBuf,
    /// Office converter binary (name or absolute path).
    pub soffice_path: String,
    /// PDF rasterizer binary (name or absolute path).
    pub pdftoppm_path: String,
    /// Timeout for one office conversion, in seconds.
    pub convert_timeout_secs: u64,
    /// Rasterization resolution.
    pub raster_dpi: u32,
    /// Listen host for the web server.
    pub host: String,
    /// Listen port for the web server.
    pub port: u16,
    /// Retention TTL in days. 0 disables the periodic sweep.
    pub retention_ttl_days: u64,
    /// Fail startup when external tools are missing (instead of warning).
    pub require_tools: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            soffice_path: "soffice".to_string(),
            pdftoppm_path: "pdftoppm".to_string(),
            convert_timeout_secs: DEFAULT_CONVERT_TIMEOUT_SECS,
            raster_dpi: DEFAULT_RASTER_DPI,
            host: "0.0.0.0".to_string(),
            port: 8080,
            retention_ttl_days: 0,
            require_tools: false,
        }
    }
}

impl Settings {
    /// Directory for uploaded originals.
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    /// Directory for recorded audio files.
    pub fn audio_dir(&self) -> PathBuf {
        self.uploads_dir().join("audio")
    }

    /// Directory for rendered slide images, one subdirectory per deck.
    pub fn slides_dir(&self) -> PathBuf {
        self.data_dir.join("static").join("slides")
    }

    /// Directory holding per-deck commentary files.
    pub fn commentary_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    /// Create the directory layout if missing.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.uploads_dir())?;
        std::fs::create_dir_all(self.audio_dir())?;
        std::fs::create_dir_all(self.slides_dir())?;
        std::fs::create_dir_all(self.commentary_dir())?;
        Ok(())
    }
}

/// Load settings from defaults, an optional config file, and the environment.
///
/// `data_dir_override` comes from the global `--data-dir` CLI flag and wins
/// over both the config file and `DECKSCRIBE_DATA_DIR`.
pub fn load_settings(data_dir_override: Option<&Path>) -> anyhow::Result<Settings> {
    let config_path = std::env::var("DECKSCRIBE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("deckscribe.toml"));

    let mut settings = if config_path.exists() {
        let raw = std::fs::read_to_string(&config_path)?;
        toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", config_path.display(), e))?
    } else {
        Settings::default()
    };

    apply_env_overrides(&mut settings)?;

    if let Some(dir) = data_dir_override {
        settings.data_dir = dir.to_path_buf();
    }

    Ok(settings)
}

fn apply_env_overrides(settings: &mut Settings) -> anyhow::Result<()> {
    if let Ok(v) = std::env::var("DECKSCRIBE_DATA_DIR") {
        settings.data_dir = PathBuf::from(v);
    }
    if let Ok(v) = std::env::var("DECKSCRIBE_SOFFICE") {
        settings.soffice_path = v;
    }
    if let Ok(v) = std::env::var("DECKSCRIBE_PDFTOPPM") {
        settings.pdftoppm_path = v;
    }
    if let Ok(v) = std::env::var("DECKSCRIBE_CONVERT_TIMEOUT_SECS") {
        settings.convert_timeout_secs = v
            .parse()
            .map_err(|_| anyhow::anyhow!("DECKSCRIBE_CONVERT_TIMEOUT_SECS must be an integer"))?;
    }
    if let Ok(v) = std::env::var("DECKSCRIBE_RASTER_DPI") {
        settings.raster_dpi = v
            .parse()
            .map_err(|_| anyhow::anyhow!("DECKSCRIBE_RASTER_DPI must be an integer"))?;
    }
    if let Ok(v) = std::env::var("DECKSCRIBE_HOST") {
        settings.host = v;
    }
    if let Ok(v) = std::env::var("DECKSCRIBE_PORT") {
        settings.port = v
            .parse()
            .map_err(|_| anyhow::anyhow!("DECKSCRIBE_PORT must be a port number"))?;
    }
    if let Ok(v) = std::env::var("DECKSCRIBE_RETENTION_TTL_DAYS") {
        settings.retention_ttl_days = v
            .parse()
            .map_err(|_| anyhow::anyhow!("DECKSCRIBE_RETENTION_TTL_DAYS must be an integer"))?;
    }
    if let Ok(v) = std::env::var("DECKSCRIBE_REQUIRE_TOOLS") {
        settings.require_tools = matches!(v.as_str(), "1" | "true" | "yes");
    }
    Ok(())
}

/// Resolve a tool name or path to an executable on disk.
///
/// Absolute or relative paths are checked directly; bare names go through a
/// PATH lookup.
pub fn resolve_tool(tool: &str) -> Option<PathBuf> {
    let path = Path::new(tool);
    if path.components().count() > 1 {
        return path.is_file().then(|| path.to_path_buf());
    }
    which::which(tool).ok()
}
