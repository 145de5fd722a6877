//! Storage lifecycle: explicit deletes and TTL-based sweeping.
//!
//! Uploads, slide directories, commentary files, and audio recordings are
//! otherwise never reclaimed. The sweep removes anything whose mtime is
//! older than the configured TTL; `delete_deck` removes every artifact of
//! one deck on demand.

use std::path::Path;
use std::time::{Duration, SystemTime};

use serde::Serialize;

use crate::config::Settings;
use crate::storage::commentary_path;

/// What one sweep or delete removed.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SweepReport {
    pub uploads_removed: u64,
    pub slide_dirs_removed: u64,
    pub commentary_removed: u64,
    pub audio_removed: u64,
}

impl SweepReport {
    pub fn total(&self) -> u64 {
        self.uploads_removed + self.slide_dirs_removed + self.commentary_removed + self.audio_removed
    }
}

/// Remove every artifact of one deck: the uploaded original, the slide
/// image directory, and the commentary file.
///
/// Idempotent; reports what was actually present.
pub fn delete_deck(settings: &Settings, deck_id: &str) -> std::io::Result<SweepReport> {
    let mut report = SweepReport::default();

    // The upload keeps its original extension, so match on the stem
    if let Ok(entries) = std::fs::read_dir(settings.uploads_dir()) {
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let stem = path.file_stem().and_then(|s| s.to_str());
            if stem == Some(deck_id) {
                std::fs::remove_file(&path)?;
                report.uploads_removed += 1;
            }
        }
    }

    let slide_dir = settings.slides_dir().join(deck_id);
    if slide_dir.is_dir() {
        std::fs::remove_dir_all(&slide_dir)?;
        report.slide_dirs_removed += 1;
    }

    let commentary = commentary_path(&settings.commentary_dir(), deck_id);
    if commentary.is_file() {
        std::fs::remove_file(&commentary)?;
        report.commentary_removed += 1;
    }

    tracing::info!(deck_id, removed = report.total(), "Deleted deck artifacts");
    Ok(report)
}

/// Remove artifacts older than `ttl`, judged by filesystem mtime.
pub fn sweep(settings: &Settings, ttl: Duration) -> std::io::Result<SweepReport> {
    let cutoff = SystemTime::now() - ttl;
    let mut report = SweepReport::default();

    if let Ok(entries) = std::fs::read_dir(settings.uploads_dir()) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && older_than(&path, cutoff) {
                std::fs::remove_file(&path)?;
                report.uploads_removed += 1;
            }
        }
    }

    if let Ok(entries) = std::fs::read_dir(settings.audio_dir()) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && older_than(&path, cutoff) {
                std::fs::remove_file(&path)?;
                report.audio_removed += 1;
            }
        }
    }

    if let Ok(entries) = std::fs::read_dir(settings.slides_dir()) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() && older_than(&path, cutoff) {
                std::fs::remove_dir_all(&path)?;
                report.slide_dirs_removed += 1;
            }
        }
    }

    if let Ok(entries) = std::fs::read_dir(settings.commentary_dir()) {
        for entry in entries.flatten() {
            let path = entry.path();
            let is_commentary = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("commentary_") && n.ends_with(".txt"))
                .unwrap_or(false);
            if path.is_file() && is_commentary && older_than(&path, cutoff) {
                std::fs::remove_file(&path)?;
                report.commentary_removed += 1;
            }
        }
    }

    if report.total() > 0 {
        tracing::info!(
            uploads = report.uploads_removed,
            slide_dirs = report.slide_dirs_removed,
            commentary = report.commentary_removed,
            audio = report.audio_removed,
            "Retention sweep removed expired artifacts"
        );
    }
    Ok(report)
}

/// Spawn the periodic sweep task. Disabled when the TTL is zero.
pub fn spawn_sweeper(settings: Settings) -> Option<tokio::task::JoinHandle<()>> {
    if settings.retention_ttl_days == 0 {
        return None;
    }
    let ttl = Duration::from_secs(settings.retention_ttl_days * 24 * 60 * 60);
    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60 * 60));
        loop {
            interval.tick().await;
            if let Err(e) = sweep(&settings, ttl) {
                tracing::error!(error = %e, "Retention sweep failed");
            }
        }
    }))
}

fn older_than(path: &Path, cutoff: SystemTime) -> bool {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|mtime| mtime < cutoff)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_settings(data_dir: &Path) -> Settings {
        Settings {
            data_dir: data_dir.to_path_buf(),
            ..Settings::default()
        }
    }

    fn populate_deck(settings: &Settings, deck_id: &str) {
        std::fs::write(
            settings.uploads_dir().join(format!("{}.pdf", deck_id)),
            b"pdf",
        )
        .unwrap();
        let slide_dir = settings.slides_dir().join(deck_id);
        std::fs::create_dir_all(&slide_dir).unwrap();
        std::fs::write(slide_dir.join("slide_1.png"), b"png").unwrap();
        std::fs::write(
            commentary_path(&settings.commentary_dir(), deck_id),
            "1 - hi\n",
        )
        .unwrap();
    }

    #[test]
    fn test_delete_deck_removes_all_artifacts() {
        let dir = tempdir().unwrap();
        let settings = test_settings(dir.path());
        settings.ensure_dirs().unwrap();
        populate_deck(&settings, "deck-a");
        populate_deck(&settings, "deck-b");

        let report = delete_deck(&settings, "deck-a").unwrap();
        assert_eq!(report.uploads_removed, 1);
        assert_eq!(report.slide_dirs_removed, 1);
        assert_eq!(report.commentary_removed, 1);

        // deck-b untouched
        assert!(settings.uploads_dir().join("deck-b.pdf").exists());
        assert!(settings.slides_dir().join("deck-b").is_dir());
    }

    #[test]
    fn test_delete_deck_idempotent() {
        let dir = tempdir().unwrap();
        let settings = test_settings(dir.path());
        settings.ensure_dirs().unwrap();

        let report = delete_deck(&settings, "never-existed").unwrap();
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn test_sweep_spares_fresh_files() {
        let dir = tempdir().unwrap();
        let settings = test_settings(dir.path());
        settings.ensure_dirs().unwrap();
        populate_deck(&settings, "fresh");

        let report = sweep(&settings, Duration::from_secs(60 * 60)).unwrap();
        assert_eq!(report.total(), 0);
        assert!(settings.uploads_dir().join("fresh.pdf").exists());
    }

    #[test]
    fn test_sweep_removes_expired_files() {
        let dir = tempdir().unwrap();
        let settings = test_settings(dir.path());
        settings.ensure_dirs().unwrap();
        populate_deck(&settings, "old");
        std::fs::write(settings.audio_dir().join("rec.wav"), b"wav").unwrap();

        // Zero TTL: everything already written is expired
        let report = sweep(&settings, Duration::ZERO).unwrap();
        assert!(report.uploads_removed >= 1);
        assert_eq!(report.slide_dirs_removed, 1);
        assert_eq!(report.commentary_removed, 1);
        assert_eq!(report.audio_removed, 1);
        assert!(!settings.uploads_dir().join("old.pdf").exists());
    }
}
