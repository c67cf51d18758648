use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::Local;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tracing::{error, warn};

/// Shared JSON file persistence. Reads never fail the caller: a missing or
/// corrupt file yields the provided default. Writes rotate a timestamped
/// sibling copy of the previous contents, then replace the file atomically
/// via a temp-file rename, so readers and backup copies only ever see a
/// complete document.
#[derive(Debug, Clone)]
pub struct JsonStore {
    max_backups: usize,
}

impl JsonStore {
    pub fn new(max_backups: usize) -> Self {
        Self { max_backups }
    }

    /// Read and deserialize `path`, falling back to `default` when the file
    /// is absent or unreadable. Corrupt contents are logged, never bubbled.
    pub async fn read_or_default<T: DeserializeOwned>(&self, path: &Path, default: T) -> T {
        let raw = match fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return default,
            Err(err) => {
                error!(path = %path.display(), %err, "failed to read data file");
                return default;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                error!(path = %path.display(), %err, "data file contains invalid JSON, using default");
                default
            }
        }
    }

    /// Serialize `value` to `path`, rotating a backup of the previous file.
    pub async fn write<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        self.write_with_backup(path, value, true).await
    }

    /// Serialize `value` to `path`. Backup failures are logged but do not
    /// block the write itself.
    pub async fn write_with_backup<T: Serialize>(
        &self,
        path: &Path,
        value: &T,
        backup: bool,
    ) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.with_context(|| {
                    format!("failed to create data directory {}", parent.display())
                })?;
            }
        }

        if backup && fs::try_exists(path).await.unwrap_or(false) {
            match self.rotate_backup(path).await {
                Ok(_) => {
                    if let Err(err) = self.prune_backups(path).await {
                        warn!(path = %path.display(), %err, "backup pruning failed");
                    }
                }
                Err(err) => warn!(path = %path.display(), %err, "backup rotation failed"),
            }
        }

        let content = serde_json::to_string_pretty(value).context("failed to serialize data")?;

        // Stage the new contents next to the target and rename over it.
        // Writers to one path are already serialized by their owners, so a
        // fixed temp name per target is unambiguous.
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "data".to_string());
        let staging = path.with_file_name(format!("{name}.tmp"));
        fs::write(&staging, content)
            .await
            .with_context(|| format!("failed to write {}", staging.display()))?;
        fs::rename(&staging, path)
            .await
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    async fn rotate_backup(&self, path: &Path) -> Result<PathBuf> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "data".to_string());
        let backup_path = path.with_file_name(format!("{name}.backup_{stamp}"));
        fs::copy(path, &backup_path)
            .await
            .with_context(|| format!("failed to copy {} to backup", path.display()))?;
        Ok(backup_path)
    }

    /// Delete the oldest sibling backups beyond `max_backups`, newest kept
    /// by modification time.
    async fn prune_backups(&self, path: &Path) -> Result<usize> {
        let Some(dir) = path.parent() else {
            return Ok(0);
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "data".to_string());
        let prefix = format!("{name}.backup_");

        let mut backups: Vec<(SystemTime, PathBuf)> = Vec::new();
        let mut entries = fs::read_dir(dir)
            .await
            .with_context(|| format!("failed to list {}", dir.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let entry_name = entry.file_name().to_string_lossy().into_owned();
            if !entry_name.starts_with(&prefix) {
                continue;
            }
            let modified = entry
                .metadata()
                .await
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            backups.push((modified, entry.path()));
        }

        backups.sort_by(|a, b| b.0.cmp(&a.0));
        let mut removed = 0;
        for (_, stale) in backups.into_iter().skip(self.max_backups) {
            if let Err(err) = fs::remove_file(&stale).await {
                warn!(path = %stale.display(), %err, "failed to remove stale backup");
            } else {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
