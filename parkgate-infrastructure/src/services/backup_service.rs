use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::{bail, Context};
use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{info, warn};

use parkgate_domain::entities::{BackupInfo, BackupStats};
use parkgate_domain::ports::BackupStore;

const BACKUP_PREFIX: &str = "cards_backup_";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Snapshots of the card table file in a dedicated backup directory.
/// Artifacts are named `cards_backup_<timestamp>[_<reason>].json` and the
/// newest `max_backups` are kept, ordered by modification time.
pub struct FileBackupManager {
    cards_path: PathBuf,
    backup_dir: PathBuf,
    max_backups: usize,
    /// Writer lock shared with the command layer; held while the live
    /// table file is overwritten during restore.
    table_lock: Arc<Mutex<()>>,
}

impl FileBackupManager {
    pub fn new(
        cards_path: PathBuf,
        backup_dir: PathBuf,
        max_backups: usize,
        table_lock: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            cards_path,
            backup_dir,
            max_backups,
            table_lock,
        }
    }

    fn artifact_name(reason: &str) -> String {
        let stamp = Local::now().format(TIMESTAMP_FORMAT);
        if reason.is_empty() {
            format!("{BACKUP_PREFIX}{stamp}.json")
        } else {
            format!("{BACKUP_PREFIX}{stamp}_{reason}.json")
        }
    }

    async fn copy_table_to(&self, target: &Path) -> anyhow::Result<()> {
        if !fs::try_exists(&self.cards_path).await.unwrap_or(false) {
            bail!(
                "card table file not found: {}",
                self.cards_path.display()
            );
        }
        fs::create_dir_all(&self.backup_dir)
            .await
            .with_context(|| format!("failed to create {}", self.backup_dir.display()))?;
        fs::copy(&self.cards_path, target)
            .await
            .with_context(|| format!("failed to copy table to {}", target.display()))?;

        let size = fs::metadata(target).await.map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            let _ = fs::remove_file(target).await;
            bail!("backup verification failed: empty artifact");
        }
        Ok(())
    }

    async fn collect(&self) -> anyhow::Result<Vec<BackupInfo>> {
        if !fs::try_exists(&self.backup_dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        let mut entries = fs::read_dir(&self.backup_dir)
            .await
            .with_context(|| format!("failed to list {}", self.backup_dir.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let filename = entry.file_name().to_string_lossy().into_owned();
            if !filename.starts_with(BACKUP_PREFIX) || !filename.ends_with(".json") {
                continue;
            }
            let metadata = entry.metadata().await?;
            let modified = system_time_to_utc(metadata.modified().ok());
            let created = system_time_to_utc(metadata.created().ok().or(metadata.modified().ok()));
            backups.push(BackupInfo {
                is_hourly: filename.contains("hourly"),
                is_manual: filename.contains("manual"),
                path: entry.path().to_string_lossy().into_owned(),
                size_bytes: metadata.len(),
                created_time: created,
                modified_time: modified,
                filename,
            });
        }

        backups.sort_by(|a, b| b.modified_time.cmp(&a.modified_time));
        Ok(backups)
    }

    async fn prune(&self) -> anyhow::Result<()> {
        let backups = self.collect().await?;
        for stale in backups.iter().skip(self.max_backups) {
            if let Err(err) = fs::remove_file(&stale.path).await {
                warn!(path = %stale.path, %err, "failed to remove stale backup");
            }
        }
        Ok(())
    }
}

fn system_time_to_utc(time: Option<SystemTime>) -> DateTime<Utc> {
    time.map(DateTime::<Utc>::from)
        .unwrap_or_else(|| DateTime::<Utc>::from(SystemTime::UNIX_EPOCH))
}

#[async_trait]
impl BackupStore for FileBackupManager {
    async fn snapshot(&self, reason: &str) -> anyhow::Result<String> {
        let filename = Self::artifact_name(reason);
        let target = self.backup_dir.join(&filename);
        self.copy_table_to(&target).await?;
        self.prune().await?;
        info!(%filename, %reason, "card table snapshot created");
        Ok(filename)
    }

    async fn list(&self) -> anyhow::Result<Vec<BackupInfo>> {
        self.collect().await
    }

    async fn restore(&self, filename: &str) -> anyhow::Result<String> {
        // accept either a bare artifact name or a full path
        let name = Path::new(filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.to_string());
        let source = self.backup_dir.join(&name);
        if !fs::try_exists(&source).await.unwrap_or(false) {
            bail!("backup file not found: {name}");
        }

        let _guard = self.table_lock.lock().await;

        // best-effort snapshot of the current table before overwriting it
        if let Err(err) = self.copy_table_to(
            &self
                .backup_dir
                .join(Self::artifact_name("before_restore")),
        )
        .await
        {
            warn!(%err, "pre-restore snapshot failed");
        }

        // stage and rename so readers never see a half-copied table
        let table_name = self
            .cards_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cards.json".to_string());
        let staging = self.cards_path.with_file_name(format!("{table_name}.tmp"));
        fs::copy(&source, &staging)
            .await
            .with_context(|| format!("failed to restore from {}", source.display()))?;
        fs::rename(&staging, &self.cards_path)
            .await
            .with_context(|| format!("failed to replace {}", self.cards_path.display()))?;
        info!(%name, "card table restored from backup");
        Ok(name)
    }

    async fn stats(&self) -> anyhow::Result<BackupStats> {
        let backups = self.collect().await?;
        Ok(BackupStats {
            total_backups: backups.len() as u64,
            hourly_backups: backups.iter().filter(|b| b.is_hourly).count() as u64,
            manual_backups: backups.iter().filter(|b| b.is_manual).count() as u64,
            total_size_bytes: backups.iter().map(|b| b.size_bytes).sum(),
            backup_directory: self.backup_dir.to_string_lossy().into_owned(),
            max_backups: self.max_backups,
            oldest_backup: backups.iter().map(|b| b.modified_time).min(),
            newest_backup: backups.iter().map(|b| b.modified_time).max(),
        })
    }
}
