// Backup artifact metadata

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct BackupInfo {
    pub filename: String,
    pub path: String,
    pub size_bytes: u64,
    pub created_time: DateTime<Utc>,
    pub modified_time: DateTime<Utc>,
    pub is_hourly: bool,
    pub is_manual: bool,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct BackupStats {
    pub total_backups: u64,
    pub hourly_backups: u64,
    pub manual_backups: u64,
    pub total_size_bytes: u64,
    pub backup_directory: String,
    pub max_backups: usize,
    pub oldest_backup: Option<DateTime<Utc>>,
    pub newest_backup: Option<DateTime<Utc>>,
}
