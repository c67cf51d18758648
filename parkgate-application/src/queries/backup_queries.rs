use parkgate_domain::{BackupInfo, BackupStats};

use crate::{AppError, AppState};

pub async fn list_backups(state: &AppState) -> Result<Vec<BackupInfo>, AppError> {
    state
        .backups
        .list()
        .await
        .map_err(|err| AppError::Io(err.to_string()))
}

pub async fn backup_stats(state: &AppState) -> Result<BackupStats, AppError> {
    state
        .backups
        .stats()
        .await
        .map_err(|err| AppError::Io(err.to_string()))
}
