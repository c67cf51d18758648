use parkgate_domain::LogAction;
use serde_json::{Map, Value};

use super::record_activity;
use crate::{AppError, AppState};

fn tag_details(reason: &str, artifact: &str) -> Map<String, Value> {
    let mut details = Map::new();
    details.insert("reason".to_string(), Value::from(reason));
    details.insert("artifact".to_string(), Value::from(artifact));
    details
}

/// Snapshot the card table to a reason-tagged artifact and log it.
pub async fn create_backup(state: &AppState, reason: &str) -> Result<String, AppError> {
    let artifact = state
        .backups
        .snapshot(reason)
        .await
        .map_err(|err| AppError::Io(err.to_string()))?;
    state.metrics.record_backup();
    record_activity(state, "system", LogAction::Backup, tag_details(reason, &artifact)).await;
    Ok(artifact)
}

/// Manual trigger used by admin operations.
pub async fn force_backup_now(state: &AppState) -> Result<String, AppError> {
    create_backup(state, "force_backup").await
}

/// Overwrite the live table with a named artifact. The backup store
/// snapshots the current table first so the restore is reversible.
pub async fn restore_backup(state: &AppState, filename: &str) -> Result<String, AppError> {
    let known = state
        .backups
        .list()
        .await
        .map_err(|err| AppError::Io(err.to_string()))?
        .iter()
        .any(|info| info.filename == filename);
    if !known {
        return Err(AppError::NotFound(format!(
            "Backup file not found: {}",
            filename
        )));
    }

    let message = state
        .backups
        .restore(filename)
        .await
        .map_err(|err| AppError::Io(err.to_string()))?;
    record_activity(
        state,
        "system",
        LogAction::Restore,
        tag_details("restore", filename),
    )
    .await;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::test_state;
    use parkgate_domain::ActivityQuery;

    #[tokio::test]
    async fn backup_is_logged_with_its_reason() {
        let (state, ports) = test_state();
        create_backup(&state, "hourly").await.expect("backup");
        assert_eq!(ports.backups.snapshot_names().await.len(), 1);

        let mut query = ActivityQuery::new(10, 0);
        query.action = Some(LogAction::Backup);
        let page = state.activity_log.query(&query).await.expect("query");
        assert_eq!(page.total_count, 1);
        assert_eq!(page.entries[0].details["reason"], "hourly");
    }

    #[tokio::test]
    async fn restoring_missing_artifact_reports_not_found() {
        let (state, _ports) = test_state();
        let err = restore_backup(&state, "cards_backup_nope.json")
            .await
            .expect_err("missing artifact");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn restore_goes_through_after_snapshot_exists() {
        let (state, ports) = test_state();
        let artifact = create_backup(&state, "manual_admin").await.expect("backup");
        let message = restore_backup(&state, &artifact).await.expect("restore");
        assert!(message.contains(&artifact));
        // The store took a safety snapshot before overwriting.
        assert!(ports
            .backups
            .snapshot_names()
            .await
            .iter()
            .any(|name| name.contains("before_restore")));
    }
}
