use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use parkgate_application::{AppState, Metrics};
use parkgate_domain::ports::ActivityLogStore;
use parkgate_infrastructure::{
    AppConfig, FileBackupManager, HttpSensorClient, JsonActivityLog, JsonCardTable, JsonStore,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config();

        let store = JsonStore::new(runtime_config.max_backups);
        let table_lock = Arc::new(Mutex::new(()));

        let card_table = Arc::new(JsonCardTable::new(
            store.clone(),
            runtime_config.cards_file.clone(),
            runtime_config.unknown_cards_file.clone(),
        ));
        let activity_log = Arc::new(JsonActivityLog::new(
            store,
            runtime_config.activity_log_file.clone(),
        ));
        let backups = Arc::new(FileBackupManager::new(
            runtime_config.cards_file.clone(),
            runtime_config.backup_dir.clone(),
            runtime_config.max_backups,
            table_lock.clone(),
        ));
        let sensor = Arc::new(HttpSensorClient::new(&runtime_config)?);

        // one-shot migration of pre-uuid log entries
        match activity_log.heal_legacy_ids().await {
            Ok(0) => {}
            Ok(healed) => info!(healed, "migrated legacy activity log ids"),
            Err(err) => warn!(%err, "legacy log id migration failed"),
        }

        let state = AppState {
            config: runtime_config,
            card_table,
            activity_log,
            backups,
            sensor,
            table_lock,
            metrics: Arc::new(Metrics::default()),
            scheduler_status: Arc::new(RwLock::new(Default::default())),
        };

        Ok(Self { state })
    }
}
