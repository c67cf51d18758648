use std::sync::Arc;

use parkgate_domain::ports::{ActivityLogStore, BackupStore, CardTableRepository, SensorClient};
use parkgate_domain::{RuntimeConfig, SchedulerStatus};
use tokio::sync::{Mutex, RwLock};

use crate::Metrics;

/// Shared application context handed to every command and query.
///
/// `table_lock` serializes every load-mutate-store span touching the
/// card table or unknown-card table; concurrent mutations are queued,
/// never lost to a read-modify-write race.
#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub card_table: Arc<dyn CardTableRepository>,
    pub activity_log: Arc<dyn ActivityLogStore>,
    pub backups: Arc<dyn BackupStore>,
    pub sensor: Arc<dyn SensorClient>,
    pub table_lock: Arc<Mutex<()>>,
    pub metrics: Arc<Metrics>,
    pub scheduler_status: Arc<RwLock<SchedulerStatus>>,
}
