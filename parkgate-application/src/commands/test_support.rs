// In-memory port implementations for command/query tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parkgate_domain::ports::{ActivityLogStore, BackupStore, CardTableRepository, SensorClient};
use parkgate_domain::{
    ActivityEntry, ActivityPage, ActivityQuery, ActivityStats, BackupInfo, BackupStats, Card,
    LogAction, RuntimeConfig, SchedulerStatus, SensorSnapshot, UnknownCard,
};
use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};

use crate::{AppState, Metrics};

#[derive(Default)]
pub struct MemoryCardTable {
    cards: Mutex<BTreeMap<String, Card>>,
    unknown: Mutex<Vec<UnknownCard>>,
    saves: AtomicUsize,
    fail: AtomicBool,
}

impl MemoryCardTable {
    pub async fn dump(&self) -> Value {
        serde_json::to_value(&*self.cards.lock().await).expect("serialize table")
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_saves(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CardTableRepository for MemoryCardTable {
    async fn load_cards(&self) -> anyhow::Result<BTreeMap<String, Card>> {
        Ok(self.cards.lock().await.clone())
    }

    async fn save_cards(&self, cards: &BTreeMap<String, Card>) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("card table unavailable");
        }
        *self.cards.lock().await = cards.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_unknown_cards(&self) -> anyhow::Result<Vec<UnknownCard>> {
        Ok(self.unknown.lock().await.clone())
    }

    async fn save_unknown_cards(&self, cards: &[UnknownCard]) -> anyhow::Result<()> {
        *self.unknown.lock().await = cards.to_vec();
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryActivityLog {
    entries: Mutex<Vec<ActivityEntry>>,
    fail: AtomicBool,
}

impl MemoryActivityLog {
    pub fn fail_appends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ActivityLogStore for MemoryActivityLog {
    async fn append(
        &self,
        card_id: &str,
        action: LogAction,
        details: Map<String, Value>,
        metadata: Map<String, Value>,
    ) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("log store unavailable");
        }
        self.entries
            .lock()
            .await
            .push(ActivityEntry::new(card_id, action, details, metadata));
        Ok(())
    }

    async fn query(&self, query: &ActivityQuery) -> anyhow::Result<ActivityPage> {
        let entries = self.entries.lock().await;
        let mut filtered: Vec<ActivityEntry> = entries
            .iter()
            .filter(|entry| {
                query
                    .card_id
                    .as_deref()
                    .map_or(true, |card_id| entry.card_id == card_id)
            })
            .filter(|entry| query.action.map_or(true, |action| entry.action == action))
            .cloned()
            .collect();
        // Newest first; appends with equal timestamps keep newest-append
        // ahead because the stable sort sees them already reversed.
        filtered.reverse();
        filtered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let total_count = filtered.len() as u64;
        let page: Vec<ActivityEntry> = filtered
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();
        let page_count = page.len() as u64;
        Ok(ActivityPage {
            entries: page,
            total_count,
            page_count,
            has_more: (query.offset + query.limit) < total_count as usize,
        })
    }

    async fn statistics(&self) -> anyhow::Result<ActivityStats> {
        let entries = self.entries.lock().await;
        Ok(ActivityStats {
            total_logs: entries.len() as u64,
            ..Default::default()
        })
    }

    async fn heal_legacy_ids(&self) -> anyhow::Result<usize> {
        Ok(0)
    }
}

#[derive(Default)]
pub struct MemoryBackupStore {
    snapshots: Mutex<Vec<String>>,
}

impl MemoryBackupStore {
    pub async fn snapshot_names(&self) -> Vec<String> {
        self.snapshots.lock().await.clone()
    }
}

#[async_trait]
impl BackupStore for MemoryBackupStore {
    async fn snapshot(&self, reason: &str) -> anyhow::Result<String> {
        let mut snapshots = self.snapshots.lock().await;
        let name = format!("cards_backup_{:04}_{}.json", snapshots.len(), reason);
        snapshots.push(name.clone());
        Ok(name)
    }

    async fn list(&self) -> anyhow::Result<Vec<BackupInfo>> {
        let now = Utc::now();
        Ok(self
            .snapshots
            .lock()
            .await
            .iter()
            .map(|name| BackupInfo {
                filename: name.clone(),
                path: name.clone(),
                size_bytes: 2,
                created_time: now,
                modified_time: now,
                is_hourly: name.contains("hourly"),
                is_manual: name.contains("manual"),
            })
            .collect())
    }

    async fn restore(&self, filename: &str) -> anyhow::Result<String> {
        let known = self
            .snapshots
            .lock()
            .await
            .iter()
            .any(|name| name == filename);
        if !known {
            anyhow::bail!("Backup file not found: {}", filename);
        }
        self.snapshots
            .lock()
            .await
            .push("cards_backup_9999_before_restore.json".to_string());
        Ok(format!("Data restored from backup: {}", filename))
    }

    async fn stats(&self) -> anyhow::Result<BackupStats> {
        let snapshots = self.snapshots.lock().await;
        Ok(BackupStats {
            total_backups: snapshots.len() as u64,
            ..Default::default()
        })
    }
}

pub struct NullSensorClient;

#[async_trait]
impl SensorClient for NullSensorClient {
    async fn fetch_slots(&self) -> anyhow::Result<SensorSnapshot> {
        anyhow::bail!("sensor not wired in tests")
    }

    async fn reset_sensors(&self) -> anyhow::Result<String> {
        anyhow::bail!("sensor not wired in tests")
    }
}

pub struct TestPorts {
    pub cards: Arc<MemoryCardTable>,
    pub log: Arc<MemoryActivityLog>,
    pub backups: Arc<MemoryBackupStore>,
}

fn test_config() -> RuntimeConfig {
    RuntimeConfig {
        data_dir: "./data".into(),
        cards_file: "./data/cards.json".into(),
        unknown_cards_file: "./data/unknown_cards.json".into(),
        activity_log_file: "./data/card_logs.json".into(),
        backup_dir: "./data/backups".into(),
        max_backups: 5,
        sensor_base_url: "http://127.0.0.1:8266".to_string(),
        sensor_timeout_seconds: 5,
        detection_threshold_cm: 20,
        backup_interval_seconds: 3600,
        sensor_poll_interval_seconds: 1800,
        maintenance_interval_seconds: 86_400,
        scheduler_tick_seconds: 60,
    }
}

pub fn test_state() -> (AppState, TestPorts) {
    let cards = Arc::new(MemoryCardTable::default());
    let log = Arc::new(MemoryActivityLog::default());
    let backups = Arc::new(MemoryBackupStore::default());
    let state = AppState {
        config: test_config(),
        card_table: cards.clone(),
        activity_log: log.clone(),
        backups: backups.clone(),
        sensor: Arc::new(NullSensorClient),
        table_lock: Arc::new(Mutex::new(())),
        metrics: Arc::new(Metrics::default()),
        scheduler_status: Arc::new(RwLock::new(SchedulerStatus::default())),
    };
    (
        state,
        TestPorts {
            cards,
            log,
            backups,
        },
    )
}
