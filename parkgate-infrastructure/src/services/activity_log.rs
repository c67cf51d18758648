use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{Duration, Local, Utc};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use parkgate_domain::entities::{
    ActivityEntry,
    ActivityLogDocument,
    ActivityPage,
    ActivityQuery,
    ActivityStats,
    LogAction,
};
use parkgate_domain::ports::ActivityLogStore;

use crate::repositories::json_store::JsonStore;

/// Hard cap on retained entries; once exceeded the file is trimmed down
/// to the newest `TRIM_TO`.
const MAX_LOG_ENTRIES: usize = 10_000;
const TRIM_TO: usize = 8_000;

/// File-backed activity log. Appends are serialized through an internal
/// lock; the log file itself is rewritten without sibling backups since
/// the card table snapshots cover disaster recovery.
pub struct JsonActivityLog {
    store: JsonStore,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonActivityLog {
    pub fn new(store: JsonStore, path: PathBuf) -> Self {
        Self {
            store,
            path,
            write_lock: Mutex::new(()),
        }
    }

    async fn read_document(&self) -> ActivityLogDocument {
        self.store
            .read_or_default(&self.path, ActivityLogDocument::empty())
            .await
    }

    async fn write_document(&self, document: &ActivityLogDocument) -> anyhow::Result<()> {
        self.store
            .write_with_backup(&self.path, document, false)
            .await
    }
}

#[async_trait]
impl ActivityLogStore for JsonActivityLog {
    async fn append(
        &self,
        card_id: &str,
        action: LogAction,
        details: Map<String, Value>,
        metadata: Map<String, Value>,
    ) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut details = details;
        details.insert(
            "local_time".to_string(),
            Value::String(Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        );

        let mut document = self.read_document().await;
        document
            .logs
            .push(ActivityEntry::new(card_id, action, details, metadata));

        if document.logs.len() > MAX_LOG_ENTRIES {
            let excess = document.logs.len() - TRIM_TO;
            document.logs.drain(..excess);
            info!(kept = TRIM_TO, "activity log trimmed");
        }

        self.write_document(&document).await
    }

    async fn query(&self, query: &ActivityQuery) -> anyhow::Result<ActivityPage> {
        let document = self.read_document().await;

        let mut matches: Vec<ActivityEntry> = document
            .logs
            .into_iter()
            .filter(|entry| {
                query
                    .card_id
                    .as_deref()
                    .map_or(true, |card_id| entry.card_id == card_id)
            })
            .filter(|entry| query.action.map_or(true, |action| entry.action == action))
            .collect();
        matches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let total_count = matches.len() as u64;
        let entries: Vec<ActivityEntry> = matches
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();
        let page_count = entries.len() as u64;
        let has_more = (query.offset as u64 + page_count) < total_count;

        Ok(ActivityPage {
            entries,
            total_count,
            page_count,
            has_more,
        })
    }

    async fn statistics(&self) -> anyhow::Result<ActivityStats> {
        let document = self.read_document().await;

        let mut action_counts: HashMap<String, u64> = HashMap::new();
        let mut card_counts: HashMap<String, u64> = HashMap::new();
        let mut daily_activity: HashMap<String, u64> = HashMap::new();
        let week_ago = Utc::now() - Duration::days(7);

        for entry in &document.logs {
            *action_counts
                .entry(entry.action.as_str().to_string())
                .or_insert(0) += 1;
            *card_counts.entry(entry.card_id.clone()).or_insert(0) += 1;
            if entry.timestamp >= week_ago {
                let day = entry.timestamp.format("%Y-%m-%d").to_string();
                *daily_activity.entry(day).or_insert(0) += 1;
            }
        }

        let mut top_active_cards: Vec<(String, u64)> = card_counts.into_iter().collect();
        top_active_cards.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_active_cards.truncate(10);

        let log_file_size = tokio::fs::metadata(&self.path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(ActivityStats {
            total_logs: document.logs.len() as u64,
            action_counts,
            daily_activity,
            top_active_cards,
            log_file_size,
            oldest_log: document.logs.iter().map(|e| e.timestamp).min(),
            newest_log: document.logs.iter().map(|e| e.timestamp).max(),
        })
    }

    async fn heal_legacy_ids(&self) -> anyhow::Result<usize> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.read_document().await;
        let legacy: Vec<usize> = document
            .logs
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.id.starts_with("log_"))
            .map(|(idx, _)| idx)
            .collect();
        if legacy.is_empty() {
            return Ok(0);
        }

        for idx in &legacy {
            document.logs[*idx].id = Uuid::new_v4().to_string();
        }
        self.write_document(&document).await?;
        warn!(rewritten = legacy.len(), "rewrote legacy activity log ids");
        Ok(legacy.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_in(dir: &tempfile::TempDir) -> JsonActivityLog {
        JsonActivityLog::new(JsonStore::new(3), dir.path().join("card_logs.json"))
    }

    #[tokio::test]
    async fn append_creates_file_and_stamps_local_time() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);

        log.append("AB12", LogAction::Entry, Map::new(), Map::new())
            .await
            .unwrap();

        let page = log.query(&ActivityQuery::new(10, 0)).await.unwrap();
        assert_eq!(page.total_count, 1);
        let entry = &page.entries[0];
        assert_eq!(entry.card_id, "AB12");
        assert_eq!(entry.action, LogAction::Entry);
        assert!(entry.details.contains_key("local_time"));
        assert!(Uuid::parse_str(&entry.id).is_ok());
    }

    #[tokio::test]
    async fn query_filters_and_paginates_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);

        for i in 0..5 {
            let card = if i % 2 == 0 { "AB12" } else { "CD34" };
            log.append(card, LogAction::Scan, Map::new(), Map::new())
                .await
                .unwrap();
        }
        log.append("AB12", LogAction::Exit, Map::new(), Map::new())
            .await
            .unwrap();

        let query = ActivityQuery {
            card_id: Some("AB12".to_string()),
            action: None,
            limit: 2,
            offset: 0,
        };
        let page = log.query(&query).await.unwrap();
        assert_eq!(page.total_count, 4);
        assert_eq!(page.page_count, 2);
        assert!(page.has_more);
        // newest entry is the exit
        assert_eq!(page.entries[0].action, LogAction::Exit);

        let query = ActivityQuery {
            card_id: None,
            action: Some(LogAction::Exit),
            limit: 10,
            offset: 0,
        };
        let page = log.query(&query).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn oversized_log_is_trimmed_to_the_newest_entries() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);

        // Seed a document just over the cap, then append once.
        let mut document = ActivityLogDocument::empty();
        for i in 0..MAX_LOG_ENTRIES {
            let mut entry = ActivityEntry::new("AB12", LogAction::Scan, Map::new(), Map::new());
            entry.details.insert("seq".to_string(), serde_json::json!(i));
            document.logs.push(entry);
        }
        std::fs::write(
            dir.path().join("card_logs.json"),
            serde_json::to_string(&document).unwrap(),
        )
        .unwrap();

        log.append("AB12", LogAction::Entry, Map::new(), Map::new())
            .await
            .unwrap();

        let page = log.query(&ActivityQuery::new(1, 0)).await.unwrap();
        assert_eq!(page.total_count, TRIM_TO as u64);
        // survivors are the newest ones
        assert_eq!(page.entries[0].action, LogAction::Entry);
    }

    #[tokio::test]
    async fn legacy_ids_are_rewritten_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);

        let mut document = ActivityLogDocument::empty();
        for i in 0..3 {
            let mut entry = ActivityEntry::new("AB12", LogAction::Scan, Map::new(), Map::new());
            entry.id = format!("log_{i}");
            document.logs.push(entry);
        }
        std::fs::write(
            dir.path().join("card_logs.json"),
            serde_json::to_string(&document).unwrap(),
        )
        .unwrap();

        assert_eq!(log.heal_legacy_ids().await.unwrap(), 3);
        assert_eq!(log.heal_legacy_ids().await.unwrap(), 0);

        let page = log.query(&ActivityQuery::new(10, 0)).await.unwrap();
        for entry in &page.entries {
            assert!(Uuid::parse_str(&entry.id).is_ok());
        }
    }

    #[tokio::test]
    async fn statistics_count_actions_and_cards() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);

        for _ in 0..3 {
            log.append("AB12", LogAction::Entry, Map::new(), Map::new())
                .await
                .unwrap();
        }
        log.append("CD34", LogAction::Exit, Map::new(), Map::new())
            .await
            .unwrap();

        let stats = log.statistics().await.unwrap();
        assert_eq!(stats.total_logs, 4);
        assert_eq!(stats.action_counts["entry"], 3);
        assert_eq!(stats.action_counts["exit"], 1);
        assert_eq!(stats.top_active_cards[0], ("AB12".to_string(), 3));
        assert!(stats.log_file_size > 0);
        assert!(stats.oldest_log.is_some());
        assert!(stats.newest_log >= stats.oldest_log);
    }
}
