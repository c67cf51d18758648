use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::entities::{
    ActivityPage,
    ActivityQuery,
    ActivityStats,
    BackupInfo,
    BackupStats,
    Card,
    LogAction,
    UnknownCard,
};

/// The card table and its unknown-card companion. Implementations load
/// and replace whole documents; callers own the mutation span.
#[async_trait]
pub trait CardTableRepository: Send + Sync {
    async fn load_cards(&self) -> anyhow::Result<BTreeMap<String, Card>>;
    async fn save_cards(&self, cards: &BTreeMap<String, Card>) -> anyhow::Result<()>;

    async fn load_unknown_cards(&self) -> anyhow::Result<Vec<UnknownCard>>;
    async fn save_unknown_cards(&self, cards: &[UnknownCard]) -> anyhow::Result<()>;
}

/// Append-only activity history with filtered pagination.
#[async_trait]
pub trait ActivityLogStore: Send + Sync {
    async fn append(
        &self,
        card_id: &str,
        action: LogAction,
        details: Map<String, Value>,
        metadata: Map<String, Value>,
    ) -> anyhow::Result<()>;

    async fn query(&self, query: &ActivityQuery) -> anyhow::Result<ActivityPage>;
    async fn statistics(&self) -> anyhow::Result<ActivityStats>;

    /// One-time idempotent rewrite of legacy sequential entry ids.
    /// Returns the number of rewritten entries.
    async fn heal_legacy_ids(&self) -> anyhow::Result<usize>;
}

/// Point-in-time snapshots of the card table file.
#[async_trait]
pub trait BackupStore: Send + Sync {
    /// Copy the live table to a timestamped, reason-tagged artifact.
    async fn snapshot(&self, reason: &str) -> anyhow::Result<String>;
    async fn list(&self) -> anyhow::Result<Vec<BackupInfo>>;
    /// Overwrite the live table with the named artifact, after a
    /// best-effort pre-restore snapshot of the current table.
    async fn restore(&self, filename: &str) -> anyhow::Result<String>;
    async fn stats(&self) -> anyhow::Result<BackupStats>;
}
