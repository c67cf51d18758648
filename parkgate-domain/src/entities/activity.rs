// Activity log entities
// Append-only history of every action taken on any card

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Action taken against a card or the system as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogAction {
    Entry,
    Exit,
    Scan,
    Created,
    Deleted,
    Updated,
    Unknown,
    Backup,
    Restore,
}

impl LogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::Entry => "entry",
            LogAction::Exit => "exit",
            LogAction::Scan => "scan",
            LogAction::Created => "created",
            LogAction::Deleted => "deleted",
            LogAction::Updated => "updated",
            LogAction::Unknown => "unknown",
            LogAction::Backup => "backup",
            LogAction::Restore => "restore",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub card_id: String,
    pub action: LogAction,
    #[serde(default)]
    pub details: Map<String, Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl ActivityEntry {
    pub fn new(
        card_id: &str,
        action: LogAction,
        details: Map<String, Value>,
        metadata: Map<String, Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            card_id: card_id.to_string(),
            action,
            details,
            metadata,
        }
    }
}

/// On-disk shape of the activity log file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogDocument {
    #[serde(default)]
    pub logs: Vec<ActivityEntry>,
    pub created_at: DateTime<Utc>,
    pub version: String,
}

impl ActivityLogDocument {
    pub fn empty() -> Self {
        Self {
            logs: Vec::new(),
            created_at: Utc::now(),
            version: "1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActivityQuery {
    pub card_id: Option<String>,
    pub action: Option<LogAction>,
    pub limit: usize,
    pub offset: usize,
}

impl ActivityQuery {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            card_id: None,
            action: None,
            limit,
            offset,
        }
    }
}

/// One page of the filtered, newest-first log.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityPage {
    pub entries: Vec<ActivityEntry>,
    /// Total matches after filtering, before pagination.
    pub total_count: u64,
    /// Matches in this page.
    pub page_count: u64,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ActivityStats {
    pub total_logs: u64,
    pub action_counts: HashMap<String, u64>,
    /// Entries per day for the last 7 days, keyed "%Y-%m-%d".
    pub daily_activity: HashMap<String, u64>,
    /// Ten most frequent card ids, most active first.
    pub top_active_cards: Vec<(String, u64)>,
    pub log_file_size: u64,
    pub oldest_log: Option<DateTime<Utc>>,
    pub newest_log: Option<DateTime<Utc>>,
}
