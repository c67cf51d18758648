// Scheduler status entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TaskTiming {
    pub interval_seconds: u64,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    pub seconds_until_next: u64,
}

impl TaskTiming {
    pub fn new(interval_seconds: u64) -> Self {
        Self {
            interval_seconds,
            ..Default::default()
        }
    }

    /// Record a completed run and project the next due time.
    pub fn mark_run(&mut self, at: DateTime<Utc>) {
        self.last_run = Some(at);
        self.next_run = Some(at + chrono::Duration::seconds(self.interval_seconds as i64));
    }

    pub fn refresh_countdown(&mut self, now: DateTime<Utc>) {
        self.seconds_until_next = match self.next_run {
            Some(next) => (next - now).num_seconds().max(0) as u64,
            None => 0,
        };
    }

    /// A task with no recorded run is immediately due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_run {
            Some(last) => (now - last).num_seconds() >= self.interval_seconds as i64,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SchedulerStatus {
    pub running: bool,
    pub current_time: Option<DateTime<Utc>>,
    pub backup: TaskTiming,
    pub sensor_poll: TaskTiming,
    pub maintenance: TaskTiming,
}
