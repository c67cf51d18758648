use chrono::Utc;
use parkgate_domain::SchedulerStatus;

use crate::AppState;

/// Snapshot of the scheduler's task timings with live countdowns.
pub async fn scheduler_status(state: &AppState) -> SchedulerStatus {
    let mut status = state.scheduler_status.read().await.clone();
    let now = Utc::now();
    status.current_time = Some(now);
    status.backup.refresh_countdown(now);
    status.sensor_poll.refresh_countdown(now);
    status.maintenance.refresh_countdown(now);
    status
}
