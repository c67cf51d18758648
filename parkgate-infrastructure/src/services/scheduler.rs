use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use parkgate_application::commands::create_backup;
use parkgate_application::AppState;
use parkgate_domain::entities::TaskTiming;

/// Handle to the running scheduler loop. Dropping it does not stop the
/// loop; call `stop` for a clean shutdown.
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal the loop to exit and wait for it to drain.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(err) = self.task.await {
            warn!(%err, "scheduler task did not exit cleanly");
        }
    }
}

/// Spawn the background loop. Every tick it runs whichever periodic
/// tasks are due; a failing task is logged and retried on its next due
/// time, never aborting the loop. All three tasks run on the first tick.
pub fn start_scheduler(state: AppState) -> SchedulerHandle {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(scheduler_loop(state, shutdown_rx));
    SchedulerHandle { shutdown_tx, task }
}

async fn scheduler_loop(state: AppState, mut shutdown: watch::Receiver<bool>) {
    let tick = Duration::from_secs(state.config.scheduler_tick_seconds);
    {
        let mut status = state.scheduler_status.write().await;
        status.running = true;
        status.backup = TaskTiming::new(state.config.backup_interval_seconds);
        status.sensor_poll = TaskTiming::new(state.config.sensor_poll_interval_seconds);
        status.maintenance = TaskTiming::new(state.config.maintenance_interval_seconds);
    }
    info!(
        tick_seconds = state.config.scheduler_tick_seconds,
        "scheduler started"
    );

    loop {
        let now = Utc::now();
        let (backup_due, sensor_due, maintenance_due) = {
            let status = state.scheduler_status.read().await;
            (
                status.backup.is_due(now),
                status.sensor_poll.is_due(now),
                status.maintenance.is_due(now),
            )
        };

        if backup_due {
            run_backup_task(&state).await;
            state.scheduler_status.write().await.backup.mark_run(Utc::now());
        }
        if sensor_due {
            run_sensor_poll(&state).await;
            state
                .scheduler_status
                .write()
                .await
                .sensor_poll
                .mark_run(Utc::now());
        }
        if maintenance_due {
            run_maintenance(&state).await;
            state
                .scheduler_status
                .write()
                .await
                .maintenance
                .mark_run(Utc::now());
        }
        state.scheduler_status.write().await.current_time = Some(Utc::now());

        tokio::select! {
            _ = tokio::time::sleep(tick) => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    state.scheduler_status.write().await.running = false;
    info!("scheduler stopped");
}

async fn run_backup_task(state: &AppState) {
    match create_backup(state, "hourly").await {
        Ok(artifact) => info!(%artifact, "scheduled backup created"),
        Err(err) => warn!(%err, "scheduled backup failed"),
    }
}

async fn run_sensor_poll(state: &AppState) {
    match state.sensor.fetch_slots().await {
        Ok(snapshot) => {
            state.metrics.record_sensor_poll(true);
            for problem in snapshot.validate() {
                warn!(%problem, "sensor snapshot anomaly");
            }
            info!(
                occupied = snapshot.occupied_count(),
                total = snapshot.slots.len(),
                "sensor poll completed"
            );
        }
        Err(err) => {
            state.metrics.record_sensor_poll(false);
            warn!(%err, "sensor poll failed");
        }
    }
}

/// Daily sweep: surface log and backup health in the service log.
async fn run_maintenance(state: &AppState) {
    match state.activity_log.statistics().await {
        Ok(stats) => info!(
            total_logs = stats.total_logs,
            file_size = stats.log_file_size,
            "maintenance: activity log health"
        ),
        Err(err) => warn!(%err, "maintenance: activity log statistics failed"),
    }
    match state.backups.stats().await {
        Ok(stats) => info!(
            total_backups = stats.total_backups,
            size_bytes = stats.total_size_bytes,
            "maintenance: backup health"
        ),
        Err(err) => warn!(%err, "maintenance: backup statistics failed"),
    }
}
