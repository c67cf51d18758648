// Runtime configuration carried in application state

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub data_dir: PathBuf,
    pub cards_file: PathBuf,
    pub unknown_cards_file: PathBuf,
    pub activity_log_file: PathBuf,
    pub backup_dir: PathBuf,
    pub max_backups: usize,
    pub sensor_base_url: String,
    pub sensor_timeout_seconds: u64,
    pub detection_threshold_cm: u32,
    pub backup_interval_seconds: u64,
    pub sensor_poll_interval_seconds: u64,
    pub maintenance_interval_seconds: u64,
    pub scheduler_tick_seconds: u64,
}
