use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use parkgate_domain::entities::config::RuntimeConfig;

/// Application configuration loaded from a TOML file with environment
/// overrides. Every field has a default so the service can start without
/// a config file at all.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the card table, unknown-card list and activity log.
    pub data_dir: PathBuf,
    /// How many rotated backups to keep per artifact.
    pub max_backups: usize,
    /// Base URL of the slot occupancy sensor controller.
    pub sensor_base_url: String,
    /// Per-request timeout when talking to the sensor controller.
    pub sensor_timeout_seconds: u64,
    /// Distance below which a slot counts as occupied.
    pub detection_threshold_cm: u32,
    /// Interval between automatic card table snapshots.
    pub backup_interval_seconds: u64,
    /// Interval between sensor polls.
    pub sensor_poll_interval_seconds: u64,
    /// Interval between maintenance sweeps.
    pub maintenance_interval_seconds: u64,
    /// How often the scheduler wakes up to check for due tasks.
    pub scheduler_tick_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            max_backups: 5,
            sensor_base_url: "http://192.168.4.1".to_string(),
            sensor_timeout_seconds: 5,
            detection_threshold_cm: 20,
            backup_interval_seconds: 3_600,
            sensor_poll_interval_seconds: 1_800,
            maintenance_interval_seconds: 86_400,
            scheduler_tick_seconds: 60,
        }
    }
}

impl AppConfig {
    /// Load the configuration. The file named by `PARKGATE_CONFIG` is used
    /// when set, otherwise `./config.toml`; a missing file yields defaults.
    /// Environment variables are applied on top in either case.
    pub async fn load() -> Result<Self> {
        let path = env::var("PARKGATE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./config.toml"));

        let mut config = if path.exists() {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            let config: AppConfig = toml::from_str(&raw)
                .with_context(|| format!("failed to parse config file {}", path.display()))?;
            config.resolve_paths(path.parent().unwrap_or_else(|| Path::new(".")))
        } else {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            AppConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Interpret a relative `data_dir` as relative to the config file's
    /// directory rather than the process working directory.
    fn resolve_paths(mut self, base: &Path) -> Self {
        if self.data_dir.is_relative() {
            self.data_dir = base.join(&self.data_dir);
        }
        self
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = env::var("PARKGATE_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(url) = env::var("PARKGATE_SENSOR_URL") {
            self.sensor_base_url = url;
        }
        override_parsed(&mut self.max_backups, "PARKGATE_MAX_BACKUPS");
        override_parsed(&mut self.sensor_timeout_seconds, "PARKGATE_SENSOR_TIMEOUT");
        override_parsed(&mut self.detection_threshold_cm, "PARKGATE_DETECTION_THRESHOLD");
        override_parsed(&mut self.backup_interval_seconds, "PARKGATE_BACKUP_INTERVAL");
        override_parsed(
            &mut self.sensor_poll_interval_seconds,
            "PARKGATE_SENSOR_POLL_INTERVAL",
        );
        override_parsed(
            &mut self.maintenance_interval_seconds,
            "PARKGATE_MAINTENANCE_INTERVAL",
        );
        override_parsed(&mut self.scheduler_tick_seconds, "PARKGATE_SCHEDULER_TICK");
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_backups == 0 {
            bail!("max_backups must be at least 1");
        }
        if self.scheduler_tick_seconds == 0 {
            bail!("scheduler_tick_seconds must be positive");
        }
        if self.backup_interval_seconds == 0
            || self.sensor_poll_interval_seconds == 0
            || self.maintenance_interval_seconds == 0
        {
            bail!("task intervals must be positive");
        }
        if self.sensor_base_url.trim().is_empty() {
            bail!("sensor_base_url must not be empty");
        }
        Ok(())
    }

    /// Derive the concrete file layout the repositories and services use.
    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            data_dir: self.data_dir.clone(),
            cards_file: self.data_dir.join("cards.json"),
            unknown_cards_file: self.data_dir.join("unknown_cards.json"),
            activity_log_file: self.data_dir.join("card_logs.json"),
            backup_dir: self.data_dir.join("backups"),
            max_backups: self.max_backups,
            sensor_base_url: self.sensor_base_url.trim_end_matches('/').to_string(),
            sensor_timeout_seconds: self.sensor_timeout_seconds,
            detection_threshold_cm: self.detection_threshold_cm,
            backup_interval_seconds: self.backup_interval_seconds,
            sensor_poll_interval_seconds: self.sensor_poll_interval_seconds,
            maintenance_interval_seconds: self.maintenance_interval_seconds,
            scheduler_tick_seconds: self.scheduler_tick_seconds,
        }
    }
}

fn override_parsed<T: std::str::FromStr>(target: &mut T, var: &str) {
    if let Ok(raw) = env::var(var) {
        match raw.parse() {
            Ok(value) => *target = value,
            Err(_) => tracing::warn!(%var, %raw, "ignoring unparseable environment override"),
        }
    }
}
