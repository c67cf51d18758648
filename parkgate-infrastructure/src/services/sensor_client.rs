use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use parkgate_domain::entities::{RuntimeConfig, SensorSnapshot, SlotReading};
use parkgate_domain::ports::SensorClient;

/// Reqwest client against the lot's sensor controller. The controller
/// exposes `GET /data` with raw distance readings and `POST /detect`
/// to re-run detection calibration.
pub struct HttpSensorClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    detection_threshold_cm: u32,
}

#[derive(Debug, Deserialize)]
struct RawSensorResponse {
    #[serde(rename = "soIC")]
    ic_count: Option<u32>,
    #[serde(rename = "totalSensors")]
    total_sensors: Option<u32>,
    timestamp: Option<u64>,
    data: Option<Vec<u32>>,
}

#[derive(Debug, Deserialize)]
struct RawResetResponse {
    success: Option<bool>,
    message: Option<String>,
}

impl HttpSensorClient {
    pub fn new(config: &RuntimeConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.sensor_timeout_seconds);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build sensor HTTP client")?;
        Ok(Self {
            client,
            base_url: config.sensor_base_url.clone(),
            timeout,
            detection_threshold_cm: config.detection_threshold_cm,
        })
    }

    fn parse_snapshot(&self, raw: RawSensorResponse) -> anyhow::Result<SensorSnapshot> {
        let Some(data) = raw.data else {
            bail!("sensor response is missing the 'data' field");
        };
        let slots = data
            .iter()
            .enumerate()
            .map(|(idx, &distance_cm)| SlotReading {
                slot_id: idx as u32 + 1,
                distance_cm,
                occupied: distance_cm > 0 && distance_cm < self.detection_threshold_cm,
            })
            .collect::<Vec<_>>();
        Ok(SensorSnapshot {
            ic_count: raw.ic_count.unwrap_or(0),
            total_sensors: raw.total_sensors.unwrap_or(slots.len() as u32),
            device_timestamp_ms: raw.timestamp.unwrap_or(0),
            slots,
            fetched_at: Utc::now(),
        })
    }
}

#[async_trait]
impl SensorClient for HttpSensorClient {
    async fn fetch_slots(&self) -> anyhow::Result<SensorSnapshot> {
        let url = format!("{}/data", self.base_url);
        debug!(%url, "polling sensor controller");
        let raw: RawSensorResponse = self
            .client
            .get(&url)
            .send()
            .await
            .context("sensor controller unreachable")?
            .error_for_status()
            .context("sensor controller returned an error status")?
            .json()
            .await
            .context("sensor controller sent invalid JSON")?;
        self.parse_snapshot(raw)
    }

    async fn reset_sensors(&self) -> anyhow::Result<String> {
        let url = format!("{}/detect", self.base_url);
        // calibration takes longer than a normal poll
        let raw: RawResetResponse = self
            .client
            .post(&url)
            .timeout(self.timeout * 2)
            .send()
            .await
            .context("sensor controller unreachable")?
            .error_for_status()
            .context("sensor controller returned an error status")?
            .json()
            .await
            .context("sensor controller sent invalid JSON")?;
        if raw.success == Some(false) {
            bail!(
                "sensor reset rejected: {}",
                raw.message.unwrap_or_else(|| "no message".to_string())
            );
        }
        Ok(raw
            .message
            .unwrap_or_else(|| "sensor detection restarted".to_string()))
    }
}
