use async_trait::async_trait;

use crate::entities::SensorSnapshot;

/// Occupancy-sensor controller reached over the network. Only the
/// scheduler's polling task and explicit admin calls go through here.
#[async_trait]
pub trait SensorClient: Send + Sync {
    async fn fetch_slots(&self) -> anyhow::Result<SensorSnapshot>;
    async fn reset_sensors(&self) -> anyhow::Result<String>;
}
