// Occupancy sensor entities
// Readings fetched from the lot's ultrasonic sensor controller

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotReading {
    pub slot_id: u32,
    pub distance_cm: u32,
    pub occupied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub ic_count: u32,
    pub total_sensors: u32,
    /// Controller uptime timestamp, milliseconds.
    pub device_timestamp_ms: u64,
    pub slots: Vec<SlotReading>,
    pub fetched_at: DateTime<Utc>,
}

impl SensorSnapshot {
    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.occupied).count()
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.slots.is_empty() {
            errors.push("snapshot carries no slot readings".to_string());
        }
        if self.slots.len() > self.total_sensors as usize {
            errors.push(format!(
                "snapshot has {} readings but controller reports {} sensors",
                self.slots.len(),
                self.total_sensors
            ));
        }
        errors
    }
}
