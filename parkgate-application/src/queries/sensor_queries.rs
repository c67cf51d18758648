use parkgate_domain::SensorSnapshot;

use crate::{AppError, AppState};

/// Live slot readings from the occupancy sensor controller.
pub async fn sensor_snapshot(state: &AppState) -> Result<SensorSnapshot, AppError> {
    let snapshot = state
        .sensor
        .fetch_slots()
        .await
        .map_err(|err| AppError::Upstream(err.to_string()))?;
    state.metrics.record_sensor_poll(true);
    Ok(snapshot)
}

/// Ask the controller to re-run its detection calibration.
pub async fn reset_sensors(state: &AppState) -> Result<String, AppError> {
    state
        .sensor
        .reset_sensors()
        .await
        .map_err(|err| AppError::Upstream(err.to_string()))
}
