use parkgate_domain::{ActivityPage, ActivityQuery, ActivityStats};

use crate::{AppError, AppState};

pub async fn query_logs(state: &AppState, query: &ActivityQuery) -> Result<ActivityPage, AppError> {
    Ok(state.activity_log.query(query).await?)
}

pub async fn log_statistics(state: &AppState) -> Result<ActivityStats, AppError> {
    Ok(state.activity_log.statistics().await?)
}
