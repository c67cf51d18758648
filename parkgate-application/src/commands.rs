pub mod backup_commands;
pub mod card_commands;
pub mod unknown_card_commands;

#[cfg(test)]
pub(crate) mod test_support;

pub use backup_commands::*;
pub use card_commands::*;
pub use unknown_card_commands::*;

use parkgate_domain::LogAction;
use serde_json::{Map, Value};
use tracing::warn;

use crate::{AppError, AppState};

/// A table write that failed mid-mutation. Counted before being
/// surfaced as an io fault.
pub(crate) fn save_failed(state: &AppState, err: anyhow::Error) -> AppError {
    state.metrics.record_mutation_error();
    AppError::Io(err.to_string())
}

/// Best-effort activity-log append. The primary mutation is already
/// durably committed when this runs; a log failure is warned about and
/// swallowed, never surfaced to the caller.
pub(crate) async fn record_activity(
    state: &AppState,
    card_id: &str,
    action: LogAction,
    details: Map<String, Value>,
) {
    if let Err(err) = state
        .activity_log
        .append(card_id, action, details, Map::new())
        .await
    {
        warn!(
            "failed to log action {} for card {}: {}",
            action.as_str(),
            card_id,
            err
        );
    }
}
