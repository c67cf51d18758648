use parkgate_domain::{CardUid, LogAction, UnknownCard};
use serde_json::{Map, Value};

use super::{record_activity, save_failed};
use crate::{AppError, AppState};

/// Track a uid the hardware reported but the table does not know.
/// Adding a uid that is already tracked is a success no-op.
pub async fn record_unknown_card(
    state: &AppState,
    uid: &str,
    metadata: Map<String, Value>,
) -> Result<String, AppError> {
    let normalized = CardUid::normalize(uid);

    let _guard = state.table_lock.lock().await;
    let mut unknown_cards = state.card_table.load_unknown_cards().await?;
    if unknown_cards.iter().any(|card| card.uid == normalized) {
        return Ok(format!("Unknown card {} already exists", normalized));
    }

    unknown_cards.push(UnknownCard::new(&normalized, metadata.clone()));
    state
        .card_table
        .save_unknown_cards(&unknown_cards)
        .await
        .map_err(|err| save_failed(state, err))?;
    drop(_guard);

    record_activity(state, &normalized, LogAction::Unknown, metadata).await;
    Ok(format!("Unknown card {} added successfully", normalized))
}

/// Remove a tracked unknown uid. Removing an untracked uid is a
/// success no-op.
pub async fn remove_unknown_card(state: &AppState, uid: &str) -> Result<String, AppError> {
    let normalized = CardUid::normalize(uid);

    let _guard = state.table_lock.lock().await;
    let unknown_cards = state.card_table.load_unknown_cards().await?;
    let before = unknown_cards.len();
    let remaining: Vec<_> = unknown_cards
        .into_iter()
        .filter(|card| card.uid != normalized)
        .collect();
    if remaining.len() == before {
        return Ok(format!("Unknown card {} was not in list", normalized));
    }

    state
        .card_table
        .save_unknown_cards(&remaining)
        .await
        .map_err(|err| save_failed(state, err))?;
    Ok(format!("Unknown card {} removed successfully", normalized))
}

pub async fn clear_unknown_cards(state: &AppState) -> Result<(), AppError> {
    let _guard = state.table_lock.lock().await;
    state
        .card_table
        .save_unknown_cards(&[])
        .await
        .map_err(|err| save_failed(state, err))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::test_state;
    use parkgate_domain::CardTableRepository;

    #[tokio::test]
    async fn duplicate_add_is_a_success_no_op() {
        let (state, ports) = test_state();
        record_unknown_card(&state, "ab99", Map::new())
            .await
            .expect("first add");
        let message = record_unknown_card(&state, " AB99 ", Map::new())
            .await
            .expect("second add");
        assert!(message.contains("already exists"));
        assert_eq!(
            ports
                .cards
                .load_unknown_cards()
                .await
                .expect("load")
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn remove_untracked_uid_is_a_success_no_op() {
        let (state, _ports) = test_state();
        let message = remove_unknown_card(&state, "AB99").await.expect("remove");
        assert!(message.contains("was not in list"));
    }

    #[tokio::test]
    async fn clear_empties_the_table() {
        let (state, ports) = test_state();
        record_unknown_card(&state, "AB99", Map::new())
            .await
            .expect("add");
        clear_unknown_cards(&state).await.expect("clear");
        assert!(ports
            .cards
            .load_unknown_cards()
            .await
            .expect("load")
            .is_empty());
    }
}
