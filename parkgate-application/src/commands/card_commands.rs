use parkgate_domain::{Card, CardStatus, CardUid, LogAction, StatusChange};
use serde_json::{Map, Value};

use super::{record_activity, save_failed};
use crate::{AppError, AppState};

fn details(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

/// Register a new card. Fails with `Conflict` if the uid is already in
/// the table.
pub async fn create_card(
    state: &AppState,
    uid: &str,
    status: CardStatus,
) -> Result<Card, AppError> {
    let uid = CardUid::parse(uid).map_err(|err| AppError::Validation(vec![err]))?;

    let _guard = state.table_lock.lock().await;
    let mut cards = state.card_table.load_cards().await?;
    if cards.contains_key(uid.as_str()) {
        return Err(AppError::Conflict(format!("Thẻ {} đã tồn tại", uid)));
    }

    let card = Card::new(uid.as_str(), status);
    cards.insert(uid.as_str().to_string(), card.clone());
    state
        .card_table
        .save_cards(&cards)
        .await
        .map_err(|err| save_failed(state, err))?;
    drop(_guard);

    record_activity(
        state,
        uid.as_str(),
        LogAction::Created,
        details(&[("initial_status", Value::from(u8::from(status)))]),
    )
    .await;
    state.metrics.record_card_mutation();
    Ok(card)
}

/// Remove a card from the table. Fails with `NotFound` if absent.
pub async fn delete_card(state: &AppState, uid: &str) -> Result<String, AppError> {
    let normalized = CardUid::normalize(uid);

    let _guard = state.table_lock.lock().await;
    let mut cards = state.card_table.load_cards().await?;
    if cards.remove(&normalized).is_none() {
        return Err(AppError::NotFound(format!("Thẻ {} không tồn tại", normalized)));
    }
    state
        .card_table
        .save_cards(&cards)
        .await
        .map_err(|err| save_failed(state, err))?;
    drop(_guard);

    record_activity(
        state,
        &normalized,
        LogAction::Deleted,
        details(&[("reason", Value::from("manual_deletion"))]),
    )
    .await;
    state.metrics.record_card_mutation();
    Ok(format!("Thẻ {} đã được xóa thành công", normalized))
}

/// Drive one card through its occupancy transition. The whole table is
/// loaded fresh, mutated, and written back under the table lock; the
/// activity append happens after the write commits.
pub async fn set_card_status(
    state: &AppState,
    uid: &str,
    new_status: CardStatus,
) -> Result<Card, AppError> {
    let normalized = CardUid::normalize(uid);

    let _guard = state.table_lock.lock().await;
    let mut cards = state.card_table.load_cards().await?;
    let Some(card) = cards.get_mut(&normalized) else {
        return Err(AppError::NotFound(format!("Thẻ {} không tồn tại", normalized)));
    };

    let old_status = card.status;
    let change = card.set_status(new_status);
    if !change.changed() {
        return Err(AppError::Conflict(format!(
            "Thẻ {} đã ở trạng thái {}",
            normalized,
            u8::from(new_status)
        )));
    }

    let updated = card.clone();
    state
        .card_table
        .save_cards(&cards)
        .await
        .map_err(|err| save_failed(state, err))?;
    drop(_guard);

    let action = match &change {
        StatusChange::Entered { .. } => LogAction::Entry,
        _ => LogAction::Exit,
    };
    let mut log_details = details(&[
        ("previous_status", Value::from(u8::from(old_status))),
        ("new_status", Value::from(u8::from(new_status))),
    ]);
    if let StatusChange::Exited {
        duration: Some(duration),
        ..
    } = &change
    {
        log_details.insert(
            "parking_duration".to_string(),
            Value::from(duration.display.clone()),
        );
    }
    record_activity(state, &normalized, action, log_details).await;
    state.metrics.record_card_mutation();
    Ok(updated)
}
