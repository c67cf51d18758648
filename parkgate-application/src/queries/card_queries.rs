use std::collections::BTreeMap;

use parkgate_domain::{Card, CardStatus, CardUid, UnknownCard};
use serde::Serialize;

use crate::{AppError, AppState};

#[derive(Debug, Clone, Serialize)]
pub struct CardStatistics {
    pub total_cards: u64,
    pub inside_parking: u64,
    pub outside_parking: u64,
    pub occupancy_rate: f64,
}

/// Full table, durations recomputed on load: live for cards still
/// inside, and the corrupt-timestamp self-heal for anything read back
/// with an exit before its entry. The recompute is idempotent for
/// healthy finalized cards.
pub async fn list_cards(state: &AppState) -> Result<BTreeMap<String, Card>, AppError> {
    let mut cards = state.card_table.load_cards().await?;
    for card in cards.values_mut() {
        card.refresh_duration();
    }
    Ok(cards)
}

pub async fn get_card(state: &AppState, uid: &str) -> Result<Card, AppError> {
    let normalized = CardUid::normalize(uid);
    let mut cards = state.card_table.load_cards().await?;
    let Some(mut card) = cards.remove(&normalized) else {
        return Err(AppError::NotFound(format!("Thẻ {} không tồn tại", normalized)));
    };
    card.refresh_duration();
    Ok(card)
}

pub async fn card_statistics(state: &AppState) -> Result<CardStatistics, AppError> {
    let cards = state.card_table.load_cards().await?;
    let total = cards.len() as u64;
    let inside = cards
        .values()
        .filter(|card| card.status == CardStatus::Inside)
        .count() as u64;
    let rate = if total > 0 {
        inside as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    Ok(CardStatistics {
        total_cards: total,
        inside_parking: inside,
        outside_parking: total - inside,
        occupancy_rate: rate,
    })
}

pub async fn list_unknown_cards(state: &AppState) -> Result<Vec<UnknownCard>, AppError> {
    Ok(state.card_table.load_unknown_cards().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::card_commands::{create_card, set_card_status};
    use crate::commands::test_support::test_state;

    #[tokio::test]
    async fn statistics_reflect_occupancy() {
        let (state, _ports) = test_state();
        create_card(&state, "AB12", CardStatus::Outside)
            .await
            .expect("create");
        create_card(&state, "CD34", CardStatus::Outside)
            .await
            .expect("create");
        set_card_status(&state, "AB12", CardStatus::Inside)
            .await
            .expect("enter");

        let stats = card_statistics(&state).await.expect("stats");
        assert_eq!(stats.total_cards, 2);
        assert_eq!(stats.inside_parking, 1);
        assert_eq!(stats.outside_parking, 1);
        assert!((stats.occupancy_rate - 50.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn empty_table_has_zero_occupancy_rate() {
        let (state, _ports) = test_state();
        let stats = card_statistics(&state).await.expect("stats");
        assert_eq!(stats.total_cards, 0);
        assert_eq!(stats.occupancy_rate, 0.0);
    }

    #[tokio::test]
    async fn corrupt_timestamps_are_healed_on_read() {
        let (state, _ports) = test_state();
        let mut card = Card::new("AB12", CardStatus::Outside);
        card.entry_time = Some("2026-08-01T10:00:00Z".parse().expect("timestamp"));
        card.exit_time = Some("2026-08-01T08:00:00Z".parse().expect("timestamp"));
        let mut cards = BTreeMap::new();
        cards.insert(card.uid.clone(), card);
        state.card_table.save_cards(&cards).await.expect("seed");

        let healed = get_card(&state, "AB12").await.expect("get");
        assert!(healed.exit_time.is_none());
        let duration = healed.parking_duration.expect("flagged duration");
        assert!(duration.is_corrupt_marker());
        assert_eq!(duration.total_seconds, 0);

        let table = list_cards(&state).await.expect("list");
        assert!(table["AB12"].exit_time.is_none());
    }

    #[tokio::test]
    async fn inside_card_reports_live_duration() {
        let (state, _ports) = test_state();
        create_card(&state, "AB12", CardStatus::Outside)
            .await
            .expect("create");
        set_card_status(&state, "AB12", CardStatus::Inside)
            .await
            .expect("enter");

        let card = get_card(&state, "ab12").await.expect("get");
        let duration = card.parking_duration.expect("live duration");
        assert!(duration.display.contains("hiện tại"));
    }
}
