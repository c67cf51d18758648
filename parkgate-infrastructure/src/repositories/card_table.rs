use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use parkgate_domain::entities::{Card, UnknownCard, UnknownCardDocument};
use parkgate_domain::ports::CardTableRepository;

use crate::repositories::json_store::JsonStore;

/// File-backed card table. The live file is a flat `{uid: card}` object;
/// an older deployment wrapped the map in `{"cards": {...}}` and both
/// shapes are accepted on read.
pub struct JsonCardTable {
    store: JsonStore,
    cards_path: PathBuf,
    unknown_path: PathBuf,
}

impl JsonCardTable {
    pub fn new(store: JsonStore, cards_path: PathBuf, unknown_path: PathBuf) -> Self {
        Self {
            store,
            cards_path,
            unknown_path,
        }
    }

    fn parse_table(raw: Value) -> BTreeMap<String, Card> {
        let map = match raw {
            Value::Object(map) => {
                // legacy wrapper
                match map.get("cards") {
                    Some(Value::Object(inner)) => inner.clone(),
                    _ => map,
                }
            }
            _ => return BTreeMap::new(),
        };

        let mut cards = BTreeMap::new();
        for (uid, value) in map {
            match serde_json::from_value::<Card>(value) {
                Ok(card) => {
                    cards.insert(uid, card);
                }
                Err(err) => {
                    warn!(%uid, %err, "skipping unreadable card record");
                }
            }
        }
        cards
    }
}

#[async_trait]
impl CardTableRepository for JsonCardTable {
    async fn load_cards(&self) -> anyhow::Result<BTreeMap<String, Card>> {
        let raw: Value = self
            .store
            .read_or_default(&self.cards_path, Value::Object(Default::default()))
            .await;
        Ok(Self::parse_table(raw))
    }

    async fn save_cards(&self, cards: &BTreeMap<String, Card>) -> anyhow::Result<()> {
        self.store.write(&self.cards_path, cards).await
    }

    async fn load_unknown_cards(&self) -> anyhow::Result<Vec<UnknownCard>> {
        let document: UnknownCardDocument = self
            .store
            .read_or_default(&self.unknown_path, UnknownCardDocument::default())
            .await;
        Ok(document.unknown_cards)
    }

    async fn save_unknown_cards(&self, cards: &[UnknownCard]) -> anyhow::Result<()> {
        let document = UnknownCardDocument {
            unknown_cards: cards.to_vec(),
        };
        self.store.write(&self.unknown_path, &document).await
    }
}
