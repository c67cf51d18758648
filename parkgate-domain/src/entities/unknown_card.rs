// Unknown card entity
// A uid the sensing hardware reported that is not in the card table

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::value_objects::CardUid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnknownCard {
    pub uid: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl UnknownCard {
    pub fn new(uid: &str, metadata: Map<String, Value>) -> Self {
        Self {
            uid: CardUid::normalize(uid),
            timestamp: Utc::now(),
            metadata,
        }
    }
}

/// On-disk shape of the unknown-card file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnknownCardDocument {
    #[serde(default)]
    pub unknown_cards: Vec<UnknownCard>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_flattens_into_the_object() {
        let mut metadata = Map::new();
        metadata.insert("source".to_string(), Value::String("esp32".to_string()));
        let card = UnknownCard::new(" ab99 ", metadata);
        let json = serde_json::to_value(&card).expect("serialize");
        assert_eq!(json["uid"], "AB99");
        assert_eq!(json["source"], "esp32");
    }
}
