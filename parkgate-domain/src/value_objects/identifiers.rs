// Identifier value objects

use serde::{Deserialize, Serialize};

/// Normalized RFID card identifier: trimmed, upper-cased, at least 4 chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardUid(String);

impl CardUid {
    /// Normalization applied to every uid the system touches, even ones
    /// that fail validation (unknown-card tracking keys on this form).
    pub fn normalize(raw: &str) -> String {
        raw.trim().to_uppercase()
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        let normalized = Self::normalize(raw);
        if normalized.is_empty() {
            return Err("UID không được để trống".to_string());
        }
        if normalized.len() < 4 {
            return Err("UID phải có ít nhất 4 ký tự".to_string());
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardUid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CardUid> for String {
    fn from(uid: CardUid) -> Self {
        uid.0
    }
}
