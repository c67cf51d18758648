// Card entity
// One tracked RFID card with its occupancy state machine and parking timer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::CardUid;

/// Physical-presence state of a card. Persisted as the integers the
/// hardware protocol uses: 0 = outside the lot, 1 = inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CardStatus {
    Outside,
    Inside,
}

impl From<CardStatus> for u8 {
    fn from(status: CardStatus) -> Self {
        match status {
            CardStatus::Outside => 0,
            CardStatus::Inside => 1,
        }
    }
}

impl TryFrom<u8> for CardStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CardStatus::Outside),
            1 => Ok(CardStatus::Inside),
            other => Err(format!(
                "Status phải là 0 (ngoài bãi) hoặc 1 (trong bãi), nhận được {}",
                other
            )),
        }
    }
}

/// Derived time-in-lot bookkeeping. `display` carries a live qualifier
/// while the card is still inside, or the corrupt-data marker after a
/// negative-delta self-heal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingDuration {
    pub total_seconds: i64,
    pub hours: i64,
    pub minutes: i64,
    pub display: String,
}

impl ParkingDuration {
    pub const CORRUPT_DISPLAY: &'static str =
        "Dữ liệu lỗi - thời gian không hợp lệ (đã reset)";

    fn from_seconds(total_seconds: i64, live: bool) -> Self {
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let qualifier = if live { " (hiện tại)" } else { "" };
        let display = if hours > 0 {
            format!("{} giờ {} phút{}", hours, minutes, qualifier)
        } else {
            format!("{} phút{}", minutes, qualifier)
        };
        Self {
            total_seconds,
            hours,
            minutes,
            display,
        }
    }

    fn corrupt() -> Self {
        Self {
            total_seconds: 0,
            hours: 0,
            minutes: 0,
            display: Self::CORRUPT_DISPLAY.to_string(),
        }
    }

    pub fn is_corrupt_marker(&self) -> bool {
        self.display == Self::CORRUPT_DISPLAY
    }
}

/// Outcome of a `set_status` transition. `NoChange` is a reported
/// failure, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusChange {
    NoChange,
    Entered { at: DateTime<Utc> },
    Exited {
        at: DateTime<Utc>,
        duration: Option<ParkingDuration>,
    },
}

impl StatusChange {
    pub fn changed(&self) -> bool {
        !matches!(self, StatusChange::NoChange)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub uid: String,
    pub status: CardStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking_duration: Option<ParkingDuration>,
}

impl Card {
    pub fn new(uid: &str, status: CardStatus) -> Self {
        let mut card = Self {
            uid: CardUid::normalize(uid),
            status,
            entry_time: None,
            exit_time: None,
            created_at: Utc::now(),
            parking_duration: None,
        };
        card.refresh_duration();
        card
    }

    /// Drive the occupancy state machine. Same state reports `NoChange`;
    /// entering stamps `entry_time` and clears the previous visit;
    /// exiting stamps `exit_time` and finalizes the duration.
    pub fn set_status(&mut self, new_status: CardStatus) -> StatusChange {
        self.set_status_at(new_status, Utc::now())
    }

    pub fn set_status_at(&mut self, new_status: CardStatus, now: DateTime<Utc>) -> StatusChange {
        if new_status == self.status {
            return StatusChange::NoChange;
        }
        self.status = new_status;
        match new_status {
            CardStatus::Inside => {
                self.entry_time = Some(now);
                self.exit_time = None;
                self.parking_duration = None;
                StatusChange::Entered { at: now }
            }
            CardStatus::Outside => {
                self.exit_time = Some(now);
                self.recompute_duration(now);
                StatusChange::Exited {
                    at: now,
                    duration: self.parking_duration.clone(),
                }
            }
        }
    }

    /// Recompute the derived duration. Idempotent; callable at any time.
    /// A negative delta means the stored timestamps are corrupt: the
    /// exit time is cleared and the duration flagged, never an error.
    pub fn refresh_duration(&mut self) {
        self.recompute_duration(Utc::now());
    }

    pub fn recompute_duration(&mut self, now: DateTime<Utc>) {
        let Some(entry) = self.entry_time else {
            self.parking_duration = None;
            return;
        };
        let end = match (self.status, self.exit_time) {
            (CardStatus::Outside, Some(exit)) => exit,
            (CardStatus::Inside, _) => now,
            (CardStatus::Outside, None) => {
                self.parking_duration = None;
                return;
            }
        };
        let total_seconds = (end - entry).num_seconds();
        if total_seconds < 0 {
            self.exit_time = None;
            self.parking_duration = Some(ParkingDuration::corrupt());
            return;
        }
        self.parking_duration = Some(ParkingDuration::from_seconds(
            total_seconds,
            self.status == CardStatus::Inside,
        ));
    }

    /// Structural validation. Status and timestamps are already enforced
    /// by the types; this reports uid problems and timestamp ordering.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Err(err) = CardUid::parse(&self.uid) {
            errors.push(err);
        }
        if let (Some(entry), Some(exit)) = (self.entry_time, self.exit_time) {
            if exit < entry {
                errors.push("Exit time phải sau entry time".to_string());
            }
        }
        errors
    }
}
