//! Stable trigger keys.
//!
//! Key formats:
//! - `<reminder_id>` for one-off triggers.
//! - `<reminder_id>_<weekday>` for every-week triggers.
//! - `<reminder_id>_<weekday>_<week_offset>` for concrete interval-week triggers.
//! - `<reminder_id>_<day_of_month>` for every-month triggers.
//!
//! The reminder id is always the prefix, so keys of different reminders never
//! collide.

use crate::model::reminder::ReminderId;
use crate::recurrence::weekday::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const KEY_SEPARATOR: char = '_';

/// Deterministic identity of one scheduled trigger.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StableKey(String);

impl StableKey {
    pub fn once(reminder_id: ReminderId) -> Self {
        Self(reminder_id.to_string())
    }

    pub fn weekday(reminder_id: ReminderId, weekday: Weekday) -> Self {
        Self(format!("{reminder_id}{KEY_SEPARATOR}{}", weekday.number()))
    }

    pub fn week_occurrence(reminder_id: ReminderId, weekday: Weekday, week_offset: u64) -> Self {
        Self(format!(
            "{reminder_id}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{week_offset}",
            weekday.number()
        ))
    }

    pub fn day_of_month(reminder_id: ReminderId, day: u8) -> Self {
        Self(format!("{reminder_id}{KEY_SEPARATOR}{day}"))
    }

    /// Wraps a key reported by a scheduling backend. Unknown shapes are kept
    /// verbatim so they can still be cancelled.
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Owning reminder id, when the key carries a parseable prefix.
    pub fn reminder_id(&self) -> Option<ReminderId> {
        let prefix = self
            .0
            .split_once(KEY_SEPARATOR)
            .map_or(self.0.as_str(), |(head, _)| head);
        Uuid::parse_str(prefix).ok()
    }

    pub fn belongs_to(&self, reminder_id: ReminderId) -> bool {
        self.reminder_id() == Some(reminder_id)
    }
}

impl Display for StableKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<StableKey> for String {
    fn from(value: StableKey) -> Self {
        value.0
    }
}
