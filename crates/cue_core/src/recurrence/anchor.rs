//! Reminder anchor and computed occurrence values.

use crate::recurrence::rule::InvalidRuleError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reference date plus time-of-day a recurrence is measured from.
///
/// Recurrence evaluation never mutates the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAnchor")]
pub struct Anchor {
    date: NaiveDate,
    hour: u8,
    minute: u8,
}

#[derive(Deserialize)]
struct RawAnchor {
    date: NaiveDate,
    hour: u8,
    minute: u8,
}

impl Anchor {
    /// Creates an anchor, validating `hour <= 23` and `minute <= 59`.
    pub fn new(date: NaiveDate, hour: u8, minute: u8) -> Result<Self, InvalidRuleError> {
        if hour > 23 || minute > 59 {
            return Err(InvalidRuleError::InvalidTimeOfDay { hour, minute });
        }
        Ok(Self { date, hour, minute })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Same time-of-day on another date.
    pub fn instance_on(&self, date: NaiveDate) -> DueInstance {
        DueInstance {
            date,
            hour: self.hour,
            minute: self.minute,
        }
    }
}

impl TryFrom<RawAnchor> for Anchor {
    type Error = InvalidRuleError;

    fn try_from(value: RawAnchor) -> Result<Self, Self::Error> {
        Self::new(value.date, value.hour, value.minute)
    }
}

/// One concrete occurrence. Computed, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DueInstance {
    pub date: NaiveDate,
    pub hour: u8,
    pub minute: u8,
}
