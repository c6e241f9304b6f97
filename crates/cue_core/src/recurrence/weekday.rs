//! Calendar weekday with the mobile calendar numbering.
//!
//! # Invariants
//! - Numbering is `1 = Sunday ... 7 = Saturday`.
//! - Ordering follows the numbering, so sets iterate Sunday first.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Day of week used by weekly recurrence rules and trigger keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// All weekdays in numbering order.
    pub const ALL: [Weekday; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// Parses the `1..=7` weekday number.
    pub fn from_number(value: u8) -> Option<Self> {
        match value {
            1..=7 => Some(Self::ALL[usize::from(value - 1)]),
            _ => None,
        }
    }

    /// Returns the `1..=7` weekday number.
    pub fn number(self) -> u8 {
        match self {
            Self::Sunday => 1,
            Self::Monday => 2,
            Self::Tuesday => 3,
            Self::Wednesday => 4,
            Self::Thursday => 5,
            Self::Friday => 6,
            Self::Saturday => 7,
        }
    }

    /// Weekday that `date` falls on.
    pub fn of(date: NaiveDate) -> Self {
        Self::from_chrono(date.weekday())
    }

    pub fn from_chrono(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Sun => Self::Sunday,
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
        }
    }

    pub fn to_chrono(self) -> chrono::Weekday {
        match self {
            Self::Sunday => chrono::Weekday::Sun,
            Self::Monday => chrono::Weekday::Mon,
            Self::Tuesday => chrono::Weekday::Tue,
            Self::Wednesday => chrono::Weekday::Wed,
            Self::Thursday => chrono::Weekday::Thu,
            Self::Friday => chrono::Weekday::Fri,
            Self::Saturday => chrono::Weekday::Sat,
        }
    }

    /// Days elapsed from `week_start` to `self` inside one week (`0..=6`).
    pub fn days_since(self, week_start: Weekday) -> i64 {
        (i64::from(self.number()) - i64::from(week_start.number())).rem_euclid(7)
    }
}

impl From<Weekday> for u8 {
    fn from(value: Weekday) -> Self {
        value.number()
    }
}

impl TryFrom<u8> for Weekday {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value)
            .ok_or_else(|| format!("weekday must be within 1..=7 (1 = Sunday), got {value}"))
    }
}

impl Display for Weekday {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Sunday => "sunday",
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
        };
        f.write_str(label)
    }
}
