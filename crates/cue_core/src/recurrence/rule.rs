//! Recurrence rule value type.
//!
//! # Responsibility
//! - Model the three reminder recurrence shapes as one tagged union.
//! - Reject malformed rules at construction, never at evaluation.
//!
//! # Invariants
//! - Exactly one shape is active.
//! - `weekdays` and `days_of_month` are never empty.
//! - `interval_weeks >= 1`; every day of month is within `1..=31`.
//! - Deserialization runs the same validation as the factories.

use crate::recurrence::weekday::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Highest day-of-month a monthly rule may name.
pub const MAX_DAY_OF_MONTH: u8 = 31;

/// Construction-time validation failure for recurrence input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidRuleError {
    /// Weekly interval must be at least one week.
    ZeroInterval,
    /// Weekly rule without any weekday.
    EmptyWeekdays,
    /// Weekday number outside `1..=7`.
    WeekdayOutOfRange(u8),
    /// Monthly rule without any day of month.
    EmptyDaysOfMonth,
    /// Day of month outside `1..=31`.
    DayOfMonthOutOfRange(u8),
    /// Anchor time-of-day outside `0..=23` / `0..=59`.
    InvalidTimeOfDay { hour: u8, minute: u8 },
}

impl Display for InvalidRuleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroInterval => write!(f, "weekly interval must be at least 1 week"),
            Self::EmptyWeekdays => write!(f, "weekly rule requires at least one weekday"),
            Self::WeekdayOutOfRange(value) => {
                write!(f, "weekday must be within 1..=7, got {value}")
            }
            Self::EmptyDaysOfMonth => {
                write!(f, "monthly rule requires at least one day of month")
            }
            Self::DayOfMonthOutOfRange(value) => {
                write!(f, "day of month must be within 1..={MAX_DAY_OF_MONTH}, got {value}")
            }
            Self::InvalidTimeOfDay { hour, minute } => {
                write!(f, "time of day {hour:02}:{minute:02} is out of range")
            }
        }
    }
}

impl Error for InvalidRuleError {}

/// Reminder recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecurrenceRule {
    /// Due on the anchor date only.
    Once,
    /// Due on selected weekdays of every `interval_weeks`-th week.
    Weekly(WeeklyRule),
    /// Due on selected days of every month.
    Monthly(MonthlyRule),
}

/// Payload of [`RecurrenceRule::Weekly`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWeeklyRule")]
pub struct WeeklyRule {
    interval_weeks: u32,
    weekdays: BTreeSet<Weekday>,
}

/// Payload of [`RecurrenceRule::Monthly`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMonthlyRule")]
pub struct MonthlyRule {
    days_of_month: BTreeSet<u8>,
}

#[derive(Deserialize)]
struct RawWeeklyRule {
    interval_weeks: u32,
    weekdays: Vec<u8>,
}

#[derive(Deserialize)]
struct RawMonthlyRule {
    days_of_month: Vec<u8>,
}

impl RecurrenceRule {
    /// One-off rule.
    pub fn once() -> Self {
        Self::Once
    }

    /// Weekly rule with interval and weekday set.
    ///
    /// # Errors
    /// - `ZeroInterval` when `interval_weeks == 0`.
    /// - `EmptyWeekdays` when `weekdays` yields nothing.
    pub fn weekly(
        interval_weeks: u32,
        weekdays: impl IntoIterator<Item = Weekday>,
    ) -> Result<Self, InvalidRuleError> {
        WeeklyRule::new(interval_weeks, weekdays).map(Self::Weekly)
    }

    /// Weekly rule from `1..=7` weekday numbers (`1 = Sunday`).
    pub fn weekly_from_numbers(
        interval_weeks: u32,
        weekdays: &[u8],
    ) -> Result<Self, InvalidRuleError> {
        WeeklyRule::from_numbers(interval_weeks, weekdays).map(Self::Weekly)
    }

    /// Monthly rule with a day-of-month set.
    ///
    /// Days beyond a month's length are skipped for that month, not clamped.
    pub fn monthly(days_of_month: impl IntoIterator<Item = u8>) -> Result<Self, InvalidRuleError> {
        MonthlyRule::new(days_of_month).map(Self::Monthly)
    }

    /// Stable label for diagnostics (`once|weekly|monthly`).
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Weekly(_) => "weekly",
            Self::Monthly(_) => "monthly",
        }
    }
}

impl WeeklyRule {
    fn new(
        interval_weeks: u32,
        weekdays: impl IntoIterator<Item = Weekday>,
    ) -> Result<Self, InvalidRuleError> {
        let weekdays = weekdays.into_iter().collect::<BTreeSet<_>>();
        if interval_weeks == 0 {
            return Err(InvalidRuleError::ZeroInterval);
        }
        if weekdays.is_empty() {
            return Err(InvalidRuleError::EmptyWeekdays);
        }
        Ok(Self {
            interval_weeks,
            weekdays,
        })
    }

    fn from_numbers(interval_weeks: u32, weekdays: &[u8]) -> Result<Self, InvalidRuleError> {
        let parsed = weekdays
            .iter()
            .map(|value| {
                Weekday::from_number(*value).ok_or(InvalidRuleError::WeekdayOutOfRange(*value))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(interval_weeks, parsed)
    }

    pub fn interval_weeks(&self) -> u32 {
        self.interval_weeks
    }

    pub fn weekdays(&self) -> &BTreeSet<Weekday> {
        &self.weekdays
    }

    pub fn contains(&self, weekday: Weekday) -> bool {
        self.weekdays.contains(&weekday)
    }

    /// Whether the OS backend can repeat this rule natively (every week).
    pub fn is_every_week(&self) -> bool {
        self.interval_weeks == 1
    }
}

impl MonthlyRule {
    fn new(days_of_month: impl IntoIterator<Item = u8>) -> Result<Self, InvalidRuleError> {
        let days_of_month = days_of_month.into_iter().collect::<BTreeSet<_>>();
        if days_of_month.is_empty() {
            return Err(InvalidRuleError::EmptyDaysOfMonth);
        }
        if let Some(day) = days_of_month
            .iter()
            .copied()
            .find(|day| *day == 0 || *day > MAX_DAY_OF_MONTH)
        {
            return Err(InvalidRuleError::DayOfMonthOutOfRange(day));
        }
        Ok(Self { days_of_month })
    }

    pub fn days_of_month(&self) -> &BTreeSet<u8> {
        &self.days_of_month
    }

    pub fn contains(&self, day: u8) -> bool {
        self.days_of_month.contains(&day)
    }
}

impl TryFrom<RawWeeklyRule> for WeeklyRule {
    type Error = InvalidRuleError;

    fn try_from(value: RawWeeklyRule) -> Result<Self, Self::Error> {
        Self::from_numbers(value.interval_weeks, &value.weekdays)
    }
}

impl TryFrom<RawMonthlyRule> for MonthlyRule {
    type Error = InvalidRuleError;

    fn try_from(value: RawMonthlyRule) -> Result<Self, Self::Error> {
        Self::new(value.days_of_month)
    }
}
