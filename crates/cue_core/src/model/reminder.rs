//! Reminder aggregate snapshot.
//!
//! # Responsibility
//! - Carry the reminder fields scheduling depends on.
//! - Provide lifecycle helpers for soft-delete semantics.
//!
//! # Invariants
//! - `id` is stable, non-nil and never reused for another reminder.
//! - A deleted reminder desires no scheduled triggers.
//! - `snooze_minutes` never exceeds one day.

use crate::recurrence::anchor::Anchor;
use crate::recurrence::rule::RecurrenceRule;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable reminder identifier; prefix of every trigger key it owns.
pub type ReminderId = Uuid;

/// Snooze duration applied when a reminder is created without one.
pub const DEFAULT_SNOOZE_MINUTES: u32 = 10;
/// Upper bound for `snooze_minutes`.
pub const MAX_SNOOZE_MINUTES: u32 = 24 * 60;

/// How a reminder reaches the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Local notification banner.
    #[default]
    Notification,
    /// Full-screen alarm.
    Alarm,
}

impl DeliveryMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notification => "notification",
            Self::Alarm => "alarm",
        }
    }
}

/// Reminder invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderValidationError {
    NilId,
    SnoozeTooLong(u32),
}

impl Display for ReminderValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "reminder id must not be nil"),
            Self::SnoozeTooLong(value) => write!(
                f,
                "snooze_minutes ({value}) must be <= {MAX_SNOOZE_MINUTES}"
            ),
        }
    }
}

impl Error for ReminderValidationError {}

/// Snapshot of one reminder as supplied by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawReminder")]
pub struct Reminder {
    pub id: ReminderId,
    /// Display text. Never logged.
    pub title: String,
    pub anchor: Anchor,
    pub rule: RecurrenceRule,
    pub snooze_minutes: u32,
    pub delivery: DeliveryMode,
    /// Soft delete tombstone.
    pub is_deleted: bool,
}

#[derive(Deserialize)]
struct RawReminder {
    id: ReminderId,
    title: String,
    anchor: Anchor,
    rule: RecurrenceRule,
    #[serde(default = "default_snooze_minutes")]
    snooze_minutes: u32,
    #[serde(default)]
    delivery: DeliveryMode,
    #[serde(default)]
    is_deleted: bool,
}

fn default_snooze_minutes() -> u32 {
    DEFAULT_SNOOZE_MINUTES
}

impl Reminder {
    /// Creates a reminder with a generated id, notification delivery and
    /// the default snooze.
    pub fn new(title: impl Into<String>, anchor: Anchor, rule: RecurrenceRule) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            anchor,
            rule,
            snooze_minutes: DEFAULT_SNOOZE_MINUTES,
            delivery: DeliveryMode::Notification,
            is_deleted: false,
        }
    }

    /// Creates a reminder with a caller-provided id.
    ///
    /// Used by persistence paths where identity already exists.
    pub fn with_id(
        id: ReminderId,
        title: impl Into<String>,
        anchor: Anchor,
        rule: RecurrenceRule,
    ) -> Result<Self, ReminderValidationError> {
        let reminder = Self {
            id,
            ..Self::new(title, anchor, rule)
        };
        reminder.validate()?;
        Ok(reminder)
    }

    pub fn validate(&self) -> Result<(), ReminderValidationError> {
        if self.id.is_nil() {
            return Err(ReminderValidationError::NilId);
        }
        if self.snooze_minutes > MAX_SNOOZE_MINUTES {
            return Err(ReminderValidationError::SnoozeTooLong(self.snooze_minutes));
        }
        Ok(())
    }

    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    pub fn restore(&mut self) {
        self.is_deleted = false;
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

impl TryFrom<RawReminder> for Reminder {
    type Error = ReminderValidationError;

    fn try_from(value: RawReminder) -> Result<Self, Self::Error> {
        let reminder = Self {
            id: value.id,
            title: value.title,
            anchor: value.anchor,
            rule: value.rule,
            snooze_minutes: value.snooze_minutes,
            delivery: value.delivery,
            is_deleted: value.is_deleted,
        };
        reminder.validate()?;
        Ok(reminder)
    }
}
