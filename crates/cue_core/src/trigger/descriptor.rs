//! Backend-neutral trigger descriptors.

use crate::recurrence::weekday::Weekday;
use crate::trigger::key::StableKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Calendar component a backend repeats (or fires once) on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerSchedule {
    /// Fires once on `date`.
    At { date: NaiveDate },
    /// Repeats natively every week on `weekday`.
    EveryWeek { weekday: Weekday },
    /// Repeats natively every month on `day`; months without that day are
    /// skipped by the backend.
    EveryMonth { day: u8 },
}

impl TriggerSchedule {
    pub fn repeats(&self) -> bool {
        !matches!(self, Self::At { .. })
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::At { .. } => "at",
            Self::EveryWeek { .. } => "every_week",
            Self::EveryMonth { .. } => "every_month",
        }
    }
}

/// One trigger a notification/alarm backend must register.
///
/// Equality covers every field, so an unchanged key with a changed fire time
/// compares unequal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriggerDescriptor {
    pub key: StableKey,
    pub fire_hour: u8,
    pub fire_minute: u8,
    pub schedule: TriggerSchedule,
}

/// Trigger as reported back by a scheduling backend.
///
/// Backends that can describe what they scheduled fill `descriptor`, which
/// enables fire-time drift detection; key-only backends leave it `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredTrigger {
    pub key: StableKey,
    pub descriptor: Option<TriggerDescriptor>,
}

impl RegisteredTrigger {
    pub fn key_only(key: StableKey) -> Self {
        Self {
            key,
            descriptor: None,
        }
    }

    pub fn described(descriptor: TriggerDescriptor) -> Self {
        Self {
            key: descriptor.key.clone(),
            descriptor: Some(descriptor),
        }
    }
}
