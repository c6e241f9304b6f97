//! Scheduling configuration.
//!
//! # Responsibility
//! - Hold the tunables shared by the engine, generator and service.
//! - Load environment overrides for host apps and the CLI.
//!
//! # Invariants
//! - Unset variables fall back to defaults; malformed ones are rejected,
//!   never silently ignored.

use crate::recurrence::engine::RecurrenceEngine;
use crate::recurrence::weekday::Weekday;
use crate::trigger::generator::{TriggerGenerator, TriggerHorizon, DEFAULT_HORIZON_OCCURRENCES};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// First weekday override, `1..=7` with `1 = Sunday`.
pub const ENV_WEEK_START: &str = "CUE_WEEK_START";
/// Interval-week horizon override, positive integer.
pub const ENV_TRIGGER_HORIZON: &str = "CUE_TRIGGER_HORIZON";

/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                name,
                value,
                expected,
            } => write!(f, "invalid `{name}` value `{value}`; expected {expected}"),
        }
    }
}

impl Error for ConfigError {}

/// Tunables for recurrence evaluation and trigger expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// First day of the week for interval-week math.
    pub week_start: Weekday,
    /// Due weeks expanded ahead for interval-week rules.
    pub horizon_occurrences: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            week_start: Weekday::Monday,
            horizon_occurrences: DEFAULT_HORIZON_OCCURRENCES,
        }
    }
}

impl SchedulingConfig {
    /// Defaults overridden by `CUE_WEEK_START` / `CUE_TRIGGER_HORIZON`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = non_empty(lookup(ENV_WEEK_START)) {
            config.week_start = raw
                .parse::<u8>()
                .ok()
                .and_then(Weekday::from_number)
                .ok_or_else(|| ConfigError::InvalidValue {
                    name: ENV_WEEK_START,
                    value: raw.clone(),
                    expected: "a weekday number 1..=7 (1 = Sunday)",
                })?;
        }

        if let Some(raw) = non_empty(lookup(ENV_TRIGGER_HORIZON)) {
            config.horizon_occurrences = raw
                .parse::<u32>()
                .ok()
                .filter(|value| *value >= 1)
                .ok_or_else(|| ConfigError::InvalidValue {
                    name: ENV_TRIGGER_HORIZON,
                    value: raw.clone(),
                    expected: "a positive integer",
                })?;
        }

        Ok(config)
    }

    pub fn engine(&self) -> RecurrenceEngine {
        RecurrenceEngine::new(self.week_start)
    }

    pub fn generator(&self) -> TriggerGenerator {
        TriggerGenerator::new(self.engine())
    }

    pub fn horizon(&self, from: NaiveDate) -> TriggerHorizon {
        TriggerHorizon::new(from, self.horizon_occurrences)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}
