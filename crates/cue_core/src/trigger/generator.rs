//! Recurrence-to-trigger expansion.
//!
//! # Responsibility
//! - Translate one rule into the finite trigger set an OS scheduler needs.
//! - Re-derive whether an already registered trigger still matches a rule.
//!
//! # Invariants
//! - Same input always yields the same keys.
//! - Keys within one result are pairwise distinct and prefixed by the
//!   reminder id.
//! - `once` yields at most one trigger.
//! - Interval weeks above one have no native repeat, so they are expanded
//!   into concrete `At` triggers up to the horizon. Callers must re-run
//!   generation (e.g. on app foreground) to roll the horizon forward.

use crate::model::reminder::{Reminder, ReminderId};
use crate::recurrence::anchor::Anchor;
use crate::recurrence::engine::RecurrenceEngine;
use crate::recurrence::rule::{RecurrenceRule, WeeklyRule};
use crate::recurrence::weekday::Weekday;
use crate::trigger::descriptor::{RegisteredTrigger, TriggerDescriptor, TriggerSchedule};
use crate::trigger::key::StableKey;
use chrono::{Days, NaiveDate};
use log::debug;
use std::collections::BTreeSet;

/// Interval-week occurrences expanded when no count is configured.
pub const DEFAULT_HORIZON_OCCURRENCES: u32 = 8;

/// Bounds expansion of rules the backend cannot repeat natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerHorizon {
    from: NaiveDate,
    occurrences: u32,
}

impl TriggerHorizon {
    /// Horizon starting at `from` covering `occurrences` due weeks (min 1).
    pub fn new(from: NaiveDate, occurrences: u32) -> Self {
        Self {
            from,
            occurrences: occurrences.max(1),
        }
    }

    pub fn starting(from: NaiveDate) -> Self {
        Self::new(from, DEFAULT_HORIZON_OCCURRENCES)
    }

    /// First day concrete triggers may fire on; earlier ones are in the past.
    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn occurrences(&self) -> u32 {
        self.occurrences
    }
}

/// Builds trigger descriptors from recurrence rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerGenerator {
    engine: RecurrenceEngine,
}

impl TriggerGenerator {
    pub fn new(engine: RecurrenceEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &RecurrenceEngine {
        &self.engine
    }

    /// Desired triggers for one rule.
    pub fn generate(
        &self,
        reminder_id: ReminderId,
        rule: &RecurrenceRule,
        anchor: &Anchor,
        horizon: TriggerHorizon,
    ) -> BTreeSet<TriggerDescriptor> {
        let mut triggers = BTreeSet::new();
        let descriptor = |key: StableKey, schedule: TriggerSchedule| TriggerDescriptor {
            key,
            fire_hour: anchor.hour(),
            fire_minute: anchor.minute(),
            schedule,
        };

        match rule {
            RecurrenceRule::Once => {
                if anchor.date() >= horizon.from() {
                    triggers.insert(descriptor(
                        StableKey::once(reminder_id),
                        TriggerSchedule::At {
                            date: anchor.date(),
                        },
                    ));
                }
            }
            RecurrenceRule::Weekly(weekly) if weekly.is_every_week() => {
                for weekday in weekly.weekdays() {
                    triggers.insert(descriptor(
                        StableKey::weekday(reminder_id, *weekday),
                        TriggerSchedule::EveryWeek { weekday: *weekday },
                    ));
                }
            }
            RecurrenceRule::Weekly(weekly) => {
                for (key, date) in self.interval_week_occurrences(reminder_id, weekly, anchor, horizon)
                {
                    triggers.insert(descriptor(key, TriggerSchedule::At { date }));
                }
            }
            RecurrenceRule::Monthly(monthly) => {
                for day in monthly.days_of_month() {
                    triggers.insert(descriptor(
                        StableKey::day_of_month(reminder_id, *day),
                        TriggerSchedule::EveryMonth { day: *day },
                    ));
                }
            }
        }

        debug!(
            "event=triggers_generated module=trigger reminder_id={} rule={} count={}",
            reminder_id,
            rule.kind_label(),
            triggers.len()
        );
        triggers
    }

    /// Desired triggers for a reminder snapshot; empty once it is deleted.
    pub fn generate_for(
        &self,
        reminder: &Reminder,
        horizon: TriggerHorizon,
    ) -> BTreeSet<TriggerDescriptor> {
        if !reminder.is_active() {
            return BTreeSet::new();
        }
        self.generate(reminder.id, &reminder.rule, &reminder.anchor, horizon)
    }

    /// Descriptor this generator would build for `schedule` under the
    /// reminder's current rule, or `None` when the schedule no longer fits.
    pub fn rederive(
        &self,
        reminder: &Reminder,
        schedule: &TriggerSchedule,
        horizon: TriggerHorizon,
    ) -> Option<TriggerDescriptor> {
        if !reminder.is_active() {
            return None;
        }
        let id = reminder.id;
        let anchor = &reminder.anchor;

        let key = match (&reminder.rule, schedule) {
            (RecurrenceRule::Once, TriggerSchedule::At { date })
                if *date == anchor.date() && *date >= horizon.from() =>
            {
                StableKey::once(id)
            }
            (RecurrenceRule::Weekly(weekly), TriggerSchedule::EveryWeek { weekday })
                if weekly.is_every_week() && weekly.contains(*weekday) =>
            {
                StableKey::weekday(id, *weekday)
            }
            (RecurrenceRule::Weekly(weekly), TriggerSchedule::At { date })
                if !weekly.is_every_week()
                    && *date >= horizon.from()
                    && self.engine.is_due(&reminder.rule, anchor, *date) =>
            {
                let offset = self.engine.week_offset(anchor.date(), *date).unsigned_abs();
                StableKey::week_occurrence(id, Weekday::of(*date), offset)
            }
            (RecurrenceRule::Monthly(monthly), TriggerSchedule::EveryMonth { day })
                if monthly.contains(*day) =>
            {
                StableKey::day_of_month(id, *day)
            }
            _ => return None,
        };

        Some(TriggerDescriptor {
            key,
            fire_hour: anchor.hour(),
            fire_minute: anchor.minute(),
            schedule: *schedule,
        })
    }

    /// Whether a registered trigger is still consistent with the reminder.
    ///
    /// Described triggers are checked field by field (schedule, key and fire
    /// time). Key-only triggers are valid when the current desired set still
    /// contains their key.
    pub fn is_registered_valid(
        &self,
        reminder: &Reminder,
        registered: &RegisteredTrigger,
        horizon: TriggerHorizon,
    ) -> bool {
        if !registered.key.belongs_to(reminder.id) {
            return false;
        }

        match &registered.descriptor {
            Some(descriptor) => {
                descriptor.key == registered.key
                    && self
                        .rederive(reminder, &descriptor.schedule, horizon)
                        .as_ref()
                        == Some(descriptor)
            }
            None => self
                .generate_for(reminder, horizon)
                .iter()
                .any(|descriptor| descriptor.key == registered.key),
        }
    }

    /// Concrete `(key, date)` pairs for an interval-week rule.
    ///
    /// Counts only weeks that produce at least one date on or after
    /// `max(anchor, horizon.from)`.
    fn interval_week_occurrences(
        &self,
        reminder_id: ReminderId,
        weekly: &WeeklyRule,
        anchor: &Anchor,
        horizon: TriggerHorizon,
    ) -> Vec<(StableKey, NaiveDate)> {
        let first_day = anchor.date().max(horizon.from());
        let interval = u64::from(weekly.interval_weeks());
        let anchor_week = self.engine.start_of_week(anchor.date());
        let elapsed = self
            .engine
            .week_offset(anchor.date(), first_day)
            .max(0)
            .unsigned_abs();

        let mut occurrences = Vec::new();
        let mut offset = elapsed.div_ceil(interval) * interval;
        let mut weeks = 0;

        while weeks < horizon.occurrences() {
            let Some(week_start) = offset
                .checked_mul(7)
                .and_then(|days| anchor_week.checked_add_days(Days::new(days)))
            else {
                break;
            };

            let mut emitted = false;
            for weekday in weekly.weekdays() {
                let into_week = weekday.days_since(self.engine.week_start()).unsigned_abs();
                let Some(date) = week_start.checked_add_days(Days::new(into_week)) else {
                    continue;
                };
                if date < first_day {
                    continue;
                }
                occurrences.push((
                    StableKey::week_occurrence(reminder_id, *weekday, offset),
                    date,
                ));
                emitted = true;
            }

            if emitted {
                weeks += 1;
            }
            let Some(next) = offset.checked_add(interval) else {
                break;
            };
            offset = next;
        }

        occurrences
    }
}
