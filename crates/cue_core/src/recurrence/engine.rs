//! Recurrence membership and due-date enumeration.
//!
//! # Responsibility
//! - Decide whether a rule is due on a calendar day (`is_due`).
//! - Enumerate due days inside a window lazily (`due_dates`).
//!
//! # Invariants
//! - `is_due` is the ground truth; `due_dates` yields exactly the days in the
//!   window for which `is_due` holds, in ascending order.
//! - Days before the anchor's calendar day are never due.
//! - Week offsets are absolute week counts between the start of the anchor's
//!   week and the start of the query's week, so they never reset at a year
//!   boundary.
//! - Evaluation is pure: no I/O, no shared state, callable from any thread.

use crate::recurrence::anchor::{Anchor, DueInstance};
use crate::recurrence::rule::{MonthlyRule, RecurrenceRule, WeeklyRule};
use crate::recurrence::weekday::Weekday;
use crate::recurrence::window::DateWindow;
use chrono::{Datelike, Days, NaiveDate};
use std::iter::FusedIterator;

/// Longest gap between two due days of any monthly rule (Jan 31 -> Mar 31).
const MONTHLY_SEARCH_DAYS: u64 = 62;

/// Stateless recurrence evaluator.
///
/// `week_start` defines where a week begins for interval math. It only
/// matters for weekly rules whose weekday set spans a week boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceEngine {
    week_start: Weekday,
}

impl Default for RecurrenceEngine {
    fn default() -> Self {
        Self::new(Weekday::Monday)
    }
}

impl RecurrenceEngine {
    pub fn new(week_start: Weekday) -> Self {
        Self { week_start }
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// Returns whether `rule` anchored at `anchor` is due on `date`.
    pub fn is_due(&self, rule: &RecurrenceRule, anchor: &Anchor, date: NaiveDate) -> bool {
        if date < anchor.date() {
            return false;
        }

        match rule {
            RecurrenceRule::Once => date == anchor.date(),
            RecurrenceRule::Weekly(weekly) => self.is_weekly_due(weekly, anchor, date),
            RecurrenceRule::Monthly(monthly) => is_monthly_due(monthly, date),
        }
    }

    /// Lazily enumerates due days inside `window`.
    ///
    /// The sequence is finite and can be restarted by cloning it before
    /// iteration or by calling this again.
    pub fn due_dates<'a>(
        &self,
        rule: &'a RecurrenceRule,
        anchor: &Anchor,
        window: DateWindow,
    ) -> DueDates<'a> {
        DueDates {
            engine: *self,
            rule,
            anchor: *anchor,
            cursor: (!window.is_empty()).then_some(window.start),
            end: window.end,
        }
    }

    /// Due days inside `window` paired with the anchor's time-of-day.
    pub fn due_instances<'a>(
        &self,
        rule: &'a RecurrenceRule,
        anchor: &Anchor,
        window: DateWindow,
    ) -> impl Iterator<Item = DueInstance> + 'a {
        let anchor = *anchor;
        self.due_dates(rule, &anchor, window)
            .map(move |date| anchor.instance_on(date))
    }

    /// First due day on or after `from`, if any.
    pub fn next_due(
        &self,
        rule: &RecurrenceRule,
        anchor: &Anchor,
        from: NaiveDate,
    ) -> Option<NaiveDate> {
        let start = from.max(anchor.date());
        let span = match rule {
            RecurrenceRule::Once => 1,
            RecurrenceRule::Weekly(weekly) => (u64::from(weekly.interval_weeks()) + 1) * 7,
            RecurrenceRule::Monthly(_) => MONTHLY_SEARCH_DAYS,
        };
        self.due_dates(rule, anchor, DateWindow::days_from(start, span))
            .next()
    }

    /// First day of the week containing `date`.
    pub fn start_of_week(&self, date: NaiveDate) -> NaiveDate {
        let back = Weekday::of(date).days_since(self.week_start).unsigned_abs();
        date.checked_sub_days(Days::new(back))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Whole weeks between the anchor's week and `date`'s week.
    ///
    /// Negative when `date` lies in an earlier week than `anchor_date`.
    pub fn week_offset(&self, anchor_date: NaiveDate, date: NaiveDate) -> i64 {
        (self.start_of_week(date) - self.start_of_week(anchor_date))
            .num_days()
            .div_euclid(7)
    }

    fn is_weekly_due(&self, weekly: &WeeklyRule, anchor: &Anchor, date: NaiveDate) -> bool {
        if !weekly.contains(Weekday::of(date)) {
            return false;
        }
        let offset = self.week_offset(anchor.date(), date);
        offset >= 0 && offset % i64::from(weekly.interval_weeks()) == 0
    }
}

fn is_monthly_due(monthly: &MonthlyRule, date: NaiveDate) -> bool {
    u8::try_from(date.day()).is_ok_and(|day| monthly.contains(day))
}

/// Lazy, finite sequence of due days produced by [`RecurrenceEngine::due_dates`].
#[derive(Debug, Clone)]
pub struct DueDates<'a> {
    engine: RecurrenceEngine,
    rule: &'a RecurrenceRule,
    anchor: Anchor,
    cursor: Option<NaiveDate>,
    end: NaiveDate,
}

impl DueDates<'_> {
    /// Next day worth testing after a non-due `date`.
    ///
    /// Never skips over a due day: every jump lands on or before the next
    /// day `is_due` accepts.
    fn next_candidate(&self, date: NaiveDate) -> Option<NaiveDate> {
        if date < self.anchor.date() {
            return Some(self.anchor.date());
        }

        match self.rule {
            // Past the anchor day nothing else is due.
            RecurrenceRule::Once => None,
            RecurrenceRule::Weekly(weekly) => {
                let interval = i64::from(weekly.interval_weeks());
                let remainder = self
                    .engine
                    .week_offset(self.anchor.date(), date)
                    .rem_euclid(interval);
                if remainder == 0 {
                    return date.succ_opt();
                }
                let skip_days = (interval - remainder).unsigned_abs().checked_mul(7)?;
                self.engine
                    .start_of_week(date)
                    .checked_add_days(Days::new(skip_days))
            }
            RecurrenceRule::Monthly(monthly) => {
                let day = u8::try_from(date.day()).ok()?;
                let later_this_month = monthly
                    .days_of_month()
                    .range(day.saturating_add(1)..)
                    .find_map(|candidate| {
                        NaiveDate::from_ymd_opt(date.year(), date.month(), u32::from(*candidate))
                    });
                later_this_month.or_else(|| first_of_next_month(date))
            }
        }
    }
}

impl Iterator for DueDates<'_> {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.cursor {
            if current >= self.end {
                self.cursor = None;
                return None;
            }
            if self.engine.is_due(self.rule, &self.anchor, current) {
                self.cursor = current.succ_opt();
                return Some(current);
            }
            self.cursor = self.next_candidate(current);
        }
        None
    }
}

impl FusedIterator for DueDates<'_> {}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year().checked_add(1)?, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::RecurrenceEngine;
    use crate::recurrence::anchor::Anchor;
    use crate::recurrence::rule::RecurrenceRule;
    use crate::recurrence::weekday::Weekday;
    use crate::recurrence::window::DateWindow;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn anchor(d: NaiveDate) -> Anchor {
        Anchor::new(d, 9, 30).unwrap()
    }

    #[test]
    fn week_offset_crosses_year_boundary() {
        let engine = RecurrenceEngine::default();
        // Monday 2025-12-29 and Monday 2026-01-12 are two weeks apart even
        // though their week-of-year fields are 1 and 3.
        assert_eq!(engine.week_offset(date(2025, 12, 29), date(2026, 1, 12)), 2);
        assert_eq!(engine.week_offset(date(2025, 12, 22), date(2026, 1, 5)), 2);
        assert_eq!(engine.week_offset(date(2026, 1, 5), date(2026, 1, 4)), -1);
    }

    #[test]
    fn start_of_week_honors_configured_first_day() {
        let monday_first = RecurrenceEngine::new(Weekday::Monday);
        let sunday_first = RecurrenceEngine::new(Weekday::Sunday);
        // Sunday 2026-01-11
        assert_eq!(monday_first.start_of_week(date(2026, 1, 11)), date(2026, 1, 5));
        assert_eq!(sunday_first.start_of_week(date(2026, 1, 11)), date(2026, 1, 11));
    }

    #[test]
    fn biweekly_across_new_year() {
        let engine = RecurrenceEngine::default();
        let rule = RecurrenceRule::weekly(2, [Weekday::Monday]).unwrap();
        let anchor = anchor(date(2025, 12, 22));
        assert!(engine.is_due(&rule, &anchor, date(2026, 1, 5)));
        assert!(!engine.is_due(&rule, &anchor, date(2025, 12, 29)));
        assert!(!engine.is_due(&rule, &anchor, date(2026, 1, 12)));
        assert!(engine.is_due(&rule, &anchor, date(2026, 1, 19)));
    }

    #[test]
    fn weekly_skips_days_before_anchor_in_anchor_week() {
        let engine = RecurrenceEngine::default();
        let rule = RecurrenceRule::weekly(1, [Weekday::Monday, Weekday::Friday]).unwrap();
        // Wednesday anchor: Monday of the same week is before the anchor.
        let anchor = anchor(date(2026, 1, 7));
        assert!(!engine.is_due(&rule, &anchor, date(2026, 1, 5)));
        assert!(engine.is_due(&rule, &anchor, date(2026, 1, 9)));
    }

    #[test]
    fn due_dates_jumps_but_matches_scan() {
        let engine = RecurrenceEngine::default();
        let rule = RecurrenceRule::weekly(3, [Weekday::Tuesday, Weekday::Sunday]).unwrap();
        let anchor = anchor(date(2026, 2, 11));
        let window = DateWindow::new(date(2026, 1, 1), date(2026, 7, 1));

        let fast = engine.due_dates(&rule, &anchor, window).collect::<Vec<_>>();
        let scan = window
            .start
            .iter_days()
            .take_while(|day| *day < window.end)
            .filter(|day| engine.is_due(&rule, &anchor, *day))
            .collect::<Vec<_>>();
        assert_eq!(fast, scan);
        assert!(!fast.is_empty());
    }

    #[test]
    fn due_dates_is_restartable() {
        let engine = RecurrenceEngine::default();
        let rule = RecurrenceRule::monthly([15]).unwrap();
        let anchor = anchor(date(2026, 1, 1));
        let dates = engine.due_dates(&rule, &anchor, DateWindow::year(2026).unwrap());
        let first_pass = dates.clone().collect::<Vec<_>>();
        let second_pass = dates.collect::<Vec<_>>();
        assert_eq!(first_pass.len(), 12);
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn next_due_finds_following_occurrence() {
        let engine = RecurrenceEngine::default();
        let rule = RecurrenceRule::monthly([31]).unwrap();
        let anchor = anchor(date(2026, 1, 1));
        assert_eq!(
            engine.next_due(&rule, &anchor, date(2026, 2, 1)),
            Some(date(2026, 3, 31))
        );

        let once = RecurrenceRule::once();
        assert_eq!(
            engine.next_due(&once, &anchor, date(2025, 6, 1)),
            Some(date(2026, 1, 1))
        );
        assert_eq!(engine.next_due(&once, &anchor, date(2026, 1, 2)), None);
    }

    #[test]
    fn due_instances_carry_anchor_time() {
        let engine = RecurrenceEngine::default();
        let rule = RecurrenceRule::once();
        let anchor = anchor(date(2026, 4, 1));
        let instances = engine
            .due_instances(&rule, &anchor, DateWindow::month(2026, 4).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(instances.len(), 1);
        assert_eq!((instances[0].hour, instances[0].minute), (9, 30));
    }
}
