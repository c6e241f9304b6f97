//! Half-open date windows for calendar population.

use chrono::{Datelike, Days, NaiveDate};

/// Date range `[start, end)`. Empty when `end <= start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Window covering `first..=last`.
    pub fn through(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            start: first,
            end: last.succ_opt().unwrap_or(NaiveDate::MAX),
        }
    }

    /// Window covering exactly `date`.
    pub fn single_day(date: NaiveDate) -> Self {
        Self::through(date, date)
    }

    /// Window covering `days` days from `start`, saturating at the calendar limit.
    pub fn days_from(start: NaiveDate, days: u64) -> Self {
        Self {
            start,
            end: start
                .checked_add_days(Days::new(days))
                .unwrap_or(NaiveDate::MAX),
        }
    }

    /// Window covering one calendar month. `None` for an invalid month.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self { start, end })
    }

    /// Window covering one calendar year.
    pub fn year(year: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Number of days in the window.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days().max(0)
    }

    /// Month window containing `date`.
    pub fn month_of(date: NaiveDate) -> Option<Self> {
        Self::month(date.year(), date.month())
    }
}

#[cfg(test)]
mod tests {
    use super::DateWindow;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_handles_december_rollover() {
        let window = DateWindow::month(2026, 12).unwrap();
        assert_eq!(window.start, date(2026, 12, 1));
        assert_eq!(window.end, date(2027, 1, 1));
        assert_eq!(window.len_days(), 31);
        assert!(DateWindow::month(2026, 13).is_none());
    }

    #[test]
    fn february_length_follows_leap_years() {
        assert_eq!(DateWindow::month(2028, 2).unwrap().len_days(), 29);
        assert_eq!(DateWindow::month(2026, 2).unwrap().len_days(), 28);
    }

    #[test]
    fn reversed_window_is_empty() {
        let window = DateWindow::new(date(2026, 3, 2), date(2026, 3, 1));
        assert!(window.is_empty());
        assert_eq!(window.len_days(), 0);
        assert!(!window.contains(date(2026, 3, 1)));
    }

    #[test]
    fn single_day_contains_only_that_day() {
        let window = DateWindow::single_day(date(2026, 1, 31));
        assert!(window.contains(date(2026, 1, 31)));
        assert!(!window.contains(date(2026, 2, 1)));
    }
}
