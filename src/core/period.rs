//! Report period calculator.
//!
//! Derives calendar-aligned reporting windows from a user's (period type,
//! start day) preference. Start days are limited to 1-28 so every window
//! boundary exists in every month. The previous period is defined as the
//! current one shifted back by its own length in days - deliberately simpler
//! than calendar-exact month arithmetic, so a 31-day window is always compared
//! against a 31-day window.

use crate::entities::PeriodType;
use crate::errors::{Error, Result};
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

/// A user's reporting-window preference, validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    period_type: PeriodType,
    start_day: u32,
}

/// An inclusive calendar reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    /// First day of the window
    pub start: NaiveDate,
    /// Last day of the window
    pub end: NaiveDate,
}

// start_day is validated to [1, 28] and every month has at least 28 days, so
// these constructions cannot fail for inputs that passed validation.
#[allow(clippy::expect_used)]
fn day_in_month(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("day 1-28 exists in every month")
}

#[allow(clippy::expect_used)]
fn prev_day(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(1))
        .expect("date is far from the calendar minimum")
}

const fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}

const fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

impl ReportPeriod {
    /// Validates and builds a reporting preference.
    ///
    /// Fails with [`Error::InvalidStartDay`] when `start_day` is outside
    /// [1, 28]; days 29-31 are excluded to avoid month-length edge cases.
    pub fn new(period_type: PeriodType, start_day: u32) -> Result<Self> {
        if !(1..=28).contains(&start_day) {
            return Err(Error::InvalidStartDay { start_day });
        }
        Ok(Self {
            period_type,
            start_day,
        })
    }

    /// The configured period type.
    #[must_use]
    pub const fn period_type(&self) -> PeriodType {
        self.period_type
    }

    /// The configured start day of month.
    #[must_use]
    pub const fn start_day(&self) -> u32 {
        self.start_day
    }

    /// The reporting window containing `reference`.
    ///
    /// Monthly: the window starts on the configured day of the month. A
    /// reference date before that day still belongs to the previous cycle, so
    /// the window is anchored one month back. Quarterly: the reference month
    /// picks the calendar quarter; the window runs from the start day of the
    /// quarter's first month to the day before the start day of its third
    /// month.
    #[must_use]
    pub fn current_period(&self, reference: NaiveDate) -> Period {
        match self.period_type {
            PeriodType::Monthly => {
                let (year, month) = if reference.day() < self.start_day {
                    prev_month(reference.year(), reference.month())
                } else {
                    (reference.year(), reference.month())
                };
                let start = day_in_month(year, month, self.start_day);
                let (next_year, next_month) = next_month(year, month);
                let end = prev_day(day_in_month(next_year, next_month, self.start_day));
                Period { start, end }
            }
            PeriodType::Quarterly => {
                let first_month = ((reference.month() - 1) / 3) * 3 + 1;
                let third_month = first_month + 2;
                let start = day_in_month(reference.year(), first_month, self.start_day);
                let end = prev_day(day_in_month(reference.year(), third_month, self.start_day));
                Period { start, end }
            }
        }
    }

    /// The window immediately before the current one, with the same length in
    /// days as the current window.
    #[must_use]
    pub fn previous_period(&self, reference: NaiveDate) -> Period {
        let current = self.current_period(reference);
        let length = current.len_days();
        let end = prev_day(current.start);
        #[allow(clippy::expect_used, clippy::cast_sign_loss)]
        let start = end
            .checked_sub_days(Days::new(length as u64 - 1))
            .expect("date is far from the calendar minimum");
        Period { start, end }
    }
}

impl Period {
    /// Number of days in the window, both endpoints included.
    #[must_use]
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Inclusive UTC datetime bounds covering the whole window, suitable for
    /// the statistics read path.
    #[must_use]
    pub fn datetime_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        #[allow(clippy::expect_used)]
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).expect("valid time of day");
        (
            self.start.and_time(NaiveTime::MIN).and_utc(),
            self.end.and_time(end_of_day).and_utc(),
        )
    }
}
