//! Reporting periods and business-day calendars.
//!
//! A month has two calendars. The standard one comes straight from the
//! business-day provider. The shifted one removes a fixed number of days from
//! the month total (floored at zero) and keeps the elapsed count untouched; it
//! is the time basis for the portability family of goals.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;

use super::ratio_or_zero;
use crate::error::{ReportingError, Result};

/// A calendar month (`year`, `month` in 1..=12)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ReportingError::invalid_parameter(format!(
                "mes must be between 1 and 12, got {month}"
            )));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(ReportingError::invalid_parameter(format!(
                "anio out of range: {year}"
            )));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // validated in the constructors
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// First day of the following month (exclusive upper bound for queries)
    pub fn next_first_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Which calendar variant a metric is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarPolicy {
    Standard,
    Shifted,
}

/// Total and elapsed business days for one month under one policy.
///
/// `elapsed_days <= total_days` is not enforced; a misconfigured provider
/// yields projections below the executed count and that passes through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BusinessCalendar {
    #[serde(skip)]
    pub period: Period,
    #[serde(rename = "totales")]
    pub total_days: f64,
    #[serde(rename = "transcurridos")]
    pub elapsed_days: f64,
}

impl BusinessCalendar {
    pub fn new(period: Period, total_days: f64, elapsed_days: f64) -> Self {
        Self {
            period,
            total_days,
            elapsed_days,
        }
    }

    /// Same month with `shift_days` removed from the total, floored at zero
    pub fn shifted(&self, shift_days: f64) -> Self {
        Self {
            period: self.period,
            total_days: (self.total_days - shift_days).max(0.0),
            elapsed_days: self.elapsed_days,
        }
    }

    pub fn remaining_days(&self) -> f64 {
        self.total_days - self.elapsed_days
    }

    /// `total / elapsed`, the factor that extends the current pace to month end
    pub fn run_rate_factor(&self) -> f64 {
        ratio_or_zero(self.total_days, self.elapsed_days)
    }
}

/// Standard and shifted calendars of the same month
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarPair {
    pub standard: BusinessCalendar,
    pub shifted: BusinessCalendar,
}

impl CalendarPair {
    pub fn new(standard: BusinessCalendar, shift_days: f64) -> Self {
        Self {
            shifted: standard.shifted(shift_days),
            standard,
        }
    }

    pub fn for_policy(&self, policy: CalendarPolicy) -> &BusinessCalendar {
        match policy {
            CalendarPolicy::Standard => &self.standard,
            CalendarPolicy::Shifted => &self.shifted,
        }
    }
}
