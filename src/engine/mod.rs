//! # Goal Attainment Engine
//!
//! Pure calculations behind every sales tile. Nothing in here performs I/O:
//! the services fetch raw facts through [`crate::source`] and hand them to the
//! functions below, which return typed records ready for serialization.
//!
//! - [`calendar`] - reporting periods and standard/shifted business calendars
//! - [`projector`] - run-rate projection for a single `(goal, executed)` pair
//! - [`category`] - category to calendar-policy table
//! - [`aggregator`] - all six categories of a month in one pass
//! - [`series`] - daily evolution and weekly breakdown
//! - [`heatmap`], [`comparison`], [`daily_close`], [`intraday`] - thin views
//!
//! Division by zero never raises here. Every ratio guards its denominator and
//! substitutes `0`.

pub mod aggregator;
pub mod calendar;
pub mod category;
pub mod comparison;
pub mod daily_close;
pub mod heatmap;
pub mod intraday;
pub mod projector;
pub mod series;

pub use aggregator::{aggregate_month, MonthlyAttainment};
pub use calendar::{BusinessCalendar, CalendarPair, CalendarPolicy, Period};
pub use category::MetricCategory;
pub use projector::{project, AttainmentResult};

/// Round half away from zero to `decimals` places (SQL `ROUND` semantics)
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub(crate) fn round1(value: f64) -> f64 {
    round_to(value, 1)
}

/// `numerator / denominator`, or `0` when the denominator is not positive
pub(crate) fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Arithmetic mean over the whole window, `0` for an empty window
pub fn window_average<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
