//! Run-rate projector.
//!
//! Converts one category's `(goal, executed)` pair and its calendar into the
//! attainment record shown on the goals tile:
//!
//! | field | formula | precision |
//! |---|---|---|
//! | `cumplimiento` | `executed / goal * 100` | 1 |
//! | `proyeccion` | `executed * total / elapsed` | per category |
//! | `cumpl_proyeccion` | unrounded projection `/ goal * 100` | 1 |
//! | `productividad_diaria` | `executed / elapsed` | 1 |
//!
//! A zero goal zeroes both percentages; zero elapsed days zero everything
//! derived from the calendar.

use serde::Serialize;

use super::calendar::BusinessCalendar;
use super::category::MetricCategory;
use super::{ratio_or_zero, round1, round_to};

/// Derived attainment metrics for a single category
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttainmentResult {
    #[serde(skip)]
    pub category: MetricCategory,
    #[serde(rename = "meta")]
    pub goal: f64,
    #[serde(rename = "ejecucion")]
    pub executed: f64,
    #[serde(rename = "cumplimiento")]
    pub attainment_pct: f64,
    #[serde(rename = "proyeccion")]
    pub projected_total: f64,
    #[serde(rename = "cumpl_proyeccion")]
    pub projected_attainment_pct: f64,
    #[serde(rename = "productividad_diaria")]
    pub daily_productivity: f64,
}

/// `executed / goal * 100`, rounded to one decimal
pub fn attainment_pct(goal: f64, executed: f64) -> f64 {
    if goal > 0.0 {
        round1(executed / goal * 100.0)
    } else {
        0.0
    }
}

/// Unrounded linear extrapolation of `executed` to the end of the calendar
pub fn raw_projection(executed: f64, calendar: &BusinessCalendar) -> f64 {
    if calendar.elapsed_days > 0.0 {
        executed * (calendar.total_days / calendar.elapsed_days)
    } else {
        0.0
    }
}

/// Projected attainment from an unrounded projection
pub fn projected_attainment_pct(projection: f64, goal: f64, calendar: &BusinessCalendar) -> f64 {
    if goal > 0.0 && calendar.elapsed_days > 0.0 {
        round1(projection / goal * 100.0)
    } else {
        0.0
    }
}

pub fn daily_productivity(executed: f64, calendar: &BusinessCalendar) -> f64 {
    round1(ratio_or_zero(executed, calendar.elapsed_days))
}

/// Project one category against its calendar
pub fn project(
    category: MetricCategory,
    goal: f64,
    executed: f64,
    calendar: &BusinessCalendar,
) -> AttainmentResult {
    let projection = raw_projection(executed, calendar);
    AttainmentResult {
        category,
        goal,
        executed,
        attainment_pct: attainment_pct(goal, executed),
        projected_total: round_to(projection, category.projection_decimals()),
        projected_attainment_pct: projected_attainment_pct(projection, goal, calendar),
        daily_productivity: daily_productivity(executed, calendar),
    }
}
