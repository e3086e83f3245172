//! Period series builder.
//!
//! Two series share this module:
//!
//! - the daily evolution, where each row carries a *smoothed* daily goal that
//!   spreads the remaining month goal over the remaining business days;
//! - the weekly breakdown, where each week's goal is proportional to the
//!   number of days it contributed.
//!
//! Window averages (`promedio_*`) are computed over every row of the response
//! and repeated on each row.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use super::calendar::{BusinessCalendar, CalendarPair, Period};
use super::{ratio_or_zero, round1, window_average};
use crate::source::{BusinessDays, DailyActivations, DailyAttempts, MonthlyGoals};

/// Daily goal that absorbs the shortfall or surplus accumulated so far.
///
/// With business days left: `(month_goal - cumulative) / remaining`.
/// Otherwise the flat `month_goal / total_days`.
pub fn smoothed_daily_goal(
    month_goal: f64,
    cumulative_executed: f64,
    calendar: &BusinessCalendar,
) -> f64 {
    let remaining = calendar.remaining_days();
    if remaining > 0.0 {
        round1((month_goal - cumulative_executed) / remaining)
    } else {
        round1(ratio_or_zero(month_goal, calendar.total_days))
    }
}

/// Goal for a week that contributed `days_in_week` days
pub fn week_goal(month_goal: f64, total_days: f64, days_in_week: u32) -> f64 {
    ratio_or_zero(month_goal, total_days) * f64::from(days_in_week)
}

/// `DATEPART(WEEK, date)` with a Sunday week start: week 1 holds 1 January
pub fn week_of_year(date: NaiveDate) -> u32 {
    let jan_first = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
    let offset = jan_first.weekday().num_days_from_sunday();
    (date.ordinal0() + offset) / 7 + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActivationsOfDay {
    pub total: i64,
    pub migraciones: i64,
    pub portabilidades: i64,
    pub ctw: i64,
    pub linea_nueva: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AttemptsOfDay {
    pub total: i64,
    pub migraciones: i64,
    pub portabilidades: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyGoals {
    pub total: f64,
    pub migraciones: f64,
    pub portabilidades: f64,
    pub linea_nueva: f64,
}

/// One day of the evolution chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeriesPoint {
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    pub r5: ActivationsOfDay,
    pub v9: AttemptsOfDay,
    pub metas_diarias: DailyGoals,
    pub promedio_r5: f64,
    pub promedio_v9: f64,
    pub promedio_meta: f64,
}

impl DailySeriesPoint {
    pub fn actual_value(&self) -> i64 {
        self.r5.total
    }

    pub fn daily_goal(&self) -> f64 {
        self.metas_diarias.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesAverages {
    pub r5: f64,
    pub v9: f64,
    pub meta: f64,
}

/// Evolution tile payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionSeries {
    pub datos_diarios: Vec<DailySeriesPoint>,
    pub promedios: SeriesAverages,
}

/// Build the daily evolution of a month.
///
/// Rows follow the activation days; attempts are matched by date and default
/// to zero. Returns `None` when there are no activation days.
pub fn build_daily_evolution(
    period: Period,
    goals: &MonthlyGoals,
    business_days: &BusinessDays,
    activations: &[DailyActivations],
    attempts: &[DailyAttempts],
    portability_day_shift: f64,
) -> Option<EvolutionSeries> {
    let mut days: Vec<&DailyActivations> = activations
        .iter()
        .filter(|day| period.contains(day.date))
        .collect();
    if days.is_empty() {
        return None;
    }
    days.sort_by_key(|day| day.date);

    let calendars = CalendarPair::new(
        BusinessCalendar::new(period, business_days.total, business_days.elapsed),
        portability_day_shift,
    );
    let cumulative: i64 = days.iter().map(|day| day.counts.total).sum();
    let goals_of_day = DailyGoals {
        total: smoothed_daily_goal(goals.total, cumulative as f64, &calendars.standard),
        migraciones: round1(ratio_or_zero(goals.migration, calendars.standard.total_days)),
        portabilidades: round1(ratio_or_zero(goals.portability, calendars.shifted.total_days)),
        linea_nueva: round1(ratio_or_zero(goals.new_line, calendars.shifted.total_days)),
    };

    let attempts_by_date: BTreeMap<NaiveDate, AttemptsOfDay> = attempts
        .iter()
        .map(|day| {
            (
                day.date,
                AttemptsOfDay {
                    total: day.counts.total,
                    migraciones: day.counts.migration,
                    portabilidades: day.counts.portability,
                },
            )
        })
        .collect();

    let mut points: Vec<DailySeriesPoint> = days
        .into_iter()
        .map(|day| DailySeriesPoint {
            date: day.date,
            r5: ActivationsOfDay {
                total: day.counts.total,
                migraciones: day.counts.migration,
                portabilidades: day.counts.portability,
                ctw: day.counts.click_to_chat,
                linea_nueva: day.counts.new_line,
            },
            v9: attempts_by_date.get(&day.date).copied().unwrap_or_default(),
            metas_diarias: goals_of_day,
            promedio_r5: 0.0,
            promedio_v9: 0.0,
            promedio_meta: 0.0,
        })
        .collect();

    let averages = SeriesAverages {
        r5: round1(window_average(points.iter().map(|p| p.r5.total as f64))),
        v9: round1(window_average(points.iter().map(|p| p.v9.total as f64))),
        meta: round1(window_average(points.iter().map(|p| p.metas_diarias.total))),
    };
    for point in &mut points {
        point.promedio_r5 = averages.r5;
        point.promedio_v9 = averages.v9;
        point.promedio_meta = averages.meta;
    }

    Some(EvolutionSeries {
        datos_diarios: points,
        promedios: averages,
    })
}

/// One week of the breakdown table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekSummary {
    pub numero_semana: u32,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    pub migraciones: i64,
    pub portabilidades_total: i64,
    pub porta_ecommerce: i64,
    pub ctw: i64,
    pub linea_nueva: i64,
    pub total: i64,
    pub dias_semana: u32,
    pub meta_semana: f64,
    pub cumplimiento: f64,
    pub promedio_total: f64,
}

/// Weekly breakdown tile payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyBreakdown {
    pub semanas: Vec<WeekSummary>,
    pub total_mes: i64,
}

/// Group the month's activation days into `DATEPART(WEEK)` buckets.
///
/// Returns `None` when there are no activation days.
pub fn build_weekly_breakdown(
    period: Period,
    goals: &MonthlyGoals,
    business_days: &BusinessDays,
    activations: &[DailyActivations],
) -> Option<WeeklyBreakdown> {
    let mut weeks: BTreeMap<u32, Vec<&DailyActivations>> = BTreeMap::new();
    for day in activations.iter().filter(|day| period.contains(day.date)) {
        weeks.entry(week_of_year(day.date)).or_default().push(day);
    }
    if weeks.is_empty() {
        return None;
    }

    let mut semanas: Vec<WeekSummary> = weeks
        .into_iter()
        .filter_map(|(number, days)| summarize_week(number, &days, goals, business_days))
        .collect();

    let promedio = round1(window_average(semanas.iter().map(|week| week.total as f64)));
    for week in &mut semanas {
        week.promedio_total = promedio;
    }
    let total_mes = semanas.iter().map(|week| week.total).sum();

    Some(WeeklyBreakdown { semanas, total_mes })
}

fn summarize_week(
    number: u32,
    days: &[&DailyActivations],
    goals: &MonthlyGoals,
    business_days: &BusinessDays,
) -> Option<WeekSummary> {
    let fecha_inicio = days.iter().map(|day| day.date).min()?;
    let fecha_fin = days.iter().map(|day| day.date).max()?;

    let mut distinct: Vec<NaiveDate> = days.iter().map(|day| day.date).collect();
    distinct.sort_unstable();
    distinct.dedup();
    let dias_semana = distinct.len() as u32;

    let sum = |field: fn(&DailyActivations) -> i64| days.iter().map(|day| field(day)).sum::<i64>();
    let portabilidades_total = sum(|day| day.counts.portability);
    let ctw = sum(|day| day.counts.click_to_chat);
    let total = sum(|day| day.counts.total);

    let goal = week_goal(goals.total, business_days.total, dias_semana);
    let meta_semana = round1(goal);
    let cumplimiento = if meta_semana > 0.0 {
        round1(total as f64 / goal * 100.0)
    } else {
        0.0
    };

    Some(WeekSummary {
        numero_semana: number,
        fecha_inicio,
        fecha_fin,
        migraciones: sum(|day| day.counts.migration),
        portabilidades_total,
        porta_ecommerce: portabilidades_total - ctw,
        ctw,
        linea_nueva: sum(|day| day.counts.new_line),
        total,
        dias_semana,
        meta_semana,
        cumplimiento,
        promedio_total: 0.0,
    })
}
