//! Heat map of activations by week-of-month and weekday.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use super::calendar::Period;
use crate::constants::{weekday_letter, weekday_name, weekday_ordinal};
use crate::source::DailyActivations;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatMapCell {
    pub semana_mes: u32,
    pub dia_semana_num: u32,
    pub dia_semana: &'static str,
    pub cantidad: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatMapSummary {
    pub mejor_semana: String,
    pub mejor_dia: &'static str,
    pub total: i64,
}

/// Heat-map tile payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatMap {
    pub datos: Vec<HeatMapCell>,
    pub resumen: HeatMapSummary,
}

fn sunday_on_or_before(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Sunday boundaries crossed since the 1st of the month, plus one
pub fn week_of_month(date: NaiveDate) -> u32 {
    let first = date.with_day(1).unwrap_or(date);
    let weeks = (sunday_on_or_before(date) - sunday_on_or_before(first)).num_days() / 7;
    weeks as u32 + 1
}

/// Key with the largest sum; ties go to the smallest key
pub fn argmax_first<K: Ord + Copy>(sums: &BTreeMap<K, i64>) -> Option<K> {
    let mut best: Option<(K, i64)> = None;
    for (key, sum) in sums {
        match best {
            Some((_, best_sum)) if *sum <= best_sum => {}
            _ => best = Some((*key, *sum)),
        }
    }
    best.map(|(key, _)| key)
}

/// Build the grid from the days of `period` strictly before `today`.
///
/// Returns `None` when no day qualifies.
pub fn build_heat_map(
    period: Period,
    activations: &[DailyActivations],
    today: NaiveDate,
) -> Option<HeatMap> {
    let days: Vec<&DailyActivations> = activations
        .iter()
        .filter(|day| period.contains(day.date) && day.date < today)
        .collect();
    if days.is_empty() {
        return None;
    }

    let mut datos: Vec<HeatMapCell> = days
        .iter()
        .map(|day| HeatMapCell {
            semana_mes: week_of_month(day.date),
            dia_semana_num: weekday_ordinal(day.date.weekday()),
            dia_semana: weekday_letter(day.date.weekday()),
            cantidad: day.counts.total,
        })
        .collect();
    datos.sort_by_key(|cell| (cell.semana_mes, cell.dia_semana_num));

    let mut by_week: BTreeMap<u32, i64> = BTreeMap::new();
    let mut by_weekday: BTreeMap<u32, i64> = BTreeMap::new();
    for cell in &datos {
        *by_week.entry(cell.semana_mes).or_default() += cell.cantidad;
        *by_weekday.entry(cell.dia_semana_num).or_default() += cell.cantidad;
    }

    let best_week = argmax_first(&by_week)?;
    let best_weekday = argmax_first(&by_weekday)?;
    let best_day = days
        .iter()
        .map(|day| day.date.weekday())
        .find(|weekday| weekday_ordinal(*weekday) == best_weekday)?;

    Some(HeatMap {
        resumen: HeatMapSummary {
            mejor_semana: format!("Semana {best_week}"),
            mejor_dia: weekday_name(best_day),
            total: datos.iter().map(|cell| cell.cantidad).sum(),
        },
        datos,
    })
}
