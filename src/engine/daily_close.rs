//! Previous-day close with week-ago and month-ago comparisons.

use chrono::{Duration, Months, NaiveDate};
use serde::Serialize;

use super::comparison::activation_rate;
use super::round1;
use crate::source::{ActivationCounts, AttemptCounts};

/// The three dates a close compares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseDates {
    pub yesterday: NaiveDate,
    /// Same weekday as yesterday, one week earlier (`today - 8`)
    pub week_before: NaiveDate,
    /// Yesterday minus one calendar month, clamped to the month end
    pub month_before: NaiveDate,
}

impl CloseDates {
    pub fn for_today(today: NaiveDate) -> Self {
        let yesterday = today - Duration::days(1);
        Self {
            yesterday,
            week_before: today - Duration::days(8),
            month_before: yesterday
                .checked_sub_months(Months::new(1))
                .unwrap_or(yesterday),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CloseAttempts {
    pub total: i64,
    pub migraciones: i64,
    pub portabilidades: i64,
    pub linea_nueva: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CloseActivations {
    pub total: i64,
    pub migraciones: i64,
    pub portabilidades_total: i64,
    pub porta_ecommerce: i64,
    pub ctw: i64,
    pub linea_nueva: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CloseComparison {
    pub activadas: i64,
    pub variacion_pct: f64,
}

impl CloseComparison {
    fn against(current: i64, previous: i64) -> Self {
        Self {
            activadas: previous,
            variacion_pct: variation_pct(current, previous),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CloseComparisons {
    pub semana_anterior: CloseComparison,
    pub mes_anterior: CloseComparison,
}

/// Previous-day close tile payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyClose {
    pub fecha: NaiveDate,
    pub cantadas: CloseAttempts,
    pub activadas: CloseActivations,
    pub tasa_activacion: f64,
    pub comparativos: CloseComparisons,
}

/// `(current - previous) / previous * 100`, one decimal, `0` when previous is 0
pub fn variation_pct(current: i64, previous: i64) -> f64 {
    if previous > 0 {
        round1((current - previous) as f64 / previous as f64 * 100.0)
    } else {
        0.0
    }
}

/// Build the close for `dates.yesterday`.
///
/// `None` unless yesterday, the week-ago day and the month-ago day all have an
/// activation row. Missing attempts for yesterday count as zero.
pub fn build_daily_close(
    dates: CloseDates,
    activations: Option<&ActivationCounts>,
    attempts: Option<&AttemptCounts>,
    week_before: Option<&ActivationCounts>,
    month_before: Option<&ActivationCounts>,
) -> Option<DailyClose> {
    let act = activations?;
    let week_total = week_before?.total;
    let month_total = month_before?.total;
    let att = attempts.copied().unwrap_or_default();

    Some(DailyClose {
        fecha: dates.yesterday,
        cantadas: CloseAttempts {
            total: att.total,
            migraciones: att.migration,
            portabilidades: att.portability,
            linea_nueva: att.new_line,
        },
        activadas: CloseActivations {
            total: act.total,
            migraciones: act.migration,
            portabilidades_total: act.portability,
            porta_ecommerce: act.portability_ecommerce(),
            ctw: act.click_to_chat,
            linea_nueva: act.new_line,
        },
        tasa_activacion: activation_rate(att.total, act.total),
        comparativos: CloseComparisons {
            semana_anterior: CloseComparison::against(act.total, week_total),
            mes_anterior: CloseComparison::against(act.total, month_total),
        },
    })
}
