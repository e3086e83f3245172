//! Postpaid sales tiles.
//!
//! Every public method follows the same shape: `fetch_*` opens a session,
//! reads what the tile needs and returns `Result<Option<T>>`; [`settle`]
//! turns that into a [`TileOutcome`] and writes the operation log. The
//! session is a local of `fetch_*`, so it is released before settling.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

use super::TileOutcome;
use crate::config::BudgetConfig;
use crate::constants::messages;
use crate::engine::comparison::{build_comparison, Comparison};
use crate::engine::daily_close::{build_daily_close, CloseDates, DailyClose};
use crate::engine::heatmap::{build_heat_map, HeatMap};
use crate::engine::intraday::{build_intraday_cuts, IntradayCuts};
use crate::engine::series::{
    build_daily_evolution, build_weekly_breakdown, EvolutionSeries, WeeklyBreakdown,
};
use crate::engine::{aggregate_month, MonthlyAttainment, Period};
use crate::error::Result;
use crate::logging::{log_error, log_report_operation};
use crate::source::SalesSource;

/// Tile names used in logs
pub mod tiles {
    pub const GOALS: &str = "metas_objetivos";
    pub const DAILY_CLOSE: &str = "cierre_dia_anterior";
    pub const INTRADAY: &str = "cortes_dia_hoy";
    pub const EVOLUTION: &str = "evolucion_ventas";
    pub const WEEKLY: &str = "desglose_semanal";
    pub const HEAT_MAP: &str = "mapa_calor";
    pub const COMPARISON: &str = "comparativo";
}

#[derive(Clone)]
pub struct PospagoService {
    source: Arc<dyn SalesSource>,
    portability_day_shift: f64,
}

impl std::fmt::Debug for PospagoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PospagoService")
            .field("source", &self.source.name())
            .field("portability_day_shift", &self.portability_day_shift)
            .finish()
    }
}

/// Count of rows a payload carries, for the operation log
trait RowCount {
    fn row_count(&self) -> usize;
}

impl RowCount for MonthlyAttainment {
    fn row_count(&self) -> usize {
        self.results().count()
    }
}

impl RowCount for DailyClose {
    fn row_count(&self) -> usize {
        1
    }
}

impl RowCount for IntradayCuts {
    fn row_count(&self) -> usize {
        self.cortes_por_franja.len()
    }
}

impl RowCount for EvolutionSeries {
    fn row_count(&self) -> usize {
        self.datos_diarios.len()
    }
}

impl RowCount for WeeklyBreakdown {
    fn row_count(&self) -> usize {
        self.semanas.len()
    }
}

impl RowCount for HeatMap {
    fn row_count(&self) -> usize {
        self.datos.len()
    }
}

impl RowCount for Comparison {
    fn row_count(&self) -> usize {
        self.comparativo.len()
    }
}

fn settle<T: RowCount>(
    tile: &str,
    period: Option<Period>,
    result: Result<Option<T>>,
    empty_message: impl FnOnce() -> String,
) -> TileOutcome<T> {
    let period_label = period.map(|p| p.to_string());
    match result {
        Ok(Some(payload)) => {
            log_report_operation(
                tile,
                period_label.as_deref(),
                "ok",
                Some(payload.row_count()),
                None,
            );
            TileOutcome::Data(payload)
        }
        Ok(None) => {
            let message = empty_message();
            log_report_operation(tile, period_label.as_deref(), "empty", Some(0), Some(&message));
            TileOutcome::NoData { message }
        }
        Err(error) => {
            log_error(
                "pospago_service",
                tile,
                &error.to_string(),
                period_label.as_deref(),
            );
            TileOutcome::Failed { error }
        }
    }
}

impl PospagoService {
    pub fn new(source: Arc<dyn SalesSource>, budget: &BudgetConfig) -> Self {
        Self {
            source,
            portability_day_shift: budget.portability_day_shift,
        }
    }

    /// Goals, execution, attainment and projections for every category
    pub async fn monthly_goals(&self, period: Period) -> TileOutcome<MonthlyAttainment> {
        let result = self.fetch_monthly_goals(period).await;
        settle(tiles::GOALS, Some(period), result, || {
            messages::no_data_for_period(period.year(), period.month())
        })
    }

    async fn fetch_monthly_goals(&self, period: Period) -> Result<Option<MonthlyAttainment>> {
        let mut session = self.source.open().await?;
        let Some(goals) = session.monthly_goals(period).await? else {
            return Ok(None);
        };
        let activations = session.monthly_activations(period).await?;
        let business_days = session.business_days(period).await?;

        debug!(
            period = %period,
            has_activations = activations.is_some(),
            has_calendar = business_days.is_some(),
            "Aggregating monthly goals"
        );

        Ok(Some(aggregate_month(
            period,
            &goals,
            activations.as_ref(),
            business_days.as_ref(),
            self.portability_day_shift,
        )))
    }

    /// Yesterday's close against the same weekday last week and last month
    pub async fn previous_day_close(&self, today: NaiveDate) -> TileOutcome<DailyClose> {
        let result = self.fetch_previous_day_close(today).await;
        settle(tiles::DAILY_CLOSE, None, result, || {
            messages::NO_PREVIOUS_DAY.to_string()
        })
    }

    async fn fetch_previous_day_close(&self, today: NaiveDate) -> Result<Option<DailyClose>> {
        let dates = CloseDates::for_today(today);
        let mut session = self.source.open().await?;
        let Some(activations) = session.activations_on(dates.yesterday).await? else {
            return Ok(None);
        };
        let attempts = session.attempts_on(dates.yesterday).await?;
        let week_before = session.activations_on(dates.week_before).await?;
        let month_before = session.activations_on(dates.month_before).await?;

        Ok(build_daily_close(
            dates,
            Some(&activations),
            attempts.as_ref(),
            week_before.as_ref(),
            month_before.as_ref(),
        ))
    }

    /// Today's attempts by hour band
    pub async fn intraday_cuts(&self, today: NaiveDate) -> TileOutcome<IntradayCuts> {
        let result = self.fetch_intraday_cuts(today).await;
        settle(tiles::INTRADAY, None, result, || {
            messages::NO_CUTS_TODAY.to_string()
        })
    }

    async fn fetch_intraday_cuts(&self, today: NaiveDate) -> Result<Option<IntradayCuts>> {
        let mut session = self.source.open().await?;
        let hours = session.hourly_cuts_today().await?;
        Ok(build_intraday_cuts(today, &hours))
    }

    /// Daily activations and attempts with the smoothed daily goal
    pub async fn sales_evolution(&self, period: Period) -> TileOutcome<EvolutionSeries> {
        let result = self.fetch_sales_evolution(period).await;
        settle(tiles::EVOLUTION, Some(period), result, || {
            messages::no_data_for_period(period.year(), period.month())
        })
    }

    async fn fetch_sales_evolution(&self, period: Period) -> Result<Option<EvolutionSeries>> {
        let mut session = self.source.open().await?;
        let Some(goals) = session.monthly_goals(period).await? else {
            return Ok(None);
        };
        let Some(business_days) = session.business_days(period).await? else {
            return Ok(None);
        };
        let activations = session.daily_activations(period).await?;
        let attempts = session.daily_attempts(period).await?;

        Ok(build_daily_evolution(
            period,
            &goals,
            &business_days,
            &activations,
            &attempts,
            self.portability_day_shift,
        ))
    }

    /// Weekly totals against a goal proportional to the days of each week
    pub async fn weekly_breakdown(&self, period: Period) -> TileOutcome<WeeklyBreakdown> {
        let result = self.fetch_weekly_breakdown(period).await;
        settle(tiles::WEEKLY, Some(period), result, || {
            messages::no_data_for_period(period.year(), period.month())
        })
    }

    async fn fetch_weekly_breakdown(&self, period: Period) -> Result<Option<WeeklyBreakdown>> {
        let mut session = self.source.open().await?;
        let Some(goals) = session.monthly_goals(period).await? else {
            return Ok(None);
        };
        let Some(business_days) = session.business_days(period).await? else {
            return Ok(None);
        };
        let activations = session.daily_activations(period).await?;

        Ok(build_weekly_breakdown(
            period,
            &goals,
            &business_days,
            &activations,
        ))
    }

    /// Activations by week-of-month and weekday, days before `today` only
    pub async fn heat_map(&self, period: Period, today: NaiveDate) -> TileOutcome<HeatMap> {
        let result = self.fetch_heat_map(period, today).await;
        settle(tiles::HEAT_MAP, Some(period), result, || {
            messages::no_data_for_period(period.year(), period.month())
        })
    }

    async fn fetch_heat_map(&self, period: Period, today: NaiveDate) -> Result<Option<HeatMap>> {
        let mut session = self.source.open().await?;
        let activations = session.daily_activations(period).await?;
        Ok(build_heat_map(period, &activations, today))
    }

    /// Attempts vs activations per category for the month
    pub async fn comparison(&self, period: Period) -> TileOutcome<Comparison> {
        let result = self.fetch_comparison(period).await;
        settle(tiles::COMPARISON, Some(period), result, || {
            messages::no_data_for_period(period.year(), period.month())
        })
    }

    async fn fetch_comparison(&self, period: Period) -> Result<Option<Comparison>> {
        let mut session = self.source.open().await?;
        let attempts = session.monthly_attempts(period).await?;
        let activations = session.monthly_activations(period).await?;
        Ok(build_comparison(attempts.as_ref(), activations.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportingError;
    use crate::source::{
        ActivationCounts, AttemptCounts, BusinessDays, HourlyCut, InMemorySalesSource,
        MonthlyGoals,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn december() -> Period {
        Period::new(2025, 12).unwrap()
    }

    fn counts(total: i64) -> ActivationCounts {
        ActivationCounts {
            total,
            migration: total / 2,
            portability: total - total / 2,
            click_to_chat: 1,
            new_line: 0,
        }
    }

    fn seeded() -> InMemorySalesSource {
        InMemorySalesSource::new()
            .with_goals(
                december(),
                MonthlyGoals {
                    total: 300.0,
                    migration: 100.0,
                    portability: 150.0,
                    portability_ecommerce: 100.0,
                    click_to_chat: 50.0,
                    new_line: 50.0,
                },
            )
            .with_business_days(
                december(),
                BusinessDays {
                    total: 22.0,
                    elapsed: 5.0,
                },
            )
            .with_daily_activations(date(2025, 12, 1), counts(10))
            .with_daily_activations(date(2025, 12, 2), counts(14))
            .with_daily_activations(date(2025, 12, 9), counts(8))
            .with_daily_activations(date(2025, 12, 10), counts(6))
            .with_daily_activations(date(2025, 11, 9), counts(4))
            .with_daily_attempts(
                date(2025, 12, 9),
                AttemptCounts {
                    total: 16,
                    migration: 8,
                    portability: 6,
                    new_line: 2,
                },
            )
            .with_monthly_attempts(
                december(),
                AttemptCounts {
                    total: 80,
                    migration: 40,
                    portability: 30,
                    new_line: 10,
                },
            )
            .with_hourly_cut(HourlyCut {
                hour: 11,
                attempts: 7,
                migration: 3,
                portability: 4,
                new_line: 0,
            })
    }

    fn service(source: &InMemorySalesSource) -> PospagoService {
        PospagoService::new(Arc::new(source.clone()), &BudgetConfig::default())
    }

    #[tokio::test]
    async fn test_monthly_goals_tile() {
        let source = seeded();
        let outcome = service(&source).monthly_goals(december()).await;
        let goals = outcome.data().unwrap();
        assert_eq!(goals.total.executed, 38.0);
        assert_eq!(goals.business_days.porta.total_days, 19.0);
        assert_eq!(source.live_sessions(), 0);
    }

    #[tokio::test]
    async fn test_monthly_goals_without_budget_is_no_data() {
        let source = seeded();
        let period = Period::new(2030, 1).unwrap();
        let outcome = service(&source).monthly_goals(period).await;
        assert_eq!(
            outcome,
            TileOutcome::NoData {
                message: "No hay datos para 2030-01".to_string()
            }
        );
        assert_eq!(source.live_sessions(), 0);
    }

    #[tokio::test]
    async fn test_failures_degrade_and_release_sessions() {
        let source = seeded();
        source.set_failing(true);
        let service = service(&source);

        let goals = service.monthly_goals(december()).await;
        let evolution = service.sales_evolution(december()).await;
        let cuts = service.intraday_cuts(date(2025, 12, 10)).await;

        assert!(!goals.is_data());
        assert!(!evolution.is_data());
        assert!(!cuts.is_data());
        assert!(matches!(
            service.comparison(december()).await,
            TileOutcome::Failed {
                error: ReportingError::Database(_)
            }
        ));
        assert_eq!(source.live_sessions(), 0);
        assert_eq!(source.opened_sessions(), 4);
    }

    #[tokio::test]
    async fn test_previous_day_close_tile() {
        let source = seeded();
        let close = service(&source)
            .previous_day_close(date(2025, 12, 10))
            .await
            .data()
            .unwrap();
        assert_eq!(close.fecha, date(2025, 12, 9));
        assert_eq!(close.tasa_activacion, 50.0);
        // 2025-12-02 is today - 8
        assert_eq!(close.comparativos.semana_anterior.activadas, 14);
        assert_eq!(close.comparativos.mes_anterior.activadas, 4);
        assert_eq!(close.comparativos.mes_anterior.variacion_pct, 100.0);
    }

    #[tokio::test]
    async fn test_previous_day_close_needs_both_comparison_days() {
        let source = seeded();
        // yesterday is 2025-12-02, but 2025-11-25 has no row
        let outcome = service(&source).previous_day_close(date(2025, 12, 3)).await;
        assert_eq!(
            outcome,
            TileOutcome::NoData {
                message: "No hay datos del día anterior".to_string()
            }
        );
        assert_eq!(source.live_sessions(), 0);
    }

    #[tokio::test]
    async fn test_previous_day_close_without_row() {
        let source = seeded();
        let outcome = service(&source).previous_day_close(date(2025, 12, 20)).await;
        assert_eq!(
            outcome,
            TileOutcome::NoData {
                message: "No hay datos del día anterior".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_series_tiles() {
        let source = seeded();
        let service = service(&source);

        let evolution = service.sales_evolution(december()).await.data().unwrap();
        assert_eq!(evolution.datos_diarios.len(), 4);
        assert_eq!(evolution.datos_diarios[2].v9.total, 16);

        let weekly = service.weekly_breakdown(december()).await.data().unwrap();
        assert_eq!(weekly.total_mes, 38);

        let heat = service
            .heat_map(december(), date(2025, 12, 10))
            .await
            .data()
            .unwrap();
        assert_eq!(heat.resumen.total, 32);

        let comparison = service.comparison(december()).await.data().unwrap();
        assert_eq!(comparison.comparativo.len(), 6);

        let cuts = service.intraday_cuts(date(2025, 12, 10)).await.data().unwrap();
        assert_eq!(cuts.cortes_por_franja[0].franja, "10-12");
        assert_eq!(source.live_sessions(), 0);
    }

    #[tokio::test]
    async fn test_evolution_requires_calendar() {
        let source = InMemorySalesSource::new()
            .with_goals(december(), MonthlyGoals::default())
            .with_daily_activations(date(2025, 12, 1), counts(3));
        let outcome = service(&source).sales_evolution(december()).await;
        assert!(matches!(outcome, TileOutcome::NoData { .. }));
    }
}
