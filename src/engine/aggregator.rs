//! Category aggregator.
//!
//! Runs the projector over the six overlapping categories of a month. The
//! portability counter is split in two: click-to-chat is the attributed
//! subset and ecommerce is whatever remains.
//!
//! The aggregate `total` row is asymmetric. Its percentages and productivity
//! come from the plain total pair on the standard calendar, but its projected
//! total is the sum of the migration, portability and new-line projections,
//! each taken on its own calendar. Those two numbers do not agree in general.

use serde::Serialize;

use super::calendar::{BusinessCalendar, CalendarPair, Period};
use super::category::MetricCategory;
use super::projector::{self, project, AttainmentResult};
use super::round_to;
use crate::source::{ActivationCounts, BusinessDays, MonthlyGoals};

/// Business days shown next to the goals (`dias_habiles`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BusinessDaysSummary {
    pub migra: BusinessCalendar,
    pub porta: BusinessCalendar,
}

/// Goals tile payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAttainment {
    #[serde(rename = "anio")]
    pub year: i32,
    #[serde(rename = "mes")]
    pub month: u32,
    #[serde(rename = "dias_habiles")]
    pub business_days: BusinessDaysSummary,
    pub total: AttainmentResult,
    #[serde(rename = "migracion")]
    pub migration: AttainmentResult,
    #[serde(rename = "portabilidad")]
    pub portability: AttainmentResult,
    #[serde(rename = "porta_ecommerce")]
    pub portability_ecommerce: AttainmentResult,
    #[serde(rename = "ctw")]
    pub click_to_chat: AttainmentResult,
    #[serde(rename = "linea_nueva")]
    pub new_line: AttainmentResult,
}

impl MonthlyAttainment {
    pub fn get(&self, category: MetricCategory) -> &AttainmentResult {
        match category {
            MetricCategory::Total => &self.total,
            MetricCategory::Migration => &self.migration,
            MetricCategory::Portability => &self.portability,
            MetricCategory::PortabilityEcommerce => &self.portability_ecommerce,
            MetricCategory::ClickToChat => &self.click_to_chat,
            MetricCategory::NewLine => &self.new_line,
        }
    }

    /// Results in emission order
    pub fn results(&self) -> impl Iterator<Item = &AttainmentResult> {
        MetricCategory::ALL.into_iter().map(move |category| self.get(category))
    }
}

/// Executed counts per category after the portability split
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryExecution {
    pub total: f64,
    pub migration: f64,
    pub portability: f64,
    pub portability_ecommerce: f64,
    pub click_to_chat: f64,
    pub new_line: f64,
}

impl CategoryExecution {
    pub fn from_activations(counts: &ActivationCounts) -> Self {
        Self {
            total: counts.total as f64,
            migration: counts.migration as f64,
            portability: counts.portability as f64,
            portability_ecommerce: counts.portability_ecommerce() as f64,
            click_to_chat: counts.click_to_chat as f64,
            new_line: counts.new_line as f64,
        }
    }

    fn executed(&self, category: MetricCategory) -> f64 {
        match category {
            MetricCategory::Total => self.total,
            MetricCategory::Migration => self.migration,
            MetricCategory::Portability => self.portability,
            MetricCategory::PortabilityEcommerce => self.portability_ecommerce,
            MetricCategory::ClickToChat => self.click_to_chat,
            MetricCategory::NewLine => self.new_line,
        }
    }
}

fn goal(goals: &MonthlyGoals, category: MetricCategory) -> f64 {
    match category {
        MetricCategory::Total => goals.total,
        MetricCategory::Migration => goals.migration,
        MetricCategory::Portability => goals.portability,
        MetricCategory::PortabilityEcommerce => goals.portability_ecommerce,
        MetricCategory::ClickToChat => goals.click_to_chat,
        MetricCategory::NewLine => goals.new_line,
    }
}

/// Sum of the migration, portability and new-line projections, two decimals
pub fn composite_total_projection(execution: &CategoryExecution, calendars: &CalendarPair) -> f64 {
    let composite = projector::raw_projection(execution.migration, &calendars.standard)
        + projector::raw_projection(execution.portability, &calendars.shifted)
        + projector::raw_projection(execution.new_line, &calendars.shifted);
    round_to(composite, MetricCategory::Total.projection_decimals())
}

/// Compute the goals tile for a month that has budget rows.
///
/// Missing activations count as zero and a missing calendar as zero days,
/// matching the outer joins of the source views.
pub fn aggregate_month(
    period: Period,
    goals: &MonthlyGoals,
    activations: Option<&ActivationCounts>,
    business_days: Option<&BusinessDays>,
    portability_day_shift: f64,
) -> MonthlyAttainment {
    let days = business_days.copied().unwrap_or_default();
    let calendars = CalendarPair::new(
        BusinessCalendar::new(period, days.total, days.elapsed),
        portability_day_shift,
    );
    let execution = activations
        .map(CategoryExecution::from_activations)
        .unwrap_or_default();

    let result_for = |category: MetricCategory| {
        let calendar = calendars.for_policy(category.calendar_policy());
        project(category, goal(goals, category), execution.executed(category), calendar)
    };

    let mut total = result_for(MetricCategory::Total);
    total.projected_total = composite_total_projection(&execution, &calendars);

    MonthlyAttainment {
        year: period.year(),
        month: period.month(),
        business_days: BusinessDaysSummary {
            migra: calendars.standard,
            porta: calendars.shifted,
        },
        total,
        migration: result_for(MetricCategory::Migration),
        portability: result_for(MetricCategory::Portability),
        portability_ecommerce: result_for(MetricCategory::PortabilityEcommerce),
        click_to_chat: result_for(MetricCategory::ClickToChat),
        new_line: result_for(MetricCategory::NewLine),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn december() -> Period {
        Period::new(2025, 12).unwrap()
    }

    fn goals() -> MonthlyGoals {
        MonthlyGoals {
            total: 500.0,
            migration: 100.0,
            portability: 300.0,
            portability_ecommerce: 200.0,
            click_to_chat: 100.0,
            new_line: 100.0,
        }
    }

    fn activations() -> ActivationCounts {
        ActivationCounts {
            total: 200,
            migration: 40,
            portability: 120,
            click_to_chat: 30,
            new_line: 40,
        }
    }

    #[test]
    fn test_migration_fixture() {
        let days = BusinessDays {
            total: 30.0,
            elapsed: 15.0,
        };
        let result = aggregate_month(december(), &goals(), Some(&activations()), Some(&days), 3.0);

        assert_eq!(result.migration.attainment_pct, 40.0);
        assert_eq!(result.migration.projected_total, 80.0);
        assert_eq!(result.migration.projected_attainment_pct, 80.0);
        assert_eq!(result.migration.daily_productivity, 2.7);
    }

    #[test]
    fn test_shifted_calendar_drives_portability_family() {
        let days = BusinessDays {
            total: 30.0,
            elapsed: 15.0,
        };
        let result = aggregate_month(december(), &goals(), Some(&activations()), Some(&days), 3.0);

        assert_eq!(result.business_days.porta.total_days, 27.0);
        assert_eq!(result.business_days.porta.elapsed_days, 15.0);
        // 120 * 27 / 15
        assert_eq!(result.portability.projected_total, 216.0);
        assert_eq!(result.portability_ecommerce.executed, 90.0);
        assert_eq!(result.click_to_chat.executed, 30.0);
        // 90 * 27 / 15 = 162 of 200
        assert_eq!(result.portability_ecommerce.projected_attainment_pct, 81.0);
    }

    #[test]
    fn test_total_projection_is_composite() {
        let days = BusinessDays {
            total: 30.0,
            elapsed: 15.0,
        };
        let result = aggregate_month(december(), &goals(), Some(&activations()), Some(&days), 3.0);

        // 40 * 2 + 120 * 1.8 + 40 * 1.8
        assert_eq!(result.total.projected_total, 368.0);
        // the plain run rate would be 200 * 2 = 400
        assert_ne!(result.total.projected_total, 400.0);
        // percentages use the plain pair on the standard calendar
        assert_eq!(result.total.attainment_pct, 40.0);
        assert_eq!(result.total.projected_attainment_pct, 80.0);
        assert_eq!(result.total.daily_productivity, 13.3);
    }

    #[test]
    fn test_composite_keeps_two_decimals() {
        let days = BusinessDays {
            total: 22.0,
            elapsed: 7.0,
        };
        let counts = ActivationCounts {
            total: 10,
            migration: 10,
            portability: 0,
            click_to_chat: 0,
            new_line: 0,
        };
        let result = aggregate_month(december(), &goals(), Some(&counts), Some(&days), 3.0);
        assert_eq!(result.total.projected_total, 31.43);
        assert_eq!(result.migration.projected_total, 31.0);
    }

    #[test]
    fn test_missing_activations_and_calendar_are_zero() {
        let result = aggregate_month(december(), &goals(), None, None, 3.0);
        for item in result.results() {
            assert_eq!(item.executed, 0.0);
            assert_eq!(item.projected_total, 0.0);
            assert_eq!(item.daily_productivity, 0.0);
        }
        assert_eq!(result.business_days.porta.total_days, 0.0);
        assert_eq!(result.total.goal, 500.0);
    }

    #[test]
    fn test_serialized_shape() {
        let days = BusinessDays {
            total: 30.0,
            elapsed: 15.0,
        };
        let result = aggregate_month(december(), &goals(), Some(&activations()), Some(&days), 3.0);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["anio"], 2025);
        assert_eq!(json["mes"], 12);
        assert_eq!(json["dias_habiles"]["porta"]["totales"], 27.0);
        assert_eq!(json["dias_habiles"]["migra"]["transcurridos"], 15.0);
        assert_eq!(json["migracion"]["cumpl_proyeccion"], 80.0);
        assert_eq!(json["ctw"]["ejecucion"], 30.0);
        assert!(json["total"].get("category").is_none());
        assert_eq!(json["total"].as_object().unwrap().len(), 6);
    }

    proptest! {
        #[test]
        fn prop_ecommerce_plus_ctw_is_portability(
            portability in 0i64..100_000,
            ctw_share in 0i64..100_000,
        ) {
            let click_to_chat = ctw_share.min(portability);
            let counts = ActivationCounts {
                total: portability,
                migration: 0,
                portability,
                click_to_chat,
                new_line: 0,
            };
            let execution = CategoryExecution::from_activations(&counts);
            prop_assert_eq!(
                execution.portability_ecommerce + execution.click_to_chat,
                execution.portability
            );
        }

        #[test]
        fn prop_shifted_total_is_floored(total in 0u32..40, elapsed in 0u32..40) {
            let days = BusinessDays { total: total as f64, elapsed: elapsed as f64 };
            let result = aggregate_month(december(), &goals(), None, Some(&days), 3.0);
            prop_assert_eq!(
                result.business_days.porta.total_days,
                (total as f64 - 3.0).max(0.0)
            );
            prop_assert_eq!(result.business_days.porta.elapsed_days, elapsed as f64);
        }
    }
}
