//! Metric categories and the calendar each one is measured against.
//!
//! Adding a category means adding a row to [`MetricCategory::ALL`] and
//! answering the three questions below; nothing else picks a calendar.

use super::calendar::CalendarPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricCategory {
    Total,
    Migration,
    Portability,
    PortabilityEcommerce,
    ClickToChat,
    NewLine,
}

impl MetricCategory {
    /// Emission order of the goals tile
    pub const ALL: [MetricCategory; 6] = [
        MetricCategory::Total,
        MetricCategory::Migration,
        MetricCategory::Portability,
        MetricCategory::PortabilityEcommerce,
        MetricCategory::ClickToChat,
        MetricCategory::NewLine,
    ];

    /// Calendar for attainment and productivity.
    ///
    /// `Total` only uses the standard calendar for its percentages and
    /// productivity; its projection is a composite (see the aggregator).
    pub fn calendar_policy(self) -> CalendarPolicy {
        match self {
            MetricCategory::Total | MetricCategory::Migration => CalendarPolicy::Standard,
            MetricCategory::Portability
            | MetricCategory::PortabilityEcommerce
            | MetricCategory::ClickToChat
            | MetricCategory::NewLine => CalendarPolicy::Shifted,
        }
    }

    /// Decimal places kept on the projected total
    pub fn projection_decimals(self) -> u32 {
        match self {
            MetricCategory::Total => 2,
            _ => 0,
        }
    }

    /// Key of the category object in the goals payload
    pub fn wire_key(self) -> &'static str {
        match self {
            MetricCategory::Total => "total",
            MetricCategory::Migration => "migracion",
            MetricCategory::Portability => "portabilidad",
            MetricCategory::PortabilityEcommerce => "porta_ecommerce",
            MetricCategory::ClickToChat => "ctw",
            MetricCategory::NewLine => "linea_nueva",
        }
    }
}
