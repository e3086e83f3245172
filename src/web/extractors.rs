//! # Query Parameters
//!
//! Query strings are taken as raw strings and parsed here, so a malformed
//! `anio`/`mes` degrades the tile like any other failure instead of being
//! rejected by the extractor. Blank values count as absent.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::analytics::clicks::BusinessUnit;
use crate::engine::Period;
use crate::error::{ReportingError, Result};

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// `?anio=YYYY&mes=MM`, each defaulting to the current local date
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeriodQuery {
    pub anio: Option<String>,
    pub mes: Option<String>,
}

impl PeriodQuery {
    pub fn resolve(&self, today: NaiveDate) -> Result<Period> {
        let year = match present(&self.anio) {
            Some(raw) => raw.parse::<i32>().map_err(|_| {
                ReportingError::invalid_parameter(format!("anio must be a year (got '{raw}')"))
            })?,
            None => today.year(),
        };
        let month = match present(&self.mes) {
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                ReportingError::invalid_parameter(format!("mes must be 1-12 (got '{raw}')"))
            })?,
            None => today.month(),
        };
        Period::new(year, month)
    }
}

/// `?start=...&end=...` for the GA4 endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DateRangeQuery {
    pub fn start(&self) -> Option<&str> {
        present(&self.start)
    }

    pub fn end(&self) -> Option<&str> {
        present(&self.end)
    }
}

/// `?start&end&unit&session_id` for the click attribution endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClickQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub unit: Option<String>,
    pub session_id: Option<String>,
}

impl ClickQuery {
    pub fn start(&self) -> Option<&str> {
        present(&self.start)
    }

    pub fn end(&self) -> Option<&str> {
        present(&self.end)
    }

    /// Unknown units are ignored, as the dashboard sends its tab name as-is
    pub fn unit(&self) -> Option<BusinessUnit> {
        present(&self.unit).and_then(BusinessUnit::parse)
    }

    pub fn session_id(&self) -> Option<&str> {
        present(&self.session_id)
    }
}
