//! # GA4 Web Performance
//!
//! Site metrics, page load times, the marketing funnel and home page click
//! attribution, read from Google Analytics 4. GA4 is treated as an opaque
//! report engine behind [`Ga4ReportSource`]: a request names dimensions and
//! metrics over a date range and the answer is rows of strings. Everything
//! the dashboard shows is reshaped from those rows by the pure functions in
//! [`reports`] and [`clicks`].
//!
//! ## Key Components
//!
//! - [`client`] - [`Ga4RestClient`], the `runReport` REST implementation
//! - [`reports`] - request builders, row reshaping and [`Ga4ReportService`]
//! - [`clicks`] - home page click attribution and per-session click flows
//! - [`canned`] - a fixed-answer source for tests and demo mode

pub mod canned;
pub mod clicks;
pub mod client;
pub mod reports;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ReportingError, Result};

pub use canned::CannedReportSource;
pub use client::Ga4RestClient;
pub use reports::Ga4ReportService;

/// GA4 date range; each bound is `YYYY-MM-DD`, `today`, `yesterday` or `NdaysAgo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

impl DateRange {
    /// Resolve `start`/`end` independently against fixed relative defaults
    pub fn with_defaults(
        start: Option<&str>,
        end: Option<&str>,
        default_start: &str,
        default_end: &str,
    ) -> Result<Self> {
        Ok(Self {
            start_date: parse_date_param("start", start.unwrap_or(default_start))?,
            end_date: parse_date_param("end", end.unwrap_or(default_end))?,
        })
    }

    /// Use `start`/`end` when both are given, otherwise the `window_days`
    /// before `today` through `today`.
    ///
    /// A bound that is present is validated even when the window applies.
    pub fn or_trailing_window(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
        window_days: i64,
    ) -> Result<Self> {
        let start = start.map(|value| parse_date_param("start", value)).transpose()?;
        let end = end.map(|value| parse_date_param("end", value)).transpose()?;
        match (start, end) {
            (Some(start_date), Some(end_date)) => Ok(Self {
                start_date,
                end_date,
            }),
            _ => Ok(Self {
                start_date: (today - Duration::days(window_days)).to_string(),
                end_date: today.to_string(),
            }),
        }
    }
}

/// Validate one GA4 date parameter, returning it trimmed
pub fn parse_date_param(name: &str, raw: &str) -> Result<String> {
    let value = raw.trim();
    let relative = matches!(value, "today" | "yesterday")
        || value
            .strip_suffix("daysAgo")
            .is_some_and(|days| !days.is_empty() && days.bytes().all(|b| b.is_ascii_digit()));

    if relative || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        Ok(value.to_string())
    } else {
        Err(ReportingError::invalid_parameter(format!(
            "{name} must be YYYY-MM-DD, today, yesterday or NdaysAgo (got '{raw}')"
        )))
    }
}

/// How a [`DimensionFilter`] matches its field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterMatch {
    Exact(String),
    InList(Vec<String>),
}

/// One dimension condition; a request's filters are combined with AND
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionFilter {
    pub field: &'static str,
    pub matcher: FilterMatch,
}

impl DimensionFilter {
    pub fn exact(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            matcher: FilterMatch::Exact(value.into()),
        }
    }

    pub fn in_list(field: &'static str, values: Vec<String>) -> Self {
        Self {
            field,
            matcher: FilterMatch::InList(values),
        }
    }
}

/// One `runReport` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub dimensions: Vec<&'static str>,
    pub metrics: Vec<&'static str>,
    pub date_range: DateRange,
    pub limit: Option<u32>,
    pub filters: Vec<DimensionFilter>,
}

impl ReportRequest {
    pub fn new(
        dimensions: Vec<&'static str>,
        metrics: Vec<&'static str>,
        date_range: DateRange,
    ) -> Self {
        Self {
            dimensions,
            metrics,
            date_range,
            limit: None,
            filters: Vec::new(),
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_filter(mut self, filter: DimensionFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_filters(mut self, filters: impl IntoIterator<Item = DimensionFilter>) -> Self {
        self.filters.extend(filters);
        self
    }
}

/// Dimension and metric values of one row, in request order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRow {
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
}

impl ReportRow {
    pub fn new<D, M>(dimensions: D, metrics: M) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            dimensions: dimensions.into_iter().map(Into::into).collect(),
            metrics: metrics.into_iter().map(Into::into).collect(),
        }
    }

    pub fn dimension(&self, index: usize) -> Option<&str> {
        self.dimensions.get(index).map(String::as_str)
    }

    pub fn metric(&self, index: usize) -> Option<&str> {
        self.metrics.get(index).map(String::as_str)
    }
}

/// Report engine seam
#[async_trait]
pub trait Ga4ReportSource: Send + Sync + std::fmt::Debug {
    /// Run one report; fails with a configuration error before any network
    /// call when credentials are missing
    async fn run_report(&self, request: &ReportRequest) -> Result<Vec<ReportRow>>;

    /// Configuration check the endpoints run before reading parameters
    fn ensure_configured(&self) -> Result<()> {
        Ok(())
    }
}
