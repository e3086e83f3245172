//! Shared fixtures for the router tests.
//!
//! `TestApp` wraps the full router built by `create_app` over an in-memory
//! sales source and a canned GA4 source, with "today" pinned to 2025-12-10.

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use pospago_dashboard::analytics::{CannedReportSource, Ga4ReportSource, Ga4RestClient};
use pospago_dashboard::config::{ConfigManager, ReportingConfig};
use pospago_dashboard::engine::Period;
use pospago_dashboard::source::{
    ActivationCounts, AttemptCounts, BusinessDays, HourlyCut, InMemorySalesSource, MonthlyGoals,
};
use pospago_dashboard::web::{create_app, AppState};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn today() -> NaiveDate {
    date(2025, 12, 10)
}

pub fn december() -> Period {
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

/// December 2025: goals, calendar, four activation days, one attempt day and
/// one hourly cut, plus the 2025-11-09 activations the previous-day close
/// compares against
pub fn seeded_sales() -> InMemorySalesSource {
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
        .with_daily_activations(date(2025, 11, 9), counts(4))
        .with_daily_activations(date(2025, 12, 1), counts(10))
        .with_daily_activations(date(2025, 12, 2), counts(14))
        .with_daily_activations(date(2025, 12, 9), counts(8))
        .with_daily_activations(date(2025, 12, 10), counts(6))
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

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub struct TestApp {
    router: Router,
    pub sales: InMemorySalesSource,
    pub reports: CannedReportSource,
}

impl TestApp {
    /// Seeded sales data and an empty canned GA4 source
    pub fn new() -> Self {
        Self::with_sources(seeded_sales(), CannedReportSource::new())
    }

    pub fn with_sources(sales: InMemorySalesSource, reports: CannedReportSource) -> Self {
        let router = build_router(Arc::new(sales.clone()), Arc::new(reports.clone()));
        Self {
            router,
            sales,
            reports,
        }
    }

    /// GA4 backed by the REST client with no credentials configured
    pub fn without_ga4_credentials() -> Self {
        let client = Ga4RestClient::new(
            &ReportingConfig::default().ga4,
            std::time::Duration::from_secs(5),
        )
        .unwrap();
        let sales = seeded_sales();
        Self {
            router: build_router(Arc::new(sales.clone()), Arc::new(client)),
            sales,
            reports: CannedReportSource::new(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

fn build_router(
    sales: Arc<InMemorySalesSource>,
    reports: Arc<dyn Ga4ReportSource>,
) -> Router {
    let config_manager = ConfigManager::from_config(ReportingConfig::default(), "test").unwrap();
    let state = AppState::new(config_manager, sales, reports).with_today(today());
    create_app(state)
}
