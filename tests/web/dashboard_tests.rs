//! # GA4 Dashboard Endpoint Tests

use axum::http::StatusCode;
use pospago_dashboard::analytics::{CannedReportSource, ReportRow};
use pospago_dashboard::constants::ga4::{
    CLICK_ELEMENT_DIMENSION, CLICK_IMAGE_DIMENSION, CLICK_TRACKING_START, DATE_DIMENSION,
    DEVICE_DIMENSION, HOUR_DIMENSION, SESSION_ID_DIMENSION, TRANSACTION_ID_DIMENSION,
};
use serde_json::json;

use super::test_infrastructure::*;

fn row(dimensions: &[&str], metrics: &[&str]) -> ReportRow {
    ReportRow::new(dimensions.iter().copied(), metrics.iter().copied())
}

fn app_with_reports(reports: CannedReportSource) -> TestApp {
    TestApp::with_sources(seeded_sales(), reports)
}

#[tokio::test]
async fn test_site_metrics_defaults_to_last_week() {
    let app = app_with_reports(
        CannedReportSource::new().with_report("", vec![row(&[], &["1520", "37", "48210.5"])]),
    );

    let response = app.get("/api/dashboard/metrics/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({"sessions": 1520, "items": 37, "revenue": 48210.5})
    );
    let requests = app.reports.requests();
    assert_eq!(requests[0].date_range.start_date, "7daysAgo");
    assert_eq!(requests[0].date_range.end_date, "today");
}

#[tokio::test]
async fn test_site_metrics_without_rows_is_zero() {
    let app = app_with_reports(CannedReportSource::new());
    let response = app
        .get("/api/dashboard/metrics/?start=2025-12-01&end=yesterday")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({"sessions": 0, "items": 0, "revenue": 0.0}));
    assert_eq!(app.reports.requests()[0].date_range.end_date, "yesterday");
}

#[tokio::test]
async fn test_daily_metrics_uses_trailing_window() {
    let app = app_with_reports(CannedReportSource::new().with_report(
        DATE_DIMENSION,
        vec![
            row(&["20251208"], &["25.0", "10", "4"]),
            row(&["20251209"], &["0", "0", "0"]),
        ],
    ));

    let response = app.get("/api/dashboard/daily-metrics/?start=2025-12-01").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!([
            {"date": "20251208", "avg_load_time": 2.5, "items": 4},
            {"date": "20251209", "avg_load_time": 0.0, "items": 0},
        ])
    );
    // one bound alone does not override the window
    let range = &app.reports.requests()[0].date_range;
    assert_eq!(range.start_date, "2025-12-04");
    assert_eq!(range.end_date, "2025-12-10");
}

#[tokio::test]
async fn test_load_time_hourly() {
    let app = app_with_reports(CannedReportSource::new().with_report(
        HOUR_DIMENSION,
        vec![
            row(&["09", "desktop"], &["12.0", "4"]),
            row(&["09", "mobile"], &["15.0", "3"]),
            row(&["10", "tablet"], &["1.0", "1"]),
        ],
    ));

    let response = app
        .get("/api/dashboard/load-time-hourly/?start=2025-12-01&end=2025-12-07")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!([
            {"hour": 9, "deviceCategory": "desktop", "avg_load_time": 3.0},
            {"hour": 9, "deviceCategory": "mobile", "avg_load_time": 5.0},
        ])
    );
    let range = &app.reports.requests()[0].date_range;
    assert_eq!(range.start_date, "2025-12-01");
    assert_eq!(range.end_date, "2025-12-07");
}

#[tokio::test]
async fn test_funnel_data_lists_all_stages() {
    let app = app_with_reports(CannedReportSource::new().with_report(
        DEVICE_DIMENSION,
        vec![
            row(&["desktop", "/"], &["100", "250", "300"]),
            row(&["mobile", "/detalle-producto/a"], &["10", "20", "50"]),
        ],
    ));

    let response = app.get("/api/dashboard/funnel-data/").await;

    assert_eq!(response.status, StatusCode::OK);
    let stages = response.body.as_array().unwrap();
    let labels: Vec<_> = stages.iter().map(|s| s["stage"].clone()).collect();
    assert_eq!(
        labels,
        vec![
            json!("Atracción"),
            json!("Interés"),
            json!("Consideración"),
            json!("Conversión")
        ]
    );
    assert_eq!(stages[0]["vistas"], json!(100));
    assert_eq!(stages[3]["top_urls"], json!([]));
    assert_eq!(
        app.reports.requests()[0].date_range.start_date,
        "2025-11-12"
    );
}

#[tokio::test]
async fn test_malformed_date_is_bad_request() {
    let app = app_with_reports(CannedReportSource::new());

    for uri in [
        "/api/dashboard/metrics/?start=last-week",
        "/api/dashboard/daily-metrics/?end=2025-13-01",
        "/api/dashboard/funnel-data/?start=3days",
    ] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(response.body["error"].is_string(), "{uri}");
    }
    assert!(app.reports.requests().is_empty());
}

#[tokio::test]
async fn test_upstream_failure_is_internal_error() {
    let app = app_with_reports(CannedReportSource::new());
    app.reports.set_failure(Some("quota exceeded"));

    let response = app.get("/api/dashboard/load-time-hourly/").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = response.body["error"].as_str().unwrap();
    assert!(error.contains("quota exceeded"), "{error}");
}

#[tokio::test]
async fn test_missing_credentials_checked_before_dates() {
    let app = TestApp::without_ga4_credentials();

    for uri in [
        "/api/dashboard/metrics/",
        "/api/dashboard/daily-metrics/?start=not-a-date",
        "/api/dashboard/funnel-data/",
        "/api/dashboard/click_relation/",
        "/api/dashboard/click_detail/banner-1/",
        "/api/dashboard/user_click_flow/",
    ] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        let error = response.body["error"].as_str().unwrap();
        assert!(error.contains("ga4.property_id"), "{error}");
    }
}

#[tokio::test]
async fn test_click_relation_sorted_by_revenue() {
    let app = app_with_reports(
        CannedReportSource::new()
            .with_report(
                &[CLICK_ELEMENT_DIMENSION, CLICK_IMAGE_DIMENSION].join(","),
                vec![
                    row(&["banner-1", "img-a"], &["120", "9"]),
                    row(&["(not set)", ""], &["500", "50"]),
                    row(&["banner-2", "img-b"], &["80", "4"]),
                ],
            )
            .with_report(
                &[CLICK_ELEMENT_DIMENSION, TRANSACTION_ID_DIMENSION].join(","),
                vec![
                    row(&["banner-2", "T-1"], &["900"]),
                    row(&["banner-1", "T-2"], &["150"]),
                ],
            ),
    );

    let response = app.get("/api/dashboard/click_relation/?unit=terminales").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({"data": [
            {"elemento": "banner-2", "img_click_home": "img-b", "sesiones": 80, "carritos": 4, "compras": 1, "ingresos": 900.0},
            {"elemento": "banner-1", "img_click_home": "img-a", "sesiones": 120, "carritos": 9, "compras": 1, "ingresos": 150.0},
        ]})
    );
    let requests = app.reports.requests();
    assert_eq!(requests.len(), 2);
    // tracked period through yesterday
    assert_eq!(requests[0].date_range.start_date, CLICK_TRACKING_START);
    assert_eq!(requests[0].date_range.end_date, "2025-12-09");
    assert!(requests[0].filters.is_empty());
    assert_eq!(requests[1].filters.len(), 1);
}

#[tokio::test]
async fn test_click_detail_flags_tracked_sessions() {
    let app = app_with_reports(
        CannedReportSource::new()
            .with_report(
                TRANSACTION_ID_DIMENSION,
                vec![
                    row(&["T-1", "banner 1", "2", "s-1"], &["300"]),
                    row(&["T-2", "banner 1", "1", "s-2"], &["120.5"]),
                ],
            )
            .with_report(SESSION_ID_DIMENSION, vec![row(&["s-2"], &[])]),
    );

    let response = app.get("/api/dashboard/click_detail/banner%201/").await;

    assert_eq!(response.status, StatusCode::OK);
    let data = response.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["transaction_id"], json!("T-1"));
    assert_eq!(data[0]["has_click_flow"], json!(false));
    assert_eq!(data[1]["valor"], json!(120.5));
    assert_eq!(data[1]["has_click_flow"], json!(true));

    let requests = app.reports.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].filters[0].field, CLICK_ELEMENT_DIMENSION);
    assert_eq!(
        requests[0].filters[0].matcher,
        pospago_dashboard::analytics::FilterMatch::Exact("banner 1".to_string())
    );
}

#[tokio::test]
async fn test_user_click_flow_in_time_order() {
    let app = app_with_reports(CannedReportSource::new().with_report(
        SESSION_ID_DIMENSION,
        vec![
            row(&["s-1", "(not set)", "https://tienda/cart", "202512081210"], &[]),
            row(&["s-1", "btn-plan", "https://tienda/", "202512081201"], &[]),
        ],
    ));

    let response = app.get("/api/dashboard/user_click_flow/?session_id=s-1").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({"data": [
            {"session_id": "s-1", "type": "click", "detail": "btn-plan", "timestamp": "202512081201"},
            {"session_id": "s-1", "type": "pageview", "detail": "https://tienda/", "timestamp": "202512081201"},
            {"session_id": "s-1", "type": "pageview", "detail": "https://tienda/cart", "timestamp": "202512081210"},
        ]})
    );
}

#[tokio::test]
async fn test_user_click_flow_requires_session_id() {
    let app = app_with_reports(CannedReportSource::new());

    for uri in ["/api/dashboard/user_click_flow/", "/api/dashboard/user_click_flow/?session_id="] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(response.body["error"], json!("Se requiere session_id"));
    }
    assert!(app.reports.requests().is_empty());
}
