//! # Web API Routes
//!
//! Route definitions grouped by endpoint family. Paths keep the trailing
//! slash the dashboard front end already calls.

use axum::{routing::get, Router};

use crate::web::{handlers, state::AppState};

/// Postpaid sales tiles
pub fn pospago_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/pospago/metas-objetivos/",
            get(handlers::pospago::metas_objetivos),
        )
        .route(
            "/api/pospago/cierre-dia-anterior/",
            get(handlers::pospago::cierre_dia_anterior),
        )
        .route(
            "/api/pospago/cortes-dia-hoy/",
            get(handlers::pospago::cortes_dia_hoy),
        )
        .route(
            "/api/pospago/evolucion-ventas/",
            get(handlers::pospago::evolucion_ventas),
        )
        .route(
            "/api/pospago/desglose-semanal/",
            get(handlers::pospago::desglose_semanal),
        )
        .route("/api/pospago/mapa-calor/", get(handlers::pospago::mapa_calor))
        .route(
            "/api/pospago/comparativo/",
            get(handlers::pospago::comparativo),
        )
}

/// GA4 web performance endpoints
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard/metrics/", get(handlers::ga4::site_metrics))
        .route(
            "/api/dashboard/daily-metrics/",
            get(handlers::ga4::daily_metrics),
        )
        .route(
            "/api/dashboard/load-time-hourly/",
            get(handlers::ga4::load_time_hourly),
        )
        .route(
            "/api/dashboard/funnel-data/",
            get(handlers::ga4::funnel_data),
        )
        .route(
            "/api/dashboard/click_relation/",
            get(handlers::ga4::click_relation),
        )
        .route(
            "/api/dashboard/click_detail/:elemento/",
            get(handlers::ga4::click_detail),
        )
        .route(
            "/api/dashboard/user_click_flow/",
            get(handlers::ga4::user_click_flow),
        )
}

/// Health check routes for load balancers and probes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::basic_health))
        .route("/health/ready", get(handlers::health::readiness_probe))
}
