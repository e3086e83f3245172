//! # Web API
//!
//! Axum router for the dashboard: the postpaid sales tiles under
//! `/api/pospago/`, the GA4 supplement under `/api/dashboard/` and health
//! probes. Everything is read-only `GET`.

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response_types;
pub mod routes;
pub mod state;
pub mod tile;

pub use state::AppState;

/// Create the web application with all routes and middleware
pub fn create_app(app_state: AppState) -> Router {
    let server = &app_state.config().server;
    let timeout = server.request_timeout();
    let cors_allow_any = server.cors_allow_any;

    let mut app = Router::new()
        .merge(routes::health_routes())
        .merge(routes::pospago_routes())
        .merge(routes::dashboard_routes())
        .layer(axum::middleware::from_fn(
            middleware::request_id::add_request_id,
        ))
        .layer(TimeoutLayer::new(timeout));

    if cors_allow_any {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    let app = app.layer(TraceLayer::new_for_http()).with_state(app_state);

    info!(
        timeout_ms = timeout.as_millis() as u64,
        cors_allow_any, "Web application created with all routes and middleware"
    );
    app
}
