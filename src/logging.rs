//! # Structured Logging
//!
//! One `tracing` subscriber per process. Production writes JSON lines, every
//! other environment the human-readable format. `RUST_LOG` overrides the
//! level picked from the environment.

use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const PRODUCTION: &str = "production";

static SUBSCRIBER_READY: OnceLock<()> = OnceLock::new();

/// Install the global subscriber; later calls are no-ops
pub fn init_structured_logging() {
    SUBSCRIBER_READY.get_or_init(|| {
        let environment = get_environment();
        let filter = std::env::var("RUST_LOG")
            .ok()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(default_level(&environment)));

        let output = if environment == PRODUCTION {
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        // test harnesses may have installed one already
        if tracing_subscriber::registry().with(output).try_init().is_err() {
            tracing::debug!("Keeping the existing global subscriber");
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            "Logging ready"
        );
    });
}

/// Deployment environment: `POSPAGO_ENV`, then `APP_ENV`, else `development`
pub fn get_environment() -> String {
    std::env::var("POSPAGO_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

fn default_level(environment: &str) -> &'static str {
    if environment == PRODUCTION {
        "info"
    } else {
        "debug"
    }
}

/// One record per tile or GA4 report served
pub fn log_report_operation(
    operation: &str,
    period: Option<&str>,
    status: &str,
    rows: Option<usize>,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        period = period,
        status = %status,
        rows = rows,
        details = details,
        at = %Utc::now().to_rfc3339(),
        "REPORT_OPERATION"
    );
}

/// Failure record with the component that raised it
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        at = %Utc::now().to_rfc3339(),
        "REPORT_ERROR"
    );
}
