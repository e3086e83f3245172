//! # Pospago Dashboard Server
//!
//! Serves the dashboard JSON API.
//!
//! ## Usage
//!
//! ```bash
//! # Run against the configured PostgreSQL and GA4 property
//! POSPAGO__DATABASE__URL=postgres://... cargo run --bin pospago-server
//!
//! # Run with generated in-memory data, no external services needed
//! cargo run --bin pospago-server -- --demo
//! ```

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use std::env;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use pospago_dashboard::analytics::{CannedReportSource, ReportRow};
use pospago_dashboard::config::ConfigManager;
use pospago_dashboard::constants::ga4::{
    CLICK_ELEMENT_DIMENSION, CLICK_IMAGE_DIMENSION, DATE_DIMENSION, DATE_HOUR_MINUTE_DIMENSION,
    DEVICE_DIMENSION, HOUR_DIMENSION, PAGE_LOCATION_DIMENSION, SESSION_ID_DIMENSION,
    TRANSACTION_ID_DIMENSION, USER_CLICK_DIMENSION,
};
use pospago_dashboard::engine::Period;
use pospago_dashboard::logging;
use pospago_dashboard::source::{
    ActivationCounts, AttemptCounts, BusinessDays, HourlyCut, InMemorySalesSource, MonthlyGoals,
};
use pospago_dashboard::web::{create_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_structured_logging();

    let demo = env::args().skip(1).any(|arg| arg == "--demo");

    info!("Starting Pospago Dashboard Server...");
    info!("   Version: {}", env!("CARGO_PKG_VERSION"));
    info!("   Mode: {}", if demo { "demo" } else { "live" });

    let config_manager = ConfigManager::load()?;
    let bind_address = config_manager.config().server.bind_address.clone();

    let app_state = if demo {
        let today = Local::now().date_naive();
        AppState::new(
            Arc::clone(&config_manager),
            Arc::new(demo_sales(today)),
            Arc::new(demo_reports(today)),
        )
    } else {
        AppState::from_config(Arc::clone(&config_manager))?
    };

    let app = create_app(app_state);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!(
        address = %bind_address,
        environment = %config_manager.environment(),
        "Dashboard API listening, press Ctrl+C to shut down"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Pospago Dashboard Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}

fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Deterministic sales for the current and previous month
fn demo_sales(today: NaiveDate) -> InMemorySalesSource {
    let current = Period::containing(today);
    let previous = Period::containing(current.first_day() - Duration::days(1));
    let mut source = InMemorySalesSource::new();

    for period in [previous, current] {
        let mut total_days = 0.0;
        let mut elapsed_days = 0.0;
        let mut day = period.first_day();
        while day < period.next_first_day() {
            if is_business_day(day) {
                total_days += 1.0;
                if day < today {
                    elapsed_days += 1.0;
                }
            }
            day += Duration::days(1);
        }

        source = source
            .with_goals(
                period,
                MonthlyGoals {
                    total: 2_400.0,
                    migration: 900.0,
                    portability: 1_100.0,
                    portability_ecommerce: 800.0,
                    click_to_chat: 300.0,
                    new_line: 400.0,
                },
            )
            .with_business_days(
                period,
                BusinessDays {
                    total: total_days,
                    elapsed: elapsed_days,
                },
            );
    }

    let mut day = previous.first_day();
    let mut attempts_this_month = AttemptCounts::default();
    while day < today {
        if is_business_day(day) {
            let seed = i64::from(day.ordinal() % 7);
            let counts = ActivationCounts {
                total: 90 + seed * 6,
                migration: 35 + seed * 2,
                portability: 40 + seed * 3,
                click_to_chat: 10 + seed,
                new_line: 15 + seed,
            };
            let attempts = AttemptCounts {
                total: counts.total + 25,
                migration: counts.migration + 8,
                portability: counts.portability + 12,
                new_line: counts.new_line + 5,
            };
            source = source
                .with_daily_activations(day, counts)
                .with_daily_attempts(day, attempts);
            if current.contains(day) {
                attempts_this_month.total += attempts.total;
                attempts_this_month.migration += attempts.migration;
                attempts_this_month.portability += attempts.portability;
                attempts_this_month.new_line += attempts.new_line;
            }
        }
        day += Duration::days(1);
    }
    source = source.with_monthly_attempts(current, attempts_this_month);

    for hour in 8..=18 {
        let seed = i64::from(hour % 5);
        source = source.with_hourly_cut(HourlyCut {
            hour,
            attempts: 6 + seed,
            migration: 2 + seed,
            portability: 3,
            new_line: 1,
        });
    }
    source
}

fn demo_reports(today: NaiveDate) -> CannedReportSource {
    let site = vec![ReportRow::new(
        Vec::<String>::new(),
        ["15230", "412", "48210350.5"],
    )];

    let daily = (1..=7)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let load = 2.0 + f64::from(date.day() % 4) * 0.35;
            ReportRow::new(
                [date.format("%Y%m%d").to_string()],
                [format!("{:.1}", load * 200.0), "200".to_string(), "58".to_string()],
            )
        })
        .collect();

    let hourly = (0..24)
        .flat_map(|hour: u32| {
            let base = 1.8 + f64::from(hour % 6) * 0.2;
            [("desktop", base), ("mobile", base + 0.9)].map(|(device, load)| {
                ReportRow::new(
                    [hour.to_string(), device.to_string()],
                    [format!("{:.1}", load * 40.0), "40".to_string()],
                )
            })
        })
        .collect();

    let funnel = [
        ("desktop", "/", ["5200", "9100", "182000"]),
        ("mobile", "/", ["8400", "13500", "201600"]),
        ("mobile", "/detalle-producto/plan-max", ["2100", "3300", "94500"]),
        ("desktop", "/detalle-producto/plan-max", ["1300", "2200", "71500"]),
        ("mobile", "/checkout/datos", ["640", "1500", "38400"]),
        ("desktop", "/resumen-pedido", ["210", "430", "6300"]),
    ]
    .into_iter()
    .map(|(device, path, metrics)| ReportRow::new([device, path], metrics))
    .collect();

    let clicks_key = [CLICK_ELEMENT_DIMENSION, CLICK_IMAGE_DIMENSION].join(",");
    let clicks = [
        ("banner-principal", "plan-max.webp", ["4210", "380"]),
        ("carrusel-equipos", "iphone.webp", ["2890", "410"]),
        ("boton-portate", "porta.webp", ["1730", "95"]),
    ]
    .into_iter()
    .map(|(element, image, metrics)| ReportRow::new([element, image], metrics))
    .collect();

    let purchases_key = [CLICK_ELEMENT_DIMENSION, TRANSACTION_ID_DIMENSION].join(",");
    let purchases = [
        ("banner-principal", "T-1001", "189900"),
        ("banner-principal", "T-1002", "129900"),
        ("carrusel-equipos", "T-1003", "3899000"),
    ]
    .into_iter()
    .map(|(element, transaction, revenue)| ReportRow::new([element, transaction], [revenue]))
    .collect();

    let detail = vec![ReportRow::new(
        ["T-1001", "banner-principal", "1", "demo-session-1"],
        ["189900"],
    )];
    let tracked = vec![ReportRow::new(["demo-session-1"], Vec::<String>::new())];

    let flow_key = [
        SESSION_ID_DIMENSION,
        USER_CLICK_DIMENSION,
        PAGE_LOCATION_DIMENSION,
        DATE_HOUR_MINUTE_DIMENSION,
    ]
    .join(",");
    let stamp = (today - Duration::days(1)).format("%Y%m%d").to_string();
    let flow = [
        ("banner-principal", "https://tienda/", "0930"),
        ("(not set)", "https://tienda/postpago/plan-max", "0931"),
    ]
    .into_iter()
    .map(|(click, page, minute)| {
        ReportRow::new(
            [
                "demo-session-1".to_string(),
                click.to_string(),
                page.to_string(),
                format!("{stamp}{minute}"),
            ],
            Vec::<String>::new(),
        )
    })
    .collect();

    CannedReportSource::new()
        .with_report("", site)
        .with_report(DATE_DIMENSION, daily)
        .with_report(HOUR_DIMENSION, hourly)
        .with_report(DEVICE_DIMENSION, funnel)
        .with_report(&clicks_key, clicks)
        .with_report(&purchases_key, purchases)
        .with_report(TRANSACTION_ID_DIMENSION, detail)
        .with_report(SESSION_ID_DIMENSION, tracked)
        .with_report(&flow_key, flow)
}
