#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, GA4 in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Pospago Dashboard
//!
//! Reporting backend for the postpaid mobile sales dashboard.
//!
//! ## Overview
//!
//! The dashboard shows how the current month's activations track against the
//! monthly budget, broken down by sales category. Every card is served by a
//! read-only JSON endpoint that aggregates raw activation and attempt counts
//! into run-rate projections, compliance percentages and time series.
//!
//! ## Module Organization
//!
//! - [`engine`] - Pure reporting math: calendar, run-rate projector, category
//!   aggregation and the series, heat-map, comparison, daily-close and
//!   intraday views
//! - [`source`] - The sales data source contract and an in-memory fixture
//! - [`database`] - PostgreSQL implementation of the sales source
//! - [`services`] - One operation per dashboard tile, with degradation rules
//! - [`analytics`] - GA4 web performance reports
//! - [`web`] - Axum router, envelopes and handlers
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pospago_dashboard::config::ConfigManager;
//! use pospago_dashboard::web::{create_app, AppState};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config_manager = ConfigManager::load()?;
//! let app = create_app(AppState::from_config(config_manager)?);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod config;
pub mod constants;
pub mod database;
pub mod engine;
pub mod error;
pub mod logging;
pub mod services;
pub mod source;
pub mod web;

pub use config::{ConfigManager, ReportingConfig};
pub use engine::{MetricCategory, Period};
pub use error::{ReportingError, Result};
pub use services::{PospagoService, TileOutcome};
pub use source::{InMemorySalesSource, SalesSource};
