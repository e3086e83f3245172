//! # Sales Database
//!
//! SQLx/PostgreSQL implementation of the [`crate::source`] seam.
//!
//! ## Key Components
//!
//! - [`connection`] - lazy pool construction and the `SELECT 1` health check
//! - [`sales_queries`] - SQL text and `FromRow` row types for the sales views
//! - [`sales_source`] - [`PgSalesSource`] and its request-scoped session
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pospago_dashboard::config::ReportingConfig;
//! use pospago_dashboard::database::PgSalesSource;
//! use pospago_dashboard::engine::Period;
//! use pospago_dashboard::source::SalesSource;
//!
//! # async fn example(config: ReportingConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let source = PgSalesSource::from_config(&config.database, &config.budget)?;
//! let mut session = source.open().await?;
//! let goals = session.monthly_goals(Period::new(2025, 12)?).await?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod sales_queries;
pub mod sales_source;

pub use connection::{create_lazy_pool, health_check};
pub use sales_source::{PgSalesSession, PgSalesSource};
