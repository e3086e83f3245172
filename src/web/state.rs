//! # Web Application State
//!
//! Everything a handler needs, cloned into each request by axum. The sales
//! source and the GA4 source are trait objects so the router can run against
//! PostgreSQL and the GA4 API in production, and in-memory fixtures in tests
//! and demo mode.

use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::info;

use crate::analytics::{Ga4ReportService, Ga4ReportSource, Ga4RestClient};
use crate::config::{ConfigManager, ReportingConfig};
use crate::database::PgSalesSource;
use crate::error::Result;
use crate::services::PospagoService;
use crate::source::SalesSource;

#[derive(Clone)]
pub struct AppState {
    pub config_manager: Arc<ConfigManager>,
    pub sales_source: Arc<dyn SalesSource>,
    pub pospago: PospagoService,
    pub ga4: Ga4ReportService,
    /// Fixed "today" for tests; the server uses the local clock
    today: Option<NaiveDate>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("environment", &self.config_manager.environment())
            .field("sales_source", &self.sales_source.name())
            .field("ga4", &self.ga4)
            .field("today", &self.today)
            .finish()
    }
}

impl AppState {
    pub fn new(
        config_manager: Arc<ConfigManager>,
        sales_source: Arc<dyn SalesSource>,
        ga4_source: Arc<dyn Ga4ReportSource>,
    ) -> Self {
        let pospago = PospagoService::new(
            Arc::clone(&sales_source),
            &config_manager.config().budget,
        );
        Self {
            config_manager,
            sales_source,
            pospago,
            ga4: Ga4ReportService::new(ga4_source),
            today: None,
        }
    }

    /// Production wiring: PostgreSQL sales source and the GA4 REST client.
    ///
    /// Neither needs its credentials here; missing ones surface per request.
    pub fn from_config(config_manager: Arc<ConfigManager>) -> Result<Self> {
        let config = config_manager.config();
        let sales_source = PgSalesSource::from_config(&config.database, &config.budget)?;
        let ga4_client = Ga4RestClient::new(&config.ga4, config.server.request_timeout())?;

        info!(
            environment = %config_manager.environment(),
            database_configured = config.database.url.is_some(),
            ga4_configured = config.ga4.credentials().is_ok(),
            "Application state initialized"
        );

        Ok(Self::new(
            config_manager,
            Arc::new(sales_source),
            Arc::new(ga4_client),
        ))
    }

    /// Pin the date tiles treat as today
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn config(&self) -> &ReportingConfig {
        self.config_manager.config()
    }
}
