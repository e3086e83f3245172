//! # Reporting Configuration
//!
//! Layered configuration for the dashboard backend. Values come from, in order
//! of increasing precedence:
//!
//! 1. Built-in defaults (the `Default` impls below)
//! 2. `config/pospago.toml`
//! 3. `config/pospago.<environment>.toml`
//! 4. `POSPAGO__*` environment variables (`POSPAGO__DATABASE__URL`, ...)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pospago_dashboard::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let bind = &manager.config().server.bind_address;
//! let pool = manager.config().database.max_connections;
//! # Ok(())
//! # }
//! ```
//!
//! A missing database URL or GA4 credential is not a startup failure: the
//! tiles that need them report a configuration error per request instead.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ReportingError, Result};

pub use loader::ConfigManager;

/// Root configuration structure mirroring `config/pospago.toml`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReportingConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Sales database connection settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Budget filters and calendar policy for the goal engine
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Google Analytics 4 reporting credentials
    #[serde(default)]
    pub ga4: Ga4Config,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub request_timeout_ms: u64,
    /// Allow any origin, method and header (the dashboard is served elsewhere)
    pub cors_allow_any: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            request_timeout_ms: 30_000,
            cors_allow_any: true,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Sales database connection and pooling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            acquire_timeout_seconds: 30,
            idle_timeout_seconds: 300,
        }
    }
}

impl DatabaseConfig {
    /// Connection URL, or a configuration error when it was never provided
    pub fn database_url(&self) -> Result<&str> {
        match self.url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => Err(ReportingError::configuration(
                "database.url is not set (POSPAGO__DATABASE__URL)",
            )),
        }
    }
}

/// Which budget rows feed the goals, and how the portability calendar is shifted
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BudgetConfig {
    pub product: String,
    pub manager: String,
    pub ecommerce_channel: String,
    pub ctw_channel: String,
    /// Business days removed from the month for portability-family goals
    pub portability_day_shift: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            product: "MOVIL".to_string(),
            manager: "RINCON CAVIELES LUISA FERNANDA".to_string(),
            ecommerce_channel: "ECOMMERCE CLARO MIGRACION".to_string(),
            ctw_channel: "CLICK TO WSP PORTA".to_string(),
            portability_day_shift: 3.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Ga4Config {
    pub property_id: Option<String>,
    pub access_token: Option<String>,
    pub api_base_url: String,
}

impl Default for Ga4Config {
    fn default() -> Self {
        Self {
            property_id: None,
            access_token: None,
            api_base_url: "https://analyticsdata.googleapis.com".to_string(),
        }
    }
}

impl Ga4Config {
    /// `(property_id, access_token)`; both must be present
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let property = self
            .property_id
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ReportingError::configuration("ga4.property_id is not set"))?;
        let token = self
            .access_token
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ReportingError::configuration("ga4.access_token is not set"))?;
        Ok((property, token))
    }
}

impl ReportingConfig {
    /// Reject values that would make the server unusable
    pub fn validate(&self) -> Result<()> {
        if self.server.bind_address.trim().is_empty() {
            return Err(ReportingError::configuration(
                "server.bind_address must not be empty",
            ));
        }
        if self.server.request_timeout_ms == 0 {
            return Err(ReportingError::configuration(
                "server.request_timeout_ms must be greater than zero",
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ReportingError::configuration(
                "database.max_connections must be greater than zero",
            ));
        }
        if self.database.acquire_timeout_seconds == 0 {
            return Err(ReportingError::configuration(
                "database.acquire_timeout_seconds must be greater than zero",
            ));
        }
        if !(self.budget.portability_day_shift >= 0.0) {
            return Err(ReportingError::configuration(
                "budget.portability_day_shift must be zero or positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ReportingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.budget.portability_day_shift, 3.0);
        assert_eq!(config.server.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_missing_database_url_is_configuration_error() {
        let config = DatabaseConfig::default();
        assert!(matches!(
            config.database_url(),
            Err(ReportingError::Configuration(_))
        ));

        let blank = DatabaseConfig {
            url: Some("   ".to_string()),
            ..DatabaseConfig::default()
        };
        assert!(blank.database_url().is_err());
    }

    #[test]
    fn test_ga4_credentials_require_both_values() {
        let mut ga4 = Ga4Config {
            property_id: Some("123456".to_string()),
            ..Ga4Config::default()
        };
        let err = ga4.credentials().unwrap_err();
        assert!(err.to_string().contains("access_token"));

        ga4.access_token = Some("ya29.token".to_string());
        assert_eq!(ga4.credentials().unwrap(), ("123456", "ya29.token"));
    }

    #[test]
    fn test_validate_rejects_zero_pool() {
        let mut config = ReportingConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_shift() {
        let mut config = ReportingConfig::default();
        config.budget.portability_day_shift = -1.0;
        assert!(config.validate().is_err());
    }
}
