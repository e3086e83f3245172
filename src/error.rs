use thiserror::Error;

/// Errors raised while producing a dashboard report.
///
/// Services never let these escape to the client as-is: each tile catches them
/// and degrades to a `tiene_datos: false` payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportingError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl ReportingError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// Whether the failure was caused by the caller rather than a collaborator
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidParameter(_))
    }
}

impl From<sqlx::Error> for ReportingError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => {
                Self::Database("timed out acquiring a connection".to_string())
            }
            sqlx::Error::ColumnDecode { index, source } => {
                Self::Decode(format!("column {index}: {source}"))
            }
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ReportingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Upstream(err.to_string())
        }
    }
}

impl From<config::ConfigError> for ReportingError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReportingError>;
