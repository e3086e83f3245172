//! # Response Envelopes and Web Errors
//!
//! Tiles answer inside `{success, data, timestamp}`. A tile that failed still
//! answers with a body shaped like an empty tile, so the dashboard can render
//! the card in its "no data" state without special-casing errors.
//!
//! The GA4 endpoints return their payload bare and `{error}` on failure.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::error::ReportingError;

fn timestamp() -> String {
    Local::now().to_rfc3339()
}

/// `{success: true, data, timestamp}`
#[derive(Debug, Serialize)]
pub struct SuccessEnvelope<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: String,
}

impl<T: Serialize> SuccessEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: timestamp(),
        }
    }
}

impl<T: Serialize> IntoResponse for SuccessEnvelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Tile payload tagged with `tiene_datos: true`
#[derive(Debug, Serialize)]
pub struct WithData<T> {
    pub tiene_datos: bool,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> WithData<T> {
    pub fn new(payload: T) -> Self {
        Self {
            tiene_datos: true,
            payload,
        }
    }
}

/// `{tiene_datos: false, mensaje}` for a valid query with nothing to show
#[derive(Debug, Serialize)]
pub struct NoDataPayload {
    pub tiene_datos: bool,
    pub mensaje: String,
}

impl NoDataPayload {
    pub fn new(mensaje: impl Into<String>) -> Self {
        Self {
            tiene_datos: false,
            mensaje: mensaje.into(),
        }
    }
}

/// `{data: [...]}`, the shape of the click attribution endpoints
#[derive(Debug, Serialize)]
pub struct DataList<T> {
    pub data: Vec<T>,
}

impl<T> DataList<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }
}

/// Web API errors with their HTTP mapping
#[derive(Error, Debug)]
pub enum ApiError {
    /// A tile failed; rendered as the degraded tile envelope
    #[error("{message}")]
    TileFailed {
        message: String,
        /// List field the empty tile carries (`semanas`, `datos`, ...)
        list_field: Option<&'static str>,
    },

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn tile_failed(error: &ReportingError, list_field: Option<&'static str>) -> Self {
        Self::TileFailed {
            message: error.to_string(),
            list_field,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Degraded `data` object of a failed tile; it repeats the error so a card
    /// reading only `data` can show it
    pub fn degraded_data(message: &str, list_field: Option<&'static str>) -> Value {
        let mut data = Map::new();
        data.insert("tiene_datos".to_string(), Value::Bool(false));
        data.insert("error".to_string(), Value::String(message.to_string()));
        if let Some(field) = list_field {
            data.insert(field.to_string(), Value::Array(vec![]));
        }
        Value::Object(data)
    }
}

impl From<ReportingError> for ApiError {
    fn from(err: ReportingError) -> Self {
        if err.is_client_error() {
            Self::BadRequest {
                message: err.to_string(),
            }
        } else {
            Self::Internal {
                message: err.to_string(),
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::TileFailed {
                message,
                list_field,
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "data": ApiError::degraded_data(&message, list_field),
                    "success": false,
                    "error": message,
                    "timestamp": timestamp(),
                })),
            )
                .into_response(),

            ApiError::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }

            ApiError::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
        }
    }
}

/// Result type alias for web API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        total: i64,
    }

    #[test]
    fn test_with_data_flattens_payload() {
        let value = serde_json::to_value(WithData::new(Sample { total: 7 })).unwrap();
        assert_eq!(value, json!({"tiene_datos": true, "total": 7}));
    }

    #[test]
    fn test_degraded_data_shape() {
        assert_eq!(
            ApiError::degraded_data("pool timed out", Some("semanas")),
            json!({"tiene_datos": false, "error": "pool timed out", "semanas": []})
        );
        assert_eq!(
            ApiError::degraded_data("pool timed out", None),
            json!({"tiene_datos": false, "error": "pool timed out"})
        );
    }

    #[test]
    fn test_reporting_error_mapping() {
        let bad = ApiError::from(ReportingError::invalid_parameter("start"));
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

        let config = ApiError::from(ReportingError::configuration("ga4.property_id is not set"));
        assert_eq!(
            config.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
