//! Shared request wrapper for the sales tiles.
//!
//! Every tile endpoint resolves its period (or just today), runs one service
//! call and renders the outcome the same way: data in the success envelope,
//! an empty result as `tiene_datos: false` with HTTP 200, and any failure as
//! the degraded envelope with HTTP 500.

use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde::Serialize;
use std::future::Future;
use tracing::{debug, info, warn};

use super::extractors::PeriodQuery;
use super::middleware::request_id::RequestId;
use super::response_types::{ApiError, NoDataPayload, SuccessEnvelope, WithData};
use super::state::AppState;
use crate::engine::Period;
use crate::logging::log_error;
use crate::services::pospago_service::tiles;
use crate::services::TileOutcome;

/// Static description of a tile endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub name: &'static str,
    /// List field of the degraded payload, for tiles that render a list
    pub list_field: Option<&'static str>,
}

impl Tile {
    pub const GOALS: Tile = Tile {
        name: tiles::GOALS,
        list_field: None,
    };
    pub const DAILY_CLOSE: Tile = Tile {
        name: tiles::DAILY_CLOSE,
        list_field: None,
    };
    pub const INTRADAY: Tile = Tile {
        name: tiles::INTRADAY,
        list_field: Some("cortes_por_franja"),
    };
    pub const EVOLUTION: Tile = Tile {
        name: tiles::EVOLUTION,
        list_field: Some("datos_diarios"),
    };
    pub const WEEKLY: Tile = Tile {
        name: tiles::WEEKLY,
        list_field: Some("semanas"),
    };
    pub const HEAT_MAP: Tile = Tile {
        name: tiles::HEAT_MAP,
        list_field: Some("datos"),
    };
    pub const COMPARISON: Tile = Tile {
        name: tiles::COMPARISON,
        list_field: Some("comparativo"),
    };
}

/// Render a tile outcome as an HTTP response
pub fn respond<T: Serialize>(tile: Tile, request_id: &RequestId, outcome: TileOutcome<T>) -> Response {
    match outcome {
        TileOutcome::Data(payload) => {
            debug!(tile = tile.name, request_id = %request_id.as_str(), "Tile served");
            SuccessEnvelope::new(WithData::new(payload)).into_response()
        }
        TileOutcome::NoData { message } => {
            info!(tile = tile.name, request_id = %request_id.as_str(), mensaje = %message, "Tile has no data");
            SuccessEnvelope::new(NoDataPayload::new(message)).into_response()
        }
        TileOutcome::Failed { error } => {
            warn!(tile = tile.name, request_id = %request_id.as_str(), error = %error, "Tile degraded");
            ApiError::tile_failed(&error, tile.list_field).into_response()
        }
    }
}

/// Run a month-scoped tile. `anio`/`mes` default to the current local month;
/// a malformed period degrades without touching the data source.
pub async fn period_tile<T, F, Fut>(
    state: &AppState,
    tile: Tile,
    query: &PeriodQuery,
    request_id: &RequestId,
    work: F,
) -> Response
where
    T: Serialize,
    F: FnOnce(Period, NaiveDate) -> Fut,
    Fut: Future<Output = TileOutcome<T>>,
{
    let today = state.today();
    let outcome = match query.resolve(today) {
        Ok(period) => {
            debug!(tile = tile.name, period = %period, request_id = %request_id.as_str(), "Running tile");
            work(period, today).await
        }
        Err(error) => {
            log_error(
                "web",
                tile.name,
                &error.to_string(),
                Some(request_id.as_str()),
            );
            TileOutcome::Failed { error }
        }
    };
    respond(tile, request_id, outcome)
}

/// Run a tile scoped to the current day
pub async fn daily_tile<T, F, Fut>(
    state: &AppState,
    tile: Tile,
    request_id: &RequestId,
    work: F,
) -> Response
where
    T: Serialize,
    F: FnOnce(NaiveDate) -> Fut,
    Fut: Future<Output = TileOutcome<T>>,
{
    let today = state.today();
    debug!(tile = tile.name, today = %today, request_id = %request_id.as_str(), "Running tile");
    respond(tile, request_id, work(today).await)
}
