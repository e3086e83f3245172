//! # Postpaid Sales Tile Handlers
//!
//! One handler per dashboard card under `/api/pospago/`. All of them go
//! through [`crate::web::tile`], so envelopes, defaults and degradation are
//! identical across cards.

use axum::extract::{Query, State};
use axum::response::Response;
use axum::Extension;

use crate::web::extractors::PeriodQuery;
use crate::web::middleware::request_id::RequestId;
use crate::web::state::AppState;
use crate::web::tile::{daily_tile, period_tile, Tile};

/// Goals and projections: GET /api/pospago/metas-objetivos/?anio&mes
pub async fn metas_objetivos(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<PeriodQuery>,
) -> Response {
    let service = state.pospago.clone();
    period_tile(&state, Tile::GOALS, &query, &request_id, |period, _| async move {
        service.monthly_goals(period).await
    })
    .await
}

/// Previous day close: GET /api/pospago/cierre-dia-anterior/
pub async fn cierre_dia_anterior(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Response {
    let service = state.pospago.clone();
    daily_tile(&state, Tile::DAILY_CLOSE, &request_id, |today| async move {
        service.previous_day_close(today).await
    })
    .await
}

/// Intraday cuts by hour band: GET /api/pospago/cortes-dia-hoy/
pub async fn cortes_dia_hoy(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Response {
    let service = state.pospago.clone();
    daily_tile(&state, Tile::INTRADAY, &request_id, |today| async move {
        service.intraday_cuts(today).await
    })
    .await
}

/// Daily evolution: GET /api/pospago/evolucion-ventas/?anio&mes
pub async fn evolucion_ventas(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<PeriodQuery>,
) -> Response {
    let service = state.pospago.clone();
    period_tile(&state, Tile::EVOLUTION, &query, &request_id, |period, _| async move {
        service.sales_evolution(period).await
    })
    .await
}

/// Weekly breakdown: GET /api/pospago/desglose-semanal/?anio&mes
pub async fn desglose_semanal(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<PeriodQuery>,
) -> Response {
    let service = state.pospago.clone();
    period_tile(&state, Tile::WEEKLY, &query, &request_id, |period, _| async move {
        service.weekly_breakdown(period).await
    })
    .await
}

/// Heat map: GET /api/pospago/mapa-calor/?anio&mes
pub async fn mapa_calor(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<PeriodQuery>,
) -> Response {
    let service = state.pospago.clone();
    period_tile(&state, Tile::HEAT_MAP, &query, &request_id, |period, today| async move {
        service.heat_map(period, today).await
    })
    .await
}

/// Attempts vs activations: GET /api/pospago/comparativo/?anio&mes
pub async fn comparativo(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<PeriodQuery>,
) -> Response {
    let service = state.pospago.clone();
    period_tile(&state, Tile::COMPARISON, &query, &request_id, |period, _| async move {
        service.comparison(period).await
    })
    .await
}
