//! # GA4 Web Performance Handlers
//!
//! Endpoints under `/api/dashboard/`. These answer with the bare payload,
//! HTTP 400 for a malformed date and HTTP 500 `{error}` for missing GA4
//! settings or an upstream failure. Credentials are checked before the query
//! string is read.
//!
//! The click attribution endpoints wrap their rows as `{data: [...]}` and
//! default to the whole tracked period, from the day click tagging went live
//! through yesterday.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, NaiveDate};

use crate::analytics::clicks::{ClickPurchase, ClickRelation, FlowStep};
use crate::analytics::reports::{DailyLoadMetrics, FunnelStageReport, HourlyLoadTime, SiteMetrics};
use crate::analytics::DateRange;
use crate::constants::ga4::{
    CLICK_TRACKING_START, DAILY_WINDOW_DAYS, DEFAULT_METRICS_END, DEFAULT_METRICS_START,
    FUNNEL_WINDOW_DAYS,
};
use crate::error::Result;
use crate::web::extractors::{ClickQuery, DateRangeQuery};
use crate::web::response_types::{ApiError, ApiResult, DataList};
use crate::web::state::AppState;

/// Site totals: GET /api/dashboard/metrics/?start&end
pub async fn site_metrics(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> ApiResult<Json<SiteMetrics>> {
    state.ga4.ensure_configured()?;
    let range = DateRange::with_defaults(
        query.start(),
        query.end(),
        DEFAULT_METRICS_START,
        DEFAULT_METRICS_END,
    )?;
    Ok(Json(state.ga4.site_metrics(range).await?))
}

/// Average load time per day: GET /api/dashboard/daily-metrics/?start&end
pub async fn daily_metrics(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> ApiResult<Json<Vec<DailyLoadMetrics>>> {
    state.ga4.ensure_configured()?;
    let range = DateRange::or_trailing_window(
        query.start(),
        query.end(),
        state.today(),
        DAILY_WINDOW_DAYS,
    )?;
    Ok(Json(state.ga4.daily_metrics(range).await?))
}

/// Average load time per hour and device: GET /api/dashboard/load-time-hourly/?start&end
pub async fn load_time_hourly(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> ApiResult<Json<Vec<HourlyLoadTime>>> {
    state.ga4.ensure_configured()?;
    let range = DateRange::or_trailing_window(
        query.start(),
        query.end(),
        state.today(),
        DAILY_WINDOW_DAYS,
    )?;
    Ok(Json(state.ga4.load_time_by_hour(range).await?))
}

/// Funnel stages: GET /api/dashboard/funnel-data/?start&end
pub async fn funnel_data(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> ApiResult<Json<Vec<FunnelStageReport>>> {
    state.ga4.ensure_configured()?;
    let range = DateRange::or_trailing_window(
        query.start(),
        query.end(),
        state.today(),
        FUNNEL_WINDOW_DAYS,
    )?;
    Ok(Json(state.ga4.funnel(range).await?))
}

/// Tracked period through yesterday unless `start`/`end` narrow it
fn click_range(query: &ClickQuery, today: NaiveDate) -> Result<DateRange> {
    let yesterday = (today - Duration::days(1)).to_string();
    DateRange::with_defaults(query.start(), query.end(), CLICK_TRACKING_START, &yesterday)
}

/// Sessions, carts and purchases per home page element:
/// GET /api/dashboard/click_relation/?unit&start&end
pub async fn click_relation(
    State(state): State<AppState>,
    Query(query): Query<ClickQuery>,
) -> ApiResult<Json<DataList<ClickRelation>>> {
    state.ga4.ensure_configured()?;
    let range = click_range(&query, state.today())?;
    let rows = state.ga4.click_relation(range, query.unit()).await?;
    Ok(Json(DataList::new(rows)))
}

/// Purchases behind one element: GET /api/dashboard/click_detail/{elemento}/?unit
pub async fn click_detail(
    State(state): State<AppState>,
    Path(element): Path<String>,
    Query(query): Query<ClickQuery>,
) -> ApiResult<Json<DataList<ClickPurchase>>> {
    state.ga4.ensure_configured()?;
    let range = click_range(&query, state.today())?;
    let rows = state.ga4.click_detail(range, &element, query.unit()).await?;
    Ok(Json(DataList::new(rows)))
}

/// One session's clicks and page views: GET /api/dashboard/user_click_flow/?session_id
pub async fn user_click_flow(
    State(state): State<AppState>,
    Query(query): Query<ClickQuery>,
) -> ApiResult<Json<DataList<FlowStep>>> {
    state.ga4.ensure_configured()?;
    let session_id = query
        .session_id()
        .ok_or_else(|| ApiError::bad_request("Se requiere session_id"))?;
    let range = click_range(&query, state.today())?;
    let steps = state.ga4.session_flow(range, session_id).await?;
    Ok(Json(DataList::new(steps)))
}
