//! Home page click attribution.
//!
//! The home page tags each click with the element and image that was clicked,
//! and purchases carry the element that led to them. The views here join the
//! two per element, list the purchases behind one element, and replay one
//! session's clicks and page views in time order.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

use super::reports::{metric_value, Ga4ReportService};
use super::{DateRange, DimensionFilter, ReportRequest, ReportRow};
use crate::constants::ga4::*;
use crate::error::{ReportingError, Result};

/// Business unit a purchase can be narrowed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessUnit {
    Terminals,
    Technology,
    Migration,
    Portability,
}

impl BusinessUnit {
    /// Case-insensitive. Unknown units yield `None` and leave purchases unfiltered.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "terminales" => Some(Self::Terminals),
            "tecnologia" => Some(Self::Technology),
            "migracion" => Some(Self::Migration),
            "portabilidad" => Some(Self::Portability),
            _ => None,
        }
    }

    /// Devices are tagged on `business_unit`, plans on `business_unit2`
    pub fn filter(self) -> DimensionFilter {
        match self {
            Self::Terminals => DimensionFilter::exact(BUSINESS_UNIT_DIMENSION, "terminales"),
            Self::Technology => DimensionFilter::exact(BUSINESS_UNIT_DIMENSION, "tecnologia"),
            Self::Migration => DimensionFilter::exact(BUSINESS_LINE_DIMENSION, "migracion"),
            Self::Portability => {
                DimensionFilter::exact(BUSINESS_LINE_DIMENSION, "portabilidad postpago")
            }
        }
    }
}

fn unit_filter(unit: Option<BusinessUnit>) -> Option<DimensionFilter> {
    unit.map(BusinessUnit::filter)
}

fn is_unset(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case(NOT_SET)
}

/// GA4 sends counts as decimals now and then; blank means zero
fn lenient_amount(row: &ReportRow, index: usize, name: &str) -> Result<f64> {
    let raw = metric_value(row, index, name)?.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse::<f64>()
        .map_err(|e| ReportingError::Decode(format!("{name} '{raw}': {e}")))
}

fn lenient_count(row: &ReportRow, index: usize, name: &str) -> Result<i64> {
    lenient_amount(row, index, name).map(|value| value.trunc() as i64)
}

// ---------------------------------------------------------------------------
// Click relation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickRelation {
    pub elemento: String,
    /// Image of the first row seen for the element
    pub img_click_home: String,
    pub sesiones: i64,
    pub carritos: i64,
    /// Distinct transactions attributed to the element
    pub compras: i64,
    pub ingresos: f64,
}

pub fn click_engagement_request(date_range: DateRange) -> ReportRequest {
    ReportRequest::new(
        vec![CLICK_ELEMENT_DIMENSION, CLICK_IMAGE_DIMENSION],
        vec![SESSIONS_METRIC, ADD_TO_CARTS_METRIC],
        date_range,
    )
    .with_limit(CLICK_ROW_LIMIT)
}

/// One row per element and transaction, narrowed to `unit` when given
pub fn click_purchases_request(
    date_range: DateRange,
    unit: Option<BusinessUnit>,
) -> ReportRequest {
    ReportRequest::new(
        vec![CLICK_ELEMENT_DIMENSION, TRANSACTION_ID_DIMENSION],
        vec![PURCHASE_REVENUE_METRIC],
        date_range,
    )
    .with_limit(CLICK_ROW_LIMIT)
    .with_filters(unit_filter(unit))
}

/// Join sessions and carts per element with the purchases attributed to it.
///
/// Only elements with engagement rows are listed; purchases for other
/// elements are dropped. Sorted by revenue, highest first, keeping
/// first-seen order between equal revenues.
pub fn click_relation(
    engagement: &[ReportRow],
    purchases: &[ReportRow],
) -> Result<Vec<ClickRelation>> {
    let mut elements: Vec<ClickRelation> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in engagement {
        let element = row.dimension(0).unwrap_or_default();
        if is_unset(element) || element.eq_ignore_ascii_case("none") {
            continue;
        }
        let sessions = lenient_count(row, 0, SESSIONS_METRIC)?;
        let carts = lenient_count(row, 1, ADD_TO_CARTS_METRIC)?;

        let slot = *index.entry(element.to_string()).or_insert_with(|| {
            elements.push(ClickRelation {
                elemento: element.to_string(),
                img_click_home: row.dimension(1).unwrap_or_default().to_string(),
                sesiones: 0,
                carritos: 0,
                compras: 0,
                ingresos: 0.0,
            });
            elements.len() - 1
        });
        elements[slot].sesiones += sessions;
        elements[slot].carritos += carts;
    }

    for row in purchases {
        let element = row.dimension(0).unwrap_or_default();
        if is_unset(element) {
            continue;
        }
        let revenue = lenient_amount(row, 0, PURCHASE_REVENUE_METRIC)?;
        if let Some(slot) = index.get(element) {
            elements[*slot].compras += 1;
            elements[*slot].ingresos += revenue;
        }
    }

    elements.sort_by(|a, b| b.ingresos.total_cmp(&a.ingresos));
    Ok(elements)
}

// ---------------------------------------------------------------------------
// Purchases behind one element
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickPurchase {
    pub transaction_id: String,
    pub elemento: String,
    pub items_purchased: String,
    pub session_id_final: String,
    pub valor: f64,
    /// Whether the session's click flow can be replayed
    pub has_click_flow: bool,
}

pub fn click_detail_request(
    date_range: DateRange,
    element: &str,
    unit: Option<BusinessUnit>,
) -> ReportRequest {
    ReportRequest::new(
        vec![
            TRANSACTION_ID_DIMENSION,
            CLICK_ELEMENT_DIMENSION,
            ITEMS_PURCHASED_DIMENSION,
            SESSION_ID_DIMENSION,
        ],
        vec![PURCHASE_REVENUE_METRIC],
        date_range,
    )
    .with_limit(CLICK_DETAIL_ROW_LIMIT)
    .with_filter(DimensionFilter::exact(CLICK_ELEMENT_DIMENSION, element))
    .with_filters(unit_filter(unit))
}

/// Sessions among `session_ids` that recorded at least one click event
pub fn tracked_sessions_request(
    date_range: DateRange,
    session_ids: Vec<String>,
) -> ReportRequest {
    ReportRequest::new(vec![SESSION_ID_DIMENSION], vec![], date_range)
        .with_limit(CLICK_DETAIL_ROW_LIMIT)
        .with_filter(DimensionFilter::exact(EVENT_NAME_DIMENSION, USER_CLICK_EVENT))
        .with_filter(DimensionFilter::in_list(SESSION_ID_DIMENSION, session_ids))
}

pub fn click_purchases(rows: &[ReportRow]) -> Result<Vec<ClickPurchase>> {
    rows.iter()
        .map(|row| {
            let dimension = |index| row.dimension(index).unwrap_or_default().to_string();
            Ok(ClickPurchase {
                transaction_id: dimension(0),
                elemento: dimension(1),
                items_purchased: dimension(2),
                session_id_final: dimension(3),
                valor: lenient_amount(row, 0, PURCHASE_REVENUE_METRIC)?,
                has_click_flow: false,
            })
        })
        .collect()
}

/// Distinct non-empty session ids, sorted
pub fn purchase_sessions(purchases: &[ClickPurchase]) -> Vec<String> {
    purchases
        .iter()
        .map(|purchase| purchase.session_id_final.as_str())
        .filter(|session| !session.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Flag purchases whose session appears in the tracked-sessions rows
pub fn mark_click_flows(purchases: &mut [ClickPurchase], tracked: &[ReportRow]) {
    let sessions: HashSet<&str> = tracked.iter().filter_map(|row| row.dimension(0)).collect();
    for purchase in purchases {
        purchase.has_click_flow = sessions.contains(purchase.session_id_final.as_str());
    }
}

// ---------------------------------------------------------------------------
// Session click flow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStepKind {
    Click,
    Pageview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowStep {
    pub session_id: String,
    #[serde(rename = "type")]
    pub kind: FlowStepKind,
    pub detail: String,
    /// GA4 `dateHourMinute` (`YYYYMMDDHHMM`)
    pub timestamp: String,
}

pub fn session_flow_request(date_range: DateRange, session_id: &str) -> ReportRequest {
    ReportRequest::new(
        vec![
            SESSION_ID_DIMENSION,
            USER_CLICK_DIMENSION,
            PAGE_LOCATION_DIMENSION,
            DATE_HOUR_MINUTE_DIMENSION,
        ],
        vec![],
        date_range,
    )
    .with_limit(CLICK_DETAIL_ROW_LIMIT)
    .with_filter(DimensionFilter::exact(SESSION_ID_DIMENSION, session_id))
}

/// Clicks and page views of one session, oldest first.
///
/// A row with both a click and a page location yields the click first.
/// Steps in the same minute keep GA4's row order.
pub fn session_flow(rows: &[ReportRow]) -> Vec<FlowStep> {
    let mut steps: Vec<FlowStep> = rows
        .iter()
        .flat_map(|row| {
            let session_id = row.dimension(0).unwrap_or_default();
            let timestamp = row.dimension(3).unwrap_or_default();
            [
                (FlowStepKind::Click, row.dimension(1).unwrap_or_default()),
                (FlowStepKind::Pageview, row.dimension(2).unwrap_or_default()),
            ]
            .into_iter()
            .filter(|(_, detail)| !is_unset(detail))
            .map(move |(kind, detail)| FlowStep {
                session_id: session_id.to_string(),
                kind,
                detail: detail.to_string(),
                timestamp: timestamp.to_string(),
            })
        })
        .collect();

    steps.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    steps
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

fn raw_rows(rows: &[ReportRow]) -> Result<Vec<ReportRow>> {
    Ok(rows.to_vec())
}

impl Ga4ReportService {
    pub async fn click_relation(
        &self,
        date_range: DateRange,
        unit: Option<BusinessUnit>,
    ) -> Result<Vec<ClickRelation>> {
        let engagement = self
            .run(
                "ga4_click_engagement",
                click_engagement_request(date_range.clone()),
                raw_rows,
                Vec::len,
            )
            .await?;
        self.run(
            "ga4_click_relation",
            click_purchases_request(date_range, unit),
            |purchases| click_relation(&engagement, purchases),
            Vec::len,
        )
        .await
    }

    /// Purchases attributed to `element`. The click-event lookup is skipped
    /// when none of them carries a session id.
    pub async fn click_detail(
        &self,
        date_range: DateRange,
        element: &str,
        unit: Option<BusinessUnit>,
    ) -> Result<Vec<ClickPurchase>> {
        let mut purchases = self
            .run(
                "ga4_click_detail",
                click_detail_request(date_range.clone(), element, unit),
                click_purchases,
                Vec::len,
            )
            .await?;

        let sessions = purchase_sessions(&purchases);
        if sessions.is_empty() {
            return Ok(purchases);
        }
        let tracked = self
            .run(
                "ga4_tracked_sessions",
                tracked_sessions_request(date_range, sessions),
                raw_rows,
                Vec::len,
            )
            .await?;
        mark_click_flows(&mut purchases, &tracked);
        Ok(purchases)
    }

    pub async fn session_flow(
        &self,
        date_range: DateRange,
        session_id: &str,
    ) -> Result<Vec<FlowStep>> {
        self.run(
            "ga4_user_click_flow",
            session_flow_request(date_range, session_id),
            |rows| Ok(session_flow(rows)),
            Vec::len,
        )
        .await
    }
}
