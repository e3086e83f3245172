//! GA4 Data API client.
//!
//! Posts to `{api_base_url}/v1beta/properties/{property_id}:runReport` with a
//! bearer token taken from configuration. Credentials are checked on every
//! call, so a server without GA4 settings still starts and only the GA4
//! endpoints report the problem.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use super::{DateRange, DimensionFilter, FilterMatch, Ga4ReportSource, ReportRequest, ReportRow};
use crate::config::Ga4Config;
use crate::error::{ReportingError, Result};

pub struct Ga4RestClient {
    client: Client,
    config: Ga4Config,
}

impl std::fmt::Debug for Ga4RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ga4RestClient")
            .field("api_base_url", &self.config.api_base_url)
            .field("property_id", &self.config.property_id)
            .field("has_token", &self.config.access_token.is_some())
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct NameRef<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StringFilter<'a> {
    match_type: &'static str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct InListFilter<'a> {
    values: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum WireMatch<'a> {
    StringFilter(StringFilter<'a>),
    InListFilter(InListFilter<'a>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireFilter<'a> {
    field_name: &'a str,
    #[serde(flatten)]
    matcher: WireMatch<'a>,
}

#[derive(Debug, Serialize)]
struct FilterExpression<'a> {
    filter: WireFilter<'a>,
}

#[derive(Debug, Serialize)]
struct ExpressionList<'a> {
    expressions: Vec<FilterExpression<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AndGroup<'a> {
    and_group: ExpressionList<'a>,
}

impl<'a> From<&'a DimensionFilter> for FilterExpression<'a> {
    fn from(filter: &'a DimensionFilter) -> Self {
        let matcher = match &filter.matcher {
            FilterMatch::Exact(value) => WireMatch::StringFilter(StringFilter {
                match_type: "EXACT",
                value,
            }),
            FilterMatch::InList(values) => WireMatch::InListFilter(InListFilter { values }),
        };
        Self {
            filter: WireFilter {
                field_name: filter.field,
                matcher,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReportBody<'a> {
    date_ranges: [&'a DateRange; 1],
    dimensions: Vec<NameRef<'a>>,
    metrics: Vec<NameRef<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimension_filter: Option<AndGroup<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

impl<'a> From<&'a ReportRequest> for RunReportBody<'a> {
    fn from(request: &'a ReportRequest) -> Self {
        let dimension_filter = (!request.filters.is_empty()).then(|| AndGroup {
            and_group: ExpressionList {
                expressions: request.filters.iter().map(Into::into).collect(),
            },
        });
        Self {
            date_ranges: [&request.date_range],
            dimensions: request.dimensions.iter().map(|name| NameRef { name }).collect(),
            metrics: request.metrics.iter().map(|name| NameRef { name }).collect(),
            dimension_filter,
            limit: request.limit,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunReportResponse {
    #[serde(default)]
    rows: Vec<WireRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRow {
    #[serde(default)]
    dimension_values: Vec<WireValue>,
    #[serde(default)]
    metric_values: Vec<WireValue>,
}

#[derive(Debug, Deserialize)]
struct WireValue {
    #[serde(default)]
    value: String,
}

impl From<WireRow> for ReportRow {
    fn from(row: WireRow) -> Self {
        ReportRow::new(
            row.dimension_values.into_iter().map(|v| v.value),
            row.metric_values.into_iter().map(|v| v.value),
        )
    }
}

impl Ga4RestClient {
    pub fn new(config: &Ga4Config, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("pospago-dashboard/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ReportingError::configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn report_url(&self, property_id: &str) -> String {
        format!(
            "{}/v1beta/properties/{}:runReport",
            self.config.api_base_url.trim_end_matches('/'),
            property_id
        )
    }
}

#[async_trait]
impl Ga4ReportSource for Ga4RestClient {
    async fn run_report(&self, request: &ReportRequest) -> Result<Vec<ReportRow>> {
        let (property_id, token) = self.config.credentials()?;
        let url = self.report_url(property_id);

        debug!(
            url = %url,
            metrics = ?request.metrics,
            start = %request.date_range.start_date,
            end = %request.date_range.end_date,
            "Running GA4 report"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&RunReportBody::from(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("GA4 runReport failed: {} - {}", status, error_text);
            return Err(ReportingError::Upstream(format!(
                "GA4 runReport failed: {status} - {error_text}"
            )));
        }

        let body: RunReportResponse = response.json().await?;
        debug!(rows = body.rows.len(), "GA4 report returned");
        Ok(body.rows.into_iter().map(Into::into).collect())
    }

    fn ensure_configured(&self) -> Result<()> {
        self.config.credentials().map(|_| ())
    }
}
