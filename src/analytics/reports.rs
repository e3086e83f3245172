//! GA4 report requests and the reshaping of their rows.
//!
//! The reshaping functions are pure so they can be tested without a GA4
//! property. [`Ga4ReportService`] pairs each request with its reshaper and
//! writes the operation log.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::{DateRange, Ga4ReportSource, ReportRequest, ReportRow};
use crate::constants::ga4::*;
use crate::engine::round_to;
use crate::error::{ReportingError, Result};
use crate::logging::{log_error, log_report_operation};

fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

fn mean_or_zero(sum: f64, count: u32) -> f64 {
    if count > 0 {
        sum / f64::from(count)
    } else {
        0.0
    }
}

pub(super) fn metric_value<'a>(row: &'a ReportRow, index: usize, name: &str) -> Result<&'a str> {
    row.metric(index)
        .ok_or_else(|| ReportingError::Decode(format!("row is missing metric {name}")))
}

fn count_metric(row: &ReportRow, index: usize, name: &str) -> Result<i64> {
    let raw = metric_value(row, index, name)?;
    raw.trim()
        .parse::<i64>()
        .map_err(|e| ReportingError::Decode(format!("{name} '{raw}': {e}")))
}

fn amount_metric(row: &ReportRow, index: usize, name: &str) -> Result<f64> {
    let raw = metric_value(row, index, name)?;
    raw.trim()
        .parse::<f64>()
        .map_err(|e| ReportingError::Decode(format!("{name} '{raw}': {e}")))
}

/// Device categories the load-time and funnel views keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Desktop,
    Mobile,
}

impl Device {
    /// Case-insensitive; tablets and `(other)` yield `None`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            DEVICE_DESKTOP => Some(Self::Desktop),
            DEVICE_MOBILE => Some(Self::Mobile),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Site metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SiteMetrics {
    pub sessions: i64,
    pub items: i64,
    pub revenue: f64,
}

pub fn site_metrics_request(date_range: DateRange) -> ReportRequest {
    ReportRequest::new(
        vec![],
        vec![
            SESSIONS_METRIC,
            ITEMS_PURCHASED_METRIC,
            PURCHASE_REVENUE_METRIC,
        ],
        date_range,
    )
}

/// Totals from the first row; zeros when GA4 returned nothing
pub fn site_metrics(rows: &[ReportRow]) -> Result<SiteMetrics> {
    let Some(row) = rows.first() else {
        return Ok(SiteMetrics::default());
    };
    Ok(SiteMetrics {
        sessions: count_metric(row, 0, SESSIONS_METRIC)?,
        items: count_metric(row, 1, ITEMS_PURCHASED_METRIC)?,
        revenue: amount_metric(row, 2, PURCHASE_REVENUE_METRIC)?,
    })
}

// ---------------------------------------------------------------------------
// Daily load time
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyLoadMetrics {
    /// As GA4 reports it (`YYYYMMDD`)
    pub date: String,
    pub avg_load_time: f64,
    pub items: i64,
}

pub fn daily_metrics_request(date_range: DateRange) -> ReportRequest {
    ReportRequest::new(
        vec![DATE_DIMENSION],
        vec![
            LOAD_TIME_TOTAL_METRIC,
            LOAD_TIME_COUNT_METRIC,
            PURCHASE_EVENTS_METRIC,
        ],
        date_range,
    )
}

pub fn daily_metrics(rows: &[ReportRow]) -> Result<Vec<DailyLoadMetrics>> {
    rows.iter()
        .map(|row| {
            let total = amount_metric(row, 0, LOAD_TIME_TOTAL_METRIC)?;
            let events = count_metric(row, 1, LOAD_TIME_COUNT_METRIC)?;
            let avg = if events > 0 {
                total / events as f64
            } else {
                0.0
            };
            Ok(DailyLoadMetrics {
                date: row.dimension(0).unwrap_or_default().to_string(),
                avg_load_time: round2(avg),
                items: count_metric(row, 2, PURCHASE_EVENTS_METRIC)?,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Load time by hour and device
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyLoadTime {
    pub hour: u32,
    #[serde(rename = "deviceCategory")]
    pub device_category: String,
    pub avg_load_time: f64,
}

pub fn load_time_request(date_range: DateRange) -> ReportRequest {
    ReportRequest::new(
        vec![HOUR_DIMENSION, DEVICE_DIMENSION],
        vec![LOAD_TIME_TOTAL_METRIC, LOAD_TIME_COUNT_METRIC],
        date_range,
    )
}

/// Rows with a non-numeric hour, another device or unreadable metrics are
/// skipped rather than failing the report.
pub fn load_time_by_hour(rows: &[ReportRow]) -> Vec<HourlyLoadTime> {
    rows.iter()
        .filter_map(|row| {
            let hour_raw = row.dimension(0)?;
            if hour_raw.is_empty() || !hour_raw.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let hour = hour_raw.parse::<u32>().ok()?;
            let device = row.dimension(1)?;
            Device::parse(device)?;

            let total = amount_metric(row, 0, LOAD_TIME_TOTAL_METRIC).ok()?;
            let events = count_metric(row, 1, LOAD_TIME_COUNT_METRIC).ok()?;
            let avg = if events > 0 {
                total / events as f64
            } else {
                0.0
            };
            Some(HourlyLoadTime {
                hour,
                device_category: device.to_string(),
                avg_load_time: round2(avg),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Funnel
// ---------------------------------------------------------------------------

const CONSIDERATION_PATTERNS: [&str; 8] = [
    "cart",
    "delivery",
    "payments",
    "pago-a-cuotas",
    "validacion-otp",
    "datos-personales-prepost",
    "postpago/cambiate-con-tu-mismo-numero/",
    "prepago/cambiate-con-tu-mismo-numero/datos-personales",
];

const CONVERSION_PATTERNS: [&str; 3] = ["thankyou", "resumen-pedido-prepost", "resumen-pedido"];

const LANDING_PATHS: [&str; 3] = ["/", "", "tienda.claro.com.co"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunnelStage {
    Attraction,
    Interest,
    Consideration,
    Conversion,
}

impl FunnelStage {
    /// Funnel order, which is also the emission order
    pub const ALL: [FunnelStage; 4] = [
        FunnelStage::Attraction,
        FunnelStage::Interest,
        FunnelStage::Consideration,
        FunnelStage::Conversion,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FunnelStage::Attraction => "Atracción",
            FunnelStage::Interest => "Interés",
            FunnelStage::Consideration => "Consideración",
            FunnelStage::Conversion => "Conversión",
        }
    }

    /// Stage of a page path. Conversion patterns win over consideration;
    /// product, login and search pages fall through to interest along with
    /// anything unmatched.
    pub fn classify(page_path: &str) -> Self {
        let path = page_path.to_lowercase();
        let matches_any = |patterns: &[&str]| patterns.iter().any(|p| path.contains(p));

        if LANDING_PATHS.contains(&path.as_str()) {
            FunnelStage::Attraction
        } else if matches_any(&CONVERSION_PATTERNS) {
            FunnelStage::Conversion
        } else if matches_any(&CONSIDERATION_PATTERNS) {
            FunnelStage::Consideration
        } else {
            FunnelStage::Interest
        }
    }
}

/// Sum and count of per-row time-per-view, overall and per device
#[derive(Debug, Clone, Copy, Default)]
struct TimeAccumulator {
    total: f64,
    count: u32,
    desktop: f64,
    desktop_count: u32,
    mobile: f64,
    mobile_count: u32,
}

impl TimeAccumulator {
    fn add(&mut self, device: Device, time_per_view: f64) {
        self.total += time_per_view;
        self.count += 1;
        match device {
            Device::Desktop => {
                self.desktop += time_per_view;
                self.desktop_count += 1;
            }
            Device::Mobile => {
                self.mobile += time_per_view;
                self.mobile_count += 1;
            }
        }
    }

    fn means(&self) -> (f64, f64, f64) {
        (
            round2(mean_or_zero(self.total, self.count)),
            round2(mean_or_zero(self.desktop, self.desktop_count)),
            round2(mean_or_zero(self.mobile, self.mobile_count)),
        )
    }
}

#[derive(Debug, Default)]
struct UrlAccumulator {
    url: String,
    views: i64,
    times: TimeAccumulator,
}

#[derive(Debug, Default)]
struct StageAccumulator {
    views: i64,
    events: i64,
    times: TimeAccumulator,
    /// First-seen order, used to break percentage ties
    urls: Vec<UrlAccumulator>,
    url_index: HashMap<String, usize>,
}

impl StageAccumulator {
    fn add(&mut self, page_path: &str, device: Device, views: i64, events: i64, time: f64) {
        self.views += views;
        self.events += events;
        self.times.add(device, time);

        let index = match self.url_index.get(page_path) {
            Some(index) => *index,
            None => {
                self.urls.push(UrlAccumulator {
                    url: page_path.to_string(),
                    ..UrlAccumulator::default()
                });
                self.url_index.insert(page_path.to_string(), self.urls.len() - 1);
                self.urls.len() - 1
            }
        };
        let url = &mut self.urls[index];
        url.views += views;
        url.times.add(device, time);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlShare {
    pub url: String,
    /// Share of the stage's views, in percent
    pub percentage: f64,
    pub avg_time: f64,
    pub desktop_time: f64,
    pub mobile_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelStageReport {
    pub stage: &'static str,
    pub vistas: i64,
    pub eventos: i64,
    pub avg_time: f64,
    pub desktop_time: f64,
    pub mobile_time: f64,
    pub top_urls: Vec<UrlShare>,
}

pub fn funnel_request(date_range: DateRange) -> ReportRequest {
    ReportRequest::new(
        vec![DEVICE_DIMENSION, PAGE_PATH_DIMENSION],
        vec![
            PAGE_VIEWS_METRIC,
            EVENT_COUNT_METRIC,
            ENGAGEMENT_DURATION_METRIC,
        ],
        date_range,
    )
    .with_limit(FUNNEL_ROW_LIMIT)
}

/// Group desktop and mobile rows into the four funnel stages.
///
/// Every stage is emitted, empty ones with zeros. Times are means of the
/// per-row `engagement / views`, not engagement over total views.
pub fn funnel(rows: &[ReportRow]) -> Vec<FunnelStageReport> {
    let mut stages: HashMap<FunnelStage, StageAccumulator> = HashMap::new();

    for row in rows {
        let Some(device) = row.dimension(0).and_then(Device::parse) else {
            continue;
        };
        let page_path = row.dimension(1).unwrap_or_default();
        let (Ok(views), Ok(events), Ok(engagement)) = (
            count_metric(row, 0, PAGE_VIEWS_METRIC),
            count_metric(row, 1, EVENT_COUNT_METRIC),
            amount_metric(row, 2, ENGAGEMENT_DURATION_METRIC),
        ) else {
            continue;
        };
        let time_per_view = if views > 0 {
            engagement / views as f64
        } else {
            0.0
        };

        stages
            .entry(FunnelStage::classify(page_path))
            .or_default()
            .add(page_path, device, views, events, time_per_view);
    }

    FunnelStage::ALL
        .into_iter()
        .map(|stage| {
            let acc = stages.remove(&stage).unwrap_or_default();
            let stage_views = acc.views;
            let (avg_time, desktop_time, mobile_time) = acc.times.means();

            let mut top_urls: Vec<UrlShare> = acc
                .urls
                .into_iter()
                .map(|url| {
                    let (avg_time, desktop_time, mobile_time) = url.times.means();
                    let share = if stage_views > 0 {
                        url.views as f64 / stage_views as f64 * 100.0
                    } else {
                        0.0
                    };
                    UrlShare {
                        url: url.url,
                        percentage: round2(share),
                        avg_time,
                        desktop_time,
                        mobile_time,
                    }
                })
                .collect();
            top_urls.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

            FunnelStageReport {
                stage: stage.label(),
                vistas: acc.views,
                eventos: acc.events,
                avg_time,
                desktop_time,
                mobile_time,
                top_urls,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Runs each GA4 report and reshapes it
#[derive(Debug, Clone)]
pub struct Ga4ReportService {
    source: Arc<dyn Ga4ReportSource>,
}

impl Ga4ReportService {
    pub fn new(source: Arc<dyn Ga4ReportSource>) -> Self {
        Self { source }
    }

    pub fn ensure_configured(&self) -> Result<()> {
        self.source.ensure_configured()
    }

    pub(super) async fn run<T>(
        &self,
        operation: &str,
        request: ReportRequest,
        reshape: impl FnOnce(&[ReportRow]) -> Result<T>,
        count: impl FnOnce(&T) -> usize,
    ) -> Result<T> {
        let window = format!(
            "{}..{}",
            request.date_range.start_date, request.date_range.end_date
        );
        let result = self
            .source
            .run_report(&request)
            .await
            .and_then(|rows| reshape(&rows));

        match &result {
            Ok(value) => log_report_operation(
                operation,
                Some(window.as_str()),
                "ok",
                Some(count(value)),
                None,
            ),
            Err(error) => log_error(
                "ga4_reports",
                operation,
                &error.to_string(),
                Some(window.as_str()),
            ),
        }
        result
    }

    pub async fn site_metrics(&self, date_range: DateRange) -> Result<SiteMetrics> {
        self.run(
            "ga4_metrics",
            site_metrics_request(date_range),
            site_metrics,
            |_| 1,
        )
        .await
    }

    pub async fn daily_metrics(&self, date_range: DateRange) -> Result<Vec<DailyLoadMetrics>> {
        self.run(
            "ga4_daily_metrics",
            daily_metrics_request(date_range),
            daily_metrics,
            Vec::len,
        )
        .await
    }

    pub async fn load_time_by_hour(&self, date_range: DateRange) -> Result<Vec<HourlyLoadTime>> {
        self.run(
            "ga4_load_time_hourly",
            load_time_request(date_range),
            |rows| Ok(load_time_by_hour(rows)),
            Vec::len,
        )
        .await
    }

    pub async fn funnel(&self, date_range: DateRange) -> Result<Vec<FunnelStageReport>> {
        self.run(
            "ga4_funnel",
            funnel_request(date_range),
            |rows| Ok(funnel(rows)),
            Vec::len,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::CannedReportSource;

    fn row(dimensions: &[&str], metrics: &[&str]) -> ReportRow {
        ReportRow::new(dimensions.iter().copied(), metrics.iter().copied())
    }

    fn range() -> DateRange {
        DateRange {
            start_date: "7daysAgo".to_string(),
            end_date: "today".to_string(),
        }
    }

    #[test]
    fn test_site_metrics_first_row_or_zeros() {
        let metrics = site_metrics(&[row(&[], &["1520", "37", "48210.5"])]).unwrap();
        assert_eq!(
            metrics,
            SiteMetrics {
                sessions: 1520,
                items: 37,
                revenue: 48210.5
            }
        );
        assert_eq!(site_metrics(&[]).unwrap(), SiteMetrics::default());
        assert!(matches!(
            site_metrics(&[row(&[], &["n/a", "1", "2"])]),
            Err(ReportingError::Decode(_))
        ));
    }

    #[test]
    fn test_daily_average_guards_zero_events() {
        let days = daily_metrics(&[
            row(&["20251208"], &["10.0", "3", "4"]),
            row(&["20251209"], &["7.5", "0", "1"]),
        ])
        .unwrap();
        assert_eq!(days[0].avg_load_time, 3.33);
        assert_eq!(days[1].avg_load_time, 0.0);
        assert_eq!(days[1].date, "20251209");
    }

    #[test]
    fn test_hourly_skips_other_rows() {
        let hours = load_time_by_hour(&[
            row(&["09", "Mobile"], &["9.0", "2"]),
            row(&["(other)", "mobile"], &["1.0", "1"]),
            row(&["10", "tablet"], &["1.0", "1"]),
            row(&["11", "desktop"], &["bad", "1"]),
            row(&["12", "desktop"], &["5.0", "4"]),
        ]);
        assert_eq!(hours.len(), 2);
        assert_eq!(hours[0].hour, 9);
        assert_eq!(hours[0].device_category, "Mobile");
        assert_eq!(hours[0].avg_load_time, 4.5);
        assert_eq!(hours[1].avg_load_time, 1.25);
    }

    #[test]
    fn test_stage_classification() {
        assert_eq!(FunnelStage::classify("/"), FunnelStage::Attraction);
        assert_eq!(FunnelStage::classify("TIENDA.CLARO.COM.CO"), FunnelStage::Attraction);
        assert_eq!(FunnelStage::classify("/cart/thankyou"), FunnelStage::Conversion);
        assert_eq!(FunnelStage::classify("/checkout/payments"), FunnelStage::Consideration);
        assert_eq!(FunnelStage::classify("/detalle-producto/x"), FunnelStage::Interest);
        assert_eq!(FunnelStage::classify("/blog"), FunnelStage::Interest);
    }

    #[test]
    fn test_funnel_groups_and_ranks_urls() {
        let stages = funnel(&[
            row(&["desktop", "/"], &["100", "250", "300"]),
            row(&["mobile", "/"], &["300", "500", "300"]),
            row(&["tablet", "/"], &["999", "999", "999"]),
            row(&["mobile", "/detalle-producto/a"], &["10", "20", "50"]),
            row(&["mobile", "/detalle-producto/b"], &["30", "40", "30"]),
            row(&["desktop", "/resumen-pedido"], &["0", "2", "10"]),
        ]);

        let labels: Vec<_> = stages.iter().map(|s| s.stage).collect();
        assert_eq!(labels, vec!["Atracción", "Interés", "Consideración", "Conversión"]);

        let attraction = &stages[0];
        assert_eq!(attraction.vistas, 400);
        assert_eq!(attraction.eventos, 750);
        // mean of 3.0 (desktop) and 1.0 (mobile)
        assert_eq!(attraction.avg_time, 2.0);
        assert_eq!(attraction.desktop_time, 3.0);
        assert_eq!(attraction.mobile_time, 1.0);
        assert_eq!(attraction.top_urls.len(), 1);
        assert_eq!(attraction.top_urls[0].percentage, 100.0);

        let interest = &stages[1];
        assert_eq!(interest.top_urls[0].url, "/detalle-producto/b");
        assert_eq!(interest.top_urls[0].percentage, 75.0);
        assert_eq!(interest.top_urls[1].percentage, 25.0);
        assert_eq!(interest.desktop_time, 0.0);

        assert_eq!(stages[2].vistas, 0);
        assert!(stages[2].top_urls.is_empty());

        let conversion = &stages[3];
        assert_eq!(conversion.avg_time, 0.0);
        assert_eq!(conversion.top_urls[0].percentage, 0.0);
    }

    #[test]
    fn test_funnel_request_uses_row_limit() {
        assert_eq!(funnel_request(range()).limit, Some(FUNNEL_ROW_LIMIT));
        assert_eq!(site_metrics_request(range()).metrics[0], SESSIONS_METRIC);
    }

    #[tokio::test]
    async fn test_service_routes_request_to_reshaper() {
        let source = CannedReportSource::new().with_report(
            HOUR_DIMENSION,
            vec![row(&["14", "desktop"], &["6.0", "3"])],
        );
        let service = Ga4ReportService::new(Arc::new(source.clone()));

        let hours = service.load_time_by_hour(range()).await.unwrap();
        assert_eq!(hours[0].avg_load_time, 2.0);
        assert_eq!(source.requests()[0].dimensions, vec![HOUR_DIMENSION, DEVICE_DIMENSION]);

        source.set_failure(Some("quota exceeded"));
        let err = service.funnel(range()).await.unwrap_err();
        assert!(matches!(err, ReportingError::Upstream(_)));
    }
}
