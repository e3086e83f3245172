//! # Dashboard Constants
//!
//! Labels, fixed tables and defaults shared by the engine, the services and
//! the web layer. Wire-visible strings live here so the JSON contract can be
//! audited in one place.

use chrono::Weekday;

/// Messages carried by `tiene_datos: false` payloads
pub mod messages {
    pub const NO_PREVIOUS_DAY: &str = "No hay datos del día anterior";
    pub const NO_CUTS_TODAY: &str = "No hay cortes del día actual";

    /// `No hay datos para YYYY-MM`
    pub fn no_data_for_period(year: i32, month: u32) -> String {
        format!("No hay datos para {year}-{month:02}")
    }
}

/// Row labels of the comparative tile, in emission order
pub mod comparison_labels {
    pub const TOTAL: &str = "Total Pospago";
    pub const MIGRATION: &str = "Migraciones";
    pub const PORTABILITY: &str = "Portabilidad Total";
    pub const PORTABILITY_ECOMMERCE: &str = "Porta Ecommerce";
    pub const CLICK_TO_CHAT: &str = "CTW";
    pub const NEW_LINE: &str = "Linea Nueva";
}

/// Intraday hour bands as `(first_hour, label)`; a band runs until the next one starts
pub const INTRADAY_BANDS: [(u32, &str); 5] = [
    (0, "00-10"),
    (10, "10-12"),
    (12, "12-14"),
    (14, "14-16"),
    (16, "16-24"),
];

/// Sunday-first ordinal used by the heat map (Sunday = 1 ... Saturday = 7)
pub fn weekday_ordinal(day: Weekday) -> u32 {
    day.num_days_from_sunday() + 1
}

/// One-letter column header for a weekday
pub fn weekday_letter(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "D",
        Weekday::Mon => "L",
        Weekday::Tue => "M",
        Weekday::Wed => "X",
        Weekday::Thu => "J",
        Weekday::Fri => "V",
        Weekday::Sat => "S",
    }
}

/// Full Spanish weekday name for the heat-map summary
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Domingo",
        Weekday::Mon => "Lunes",
        Weekday::Tue => "Martes",
        Weekday::Wed => "Miércoles",
        Weekday::Thu => "Jueves",
        Weekday::Fri => "Viernes",
        Weekday::Sat => "Sábado",
    }
}

/// GA4 report defaults
pub mod ga4 {
    pub const DEFAULT_METRICS_START: &str = "7daysAgo";
    pub const DEFAULT_METRICS_END: &str = "today";
    /// Days before today covered by the daily and hourly views (inclusive window of 7)
    pub const DAILY_WINDOW_DAYS: i64 = 6;
    pub const FUNNEL_WINDOW_DAYS: i64 = 28;
    pub const FUNNEL_ROW_LIMIT: u32 = 10_000;

    pub const SESSIONS_METRIC: &str = "sessions";
    pub const ITEMS_PURCHASED_METRIC: &str = "itemsPurchased";
    pub const PURCHASE_REVENUE_METRIC: &str = "purchaseRevenue";
    pub const LOAD_TIME_TOTAL_METRIC: &str = "customEvent:loading_time_sec";
    pub const LOAD_TIME_COUNT_METRIC: &str = "countCustomEvent:loading_time_sec";
    pub const PURCHASE_EVENTS_METRIC: &str = "keyEvents:purchase";
    pub const PAGE_VIEWS_METRIC: &str = "screenPageViews";
    pub const EVENT_COUNT_METRIC: &str = "eventCount";
    pub const ENGAGEMENT_DURATION_METRIC: &str = "userEngagementDuration";

    pub const DATE_DIMENSION: &str = "date";
    pub const HOUR_DIMENSION: &str = "hour";
    pub const DEVICE_DIMENSION: &str = "deviceCategory";
    pub const PAGE_PATH_DIMENSION: &str = "pagePath";

    pub const DEVICE_DESKTOP: &str = "desktop";
    pub const DEVICE_MOBILE: &str = "mobile";

    /// First day the home page click tagging was live
    pub const CLICK_TRACKING_START: &str = "2025-10-15";
    pub const CLICK_ROW_LIMIT: u32 = 10_000;
    pub const CLICK_DETAIL_ROW_LIMIT: u32 = 1_000;

    pub const ADD_TO_CARTS_METRIC: &str = "addToCarts";

    pub const CLICK_ELEMENT_DIMENSION: &str = "customEvent:elemento_click_home";
    pub const CLICK_IMAGE_DIMENSION: &str = "customEvent:img_click_home";
    pub const TRANSACTION_ID_DIMENSION: &str = "transactionId";
    pub const ITEMS_PURCHASED_DIMENSION: &str = "customEvent:items_purchased";
    pub const SESSION_ID_DIMENSION: &str = "customEvent:session_id_final";
    pub const USER_CLICK_DIMENSION: &str = "customEvent:user_click";
    pub const PAGE_LOCATION_DIMENSION: &str = "pageLocation";
    pub const DATE_HOUR_MINUTE_DIMENSION: &str = "dateHourMinute";
    pub const EVENT_NAME_DIMENSION: &str = "eventName";
    pub const BUSINESS_UNIT_DIMENSION: &str = "customEvent:business_unit";
    pub const BUSINESS_LINE_DIMENSION: &str = "customEvent:business_unit2";

    pub const USER_CLICK_EVENT: &str = "user_click_event";
    /// Dimension values GA4 uses for "no value"
    pub const NOT_SET: &str = "(not set)";
}
