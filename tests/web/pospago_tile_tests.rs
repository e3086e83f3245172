//! # Sales Tile Endpoint Tests
//!
//! Envelope shape, period defaults and degradation for `/api/pospago/*`.

use axum::http::StatusCode;
use pospago_dashboard::analytics::CannedReportSource;
use pospago_dashboard::source::ActivationCounts;
use serde_json::json;

use super::test_infrastructure::*;

#[tokio::test]
async fn test_monthly_goals_envelope() {
    let app = TestApp::new();
    let response = app
        .get("/api/pospago/metas-objetivos/?anio=2025&mes=12")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], json!(true));
    assert!(response.body["timestamp"].is_string());

    let data = &response.body["data"];
    assert_eq!(data["tiene_datos"], json!(true));
    assert_eq!(data["anio"], json!(2025));
    assert_eq!(data["mes"], json!(12));
    assert_eq!(data["total"]["meta"], json!(300.0));
    assert_eq!(data["total"]["ejecucion"], json!(38.0));
    assert_eq!(data["dias_habiles"]["migra"]["totales"], json!(22.0));
    assert_eq!(data["dias_habiles"]["porta"]["totales"], json!(19.0));
    for category in ["migracion", "portabilidad", "porta_ecommerce", "ctw", "linea_nueva"] {
        assert!(
            data[category]["cumplimiento"].is_number(),
            "{category} is missing from the payload"
        );
    }
    assert_eq!(app.sales.live_sessions(), 0);
}

#[tokio::test]
async fn test_period_defaults_to_current_month() {
    let app = TestApp::new();

    let response = app.get("/api/pospago/metas-objetivos/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["anio"], json!(2025));
    assert_eq!(response.body["data"]["mes"], json!(12));

    // blank values count as absent
    let blank = app.get("/api/pospago/metas-objetivos/?anio=&mes=").await;
    assert_eq!(blank.status, StatusCode::OK);
    assert_eq!(blank.body["data"]["mes"], json!(12));
}

#[tokio::test]
async fn test_period_without_budget_has_no_data() {
    let app = TestApp::new();
    let response = app
        .get("/api/pospago/metas-objetivos/?anio=2030&mes=1")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], json!(true));
    assert_eq!(
        response.body["data"],
        json!({"tiene_datos": false, "mensaje": "No hay datos para 2030-01"})
    );
}

#[tokio::test]
async fn test_invalid_month_degrades_without_querying() {
    let app = TestApp::new();

    for uri in [
        "/api/pospago/metas-objetivos/?anio=2025&mes=13",
        "/api/pospago/desglose-semanal/?anio=2025&mes=0",
        "/api/pospago/mapa-calor/?anio=dos-mil&mes=12",
    ] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(response.body["success"], json!(false));
        assert!(response.body["error"].is_string());
        assert_eq!(response.body["data"]["tiene_datos"], json!(false));
    }
    assert_eq!(app.sales.opened_sessions(), 0);
}

#[tokio::test]
async fn test_previous_day_close() {
    let app = TestApp::new();
    let response = app.get("/api/pospago/cierre-dia-anterior/").await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["fecha"], json!("2025-12-09"));
    assert_eq!(data["cantadas"]["total"], json!(16));
    assert_eq!(data["activadas"]["total"], json!(8));
    assert_eq!(data["tasa_activacion"], json!(50.0));
    assert_eq!(data["comparativos"]["semana_anterior"]["activadas"], json!(14));
    assert_eq!(data["comparativos"]["mes_anterior"]["activadas"], json!(4));
    assert_eq!(data["comparativos"]["mes_anterior"]["variacion_pct"], json!(100.0));
}

#[tokio::test]
async fn test_previous_day_close_without_month_ago_row() {
    let migrations_only = |total| ActivationCounts {
        total,
        migration: total,
        ..ActivationCounts::default()
    };
    // yesterday and a week before, but nothing on 2025-11-09
    let sales = pospago_dashboard::InMemorySalesSource::new()
        .with_daily_activations(date(2025, 12, 9), migrations_only(12))
        .with_daily_activations(date(2025, 12, 2), migrations_only(10));
    let app = TestApp::with_sources(sales, CannedReportSource::new());
    let response = app.get("/api/pospago/cierre-dia-anterior/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["data"],
        json!({"tiene_datos": false, "mensaje": "No hay datos del día anterior"})
    );
}

#[tokio::test]
async fn test_intraday_cuts() {
    let app = TestApp::new();
    let response = app.get("/api/pospago/cortes-dia-hoy/").await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["fecha"], json!("2025-12-10"));
    assert_eq!(data["cortes_por_franja"][0]["franja"], json!("10-12"));
    assert_eq!(data["cortes_por_franja"][0]["cantadas"], json!(7));
}

#[tokio::test]
async fn test_intraday_cuts_without_rows() {
    let app = TestApp::with_sources(
        pospago_dashboard::InMemorySalesSource::new(),
        CannedReportSource::new(),
    );
    let response = app.get("/api/pospago/cortes-dia-hoy/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["data"],
        json!({"tiene_datos": false, "mensaje": "No hay cortes del día actual"})
    );
}

#[tokio::test]
async fn test_series_tiles() {
    let app = TestApp::new();

    let evolution = app
        .get("/api/pospago/evolucion-ventas/?anio=2025&mes=12")
        .await;
    assert_eq!(evolution.status, StatusCode::OK);
    let days = evolution.body["data"]["datos_diarios"].as_array().unwrap();
    assert_eq!(days.len(), 4);
    assert_eq!(days[0]["fecha"], json!("2025-12-01"));
    assert_eq!(days[2]["v9"]["total"], json!(16));
    assert!(evolution.body["data"]["promedios"]["r5"].is_number());

    let weekly = app
        .get("/api/pospago/desglose-semanal/?anio=2025&mes=12")
        .await;
    assert_eq!(weekly.status, StatusCode::OK);
    assert_eq!(weekly.body["data"]["total_mes"], json!(38));
    assert!(!weekly.body["data"]["semanas"].as_array().unwrap().is_empty());

    let heat = app.get("/api/pospago/mapa-calor/?anio=2025&mes=12").await;
    assert_eq!(heat.status, StatusCode::OK);
    assert_eq!(heat.body["data"]["resumen"]["total"], json!(32));

    let comparison = app.get("/api/pospago/comparativo/?anio=2025&mes=12").await;
    assert_eq!(comparison.status, StatusCode::OK);
    let rows = comparison.body["data"]["comparativo"].as_array().unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0]["tipo"], json!("Total Pospago"));

    assert_eq!(app.sales.live_sessions(), 0);
}

#[tokio::test]
async fn test_failing_source_degrades_every_tile() {
    let app = TestApp::new();
    app.sales.set_failing(true);

    let cases = [
        ("/api/pospago/metas-objetivos/", None),
        ("/api/pospago/cierre-dia-anterior/", None),
        ("/api/pospago/cortes-dia-hoy/", Some("cortes_por_franja")),
        ("/api/pospago/evolucion-ventas/", Some("datos_diarios")),
        ("/api/pospago/desglose-semanal/", Some("semanas")),
        ("/api/pospago/mapa-calor/", Some("datos")),
        ("/api/pospago/comparativo/", Some("comparativo")),
    ];

    for (uri, list_field) in cases {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(response.body["success"], json!(false), "{uri}");
        assert!(response.body["error"].is_string(), "{uri}");
        assert!(response.body["timestamp"].is_string(), "{uri}");

        let mut expected = json!({"tiene_datos": false, "error": response.body["error"]});
        if let Some(field) = list_field {
            expected[field] = json!([]);
        }
        assert_eq!(response.body["data"], expected, "{uri}");
    }

    assert_eq!(app.sales.live_sessions(), 0);
    assert_eq!(app.sales.opened_sessions(), cases.len());
}

#[tokio::test]
async fn test_tiles_fail_independently() {
    let app = TestApp::new();

    let first = app.get("/api/pospago/comparativo/").await;
    app.sales.set_failing(true);
    let second = app.get("/api/pospago/comparativo/").await;
    app.sales.set_failing(false);
    let third = app.get("/api/pospago/comparativo/").await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(third.status, StatusCode::OK);
    assert_eq!(first.body["data"], third.body["data"]);
}
