// Prediction report over a mocked reviews endpoint

use std::sync::Arc;

use chrono::NaiveDate;
use httpmock::prelude::*;
use serde_json::json;

use productividad_app_lib::commands::args::{Command, PrediccionArgs};
use productividad_app_lib::commands::{run_command, AppState};
use productividad_app_lib::models::prediction::{PredictionTier, Trend};
use productividad_app_lib::models::settings::AppSettings;
use productividad_app_lib::services::api_client::{HttpApiClient, ProductividadApi};
use productividad_app_lib::services::report_service::ReportService;

const PATH: &str = "/api/reportes/revisiones-por-fecha";

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn service_for(server: &MockServer) -> ReportService {
    let settings = AppSettings::for_backend(server.base_url());
    let api: Arc<dyn ProductividadApi> =
        Arc::new(HttpApiClient::try_new(&settings).expect("client"));
    ReportService::new(api, &settings)
}

async fn mock_range(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(PATH)
                .query_param("start", "2024-01-11")
                .query_param("end", "2024-01-12");
            then.status(200).json_body(json!({
                "success": true,
                "data": {
                    "totalRevisiones": 12,
                    "colaboradores": [
                        {
                            "idAsignee": 15,
                            "name": "ana@empresa.com",
                            "terminadas": 3,
                            "pendientes": 2,
                            "items": {
                                "actividades": [{
                                    "titulo": "Portal",
                                    "pendientes": [
                                        {"id": "t1", "nombre": "Login", "fechaCreacion": "2024-01-08"},
                                        {"id": "t2", "nombre": "Home", "fechaCreacion": "2024-01-10T09:30:00"}
                                    ]
                                }]
                            }
                        },
                        {
                            "idAsignee": 16,
                            "name": "Bruno Díaz",
                            "items": {
                                "actividades": [{
                                    "titulo": "App",
                                    "terminadas": [
                                        {"id": "t3", "nombre": "Pago", "fechaCreacion": "2024-01-09", "fechaFinTerminada": "2024-01-11"},
                                        {"id": "t4", "nombre": "Carrito", "fechaCreacion": "2024-01-11", "fechaFinTerminada": "2024-01-11"}
                                    ]
                                }]
                            }
                        },
                        {"idAsignee": 17, "name": "  ", "pendientes": 9}
                    ]
                }
            }));
        })
        .await;
}

async fn mock_day(server: &MockServer, date: &'static str, terminadas: u64, pendientes: u64) {
    server
        .mock_async(move |when, then| {
            when.method(GET).path(PATH).query_param("date", date);
            then.status(200).json_body(json!({
                "success": true,
                "data": {
                    "colaboradores": [{
                        "idAsignee": 15,
                        "name": "ana@empresa.com",
                        "terminadas": terminadas,
                        "pendientes": pendientes
                    }]
                }
            }));
        })
        .await;
}

#[tokio::test]
async fn scores_collaborators_and_sorts_by_score() {
    let server = MockServer::start_async().await;
    mock_range(&server).await;

    let report = service_for(&server)
        .prediction(Some(day(2024, 1, 11)), Some(day(2024, 1, 12)), false, day(2024, 1, 12))
        .await
        .expect("prediction");

    assert_eq!(report.total_revisiones, 12);
    assert_eq!(report.fecha_analisis, "2024-01-12");
    assert_eq!(report.colaboradores.len(), 2);

    let bruno = &report.colaboradores[0];
    assert_eq!(bruno.nombre, "Bruno Díaz");
    assert_eq!(bruno.email, None);
    assert_eq!(bruno.metricas.total_terminadas, 2);
    assert_eq!(bruno.metricas.tareas_terminadas[0].dias_para_completar, 2);
    assert_eq!(bruno.prediccion.score, 100);
    assert_eq!(bruno.prediccion.nivel, PredictionTier::Excelente);
    assert_eq!(bruno.prediccion.tendencia, Trend::SinDatos);

    // 100 - 2*5 - 2*10 - 3.0*3 + 3*2
    let ana = &report.colaboradores[1];
    assert_eq!(ana.nombre, "ana");
    assert_eq!(ana.email.as_deref(), Some("ana@empresa.com"));
    assert_eq!(ana.metricas.tareas_con_arrastre, 2);
    assert_eq!(ana.metricas.dias_arrastre_promedio, 3.0);
    assert_eq!(ana.prediccion.score, 67);
    assert_eq!(ana.prediccion.nivel, PredictionTier::Regular);
}

#[tokio::test]
async fn trend_uses_the_two_most_recent_days() {
    let server = MockServer::start_async().await;
    mock_range(&server).await;
    mock_day(&server, "2024-01-11", 1, 3).await;
    mock_day(&server, "2024-01-12", 2, 2).await;

    let report = service_for(&server)
        .prediction(Some(day(2024, 1, 11)), Some(day(2024, 1, 12)), true, day(2024, 1, 12))
        .await
        .expect("prediction");

    let ana = report
        .colaboradores
        .iter()
        .find(|entry| entry.id == "15")
        .expect("ana");
    assert_eq!(ana.prediccion.tendencia, Trend::Mejorando);
    assert_eq!(ana.prediccion.factores.ajuste_tendencia, 5);
    assert_eq!(ana.prediccion.score, 72);
    assert_eq!(ana.prediccion.nivel, PredictionTier::Bueno);
    assert!(report.dias_fallidos.is_empty());
}

#[tokio::test]
async fn failed_trend_days_do_not_fail_the_report() {
    let server = MockServer::start_async().await;
    mock_range(&server).await;
    mock_day(&server, "2024-01-11", 1, 3).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(PATH).query_param("date", "2024-01-12");
            then.status(502).body("bad gateway");
        })
        .await;

    let report = service_for(&server)
        .prediction(Some(day(2024, 1, 11)), Some(day(2024, 1, 12)), true, day(2024, 1, 12))
        .await
        .expect("prediction");

    assert_eq!(report.dias_fallidos, vec!["2024-01-12".to_string()]);
    let ana = report
        .colaboradores
        .iter()
        .find(|entry| entry.id == "15")
        .expect("ana");
    assert_eq!(ana.prediccion.tendencia, Trend::SinDatos);
}

#[tokio::test]
async fn json_output_uses_camel_case_report_keys() {
    let server = MockServer::start_async().await;
    mock_range(&server).await;

    let state = AppState::new(AppSettings::for_backend(server.base_url())).expect("state");
    let output = run_command(
        &state,
        Command::Prediccion(PrediccionArgs {
            desde: Some(day(2024, 1, 11)),
            hasta: Some(day(2024, 1, 12)),
            tendencia: false,
        }),
        true,
    )
    .await
    .expect("json");

    let value: serde_json::Value = serde_json::from_str(&output).expect("valid json");
    assert_eq!(value["totalRevisiones"], 12);
    assert_eq!(value["colaboradores"].as_array().map(Vec::len), Some(2));
}
