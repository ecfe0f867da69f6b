// Daily, history, user-detail and activities flows against a mocked backend

use std::sync::Arc;

use chrono::NaiveDate;
use httpmock::prelude::*;
use serde_json::{json, Value};

use productividad_app_lib::commands::args::{Command, HoyArgs};
use productividad_app_lib::commands::{run_command, AppState};
use productividad_app_lib::models::activity::{ActivityFilter, CompletionState, DuePeriod};
use productividad_app_lib::models::report::StateFilter;
use productividad_app_lib::models::settings::AppSettings;
use productividad_app_lib::services::api_client::{HttpApiClient, ProductividadApi};
use productividad_app_lib::services::report_service::{DailyQuery, ReportService};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn user(id: &str, name: &str, minutes: u64, label: &str) -> Value {
    json!({
        "user_id": id,
        "colaborador": name,
        "actividades": 2,
        "revisiones": 4,
        "tiempo_total": minutes,
        "prediccion": {
            "label": label,
            "probabilities": {"productivo": 0.8, "regular": 0.15, "no_productivo": 0.05}
        }
    })
}

fn service_for(server: &MockServer) -> ReportService {
    let settings = AppSettings::for_backend(server.base_url());
    let api: Arc<dyn ProductividadApi> =
        Arc::new(HttpApiClient::try_new(&settings).expect("client"));
    ReportService::new(api, &settings)
}

#[tokio::test]
async fn daily_snapshot_counts_labels_and_formats_time() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/productividad/hoy")
                .query_param("date", "2024-01-12");
            then.status(200).json_body(json!({
                "date": "2024-01-12",
                "users": [user("1", "Ana López", 120, "productivo")]
            }));
        })
        .await;

    let settings = AppSettings::for_backend(server.base_url());
    let state = AppState::new(settings).expect("state");

    let overview = state
        .reports()
        .daily(Some(day(2024, 1, 12)), DailyQuery::default())
        .await
        .expect("overview");
    assert_eq!(overview.etiquetas.productivo, 1);
    assert_eq!(overview.etiquetas.regular, 0);
    assert_eq!(overview.etiquetas.no_productivo, 0);
    assert_eq!(overview.tiempo_total, 120);

    let text = run_command(
        &state,
        Command::Hoy(HoyArgs {
            fecha: Some(day(2024, 1, 12)),
            estado: StateFilter::Todos,
            buscar: None,
            pagina: 1,
            por_pagina: None,
        }),
        false,
    )
    .await
    .expect("text output");
    assert!(text.contains("2h"));
    assert!(text.contains("Ana López"));
}

#[tokio::test]
async fn daily_filter_search_and_pagination() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/productividad/hoy");
            then.status(200).json_body(json!({
                "date": "2024-01-12",
                "users": [
                    user("1", "Ana López", 120, "productivo"),
                    user("2", "Bruno Díaz", 0, "regular"),
                    user("3", "Carla Ruiz", 30, "no_productivo"),
                    user("4", "Andrés Mora", 90, "productivo")
                ]
            }));
        })
        .await;

    let service = service_for(&server);

    let productive = service
        .daily(
            None,
            DailyQuery {
                estado: StateFilter::Productivo,
                pagina: 1,
                por_pagina: Some(1),
                ..DailyQuery::default()
            },
        )
        .await
        .expect("productive");
    assert_eq!(productive.usuarios.total, 2);
    assert_eq!(productive.usuarios.total_pages, 2);
    assert_eq!(productive.usuarios.items.len(), 1);
    assert_eq!(productive.estados.sin_actividad, 1);
    assert_eq!(productive.top[0].user_id, "1");

    let search = service
        .daily(
            None,
            DailyQuery {
                buscar: Some("an".to_string()),
                pagina: 1,
                ..DailyQuery::default()
            },
        )
        .await
        .expect("search");
    let ids: Vec<&str> = search.usuarios.items.iter().map(|u| u.user_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "4"]);

    let idle = service
        .daily(
            None,
            DailyQuery {
                estado: StateFilter::SinActividad,
                pagina: 1,
                ..DailyQuery::default()
            },
        )
        .await
        .expect("idle");
    assert_eq!(idle.usuarios.items.len(), 1);
    assert_eq!(idle.usuarios.items[0].user_id, "2");
}

#[tokio::test]
async fn history_skips_failed_days_and_reports_them() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/productividad/hoy")
                .query_param("date", "2024-01-10");
            then.status(200).json_body(json!({
                "date": "2024-01-10",
                "users": [user("1", "Ana López", 60, "productivo"), user("2", "Bruno Díaz", 30, "regular")]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/productividad/hoy")
                .query_param("date", "2024-01-11");
            then.status(500).body("fallo interno");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/productividad/hoy")
                .query_param("date", "2024-01-12");
            then.status(200).json_body(json!({
                "date": "2024-01-12",
                "users": [user("1", "Ana López", 121, "regular")]
            }));
        })
        .await;

    let report = service_for(&server)
        .history(day(2024, 1, 10), day(2024, 1, 12), Some("1"))
        .await
        .expect("history");

    assert_eq!(report.dias_fallidos, vec!["2024-01-11".to_string()]);
    assert_eq!(report.dias_con_datos, 2);
    assert_eq!(report.tendencia.len(), 2);

    let ana = &report.promedios[0];
    assert_eq!(ana.user_id, "1");
    assert_eq!(ana.nombre, "Ana");
    assert_eq!(ana.dias, 2);
    assert_eq!(ana.tiempo_total, 181);
    assert_eq!(ana.tiempo_promedio, 91);
    assert_eq!(ana.porcentaje_productivo, 50.0);

    let history = report.usuario.expect("user history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].date, "2024-01-12");

    let names: Vec<&str> = report.usuarios.iter().map(|u| u.nombre.as_str()).collect();
    assert_eq!(names, vec!["Ana López", "Bruno Díaz"]);
}

#[tokio::test]
async fn history_fails_when_every_day_fails() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/productividad/hoy");
            then.status(503);
        })
        .await;

    let result = service_for(&server)
        .history(day(2024, 1, 10), day(2024, 1, 11), None)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn user_detail_buckets_reviews_per_activity() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/productividad/usuario/7");
            then.status(200).json_body(json!({
                "date": "2024-01-12",
                "user": {"user_id": "7", "colaborador": "Ana López"},
                "resumen": {"actividades": 2, "revisiones": 4, "tiempo_total": 95},
                "prediccion": {"label": "productivo"},
                "actividades": [
                    {
                        "id": "a1",
                        "titulo": "Portal",
                        "revisiones": {
                            "terminadas": [{"id": "r1", "duracionMin": 30}, {"id": "r2", "duracionMin": "20"}],
                            "pendientes": [{"id": "r3", "duracionMin": 15}]
                        }
                    },
                    {
                        "id": "a2",
                        "revisiones": {"confirmadas": [{"id": "r4", "duracionMin": 30}]}
                    }
                ]
            }));
        })
        .await;

    let report = service_for(&server)
        .user_detail("7", None)
        .await
        .expect("detail");

    assert_eq!(report.actividades.len(), 2);
    assert_eq!(report.actividades[0].terminadas.cantidad, 2);
    assert_eq!(report.actividades[0].terminadas.duracion_total, 50);
    assert_eq!(report.actividades[1].titulo, "a2");
    assert_eq!(report.totales.terminadas.cantidad, 2);
    assert_eq!(report.totales.confirmadas.duracion_total, 30);
    assert_eq!(report.totales.pendientes.cantidad, 1);
}

#[tokio::test]
async fn activities_dashboard_groups_by_user_and_project() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/actividades");
            then.status(200).json_body(json!({"data": [
                {
                    "id": "a1",
                    "status": "TERMINADO REVISADO/COBRADO",
                    "dueEnd": "2024-01-12",
                    "project": {"id": "p1", "name": "Portal"},
                    "prioridad": "alta",
                    "assignees": [{"id": "u1", "name": "Ana"}]
                },
                {
                    "id": "a2",
                    "status": "EN PROCESO",
                    "tiempoReal": "3",
                    "dueEnd": "2024-01-10",
                    "project": {"id": "p1", "name": "Portal"},
                    "assignees": [{"id": "u1", "name": "Ana"}, null]
                },
                {
                    "id": "a3",
                    "status": "EN PROCESO",
                    "tiempoReal": null,
                    "dueEnd": "2023-11-01",
                    "project": {"id": "p2", "name": "App"},
                    "assignees": [{"id": "u2", "name": "Bruno"}]
                }
            ]}));
        })
        .await;

    let service = service_for(&server);
    let reference = day(2024, 1, 12);

    let all = service
        .activities(
            ActivityFilter {
                periodo: DuePeriod::Todos,
                ..ActivityFilter::default()
            },
            reference,
        )
        .await
        .expect("all");
    assert_eq!(all.estadisticas.total, 3);
    assert_eq!(all.estadisticas.completadas, 2);
    assert_eq!(all.ambiguas, 1);
    assert_eq!(all.por_usuario[0].id, "u1");
    assert_eq!(all.por_usuario[0].completadas, 2);
    assert_eq!(all.por_proyecto[0].nombre, "Portal");

    let week_pending = service
        .activities(
            ActivityFilter {
                periodo: DuePeriod::Semana,
                estado: Some(CompletionState::Pendiente),
                ..ActivityFilter::default()
            },
            reference,
        )
        .await
        .expect("week pending");
    assert_eq!(week_pending.estadisticas.total, 0);
}
