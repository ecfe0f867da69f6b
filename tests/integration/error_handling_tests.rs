// Backend failures, malformed payloads and command-level error mapping

use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::json;

use productividad_app_lib::commands::args::{Command, UsuarioArgs};
use productividad_app_lib::commands::{run_command, AppState, CommandError};
use productividad_app_lib::error::ApiErrorCode;
use productividad_app_lib::models::productivity::ProductivityLabel;
use productividad_app_lib::models::settings::AppSettings;
use productividad_app_lib::services::api_client::{HttpApiClient, ProductividadApi};
use productividad_app_lib::services::report_service::{DailyQuery, ReportService};

fn client_for(server: &MockServer) -> HttpApiClient {
    HttpApiClient::try_new(&AppSettings::for_backend(server.base_url())).expect("client")
}

#[tokio::test]
async fn non_success_body_becomes_the_message_verbatim() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/productividad/hoy");
            then.status(404).body("Usuario no encontrado\n");
        })
        .await;

    let err = client_for(&server).fetch_daily(None).await.expect_err("404");
    assert_eq!(err.api_code(), Some(ApiErrorCode::HttpStatus));
    assert_eq!(err.http_status_code(), Some(404));
    assert_eq!(err.to_string(), "Usuario no encontrado\n");
    assert!(err.correlation_id().is_some());
}

#[tokio::test]
async fn empty_error_body_falls_back_to_status_line() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/productividad/hoy");
            then.status(500);
        })
        .await;

    let err = client_for(&server).fetch_daily(None).await.expect_err("500");
    assert_eq!(err.to_string(), "HTTP 500");
    assert_eq!(err.http_status_code(), Some(500));
}

#[tokio::test]
async fn invalid_json_is_an_invalid_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/productividad/hoy");
            then.status(200).body("<html>mantenimiento</html>");
        })
        .await;

    let err = client_for(&server).fetch_daily(None).await.expect_err("html");
    assert_eq!(err.api_code(), Some(ApiErrorCode::InvalidResponse));
    let details = err.api_details().expect("details");
    assert_eq!(details["endpoint"], "productividad.hoy");
}

#[tokio::test]
async fn legacy_and_malformed_fields_are_tolerated() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/productividad/hoy");
            then.status(200).json_body(json!({
                "date": "2024-01-12",
                "users": [
                    {
                        "user_id": 1,
                        "colaborador": null,
                        "tiempo_total": "45",
                        "prediccion": {
                            "label": "no_productivo",
                            "probabilidades": {"productivo": 0.1, "regular": 0.2, "no_productivo": 0.7}
                        }
                    },
                    {
                        "user_id": "2",
                        "colaborador": "Bruno",
                        "tiempo_total": -5,
                        "prediccion": {"label": "desconocido", "probabilities": "n/a"}
                    }
                ]
            }));
        })
        .await;

    let snapshot = client_for(&server).fetch_daily(None).await.expect("snapshot");
    let first = &snapshot.users[0];
    assert_eq!(first.user_id, "1");
    assert_eq!(first.name(), "1");
    assert_eq!(first.tiempo_total, 45);
    assert!(first.prediccion.uses_legacy_key());
    assert_eq!(first.prediccion.probabilities().no_productivo, 0.7);

    let second = &snapshot.users[1];
    assert_eq!(second.tiempo_total, 0);
    assert_eq!(second.label(), ProductivityLabel::Regular);
    assert_eq!(second.prediccion.probabilities().productivo, 0.0);
}

#[tokio::test]
async fn invalid_page_is_a_validation_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/productividad/hoy");
            then.status(200).json_body(json!({"date": "2024-01-12", "users": []}));
        })
        .await;

    let settings = AppSettings::for_backend(server.base_url());
    let api: Arc<dyn ProductividadApi> = Arc::new(client_for(&server));
    let service = ReportService::new(api, &settings);
    let result = service
        .daily(
            None,
            DailyQuery {
                pagina: 1,
                por_pagina: Some(0),
                ..DailyQuery::default()
            },
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn command_errors_carry_status_and_exit_code() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/productividad/usuario/99");
            then.status(404).body("Usuario no encontrado");
        })
        .await;

    let state = AppState::new(AppSettings::for_backend(server.base_url())).expect("state");
    let err: CommandError = run_command(
        &state,
        Command::Usuario(UsuarioArgs {
            id: "99".to_string(),
            fecha: None,
        }),
        false,
    )
    .await
    .expect_err("not found");

    assert_eq!(err.code, "HTTP_STATUS");
    assert_eq!(err.message, "Usuario no encontrado");
    assert_eq!(err.exit_code(), 1);
    let details = err.details.expect("details");
    assert_eq!(details["status"], 404);
    assert!(details["correlationId"].is_string());

    let err = run_command(
        &state,
        Command::Usuario(UsuarioArgs {
            id: " ".to_string(),
            fecha: None,
        }),
        false,
    )
    .await
    .expect_err("empty id");
    assert_eq!(err.code, "INVALID_REQUEST");
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn invalid_base_url_fails_state_construction() {
    assert!(AppState::new(AppSettings::for_backend("not a url")).is_err());
}
