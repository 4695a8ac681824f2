//! Applicant directory client against a local stub of the users service

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use rust_decimal_macros::dec;
use serde_json::json;

use core_kernel::{AdapterHealth, HealthCheckable, PortError};
use domain_lending::ApplicantPort;
use infra_http::{ApplicantDirectoryClient, ApplicantDirectoryConfig};

const TOKEN: &str = "directory-token";

async fn usuario_por_documento(
    Path(documento): Path<String>,
    headers: HeaderMap,
) -> axum::response::Response {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {TOKEN}"))
        .unwrap_or(false);
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match documento.as_str() {
        "1020304050" => Json(json!({
            "idUsuario": 7,
            "nombre": "Ana",
            "apellido": "Gómez",
            "email": "ana@example.com",
            "documentoIdentidad": "1020304050",
            "telefono": "3001234567",
            "idRol": 3,
            "rol": "CLIENTE",
            "salarioBase": 3500000.5,
            "activo": true
        }))
        .into_response(),
        "sin-salario" => Json(json!({
            "idUsuario": 8,
            "nombre": "Luis",
            "apellido": "Pérez",
            "email": "luis@example.com",
            "documentoIdentidad": "sin-salario"
        }))
        .into_response(),
        "incompleto" => Json(json!({
            "idUsuario": 9,
            "nombre": "",
            "apellido": "Ruiz",
            "documentoIdentidad": "incompleto"
        }))
        .into_response(),
        "roto" => (StatusCode::OK, "not json").into_response(),
        "caido" => StatusCode::BAD_GATEWAY.into_response(),
        "lento" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            StatusCode::NOT_FOUND.into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_directory() -> SocketAddr {
    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/api/v1/usuarios/documento/:documento", get(usuario_por_documento));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr, token: Option<&str>) -> ApplicantDirectoryClient {
    ApplicantDirectoryClient::new(ApplicantDirectoryConfig {
        base_url: format!("http://{addr}"),
        token: token.map(str::to_string),
        timeout: Duration::from_millis(500),
    })
    .unwrap()
}

#[tokio::test]
async fn test_profile_is_mapped() {
    let addr = spawn_directory().await;
    let profile = client(addr, Some(TOKEN))
        .find_by_id("1020304050")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(i64::from(profile.id), 7);
    assert_eq!(profile.first_name, "Ana");
    assert_eq!(profile.document_id, "1020304050");
    assert_eq!(profile.role.as_deref(), Some("CLIENTE"));
    assert_eq!(profile.base_salary, Some(dec!(3500000.5)));
}

#[tokio::test]
async fn test_optional_fields_may_be_absent() {
    let addr = spawn_directory().await;
    let profile = client(addr, Some(TOKEN))
        .find_by_id("sin-salario")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(profile.base_salary, None);
    assert_eq!(profile.phone, None);
}

#[tokio::test]
async fn test_unknown_document_is_absent() {
    let addr = spawn_directory().await;
    let profile = client(addr, Some(TOKEN)).find_by_id("0000").await.unwrap();
    assert!(profile.is_none());
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let addr = spawn_directory().await;
    let error = client(addr, None).find_by_id("1020304050").await.unwrap_err();
    assert!(matches!(error, PortError::Connection { .. }));
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let addr = spawn_directory().await;
    let error = client(addr, Some(TOKEN)).find_by_id("caido").await.unwrap_err();
    assert!(matches!(error, PortError::ServiceUnavailable { .. }));
    assert!(error.is_transient());
}

#[tokio::test]
async fn test_bad_payloads_are_transformation_errors() {
    let addr = spawn_directory().await;
    let directory = client(addr, Some(TOKEN));

    let error = directory.find_by_id("roto").await.unwrap_err();
    assert!(matches!(error, PortError::Transformation { .. }));

    let error = directory.find_by_id("incompleto").await.unwrap_err();
    assert!(matches!(error, PortError::Transformation { .. }));
}

#[tokio::test]
async fn test_slow_directory_times_out() {
    let addr = spawn_directory().await;
    let error = client(addr, Some(TOKEN)).find_by_id("lento").await.unwrap_err();
    assert!(matches!(error, PortError::Timeout { .. }));
}

#[tokio::test]
async fn test_blank_document_is_rejected_locally() {
    let addr = spawn_directory().await;
    let error = client(addr, Some(TOKEN)).find_by_id("  ").await.unwrap_err();
    assert!(matches!(error, PortError::Validation { .. }));
}

#[tokio::test]
async fn test_health_check() {
    let addr = spawn_directory().await;
    let health = client(addr, None).health_check().await;
    assert_eq!(health.status, AdapterHealth::Healthy);

    let unreachable = ApplicantDirectoryClient::new(ApplicantDirectoryConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        token: None,
        timeout: Duration::from_millis(200),
    })
    .unwrap();
    assert_eq!(unreachable.health_check().await.status, AdapterHealth::Unhealthy);
}
