//! Applicant Directory Adapter
//!
//! Implements [`ApplicantPort`] against the users service over REST:
//!
//! ```text
//! GET {base_url}/api/v1/usuarios/documento/{document_id}
//! Authorization: Bearer {token}        (only when a token is configured)
//! ```
//!
//! # Error Handling
//!
//! - 404 -> `Ok(None)`
//! - 401/403 -> `PortError::Connection` (misconfigured credentials)
//! - 5xx -> `PortError::ServiceUnavailable`
//! - Timeouts -> `PortError::Timeout`
//! - Undecodable body -> `PortError::Transformation`

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use core_kernel::{
    AdapterHealth, ApplicantProfileId, DomainPort, HealthCheckResult, HealthCheckable, PortError,
};
use domain_lending::{ApplicantPort, ApplicantProfile};

const DOCUMENT_ENDPOINT: &str = "/api/v1/usuarios/documento";
const SERVICE_NAME: &str = "applicant-directory";

/// Connection settings for the users service
#[derive(Debug, Clone)]
pub struct ApplicantDirectoryConfig {
    /// Base URL without trailing slash, e.g. `http://localhost:8080`
    pub base_url: String,
    /// Bearer token; empty or absent sends no `Authorization` header
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ApplicantDirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Profile as returned by the users service
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioResponse {
    pub id_usuario: i64,
    pub nombre: String,
    pub apellido: String,
    #[serde(default)]
    pub email: String,
    pub documento_identidad: String,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub rol: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub salario_base: Option<Decimal>,
}

impl UsuarioResponse {
    /// Required identity fields are present and non-blank
    pub fn is_valid(&self) -> bool {
        !self.nombre.trim().is_empty()
            && !self.apellido.trim().is_empty()
            && !self.documento_identidad.trim().is_empty()
    }
}

impl From<UsuarioResponse> for ApplicantProfile {
    fn from(dto: UsuarioResponse) -> Self {
        ApplicantProfile {
            id: ApplicantProfileId::new(dto.id_usuario),
            first_name: dto.nombre,
            last_name: dto.apellido,
            email: dto.email,
            document_id: dto.documento_identidad,
            phone: dto.telefono,
            role: dto.rol,
            base_salary: dto.salario_base,
        }
    }
}

/// reqwest-backed [`ApplicantPort`]
#[derive(Debug, Clone)]
pub struct ApplicantDirectoryClient {
    client: reqwest::Client,
    config: ApplicantDirectoryConfig,
}

impl ApplicantDirectoryClient {
    /// # Errors
    ///
    /// Returns `PortError::Internal` when the HTTP client cannot be built
    pub fn new(config: ApplicantDirectoryConfig) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PortError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn document_url(&self, document_id: &str) -> String {
        format!(
            "{}{}/{}",
            self.config.base_url.trim_end_matches('/'),
            DOCUMENT_ENDPOINT,
            document_id
        )
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match self.config.token.as_deref() {
            Some(token) if !token.is_empty() => request.bearer_auth(token),
            _ => request,
        }
    }

    fn map_transport_error(&self, error: reqwest::Error) -> PortError {
        if error.is_timeout() {
            PortError::Timeout {
                operation: "GET applicant profile".to_string(),
                duration_ms: self.config.timeout.as_millis() as u64,
            }
        } else if error.is_decode() {
            PortError::transformation(format!("unreadable applicant profile: {error}"))
        } else {
            PortError::Connection {
                message: format!("applicant directory unreachable: {error}"),
                source: Some(Box::new(error)),
            }
        }
    }
}

impl DomainPort for ApplicantDirectoryClient {}

#[async_trait]
impl ApplicantPort for ApplicantDirectoryClient {
    #[instrument(skip(self))]
    async fn find_by_id(&self, applicant_id: &str) -> Result<Option<ApplicantProfile>, PortError> {
        let applicant_id = applicant_id.trim();
        if applicant_id.is_empty() {
            return Err(PortError::validation_field("applicant id is required", "idUser"));
        }

        let response = self
            .get(&self.document_url(applicant_id))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                warn!("Applicant not found in directory");
                return Ok(None);
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(PortError::connection(format!(
                    "applicant directory rejected credentials ({})",
                    response.status()
                )));
            }
            status if status.is_server_error() => {
                warn!(%status, "Applicant directory failed");
                return Err(PortError::ServiceUnavailable {
                    service: SERVICE_NAME.to_string(),
                });
            }
            status if !status.is_success() => {
                return Err(PortError::internal(format!(
                    "unexpected applicant directory status {status}"
                )));
            }
            _ => {}
        }

        let dto: UsuarioResponse = response
            .json()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !dto.is_valid() {
            return Err(PortError::transformation(format!(
                "applicant profile {} is missing required fields",
                dto.id_usuario
            )));
        }

        debug!(profile_id = dto.id_usuario, "Applicant profile fetched");
        info!("Applicant profile obtained");
        Ok(Some(dto.into()))
    }
}

#[async_trait]
impl HealthCheckable for ApplicantDirectoryClient {
    /// Any HTTP answer from the base URL counts as reachable
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let result = self.get(&self.config.base_url).send().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(response) if response.status().is_server_error() => (
                AdapterHealth::Degraded,
                Some(format!("Directory answered {}", response.status())),
            ),
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Directory error: {e}"))),
        };

        HealthCheckResult {
            adapter_id: "applicant-directory-client".to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}
