//! Request and response bodies
//!
//! Field names follow the public API contract (`idSolicitud`, `monto`, ...).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{ApplicationId, LoanTypeId, PageResult, StatusId};
use domain_lending::{ApplicationView, NewApplication, NotificationOutcome};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub monto: Decimal,
    pub plazo: NaiveDate,
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    #[validate(length(min = 1, message = "applicant id is required"))]
    pub id_user: String,
    pub id_tipo_prestamo: Option<i64>,
}

impl From<CreateApplicationRequest> for NewApplication {
    fn from(request: CreateApplicationRequest) -> Self {
        NewApplication {
            applicant_id: request.id_user,
            email: request.email,
            amount: request.monto,
            term: request.plazo,
            loan_type_id: request.id_tipo_prestamo.map(LoanTypeId::new),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub id_solicitud: Option<i64>,
    pub id_estado: Option<i64>,
}

impl UpdateStatusRequest {
    pub fn application_id(&self) -> Option<ApplicationId> {
        self.id_solicitud.map(ApplicationId::new)
    }

    pub fn status_id(&self) -> Option<StatusId> {
        self.id_estado.map(StatusId::new)
    }
}

fn default_page_size() -> u32 {
    10
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListQuery {
    #[serde(default)]
    pub pagina: u32,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100, message = "page size must be between 1 and 100"))]
    pub tamanio: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id_solicitud: Option<i64>,
    pub id_user: String,
    pub email: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub monto: Decimal,
    pub plazo: NaiveDate,
    pub id_tipo_prestamo: i64,
    /// Loan type name, when the catalogue has the id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_prestamo: Option<String>,
    pub id_estado: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ApplicationView> for ApplicationResponse {
    fn from(view: ApplicationView) -> Self {
        let application = view.application;
        Self {
            id_solicitud: application.id.map(i64::from),
            id_user: application.applicant_id,
            email: application.email,
            monto: application.amount,
            plazo: application.term,
            id_tipo_prestamo: application.loan_type_id.into(),
            tipo_prestamo: view.loan_type_name,
            id_estado: application.status_id.into(),
            estado: view.status_name,
            created_at: application.created_at,
            updated_at: application.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub contenido: Vec<T>,
    pub pagina: u32,
    pub tamanio: u32,
    pub total_elementos: u64,
    pub total_paginas: u64,
    pub primera: bool,
    pub ultima: bool,
}

impl<T> From<PageResult<T>> for PageResponse<T> {
    fn from(page: PageResult<T>) -> Self {
        Self {
            total_paginas: page.total_pages(),
            primera: page.is_first(),
            ultima: page.is_last(),
            pagina: page.page,
            tamanio: page.size,
            total_elementos: page.total_elements,
            contenido: page.content,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponse {
    #[serde(flatten)]
    pub solicitud: ApplicationResponse,
    pub estado_anterior: i64,
    /// `ENVIADA`, `OMITIDA` or `FALLIDA`
    pub notificacion: &'static str,
}

impl TransitionResponse {
    pub fn new(
        view: ApplicationView,
        previous_status: StatusId,
        notification: &NotificationOutcome,
    ) -> Self {
        let notificacion = match notification {
            NotificationOutcome::Sent(_) => "ENVIADA",
            NotificationOutcome::Skipped => "OMITIDA",
            NotificationOutcome::Failed(_) => "FALLIDA",
        };
        Self {
            solicitud: view.into(),
            estado_anterior: previous_status.into(),
            notificacion,
        }
    }
}
