//! Loan application handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};
use validator::Validate;

use core_kernel::{PageRequest, PageResult};
use domain_lending::TransitionOutcome;

use crate::dto::{
    ApplicationResponse, CreateApplicationRequest, ListQuery, PageResponse, TransitionResponse,
    UpdateStatusRequest,
};
use crate::{error::ApiError, AppState};

/// Registers a new application in the pending-review status
#[instrument(skip(state, request), fields(applicant_id = %request.id_user))]
pub async fn create_application(
    State(state): State<AppState>,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationResponse>), ApiError> {
    request.validate()?;

    let application = state.service.create(request.into()).await?;
    info!(application_id = ?application.id, "Application created");

    let view = state.service.describe_one(application).await?;
    Ok((StatusCode::CREATED, Json(view.into())))
}

/// Lists applications one page at a time
pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PageResponse<ApplicationResponse>>, ApiError> {
    query.validate()?;

    let page = state
        .service
        .list_paged(PageRequest::new(query.pagina, query.tamanio))
        .await?;

    let PageResult {
        content,
        page,
        size,
        total_elements,
    } = page;
    let views = state.service.describe(content).await?;
    let content: Vec<ApplicationResponse> =
        views.into_iter().map(ApplicationResponse::from).collect();
    Ok(Json(PageResult::new(content, page, size, total_elements).into()))
}

/// Lists every application of one applicant
pub async fn list_by_applicant(
    State(state): State<AppState>,
    Path(id_user): Path<String>,
) -> Result<Json<Vec<ApplicationResponse>>, ApiError> {
    let applications = state.service.list_by_applicant(&id_user).await?;

    let views = state.service.describe(applications).await?;
    Ok(Json(views.into_iter().map(ApplicationResponse::from).collect()))
}

/// Manual status change; the applicant is notified
#[instrument(skip(state))]
pub async fn update_status(
    State(state): State<AppState>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let TransitionOutcome {
        application,
        previous_status,
        notification,
    } = state
        .service
        .transition_with_outcome(request.application_id(), request.status_id(), true)
        .await?;

    let view = state.service.describe_one(application).await?;
    Ok(Json(TransitionResponse::new(view, previous_status, &notification)))
}
