//! HTTP API Layer
//!
//! REST boundary of the credit origination system, built on Axum.
//!
//! # Routes
//!
//! | method | path                                   | operation                     |
//! |--------|----------------------------------------|-------------------------------|
//! | POST   | `/api/v1/solicitudes`                  | create an application         |
//! | GET    | `/api/v1/solicitudes?pagina&tamanio`   | list applications, paged      |
//! | GET    | `/api/v1/solicitudes/usuario/{idUser}` | list one applicant's requests |
//! | PUT    | `/api/v1/solicitudes`                  | change status and notify      |
//! | GET    | `/health`, `/health/ready`             | liveness and readiness        |
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState { service, readiness });
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::HealthCheckable;
use domain_lending::ApplicationLifecycleService;

use crate::handlers::{applications, health};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: ApplicationLifecycleService,
    /// Checked by `/health/ready`
    pub readiness: Arc<dyn HealthCheckable>,
}

/// Creates the API router with tracing and CORS layers
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let application_routes = Router::new()
        .route(
            "/",
            post(applications::create_application)
                .get(applications::list_applications)
                .put(applications::update_status),
        )
        .route("/usuario/:id_user", get(applications::list_by_applicant));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1/solicitudes", application_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
