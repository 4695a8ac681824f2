//! API error handling
//!
//! Status codes are assigned here and nowhere else. Internal failures are
//! logged in full and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::ErrorKind;
use domain_lending::LendingError;

const GENERIC_INTERNAL_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Error)]
pub enum ApiError {
    /// A failure raised by the lifecycle service
    #[error(transparent)]
    Lending(#[from] LendingError),

    /// Request input rejected before reaching the service
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },
}

impl ApiError {
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Lending(e) => e.kind(),
            ApiError::Validation { .. } => ErrorKind::Validation,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::AlreadyExists => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = self.status_code();

        let (message, field) = match &self {
            ApiError::Lending(e) if !kind.is_user_facing() => {
                error!(error = ?e, "Request failed");
                (GENERIC_INTERNAL_MESSAGE.to_string(), None)
            }
            ApiError::Lending(e) => (e.to_string(), e.field().map(str::to_string)),
            ApiError::Validation { message, field } => (message.clone(), field.clone()),
        };

        let body = ErrorResponse {
            error: kind.code().to_string(),
            message,
            field,
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        match fields.first() {
            Some((field, details)) => {
                let message = details
                    .first()
                    .and_then(|d| d.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("{field} is invalid"));
                ApiError::validation(message, field.to_string())
            }
            None => ApiError::Validation {
                message: errors.to_string(),
                field: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::PortError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (LendingError::validation("bad"), StatusCode::UNPROCESSABLE_ENTITY),
            (LendingError::not_found("Application", 1), StatusCode::NOT_FOUND),
            (LendingError::already_exists("dup"), StatusCode::CONFLICT),
            (LendingError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status_code(), expected);
        }
    }

    #[test]
    fn test_port_failure_is_internal() {
        let error = LendingError::port("saving", PortError::connection("refused"));
        let response = ApiError::from(error).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
