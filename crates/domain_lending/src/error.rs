//! Lending domain errors
//!
//! Every failure the lifecycle service can surface is one of the variants
//! below. Each variant maps onto exactly one [`ErrorKind`]; transport codes are
//! assigned later by the boundary layer.

use core_kernel::{ErrorKind, PortError};
use thiserror::Error;

/// Errors that can occur in the lending domain
#[derive(Debug, Error)]
pub enum LendingError {
    /// Missing or invalid caller input
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// A referenced entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The applicant already has an application
    #[error("{0}")]
    AlreadyExists(String),

    /// Missing bootstrap data or an unexpected infrastructure failure
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Option<PortError>,
    },
}

impl LendingError {
    pub fn validation(message: impl Into<String>) -> Self {
        LendingError::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        LendingError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        LendingError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        LendingError::AlreadyExists(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        LendingError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps a port failure with the operation that triggered it
    pub fn port(context: impl Into<String>, source: PortError) -> Self {
        match source {
            PortError::NotFound { entity_type, id } => LendingError::NotFound {
                entity: entity_type,
                id,
            },
            PortError::Validation { message, field } => LendingError::Validation { message, field },
            PortError::Conflict { message } => LendingError::AlreadyExists(message),
            other => LendingError::Internal {
                message: context.into(),
                source: Some(other),
            },
        }
    }

    /// The classification used by the boundary layer
    pub fn kind(&self) -> ErrorKind {
        match self {
            LendingError::Validation { .. } => ErrorKind::Validation,
            LendingError::NotFound { .. } => ErrorKind::NotFound,
            LendingError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            LendingError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// The offending field, when the failure is tied to one
    pub fn field(&self) -> Option<&str> {
        match self {
            LendingError::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }

    /// True when a retry of the same input may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LendingError::Internal { source: Some(source), .. } if source.is_transient()
        )
    }
}

impl From<PortError> for LendingError {
    fn from(error: PortError) -> Self {
        LendingError::port("repository operation failed", error)
    }
}

pub type LendingResult<T> = Result<T, LendingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(LendingError::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(LendingError::not_found("Application", 1).kind(), ErrorKind::NotFound);
        assert_eq!(LendingError::already_exists("dup").kind(), ErrorKind::AlreadyExists);
        assert_eq!(LendingError::internal("boom").kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_port_error_mapping_keeps_meaning() {
        let err: LendingError = PortError::not_found("Status", 9).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Status not found: 9");

        let err = LendingError::port("saving application", PortError::connection("refused"));
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "saving application");
    }

    #[test]
    fn test_field_is_reported() {
        let err = LendingError::validation_field("loan type id required", "idTipoPrestamo");
        assert_eq!(err.field(), Some("idTipoPrestamo"));
    }
}
