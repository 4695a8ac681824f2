//! Business error kinds shared across the system
//!
//! Domain errors classify themselves into one of these kinds. Only the
//! boundary layer turns a kind into a transport-specific status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed classification of business failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller-fixable input problem
    Validation,
    /// A referenced entity is absent
    NotFound,
    /// The request would duplicate an existing entity
    AlreadyExists,
    /// Missing bootstrap data or an unexpected infrastructure failure
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::Internal => "internal_error",
        }
    }

    /// Whether the message may be shown to the end user verbatim
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, ErrorKind::Internal)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let kinds = [
            ErrorKind::Validation,
            ErrorKind::NotFound,
            ErrorKind::AlreadyExists,
            ErrorKind::Internal,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_internal_is_hidden() {
        assert!(!ErrorKind::Internal.is_user_facing());
        assert!(ErrorKind::Validation.is_user_facing());
    }
}
