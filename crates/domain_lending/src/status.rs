//! Application status records
//!
//! Statuses are open data owned by the status store: new ones may be added
//! without a code change, and the assessment consumer resolves them by name.
//! The handful the code needs to recognise are listed in
//! [`StateMapping`](crate::mapping::StateMapping).

use core_kernel::StatusId;
use serde::{Deserialize, Serialize};

use crate::error::{LendingError, LendingResult};

/// A persisted application status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: StatusId,
    pub name: String,
    pub description: Option<String>,
}

impl Status {
    pub fn new(
        id: StatusId,
        name: impl Into<String>,
        description: Option<String>,
    ) -> LendingResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LendingError::validation_field("status name is required", "nombre"));
        }
        Ok(Self {
            id,
            name,
            description,
        })
    }

    /// Exact, case-sensitive name comparison used when resolving verdicts
    pub fn has_name(&self, name: &str) -> bool {
        self.name == name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_rejected() {
        assert!(Status::new(StatusId::new(1), "  ", None).is_err());
    }

    #[test]
    fn test_name_match_is_exact() {
        let status = Status::new(StatusId::new(2), "APROBADO", None).unwrap();
        assert!(status.has_name("APROBADO"));
        assert!(!status.has_name("aprobado"));
    }
}
