//! Symbolic name <-> persisted id lookup for statuses and loan kinds
//!
//! The status and loan-type tables are seeded with a fixed set of rows whose
//! ids the code needs to recognise (the pending-review status every new
//! application starts in, the approved status that triggers reporting).
//! `StateMapping` is a plain value passed to whoever needs it, so tests and
//! deployments with differently seeded tables can supply their own rows.

use core_kernel::{LoanTypeId, StatusId};
use serde::{Deserialize, Serialize};

/// The statuses the lifecycle code refers to by meaning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WellKnownStatus {
    PendingReview,
    Approved,
    Rejected,
    Cancelled,
}

impl WellKnownStatus {
    pub const ALL: [WellKnownStatus; 4] = [
        WellKnownStatus::PendingReview,
        WellKnownStatus::Approved,
        WellKnownStatus::Rejected,
        WellKnownStatus::Cancelled,
    ];

    /// Human description seeded alongside the status row
    pub fn description(&self) -> &'static str {
        match self {
            WellKnownStatus::PendingReview => "Pendiente de revisión",
            WellKnownStatus::Approved => "Aprobada",
            WellKnownStatus::Rejected => "Rechazada",
            WellKnownStatus::Cancelled => "Cancelada",
        }
    }
}

/// The seeded loan products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanKind {
    Personal,
    Vehicular,
    Mortgage,
    Commercial,
    Education,
}

impl LoanKind {
    pub const ALL: [LoanKind; 5] = [
        LoanKind::Personal,
        LoanKind::Vehicular,
        LoanKind::Mortgage,
        LoanKind::Commercial,
        LoanKind::Education,
    ];

    /// Wire code exposed to API clients
    pub fn code(&self) -> &'static str {
        match self {
            LoanKind::Personal => "PERSONAL",
            LoanKind::Vehicular => "VEHICULAR",
            LoanKind::Mortgage => "HIPOTECARIO",
            LoanKind::Commercial => "COMERCIAL",
            LoanKind::Education => "EDUCATIVO",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StatusRow {
    kind: WellKnownStatus,
    id: StatusId,
    name: String,
}

/// Bidirectional lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMapping {
    statuses: Vec<StatusRow>,
    loan_kinds: Vec<(LoanKind, LoanTypeId)>,
}

impl Default for StateMapping {
    /// Rows as seeded by the reference data set
    fn default() -> Self {
        Self::builder()
            .status(WellKnownStatus::PendingReview, StatusId::new(1), "PENDIENTE_REVISION")
            .status(WellKnownStatus::Approved, StatusId::new(2), "APROBADO")
            .status(WellKnownStatus::Rejected, StatusId::new(3), "RECHAZADO")
            .status(WellKnownStatus::Cancelled, StatusId::new(4), "CANCELADO")
            .loan_kind(LoanKind::Personal, LoanTypeId::new(1))
            .loan_kind(LoanKind::Vehicular, LoanTypeId::new(2))
            .loan_kind(LoanKind::Mortgage, LoanTypeId::new(3))
            .loan_kind(LoanKind::Commercial, LoanTypeId::new(4))
            .loan_kind(LoanKind::Education, LoanTypeId::new(5))
            .build()
    }
}

impl StateMapping {
    pub fn builder() -> StateMappingBuilder {
        StateMappingBuilder::default()
    }

    pub fn status_id(&self, kind: WellKnownStatus) -> Option<StatusId> {
        self.statuses.iter().find(|row| row.kind == kind).map(|row| row.id)
    }

    pub fn status_kind(&self, id: StatusId) -> Option<WellKnownStatus> {
        self.statuses.iter().find(|row| row.id == id).map(|row| row.kind)
    }

    /// Persisted name of a well-known status
    pub fn status_name(&self, kind: WellKnownStatus) -> Option<&str> {
        self.statuses
            .iter()
            .find(|row| row.kind == kind)
            .map(|row| row.name.as_str())
    }

    pub fn status_kind_by_name(&self, name: &str) -> Option<WellKnownStatus> {
        self.statuses.iter().find(|row| row.name == name).map(|row| row.kind)
    }

    pub fn is_status(&self, id: StatusId, kind: WellKnownStatus) -> bool {
        self.status_kind(id) == Some(kind)
    }

    pub fn loan_type_id(&self, kind: LoanKind) -> Option<LoanTypeId> {
        self.loan_kinds.iter().find(|(k, _)| *k == kind).map(|(_, id)| *id)
    }

    pub fn loan_kind(&self, id: LoanTypeId) -> Option<LoanKind> {
        self.loan_kinds.iter().find(|(_, i)| *i == id).map(|(k, _)| *k)
    }
}

/// Builder for a custom [`StateMapping`]; later rows replace earlier ones
#[derive(Debug, Default)]
pub struct StateMappingBuilder {
    statuses: Vec<StatusRow>,
    loan_kinds: Vec<(LoanKind, LoanTypeId)>,
}

impl StateMappingBuilder {
    pub fn status(mut self, kind: WellKnownStatus, id: StatusId, name: impl Into<String>) -> Self {
        self.statuses.retain(|row| row.kind != kind && row.id != id);
        self.statuses.push(StatusRow {
            kind,
            id,
            name: name.into(),
        });
        self
    }

    pub fn loan_kind(mut self, kind: LoanKind, id: LoanTypeId) -> Self {
        self.loan_kinds.retain(|(k, i)| *k != kind && *i != id);
        self.loan_kinds.push((kind, id));
        self
    }

    pub fn build(self) -> StateMapping {
        StateMapping {
            statuses: self.statuses,
            loan_kinds: self.loan_kinds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_statuses_round_trip() {
        let mapping = StateMapping::default();
        for kind in WellKnownStatus::ALL {
            let id = mapping.status_id(kind).unwrap();
            assert_eq!(mapping.status_kind(id), Some(kind));
        }
        assert_eq!(mapping.status_id(WellKnownStatus::PendingReview), Some(StatusId::new(1)));
        assert_eq!(mapping.status_name(WellKnownStatus::Approved), Some("APROBADO"));
    }

    #[test]
    fn test_default_loan_kinds_round_trip() {
        let mapping = StateMapping::default();
        for kind in LoanKind::ALL {
            let id = mapping.loan_type_id(kind).unwrap();
            assert_eq!(mapping.loan_kind(id), Some(kind));
        }
        assert_eq!(mapping.loan_kind(LoanTypeId::new(99)), None);
    }

    #[test]
    fn test_lookup_by_name() {
        let mapping = StateMapping::default();
        assert_eq!(mapping.status_kind_by_name("RECHAZADO"), Some(WellKnownStatus::Rejected));
        assert_eq!(mapping.status_kind_by_name("rechazado"), None);
    }

    #[test]
    fn test_builder_overrides_rows() {
        let mapping = StateMapping::builder()
            .status(WellKnownStatus::Approved, StatusId::new(2), "APROBADO")
            .status(WellKnownStatus::Approved, StatusId::new(20), "APPROVED")
            .build();
        assert_eq!(mapping.status_id(WellKnownStatus::Approved), Some(StatusId::new(20)));
        assert_eq!(mapping.status_kind(StatusId::new(2)), None);
        assert!(mapping.is_status(StatusId::new(20), WellKnownStatus::Approved));
        assert_eq!(mapping.status_id(WellKnownStatus::Rejected), None);
    }
}
