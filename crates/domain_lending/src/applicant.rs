//! Applicant profile as provided by the applicant directory
//!
//! Only read by this crate, to enrich the outbound capacity-assessment payload.

use core_kernel::ApplicantProfileId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub id: ApplicantProfileId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Identity document; matches `Application::applicant_id`
    pub document_id: String,
    pub phone: Option<String>,
    pub role: Option<String>,
    /// Declared monthly base income
    pub base_salary: Option<Decimal>,
}
