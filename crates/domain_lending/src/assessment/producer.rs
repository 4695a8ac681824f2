//! Outbound capacity-assessment request
//!
//! The producer assembles the applicant's profile and their whole application
//! history into one message and publishes it to the assessment queue. Each
//! history entry is resolved to its loan type and status names and priced with
//! the [`FinancialCalculator`]; if any entry cannot be resolved the whole
//! request fails and nothing is sent.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use core_kernel::{ApplicantProfileId, ApplicationId};

use crate::applicant::ApplicantProfile;
use crate::application::Application;
use crate::calculator::FinancialCalculator;
use crate::error::{LendingError, LendingResult};
use crate::ports::{DeliveryConfirmation, LoanTypePort, MessageSender, StatusPort};

/// Applicant block of the request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantData {
    #[serde(rename = "idUsuario")]
    pub profile_id: ApplicantProfileId,
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
    pub email: String,
    #[serde(rename = "documentoIdentidad")]
    pub document_id: String,
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    #[serde(rename = "rol")]
    pub role: Option<String>,
    #[serde(rename = "salarioBase", default, with = "rust_decimal::serde::float_option")]
    pub base_salary: Option<Decimal>,
}

impl From<&ApplicantProfile> for ApplicantData {
    fn from(profile: &ApplicantProfile) -> Self {
        Self {
            profile_id: profile.id,
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            email: profile.email.clone(),
            document_id: profile.document_id.clone(),
            phone: profile.phone.clone(),
            role: profile.role.clone(),
            base_salary: profile.base_salary,
        }
    }
}

/// One priced entry of the applicant's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationData {
    pub id: ApplicationId,
    #[serde(rename = "idUser")]
    pub applicant_id: String,
    pub email: String,
    #[serde(rename = "monto", with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "plazo")]
    pub term: NaiveDate,
    #[serde(rename = "tipoPrestamo")]
    pub loan_type: String,
    #[serde(rename = "estado")]
    pub status: String,
    #[serde(rename = "tasaInteres", with = "rust_decimal::serde::float")]
    pub interest_rate: Decimal,
    #[serde(rename = "deudaTotalMensual", with = "rust_decimal::serde::float")]
    pub monthly_installment: Decimal,
}

/// The message published to the assessment queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    #[serde(rename = "datosUsuario")]
    pub applicant: ApplicantData,
    #[serde(rename = "datosSolicitudes")]
    pub applications: Vec<ApplicationData>,
    #[serde(rename = "idSolicitud")]
    pub application_id: ApplicationId,
}

/// Builds and publishes capacity-assessment requests
pub struct CapacityAssessmentProducer {
    sender: Arc<dyn MessageSender>,
    loan_types: Arc<dyn LoanTypePort>,
    statuses: Arc<dyn StatusPort>,
    calculator: FinancialCalculator,
    queue: String,
}

impl CapacityAssessmentProducer {
    pub fn new(
        sender: Arc<dyn MessageSender>,
        loan_types: Arc<dyn LoanTypePort>,
        statuses: Arc<dyn StatusPort>,
        queue: impl Into<String>,
    ) -> Self {
        Self {
            sender,
            loan_types,
            statuses,
            calculator: FinancialCalculator::new(),
            queue: queue.into(),
        }
    }

    pub fn with_calculator(mut self, calculator: FinancialCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Assembles the request without sending it
    ///
    /// Exactly the entries of `history` are priced; callers load it after the
    /// application under assessment is stored.
    ///
    /// # Errors
    ///
    /// Returns an error when any entry's loan type or status cannot be
    /// resolved, or when its installment cannot be computed.
    pub async fn build_request(
        &self,
        profile: &ApplicantProfile,
        history: &[Application],
        current_id: ApplicationId,
    ) -> LendingResult<AssessmentRequest> {
        let mut applications = Vec::with_capacity(history.len());
        for application in history {
            applications.push(self.price(application).await?);
        }

        Ok(AssessmentRequest {
            applicant: ApplicantData::from(profile),
            applications,
            application_id: current_id,
        })
    }

    /// Builds the request and publishes it to the assessment queue
    pub async fn dispatch(
        &self,
        profile: &ApplicantProfile,
        current: &Application,
        history: &[Application],
        current_id: ApplicationId,
    ) -> LendingResult<DeliveryConfirmation> {
        let request = self.build_request(profile, history, current_id).await?;
        let payload = serde_json::to_string(&request).map_err(|e| {
            LendingError::internal(format!("failed to serialize assessment request: {e}"))
        })?;

        debug!(
            application_id = %current_id,
            amount = %current.amount,
            loan_type_id = %current.loan_type_id,
            payload = %payload,
            "Assessment request built"
        );

        let confirmation = self
            .sender
            .send(&payload, &self.queue)
            .await
            .map_err(|e| LendingError::port("publishing assessment request", e))?;

        info!(
            application_id = %current_id,
            entries = request.applications.len(),
            message_id = %confirmation.message_id,
            "Assessment request published"
        );
        Ok(confirmation)
    }

    async fn price(&self, application: &Application) -> LendingResult<ApplicationData> {
        let id = application.require_id()?;

        let loan_type = self
            .loan_types
            .find_by_id(application.loan_type_id)
            .await
            .map_err(|e| LendingError::port("loading loan type for assessment", e))?
            .ok_or_else(|| LendingError::not_found("LoanType", application.loan_type_id))?;

        let status = self
            .statuses
            .find_by_id(application.status_id)
            .await
            .map_err(|e| LendingError::port("loading status for assessment", e))?
            .ok_or_else(|| LendingError::not_found("Status", application.status_id))?;

        let installment =
            application.monthly_installment(&self.calculator, loan_type.annual_interest_rate)?;

        Ok(ApplicationData {
            id,
            applicant_id: application.applicant_id.clone(),
            email: application.email.clone(),
            amount: application.amount,
            term: application.term,
            loan_type: loan_type.name,
            status: status.name,
            interest_rate: loan_type.annual_interest_rate,
            monthly_installment: installment,
        })
    }
}
