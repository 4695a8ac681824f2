//! Application lifecycle service
//!
//! Orchestrates intake, listing and status transitions of loan applications.
//! Every pipeline below validates sequentially and stops at the first failure,
//! so a rejected request never writes anything.
//!
//! Side effects that are not part of the system of record (the assessment
//! hand-off, status notifications, approval reports) are best-effort: their
//! failures are logged and never undo or fail the write that triggered them.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use core_kernel::{ApplicationId, LoanTypeId, PageRequest, PageResult, StatusId};

use crate::application::Application;
use crate::assessment::CapacityAssessmentProducer;
use crate::error::{LendingError, LendingResult};
use crate::mapping::{StateMapping, WellKnownStatus};
use crate::ports::{
    ApplicantPort, ApplicationPort, DeliveryConfirmation, LoanTypePort, NotificationGateway,
    ReportsGateway, StatusPort,
};

/// How the assessment hand-off runs relative to `create`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Awaited before `create` returns; failures are logged
    #[default]
    Inline,
    /// Detached onto a tokio task
    Background,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceConfig {
    pub dispatch_mode: DispatchMode,
    /// Reject a second application from the same applicant
    pub single_application_per_applicant: bool,
}

/// The ports the service depends on
#[derive(Clone)]
pub struct LifecyclePorts {
    pub applications: Arc<dyn ApplicationPort>,
    pub loan_types: Arc<dyn LoanTypePort>,
    pub statuses: Arc<dyn StatusPort>,
    pub applicants: Arc<dyn ApplicantPort>,
    pub notifications: Arc<dyn NotificationGateway>,
    pub reports: Arc<dyn ReportsGateway>,
}

/// Input of [`ApplicationLifecycleService::create`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub applicant_id: String,
    pub email: String,
    pub amount: Decimal,
    pub term: NaiveDate,
    pub loan_type_id: Option<LoanTypeId>,
}

/// What happened to the status notification of a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent(DeliveryConfirmation),
    /// The caller asked for no notification
    Skipped,
    /// The gateway failed; the transition itself was persisted
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub application: Application,
    pub previous_status: StatusId,
    pub notification: NotificationOutcome,
}

impl TransitionOutcome {
    pub fn status_changed(&self) -> bool {
        self.previous_status != self.application.status_id
    }
}

/// An application with the current names of its loan type and status
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationView {
    pub application: Application,
    /// `None` when the catalogue has no row for the id
    pub loan_type_name: Option<String>,
    pub status_name: Option<String>,
}

/// Validates, creates, lists and transitions loan applications
#[derive(Clone)]
pub struct ApplicationLifecycleService {
    ports: LifecyclePorts,
    producer: Arc<CapacityAssessmentProducer>,
    mapping: Arc<StateMapping>,
    config: ServiceConfig,
}

impl ApplicationLifecycleService {
    pub fn new(
        ports: LifecyclePorts,
        producer: Arc<CapacityAssessmentProducer>,
        mapping: StateMapping,
        config: ServiceConfig,
    ) -> Self {
        Self {
            ports,
            producer,
            mapping: Arc::new(mapping),
            config,
        }
    }

    pub fn mapping(&self) -> &StateMapping {
        &self.mapping
    }

    /// Validates and persists a new application in the pending-review status
    ///
    /// Order of checks:
    /// 1. the applicant has no application yet (only when configured)
    /// 2. a loan type id is present
    /// 3. the loan type exists
    /// 4. the amount is positive and within the loan type's bounds
    /// 5. the pending-review status is configured
    ///
    /// When the loan type is flagged for automatic review, a capacity
    /// assessment is requested afterwards; its failure does not fail `create`.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` for a duplicate applicant when uniqueness is enforced
    /// - `Validation` for a missing or unknown loan type, or an amount out of range
    /// - `Internal` when the pending-review status is missing or a port fails
    pub async fn create(&self, request: NewApplication) -> LendingResult<Application> {
        if self.config.single_application_per_applicant {
            let exists = self
                .ports
                .applications
                .exists_by_applicant_id(request.applicant_id.trim())
                .await
                .map_err(|e| LendingError::port("checking existing applications", e))?;
            if exists {
                return Err(LendingError::already_exists(format!(
                    "applicant {} already has an application",
                    request.applicant_id.trim()
                )));
            }
        }

        let loan_type_id = request
            .loan_type_id
            .ok_or_else(|| LendingError::validation_field("loan type id required", "idTipoPrestamo"))?;

        let loan_type = self
            .ports
            .loan_types
            .find_by_id(loan_type_id)
            .await
            .map_err(|e| LendingError::port("loading loan type", e))?
            .ok_or_else(|| {
                LendingError::validation_field(
                    format!("no loan type with id {loan_type_id}"),
                    "idTipoPrestamo",
                )
            })?;

        if request.amount <= Decimal::ZERO || !loan_type.accepts_amount(request.amount) {
            return Err(LendingError::validation_field(
                format!(
                    "amount must be between {} and {} for loan type {}",
                    loan_type.min_amount, loan_type.max_amount, loan_type.name
                ),
                "monto",
            ));
        }

        let pending_review = self
            .ports
            .statuses
            .id_for_pending_review()
            .await
            .map_err(|e| LendingError::port("resolving pending review status", e))?
            .ok_or_else(|| LendingError::internal("pending review status is not configured"))?;

        let application = Application::new(
            &request.applicant_id,
            &request.email,
            request.amount,
            request.term,
            loan_type_id,
            pending_review,
        )?;

        let saved = self
            .ports
            .applications
            .create(application)
            .await
            .map_err(|e| LendingError::port("saving application", e))?;
        let id = saved.require_id()?;

        info!(
            application_id = %id,
            loan_type_id = %loan_type_id,
            automatic_review = loan_type.automatic_review,
            "Application created"
        );

        if loan_type.automatic_review {
            match self.config.dispatch_mode {
                DispatchMode::Inline => self.hand_off(saved.clone()).await,
                DispatchMode::Background => {
                    let service = self.clone();
                    let application = saved.clone();
                    tokio::spawn(async move { service.hand_off(application).await });
                }
            }
        }

        Ok(saved)
    }

    /// One page of applications; bounds are checked by the caller
    pub async fn list_paged(&self, request: PageRequest) -> LendingResult<PageResult<Application>> {
        self.ports
            .applications
            .list_paged(request)
            .await
            .map_err(|e| LendingError::port("listing applications", e))
    }

    pub async fn list_by_applicant(&self, applicant_id: &str) -> LendingResult<Vec<Application>> {
        let applicant_id = applicant_id.trim();
        if applicant_id.is_empty() {
            return Err(LendingError::validation_field("applicant id is required", "idUser"));
        }
        self.ports
            .applications
            .list_by_applicant_id(applicant_id)
            .await
            .map_err(|e| LendingError::port("listing applicant applications", e))
    }

    /// Resolves loan type and status names from the catalogues
    ///
    /// Each distinct id is looked up once per call.
    pub async fn describe(
        &self,
        applications: Vec<Application>,
    ) -> LendingResult<Vec<ApplicationView>> {
        let mut loan_type_names: HashMap<LoanTypeId, Option<String>> = HashMap::new();
        let mut status_names: HashMap<StatusId, Option<String>> = HashMap::new();
        let mut views = Vec::with_capacity(applications.len());

        for application in applications {
            let loan_type_name = match loan_type_names.get(&application.loan_type_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self
                        .ports
                        .loan_types
                        .find_by_id(application.loan_type_id)
                        .await
                        .map_err(|e| LendingError::port("loading loan type", e))?
                        .map(|loan_type| loan_type.name);
                    loan_type_names.insert(application.loan_type_id, name.clone());
                    name
                }
            };

            let status_name = match status_names.get(&application.status_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self
                        .ports
                        .statuses
                        .find_by_id(application.status_id)
                        .await
                        .map_err(|e| LendingError::port("loading status", e))?
                        .map(|status| status.name);
                    status_names.insert(application.status_id, name.clone());
                    name
                }
            };

            views.push(ApplicationView {
                application,
                loan_type_name,
                status_name,
            });
        }
        Ok(views)
    }

    /// [`Self::describe`] for a single application
    pub async fn describe_one(&self, application: Application) -> LendingResult<ApplicationView> {
        self.describe(vec![application])
            .await?
            .pop()
            .ok_or_else(|| LendingError::internal("describing application produced no view"))
    }

    /// Moves an application to a new status and returns the persisted row
    ///
    /// See [`Self::transition_with_outcome`].
    pub async fn transition(
        &self,
        application_id: Option<ApplicationId>,
        status_id: Option<StatusId>,
        notify: bool,
    ) -> LendingResult<Application> {
        self.transition_with_outcome(application_id, status_id, notify)
            .await
            .map(|outcome| outcome.application)
    }

    /// Moves an application to a new status, reporting side effects
    ///
    /// With `notify` the applicant is told the new status name exactly once
    /// per successful call. When the application moves into the approved
    /// status from another one, the approval totals are republished.
    ///
    /// # Errors
    ///
    /// - `Validation` for a missing application id, missing status id or unknown status
    /// - `NotFound` when the application does not exist
    /// - `Internal` when persistence fails
    pub async fn transition_with_outcome(
        &self,
        application_id: Option<ApplicationId>,
        status_id: Option<StatusId>,
        notify: bool,
    ) -> LendingResult<TransitionOutcome> {
        let application_id = application_id.ok_or_else(|| {
            LendingError::validation_field("application id is required", "idSolicitud")
        })?;

        let exists = self
            .ports
            .applications
            .exists_by_id(application_id)
            .await
            .map_err(|e| LendingError::port("checking application", e))?;
        if !exists {
            return Err(LendingError::not_found("Application", application_id));
        }

        let status_id = status_id
            .ok_or_else(|| LendingError::validation_field("status id is required", "idEstado"))?;

        let status = self
            .ports
            .statuses
            .find_by_id(status_id)
            .await
            .map_err(|e| LendingError::port("loading status", e))?
            .ok_or_else(|| {
                LendingError::validation_field(format!("no status with id {status_id}"), "idEstado")
            })?;

        let mut application = self
            .ports
            .applications
            .find_by_id(application_id)
            .await
            .map_err(|e| LendingError::port("loading application", e))?
            .ok_or_else(|| LendingError::not_found("Application", application_id))?;

        let previous_status = application.status_id;
        application.change_status(status_id);

        let updated = self
            .ports
            .applications
            .update(&application)
            .await
            .map_err(|e| LendingError::port("updating application", e))?;

        info!(
            application_id = %application_id,
            from = %previous_status,
            to = %status_id,
            status = %status.name,
            "Application status changed"
        );

        let approved = self
            .mapping
            .status_name(WellKnownStatus::Approved)
            .is_some_and(|name| status.has_name(name));
        if previous_status != status_id && approved {
            self.publish_approved_report(status_id).await;
        }

        let notification = if notify {
            match self
                .ports
                .notifications
                .send(&updated.email, &status.name, application_id)
                .await
            {
                Ok(confirmation) => NotificationOutcome::Sent(confirmation),
                Err(e) => {
                    warn!(
                        application_id = %application_id,
                        error = %e,
                        "Status notification could not be delivered"
                    );
                    NotificationOutcome::Failed(e.to_string())
                }
            }
        } else {
            NotificationOutcome::Skipped
        };

        Ok(TransitionOutcome {
            application: updated,
            previous_status,
            notification,
        })
    }

    async fn hand_off(&self, application: Application) {
        let Some(id) = application.id else {
            return;
        };
        if let Err(e) = self.request_assessment(&application, id).await {
            error!(application_id = %id, error = %e, "Capacity assessment request failed");
        }
    }

    async fn request_assessment(
        &self,
        application: &Application,
        id: ApplicationId,
    ) -> LendingResult<()> {
        let profile = self
            .ports
            .applicants
            .find_by_id(&application.applicant_id)
            .await
            .map_err(|e| LendingError::port("loading applicant profile", e))?;

        let Some(profile) = profile else {
            warn!(
                application_id = %id,
                applicant_id = %application.applicant_id,
                "Applicant profile not found, skipping capacity assessment"
            );
            return Ok(());
        };

        let history = self
            .ports
            .applications
            .list_by_applicant_id(&application.applicant_id)
            .await
            .map_err(|e| LendingError::port("loading applicant history", e))?;

        debug!(application_id = %id, history = history.len(), "Requesting capacity assessment");
        self.producer.dispatch(&profile, application, &history, id).await?;
        Ok(())
    }

    async fn publish_approved_report(&self, approved: StatusId) {
        let totals = match self.ports.applications.totals_by_status(approved).await {
            Ok(totals) => totals,
            Err(e) => {
                error!(error = %e, "Could not compute approved application totals");
                return;
            }
        };
        if let Err(e) = self.ports.reports.send_approved_report(totals).await {
            error!(error = %e, "Approved applications report could not be published");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_mode_deserializes_lowercase() {
        let mode: DispatchMode = serde_json::from_str("\"background\"").unwrap();
        assert_eq!(mode, DispatchMode::Background);
        assert_eq!(DispatchMode::default(), DispatchMode::Inline);
    }

    #[test]
    fn test_status_changed() {
        let application = Application::new(
            "1",
            "a@b.co",
            Decimal::ONE,
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            LoanTypeId::new(1),
            StatusId::new(2),
        )
        .unwrap();
        let outcome = TransitionOutcome {
            application,
            previous_status: StatusId::new(1),
            notification: NotificationOutcome::Skipped,
        };
        assert!(outcome.status_changed());
    }
}
