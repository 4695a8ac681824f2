//! Shared wiring for the lending integration tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use core_kernel::{ApplicantProfileId, LoanTypeId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_lending::mock::{
    MockApplicantPort, MockApplicationPort, MockLoanTypePort, MockStatusPort,
    RecordingMessageSender, RecordingNotificationGateway, RecordingReportsGateway,
};
use domain_lending::{
    ApplicantProfile, ApplicationLifecycleService, CapacityAssessmentConsumer,
    CapacityAssessmentProducer, FinancialCalculator, LifecyclePorts, LoanTypeConfig,
    NewApplication, ServiceConfig, StateMapping,
};

pub const ASSESSMENT_QUEUE: &str = "evaluacion-capacidad";
pub const APPLICANT: &str = "1020304050";

pub const PERSONAL: LoanTypeId = LoanTypeId::new(1);
pub const VEHICULAR: LoanTypeId = LoanTypeId::new(2);

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

pub fn term() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

/// PERSONAL: 1,000..=5,000 at 12%, automatic review.
/// VEHICULAR: 5,000..=50,000 at 10%, manual review.
pub fn loan_types() -> Vec<LoanTypeConfig> {
    vec![
        LoanTypeConfig::new(PERSONAL, "PERSONAL", dec!(1000), dec!(5000), dec!(12), true).unwrap(),
        LoanTypeConfig::new(VEHICULAR, "VEHICULAR", dec!(5000), dec!(50000), dec!(10), false)
            .unwrap(),
    ]
}

pub fn profile() -> ApplicantProfile {
    ApplicantProfile {
        id: ApplicantProfileId::new(77),
        first_name: "Ana".to_string(),
        last_name: "Gómez".to_string(),
        email: "ana@example.com".to_string(),
        document_id: APPLICANT.to_string(),
        phone: Some("3001234567".to_string()),
        role: Some("CLIENTE".to_string()),
        base_salary: Some(dec!(3500000)),
    }
}

pub fn request(loan_type: Option<LoanTypeId>, amount: Decimal) -> NewApplication {
    NewApplication {
        applicant_id: APPLICANT.to_string(),
        email: "ana@example.com".to_string(),
        amount,
        term: term(),
        loan_type_id: loan_type,
    }
}

pub struct Harness {
    pub applications: Arc<MockApplicationPort>,
    pub statuses: Arc<MockStatusPort>,
    pub applicants: Arc<MockApplicantPort>,
    pub notifications: Arc<RecordingNotificationGateway>,
    pub reports: Arc<RecordingReportsGateway>,
    pub sender: Arc<RecordingMessageSender>,
    pub service: ApplicationLifecycleService,
}

impl Harness {
    pub fn new() -> Self {
        HarnessBuilder::default().build()
    }

    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::default()
    }

    pub fn consumer(&self) -> CapacityAssessmentConsumer {
        CapacityAssessmentConsumer::new(self.service.clone(), self.statuses.clone())
    }
}

#[derive(Default)]
pub struct HarnessBuilder {
    config: ServiceConfig,
    statuses: Option<MockStatusPort>,
    applicants: Option<MockApplicantPort>,
    notifications: Option<RecordingNotificationGateway>,
    sender: Option<RecordingMessageSender>,
}

impl HarnessBuilder {
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn statuses(mut self, statuses: MockStatusPort) -> Self {
        self.statuses = Some(statuses);
        self
    }

    pub fn applicants(mut self, applicants: MockApplicantPort) -> Self {
        self.applicants = Some(applicants);
        self
    }

    pub fn notifications(mut self, notifications: RecordingNotificationGateway) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn sender(mut self, sender: RecordingMessageSender) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn build(self) -> Harness {
        let mapping = StateMapping::default();
        let applications = Arc::new(MockApplicationPort::new());
        let loan_types = Arc::new(MockLoanTypePort::new(loan_types()));
        let statuses = Arc::new(
            self.statuses
                .unwrap_or_else(|| MockStatusPort::from_mapping(&mapping)),
        );
        let applicants = Arc::new(
            self.applicants
                .unwrap_or_else(|| MockApplicantPort::new(vec![profile()])),
        );
        let notifications = Arc::new(self.notifications.unwrap_or_default());
        let reports = Arc::new(RecordingReportsGateway::new());
        let sender = Arc::new(self.sender.unwrap_or_default());

        let producer = CapacityAssessmentProducer::new(
            sender.clone(),
            loan_types.clone(),
            statuses.clone(),
            ASSESSMENT_QUEUE,
        )
        .with_calculator(FinancialCalculator::fixed(today()));

        let ports = LifecyclePorts {
            applications: applications.clone(),
            loan_types,
            statuses: statuses.clone(),
            applicants: applicants.clone(),
            notifications: notifications.clone(),
            reports: reports.clone(),
        };

        let service =
            ApplicationLifecycleService::new(ports, Arc::new(producer), mapping, self.config);

        Harness {
            applications,
            statuses,
            applicants,
            notifications,
            reports,
            sender,
            service,
        }
    }
}
