//! Lending Domain Ports
//!
//! The lifecycle service, the assessment producer and the assessment consumer
//! reach the outside world only through the traits in this module. Concrete
//! adapters live elsewhere:
//!
//! - **PostgreSQL** (infra_db): applications, loan types, statuses, and the
//!   message queue
//! - **Applicant directory** (infra_http): applicant profiles over REST
//! - **Queue-backed gateways** ([`crate::adapters`]): notifications and reports
//!   serialized onto a [`MessageSender`]
//! - **In-memory** ([`crate::mock`], feature `mock`): for tests
//!
//! All methods are async and return `Result<T, PortError>`. Lookups that may
//! legitimately miss return `Ok(None)` rather than a `NotFound` error so the
//! caller decides how absence is classified.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use core_kernel::{
    ApplicationId, DomainPort, LoanTypeId, PageRequest, PageResult, PortError, StatusId,
};

use crate::applicant::ApplicantProfile;
use crate::application::Application;
use crate::loan_type::LoanTypeConfig;
use crate::status::Status;

/// Aggregate of the applications currently in one status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusTotals {
    pub count: u64,
    pub total_amount: Decimal,
}

/// Acknowledgement returned by outbound message ports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfirmation {
    pub message_id: String,
}

impl DeliveryConfirmation {
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
        }
    }
}

/// Persistence of loan applications
#[async_trait]
pub trait ApplicationPort: DomainPort {
    /// Inserts a new application and returns it with its assigned id
    async fn create(&self, application: Application) -> Result<Application, PortError>;

    async fn exists_by_id(&self, id: ApplicationId) -> Result<bool, PortError>;

    async fn exists_by_applicant_id(&self, applicant_id: &str) -> Result<bool, PortError>;

    async fn find_by_id(&self, id: ApplicationId) -> Result<Option<Application>, PortError>;

    /// Writes the status and update timestamp of an existing application
    async fn update(&self, application: &Application) -> Result<Application, PortError>;

    async fn list_paged(&self, request: PageRequest) -> Result<PageResult<Application>, PortError>;

    async fn list_by_applicant_id(&self, applicant_id: &str) -> Result<Vec<Application>, PortError>;

    /// Count and summed amount of the applications in `status_id`
    async fn totals_by_status(&self, status_id: StatusId) -> Result<StatusTotals, PortError>;
}

/// Read access to loan type configuration
#[async_trait]
pub trait LoanTypePort: DomainPort {
    async fn find_by_id(&self, id: LoanTypeId) -> Result<Option<LoanTypeConfig>, PortError>;

    async fn exists_by_id(&self, id: LoanTypeId) -> Result<bool, PortError>;
}

/// Read access to the status catalogue
#[async_trait]
pub trait StatusPort: DomainPort {
    async fn find_by_id(&self, id: StatusId) -> Result<Option<Status>, PortError>;

    /// Exact name match
    async fn find_by_name(&self, name: &str) -> Result<Option<Status>, PortError>;

    /// The id of the status every new application starts in
    async fn id_for_pending_review(&self) -> Result<Option<StatusId>, PortError>;
}

/// Applicant profiles, keyed by identity document
#[async_trait]
pub trait ApplicantPort: DomainPort {
    async fn find_by_id(&self, applicant_id: &str) -> Result<Option<ApplicantProfile>, PortError>;
}

/// Tells an applicant their application changed status
#[async_trait]
pub trait NotificationGateway: DomainPort {
    async fn send(
        &self,
        email: &str,
        status_name: &str,
        application_id: ApplicationId,
    ) -> Result<DeliveryConfirmation, PortError>;
}

/// Publishes the running totals of approved applications
#[async_trait]
pub trait ReportsGateway: DomainPort {
    async fn send_approved_report(
        &self,
        totals: StatusTotals,
    ) -> Result<DeliveryConfirmation, PortError>;
}

/// Fire-and-return publication of a payload onto a named queue
#[async_trait]
pub trait MessageSender: DomainPort {
    async fn send(&self, payload: &str, queue: &str) -> Result<DeliveryConfirmation, PortError>;
}

/// A message handed out by a [`QueueReceiver`]
///
/// The message stays on the queue, hidden from other receivers, until it is
/// deleted with its receipt handle or its visibility timeout elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: String,
    /// How many times this message has been handed out, this delivery included
    pub receive_count: u32,
}

/// Parameters of a single receive call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveOptions {
    pub queue: String,
    pub max_messages: u32,
    /// Long-poll budget when the queue is empty
    pub wait_time: Duration,
    pub visibility_timeout: Duration,
}

/// Pull side of an at-least-once queue with manual acknowledgement
#[async_trait]
pub trait QueueReceiver: DomainPort {
    async fn receive(&self, options: &ReceiveOptions) -> Result<Vec<QueueMessage>, PortError>;

    /// Acknowledges a message so it is never redelivered
    async fn delete(&self, queue: &str, receipt_handle: &str) -> Result<(), PortError>;
}
