//! In-memory port implementations for testing
//!
//! These adapters keep their state behind `tokio::sync` locks and record the
//! calls made against them, so tests can assert both on results and on which
//! side effects happened.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, RwLock};

use core_kernel::{
    ApplicationId, DomainPort, LoanTypeId, PageRequest, PageResult, PortError, StatusId,
};

use crate::applicant::ApplicantProfile;
use crate::application::Application;
use crate::loan_type::LoanTypeConfig;
use crate::mapping::{StateMapping, WellKnownStatus};
use crate::ports::{
    ApplicantPort, ApplicationPort, DeliveryConfirmation, LoanTypePort, MessageSender,
    NotificationGateway, QueueMessage, QueueReceiver, ReceiveOptions, ReportsGateway,
    StatusPort, StatusTotals,
};
use crate::status::Status;

// ============================================================================
// Applications
// ============================================================================

/// In-memory application store with call counters
#[derive(Debug, Default)]
pub struct MockApplicationPort {
    rows: RwLock<BTreeMap<ApplicationId, Application>>,
    next_id: AtomicI64,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MockApplicationPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the store; applications without an id get one assigned
    pub async fn with_applications(applications: Vec<Application>) -> Self {
        let port = Self::new();
        for application in applications {
            let id = match application.id {
                Some(id) => {
                    port.next_id.fetch_max(id.value(), Ordering::SeqCst);
                    id
                }
                None => port.allocate_id(),
            };
            port.rows.write().await.insert(id, application.with_id(id));
        }
        port
    }

    /// Makes every subsequent create/update fail with a connection error
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub async fn get(&self, id: ApplicationId) -> Option<Application> {
        self.rows.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    fn allocate_id(&self) -> ApplicationId {
        ApplicationId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn check_writable(&self) -> Result<(), PortError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PortError::connection("mock store unavailable"));
        }
        Ok(())
    }
}

impl DomainPort for MockApplicationPort {}

#[async_trait]
impl ApplicationPort for MockApplicationPort {
    async fn create(&self, application: Application) -> Result<Application, PortError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        let id = self.allocate_id();
        let saved = application.with_id(id);
        self.rows.write().await.insert(id, saved.clone());
        Ok(saved)
    }

    async fn exists_by_id(&self, id: ApplicationId) -> Result<bool, PortError> {
        Ok(self.rows.read().await.contains_key(&id))
    }

    async fn exists_by_applicant_id(&self, applicant_id: &str) -> Result<bool, PortError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .any(|a| a.applicant_id == applicant_id))
    }

    async fn find_by_id(&self, id: ApplicationId) -> Result<Option<Application>, PortError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn update(&self, application: &Application) -> Result<Application, PortError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        let id = application
            .id
            .ok_or_else(|| PortError::validation("application has no id"))?;
        let mut rows = self.rows.write().await;
        let row = rows
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("Application", id))?;
        row.status_id = application.status_id;
        row.updated_at = application.updated_at;
        Ok(row.clone())
    }

    async fn list_paged(&self, request: PageRequest) -> Result<PageResult<Application>, PortError> {
        let rows = self.rows.read().await;
        let content = rows
            .values()
            .skip(request.offset() as usize)
            .take(request.size as usize)
            .cloned()
            .collect();
        Ok(PageResult::new(content, request.page, request.size, rows.len() as u64))
    }

    async fn list_by_applicant_id(&self, applicant_id: &str) -> Result<Vec<Application>, PortError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|a| a.applicant_id == applicant_id)
            .cloned()
            .collect())
    }

    async fn totals_by_status(&self, status_id: StatusId) -> Result<StatusTotals, PortError> {
        let rows = self.rows.read().await;
        let matching = rows.values().filter(|a| a.status_id == status_id);
        let (count, total_amount) = matching.fold((0u64, Decimal::ZERO), |(c, t), a| (c + 1, t + a.amount));
        Ok(StatusTotals { count, total_amount })
    }
}

// ============================================================================
// Loan types and statuses
// ============================================================================

#[derive(Debug, Default)]
pub struct MockLoanTypePort {
    loan_types: RwLock<Vec<LoanTypeConfig>>,
}

impl MockLoanTypePort {
    pub fn new(loan_types: Vec<LoanTypeConfig>) -> Self {
        Self {
            loan_types: RwLock::new(loan_types),
        }
    }
}

impl DomainPort for MockLoanTypePort {}

#[async_trait]
impl LoanTypePort for MockLoanTypePort {
    async fn find_by_id(&self, id: LoanTypeId) -> Result<Option<LoanTypeConfig>, PortError> {
        Ok(self.loan_types.read().await.iter().find(|t| t.id == id).cloned())
    }

    async fn exists_by_id(&self, id: LoanTypeId) -> Result<bool, PortError> {
        Ok(self.loan_types.read().await.iter().any(|t| t.id == id))
    }
}

#[derive(Debug)]
pub struct MockStatusPort {
    statuses: RwLock<Vec<Status>>,
    pending_review: Option<StatusId>,
}

impl MockStatusPort {
    /// Seeds one status row per well-known status in `mapping`
    pub fn from_mapping(mapping: &StateMapping) -> Self {
        let statuses = WellKnownStatus::ALL
            .iter()
            .filter_map(|kind| {
                let id = mapping.status_id(*kind)?;
                let name = mapping.status_name(*kind)?;
                Some(Status {
                    id,
                    name: name.to_string(),
                    description: Some(kind.description().to_string()),
                })
            })
            .collect();

        Self {
            statuses: RwLock::new(statuses),
            pending_review: mapping.status_id(WellKnownStatus::PendingReview),
        }
    }

    /// A catalogue without the pending-review bootstrap row
    pub fn without_pending_review(statuses: Vec<Status>) -> Self {
        Self {
            statuses: RwLock::new(statuses),
            pending_review: None,
        }
    }

    pub async fn add(&self, status: Status) {
        self.statuses.write().await.push(status);
    }
}

impl DomainPort for MockStatusPort {}

#[async_trait]
impl StatusPort for MockStatusPort {
    async fn find_by_id(&self, id: StatusId) -> Result<Option<Status>, PortError> {
        Ok(self.statuses.read().await.iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Status>, PortError> {
        Ok(self.statuses.read().await.iter().find(|s| s.has_name(name)).cloned())
    }

    async fn id_for_pending_review(&self) -> Result<Option<StatusId>, PortError> {
        Ok(self.pending_review)
    }
}

// ============================================================================
// Applicants
// ============================================================================

#[derive(Debug, Default)]
pub struct MockApplicantPort {
    profiles: RwLock<Vec<ApplicantProfile>>,
    lookups: AtomicUsize,
}

impl MockApplicantPort {
    pub fn new(profiles: Vec<ApplicantProfile>) -> Self {
        Self {
            profiles: RwLock::new(profiles),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl DomainPort for MockApplicantPort {}

#[async_trait]
impl ApplicantPort for MockApplicantPort {
    async fn find_by_id(&self, applicant_id: &str) -> Result<Option<ApplicantProfile>, PortError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .profiles
            .read()
            .await
            .iter()
            .find(|p| p.document_id == applicant_id)
            .cloned())
    }
}

// ============================================================================
// Outbound gateways
// ============================================================================

/// A notification captured by [`RecordingNotificationGateway`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub email: String,
    pub status_name: String,
    pub application_id: ApplicationId,
}

#[derive(Debug, Default)]
pub struct RecordingNotificationGateway {
    sent: Mutex<Vec<SentNotification>>,
    fail: AtomicBool,
}

impl RecordingNotificationGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let gateway = Self::default();
        gateway.fail.store(true, Ordering::SeqCst);
        gateway
    }

    pub async fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().await.clone()
    }
}

impl DomainPort for RecordingNotificationGateway {}

#[async_trait]
impl NotificationGateway for RecordingNotificationGateway {
    async fn send(
        &self,
        email: &str,
        status_name: &str,
        application_id: ApplicationId,
    ) -> Result<DeliveryConfirmation, PortError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::ServiceUnavailable {
                service: "notifications".to_string(),
            });
        }
        let mut sent = self.sent.lock().await;
        sent.push(SentNotification {
            email: email.to_string(),
            status_name: status_name.to_string(),
            application_id,
        });
        Ok(DeliveryConfirmation::new(format!("notification-{}", sent.len())))
    }
}

#[derive(Debug, Default)]
pub struct RecordingReportsGateway {
    reports: Mutex<Vec<StatusTotals>>,
}

impl RecordingReportsGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn reports(&self) -> Vec<StatusTotals> {
        self.reports.lock().await.clone()
    }
}

impl DomainPort for RecordingReportsGateway {}

#[async_trait]
impl ReportsGateway for RecordingReportsGateway {
    async fn send_approved_report(
        &self,
        totals: StatusTotals,
    ) -> Result<DeliveryConfirmation, PortError> {
        let mut reports = self.reports.lock().await;
        reports.push(totals);
        Ok(DeliveryConfirmation::new(format!("report-{}", reports.len())))
    }
}

/// A payload captured by [`RecordingMessageSender`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub queue: String,
    pub payload: String,
}

#[derive(Debug, Default)]
pub struct RecordingMessageSender {
    sent: Mutex<Vec<SentMessage>>,
    fail: AtomicBool,
}

impl RecordingMessageSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let sender = Self::default();
        sender.fail.store(true, Ordering::SeqCst);
        sender
    }

    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }
}

impl DomainPort for RecordingMessageSender {}

#[async_trait]
impl MessageSender for RecordingMessageSender {
    async fn send(&self, payload: &str, queue: &str) -> Result<DeliveryConfirmation, PortError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::connection("queue unreachable"));
        }
        let mut sent = self.sent.lock().await;
        sent.push(SentMessage {
            queue: queue.to_string(),
            payload: payload.to_string(),
        });
        Ok(DeliveryConfirmation::new(format!("message-{}", sent.len())))
    }
}

// ============================================================================
// Queue
// ============================================================================

#[derive(Debug, Clone)]
struct QueuedEntry {
    message_id: String,
    queue: String,
    body: String,
    receive_count: u32,
    receipt_handle: Option<String>,
    invisible_until: Option<Instant>,
}

/// In-memory queue with visibility timeouts and receipt-handle deletes
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    entries: Mutex<Vec<QueuedEntry>>,
    sequence: AtomicUsize,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, queue: &str, body: &str) -> String {
        let message_id = format!("msg-{}", self.sequence.fetch_add(1, Ordering::SeqCst) + 1);
        self.entries.lock().await.push(QueuedEntry {
            message_id: message_id.clone(),
            queue: queue.to_string(),
            body: body.to_string(),
            receive_count: 0,
            receipt_handle: None,
            invisible_until: None,
        });
        message_id
    }

    /// Messages still on `queue`, visible or in flight
    pub async fn depth(&self, queue: &str) -> usize {
        self.entries
            .lock()
            .await
            .iter()
            .filter(|e| e.queue == queue)
            .count()
    }

    pub async fn receive_count(&self, message_id: &str) -> Option<u32> {
        self.entries
            .lock()
            .await
            .iter()
            .find(|e| e.message_id == message_id)
            .map(|e| e.receive_count)
    }
}

impl DomainPort for InMemoryQueue {}

#[async_trait]
impl MessageSender for InMemoryQueue {
    async fn send(&self, payload: &str, queue: &str) -> Result<DeliveryConfirmation, PortError> {
        Ok(DeliveryConfirmation::new(self.push(queue, payload).await))
    }
}

#[async_trait]
impl QueueReceiver for InMemoryQueue {
    async fn receive(&self, options: &ReceiveOptions) -> Result<Vec<QueueMessage>, PortError> {
        let claimed = {
            let now = Instant::now();
            let mut entries = self.entries.lock().await;
            let mut claimed = Vec::new();
            for entry in entries.iter_mut() {
                if claimed.len() >= options.max_messages as usize {
                    break;
                }
                let visible = entry.invisible_until.map_or(true, |until| until <= now);
                if entry.queue != options.queue || !visible {
                    continue;
                }
                entry.receive_count += 1;
                let receipt = format!("{}#{}", entry.message_id, entry.receive_count);
                entry.receipt_handle = Some(receipt.clone());
                entry.invisible_until = Some(now + options.visibility_timeout);
                claimed.push(QueueMessage {
                    message_id: entry.message_id.clone(),
                    receipt_handle: receipt,
                    body: entry.body.clone(),
                    receive_count: entry.receive_count,
                });
            }
            claimed
        };

        if claimed.is_empty() {
            tokio::time::sleep(options.wait_time.min(Duration::from_millis(20))).await;
        }
        Ok(claimed)
    }

    async fn delete(&self, queue: &str, receipt_handle: &str) -> Result<(), PortError> {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|e| {
            !(e.queue == queue && e.receipt_handle.as_deref() == Some(receipt_handle))
        });
        if entries.len() == before {
            return Err(PortError::not_found("QueueMessage", receipt_handle));
        }
        Ok(())
    }
}
