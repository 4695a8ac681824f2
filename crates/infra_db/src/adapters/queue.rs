//! PostgreSQL message queue
//!
//! At-least-once delivery with a visibility timeout and explicit delete,
//! backed by the `message_queue` table. Serves both as the outbound
//! [`MessageSender`] and the inbound [`QueueReceiver`] of the assessment
//! round trip.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument, trace};
use uuid::Uuid;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_lending::{DeliveryConfirmation, MessageSender, QueueMessage, QueueReceiver, ReceiveOptions};

use crate::repositories::queue::{ClaimedMessageRow, QueueRepository};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct PostgresMessageQueue {
    repository: QueueRepository,
    pool: PgPool,
    poll_interval: Duration,
}

impl PostgresMessageQueue {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: QueueRepository::new(pool.clone()),
            pool,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// How often an empty queue is re-checked while long polling
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl DomainPort for PostgresMessageQueue {}

#[async_trait]
impl HealthCheckable for PostgresMessageQueue {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-message-queue").await
    }
}

#[async_trait]
impl MessageSender for PostgresMessageQueue {
    #[instrument(skip(self, payload), fields(bytes = payload.len()))]
    async fn send(&self, payload: &str, queue: &str) -> Result<DeliveryConfirmation, PortError> {
        let id = self.repository.enqueue(queue, payload).await?;
        debug!(message_id = id, "Enqueued message");
        Ok(DeliveryConfirmation::new(id.to_string()))
    }
}

#[async_trait]
impl QueueReceiver for PostgresMessageQueue {
    #[instrument(skip(self, options), fields(queue = %options.queue, max = options.max_messages))]
    async fn receive(&self, options: &ReceiveOptions) -> Result<Vec<QueueMessage>, PortError> {
        if options.max_messages == 0 {
            return Ok(Vec::new());
        }

        let deadline = Instant::now() + options.wait_time;
        let visibility_secs = options.visibility_timeout.as_secs_f64();

        loop {
            let rows = self
                .repository
                .claim(&options.queue, i64::from(options.max_messages), visibility_secs)
                .await?;

            if !rows.is_empty() {
                debug!(count = rows.len(), "Claimed messages");
                return Ok(rows.into_iter().map(to_queue_message).collect());
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(Vec::new());
            }
            trace!("Queue empty, waiting");
            tokio::time::sleep(remaining.min(self.poll_interval)).await;
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, queue: &str, receipt_handle: &str) -> Result<(), PortError> {
        let handle = Uuid::parse_str(receipt_handle).map_err(|_| {
            PortError::validation_field("malformed receipt handle", "receipt_handle")
        })?;

        match self.repository.delete_by_receipt(queue, handle).await? {
            0 => Err(PortError::not_found("Message", receipt_handle)),
            _ => Ok(()),
        }
    }
}

fn to_queue_message(row: ClaimedMessageRow) -> QueueMessage {
    QueueMessage {
        message_id: row.id.to_string(),
        receipt_handle: row.receipt_handle.to_string(),
        body: row.body,
        receive_count: u32::try_from(row.receive_count).unwrap_or_default(),
    }
}
