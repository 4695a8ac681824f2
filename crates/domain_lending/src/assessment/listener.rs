//! Worker pool draining the assessment-result queue
//!
//! Each worker repeats receive -> process -> acknowledge. The messages of one
//! batch are handled concurrently, each acknowledged as soon as it is done.
//! A message is deleted only once [`CapacityAssessmentConsumer::process`]
//! returns `Ok`; otherwise
//! it reappears after the visibility timeout. With `max_receive_count` set, a
//! failing message that has been delivered that many times is discarded.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use core_kernel::PortError;

use crate::assessment::consumer::{CapacityAssessmentConsumer, ProcessOutcome};
use crate::ports::{QueueMessage, QueueReceiver, ReceiveOptions};

#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub queue: String,
    pub workers: usize,
    pub batch_size: u32,
    pub wait_time: Duration,
    pub visibility_timeout: Duration,
    /// `None` redelivers a failing message forever
    pub max_receive_count: Option<u32>,
    /// Pause after a failed receive
    pub error_backoff: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            queue: "resultado-evaluacion".to_string(),
            workers: 2,
            batch_size: 10,
            wait_time: Duration::from_secs(20),
            visibility_timeout: Duration::from_secs(30),
            max_receive_count: None,
            error_backoff: Duration::from_secs(5),
        }
    }
}

/// What the listener did with one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Processed and deleted
    Acknowledged,
    /// Unusable and deleted
    Dropped,
    /// Left on the queue for redelivery
    Retained,
    /// Failed too many times and deleted
    Discarded,
}

/// Counts from one receive cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub received: usize,
    pub acknowledged: usize,
    pub dropped: usize,
    pub retained: usize,
    pub discarded: usize,
}

impl PollSummary {
    fn record(&mut self, disposition: Disposition) {
        match disposition {
            Disposition::Acknowledged => self.acknowledged += 1,
            Disposition::Dropped => self.dropped += 1,
            Disposition::Retained => self.retained += 1,
            Disposition::Discarded => self.discarded += 1,
        }
    }
}

pub struct AssessmentListener {
    receiver: Arc<dyn QueueReceiver>,
    handler: MessageHandler,
    config: ListenerConfig,
}

/// Processes and acknowledges a single message
#[derive(Clone)]
struct MessageHandler {
    receiver: Arc<dyn QueueReceiver>,
    consumer: Arc<CapacityAssessmentConsumer>,
    queue: String,
    max_receive_count: Option<u32>,
}

impl AssessmentListener {
    pub fn new(
        receiver: Arc<dyn QueueReceiver>,
        consumer: Arc<CapacityAssessmentConsumer>,
        config: ListenerConfig,
    ) -> Self {
        let handler = MessageHandler {
            receiver: Arc::clone(&receiver),
            consumer,
            queue: config.queue.clone(),
            max_receive_count: config.max_receive_count,
        };
        Self {
            receiver,
            handler,
            config,
        }
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Starts the workers; they stop once `shutdown` becomes `true` or its
    /// sender is dropped
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinSet<()> {
        let listener = Arc::new(self);
        let mut workers = JoinSet::new();
        for worker in 0..listener.config.workers.max(1) {
            let listener = Arc::clone(&listener);
            let shutdown = shutdown.clone();
            workers.spawn(async move { listener.work(worker, shutdown).await });
        }
        info!(
            queue = %listener.config.queue,
            workers = listener.config.workers.max(1),
            "Assessment listener started"
        );
        workers
    }

    /// Runs the workers until shutdown and waits for all of them
    pub async fn run(self, shutdown: watch::Receiver<bool>) {
        let mut workers = self.spawn(shutdown);
        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "Assessment listener worker panicked");
            }
        }
        info!("Assessment listener stopped");
    }

    /// One receive cycle: every received message is handled before returning
    pub async fn poll_once(&self) -> Result<PollSummary, PortError> {
        let messages = self.receiver.receive(&self.receive_options()).await?;
        Ok(self.handle_batch(messages).await)
    }

    async fn work(&self, worker: usize, mut shutdown: watch::Receiver<bool>) {
        debug!(worker, "Assessment worker started");
        loop {
            if *shutdown.borrow() {
                break;
            }

            let options = self.receive_options();
            let received = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                received = self.receiver.receive(&options) => received,
            };

            match received {
                Ok(messages) => {
                    if !messages.is_empty() {
                        let summary = self.handle_batch(messages).await;
                        debug!(worker, ?summary, "Assessment batch handled");
                    }
                }
                Err(e) => {
                    warn!(worker, error = %e, "Receiving assessment results failed");
                    tokio::select! {
                        changed = shutdown.changed() => {
                            if changed.is_err() {
                                break;
                            }
                        }
                        _ = tokio::time::sleep(self.config.error_backoff) => {}
                    }
                }
            }
        }
        debug!(worker, "Assessment worker stopped");
    }

    fn receive_options(&self) -> ReceiveOptions {
        ReceiveOptions {
            queue: self.config.queue.clone(),
            max_messages: self.config.batch_size.max(1),
            wait_time: self.config.wait_time,
            visibility_timeout: self.config.visibility_timeout,
        }
    }

    async fn handle_batch(&self, messages: Vec<QueueMessage>) -> PollSummary {
        let mut summary = PollSummary {
            received: messages.len(),
            ..PollSummary::default()
        };

        let mut in_flight = JoinSet::new();
        for message in messages {
            let handler = self.handler.clone();
            in_flight.spawn(async move { handler.handle(message).await });
        }

        while let Some(result) = in_flight.join_next().await {
            match result {
                Ok(disposition) => summary.record(disposition),
                Err(e) => {
                    // unacknowledged, so the queue redelivers it
                    error!(error = %e, "Verdict handler panicked");
                    summary.record(Disposition::Retained);
                }
            }
        }
        summary
    }
}

impl MessageHandler {
    async fn handle(self, message: QueueMessage) -> Disposition {
        let disposition = match self.consumer.process(&message.body).await {
            Ok(ProcessOutcome::Applied { .. }) => Disposition::Acknowledged,
            Ok(ProcessOutcome::Dropped { .. }) => Disposition::Dropped,
            Err(e) => match self.max_receive_count {
                Some(limit) if message.receive_count >= limit => {
                    error!(
                        message_id = %message.message_id,
                        receive_count = message.receive_count,
                        error = %e,
                        "Discarding verdict message after repeated failures"
                    );
                    Disposition::Discarded
                }
                _ => {
                    warn!(
                        message_id = %message.message_id,
                        receive_count = message.receive_count,
                        error = %e,
                        "Verdict processing failed, leaving message for redelivery"
                    );
                    Disposition::Retained
                }
            },
        };

        if disposition != Disposition::Retained {
            if let Err(e) = self
                .receiver
                .delete(&self.queue, &message.receipt_handle)
                .await
            {
                // the message will come back and be processed again
                warn!(message_id = %message.message_id, error = %e, "Acknowledging message failed");
                return Disposition::Retained;
            }
        }
        disposition
    }
}
