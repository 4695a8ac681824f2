//! Status-change notification over a message queue

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use core_kernel::{ApplicationId, DomainPort, PortError};

use crate::ports::{DeliveryConfirmation, MessageSender, NotificationGateway};

/// Wire format consumed by the mailer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub to: String,
    pub subject: String,
    #[serde(rename = "estado")]
    pub status_name: String,
    #[serde(rename = "idSolicitud")]
    pub application_id: ApplicationId,
}

impl NotificationMessage {
    pub fn new(email: &str, status_name: &str, application_id: ApplicationId) -> Self {
        Self {
            to: email.to_string(),
            subject: format!("Actualización de su Solicitud de Préstamo #{application_id}"),
            status_name: status_name.to_string(),
            application_id,
        }
    }
}

/// [`NotificationGateway`] that publishes one message per status change
pub struct QueueNotificationGateway {
    sender: Arc<dyn MessageSender>,
    queue: String,
}

impl QueueNotificationGateway {
    pub fn new(sender: Arc<dyn MessageSender>, queue: impl Into<String>) -> Self {
        Self {
            sender,
            queue: queue.into(),
        }
    }
}

impl DomainPort for QueueNotificationGateway {}

#[async_trait]
impl NotificationGateway for QueueNotificationGateway {
    async fn send(
        &self,
        email: &str,
        status_name: &str,
        application_id: ApplicationId,
    ) -> Result<DeliveryConfirmation, PortError> {
        let message = NotificationMessage::new(email, status_name, application_id);
        let payload = serde_json::to_string(&message)
            .map_err(|e| PortError::transformation(e.to_string()))?;

        info!(
            application_id = %application_id,
            status = status_name,
            queue = %self.queue,
            "Publishing status notification"
        );

        match self.sender.send(&payload, &self.queue).await {
            Ok(confirmation) => {
                info!(
                    application_id = %application_id,
                    message_id = %confirmation.message_id,
                    "Status notification published"
                );
                Ok(confirmation)
            }
            Err(e) => {
                error!(application_id = %application_id, error = %e, "Status notification failed");
                Err(e)
            }
        }
    }
}
