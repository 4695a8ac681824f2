//! Approved-applications report over a message queue

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use core_kernel::{DomainPort, PortError};

use crate::ports::{DeliveryConfirmation, MessageSender, ReportsGateway, StatusTotals};

const REPORT_ACTION: &str = "actualizarSolicitud";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Wire format consumed by the reporting service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovedReportMessage {
    #[serde(rename = "accion")]
    pub action: String,
    /// Local wall-clock time, `yyyy-MM-dd HH:mm:ss`
    #[serde(rename = "fechaHora")]
    pub timestamp: String,
    #[serde(rename = "totalSolicitudesAprobadas")]
    pub total_approved: u64,
    #[serde(rename = "montoTotalAprobado", with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

impl ApprovedReportMessage {
    pub fn new(totals: StatusTotals, at: NaiveDateTime) -> Self {
        Self {
            action: REPORT_ACTION.to_string(),
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            total_approved: totals.count,
            total_amount: totals
                .total_amount
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        }
    }
}

/// [`ReportsGateway`] that publishes the running approval totals
pub struct QueueReportsGateway {
    sender: Arc<dyn MessageSender>,
    queue: String,
}

impl QueueReportsGateway {
    pub fn new(sender: Arc<dyn MessageSender>, queue: impl Into<String>) -> Self {
        Self {
            sender,
            queue: queue.into(),
        }
    }
}

impl DomainPort for QueueReportsGateway {}

#[async_trait]
impl ReportsGateway for QueueReportsGateway {
    async fn send_approved_report(
        &self,
        totals: StatusTotals,
    ) -> Result<DeliveryConfirmation, PortError> {
        let now: DateTime<Local> = Local::now();
        let message = ApprovedReportMessage::new(totals, now.naive_local());
        let payload = serde_json::to_string(&message)
            .map_err(|e| PortError::transformation(e.to_string()))?;

        info!(
            total_approved = totals.count,
            total_amount = %totals.total_amount,
            "Publishing approved applications report"
        );

        self.sender.send(&payload, &self.queue).await.map_err(|e| {
            error!(error = %e, queue = %self.queue, "Approved applications report failed");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::RecordingMessageSender;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_message_shape() {
        let at = NaiveDate::from_ymd_opt(2025, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 1)
            .unwrap();
        let message = ApprovedReportMessage::new(
            StatusTotals {
                count: 3,
                total_amount: dec!(15000.555),
            },
            at,
        );

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["accion"], "actualizarSolicitud");
        assert_eq!(json["fechaHora"], "2025-03-07 09:05:01");
        assert_eq!(json["totalSolicitudesAprobadas"], 3);
        let amount = json["montoTotalAprobado"].as_f64().unwrap();
        assert!((amount - 15000.56).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_publishes_to_reports_queue() {
        let sender = Arc::new(RecordingMessageSender::new());
        let gateway = QueueReportsGateway::new(sender.clone(), "reportes");

        gateway
            .send_approved_report(StatusTotals {
                count: 1,
                total_amount: dec!(2500),
            })
            .await
            .unwrap();

        let sent = sender.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].queue, "reportes");
        assert!(sent[0].payload.contains("\"totalSolicitudesAprobadas\":1"));
    }
}
