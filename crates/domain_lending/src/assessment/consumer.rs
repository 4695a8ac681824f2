//! Inbound capacity-assessment verdicts
//!
//! A verdict names an application and the status the external evaluator
//! assigned to it. The consumer resolves that status by name and replays the
//! ordinary transition path with notifications off, since the verdict itself
//! already came from an asynchronous flow.
//!
//! Classification of each message:
//!
//! | input                                | result                 | acknowledged |
//! |--------------------------------------|------------------------|--------------|
//! | valid, known status                  | `Ok(Applied)`          | yes          |
//! | not JSON, no id, blank verdict       | `Ok(Dropped)`          | yes          |
//! | unknown status name, failed transition | `Err`                | no           |

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use core_kernel::{ApplicationId, StatusId};

use crate::error::{LendingError, LendingResult};
use crate::ports::StatusPort;
use crate::services::ApplicationLifecycleService;

/// Why a message was discarded without processing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DropReason {
    #[error("malformed verdict message: {0}")]
    Malformed(String),

    #[error("verdict message has no idSolicitud")]
    MissingApplicationId,

    #[error("verdict message has no estado/status")]
    MissingVerdict,
}

#[derive(Debug, Deserialize)]
struct VerdictMessage {
    #[serde(rename = "idSolicitud")]
    application_id: Option<i64>,
    estado: Option<String>,
    /// Legacy name of `estado`
    status: Option<String>,
    #[serde(rename = "planPago")]
    payment_plan: Option<String>,
}

/// A well-formed verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub application_id: ApplicationId,
    pub status_name: String,
    pub payment_plan: Option<String>,
}

/// Parses a verdict body
///
/// `estado` wins over the legacy `status` key; a blank value counts as absent.
/// The chosen value is kept verbatim for the exact name lookup.
pub fn parse_verdict(body: &str) -> Result<Verdict, DropReason> {
    let message: VerdictMessage =
        serde_json::from_str(body).map_err(|e| DropReason::Malformed(e.to_string()))?;

    let application_id = message
        .application_id
        .map(ApplicationId::new)
        .ok_or(DropReason::MissingApplicationId)?;

    let status_name = [message.estado, message.status]
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .ok_or(DropReason::MissingVerdict)?;

    Ok(Verdict {
        application_id,
        status_name,
        payment_plan: message.payment_plan,
    })
}

/// Result of processing one verdict message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Applied {
        application_id: ApplicationId,
        status_id: StatusId,
        status_name: String,
    },
    Dropped {
        reason: DropReason,
    },
}

impl ProcessOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ProcessOutcome::Applied { .. })
    }
}

/// Applies assessment verdicts to applications
pub struct CapacityAssessmentConsumer {
    service: ApplicationLifecycleService,
    statuses: Arc<dyn StatusPort>,
}

impl CapacityAssessmentConsumer {
    pub fn new(service: ApplicationLifecycleService, statuses: Arc<dyn StatusPort>) -> Self {
        Self { service, statuses }
    }

    /// Processes one message body
    ///
    /// `Ok` means the message is done with and may be acknowledged; `Err`
    /// means it should stay on the queue for redelivery.
    pub async fn process(&self, body: &str) -> LendingResult<ProcessOutcome> {
        let verdict = match parse_verdict(body) {
            Ok(verdict) => verdict,
            Err(reason) => {
                warn!(reason = %reason, "Dropping verdict message");
                return Ok(ProcessOutcome::Dropped { reason });
            }
        };

        let status = self
            .statuses
            .find_by_name(&verdict.status_name)
            .await
            .map_err(|e| LendingError::port("resolving verdict status", e))?
            .ok_or_else(|| LendingError::not_found("Status", &verdict.status_name))?;

        let application = self
            .service
            .transition(Some(verdict.application_id), Some(status.id), false)
            .await?;

        info!(
            application_id = %verdict.application_id,
            status = %status.name,
            payment_plan = verdict.payment_plan.as_deref().unwrap_or(""),
            "Verdict applied"
        );

        Ok(ProcessOutcome::Applied {
            application_id: verdict.application_id,
            status_id: application.status_id,
            status_name: status.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_verdict() {
        let verdict =
            parse_verdict(r#"{"idSolicitud": 12, "estado": "APROBADO", "planPago": "12 cuotas"}"#)
                .unwrap();
        assert_eq!(verdict.application_id, ApplicationId::new(12));
        assert_eq!(verdict.status_name, "APROBADO");
        assert_eq!(verdict.payment_plan.as_deref(), Some("12 cuotas"));
    }

    #[test]
    fn test_parse_legacy_status_key() {
        let verdict = parse_verdict(r#"{"idSolicitud": 3, "status": "RECHAZADO"}"#).unwrap();
        assert_eq!(verdict.status_name, "RECHAZADO");
    }

    #[test]
    fn test_estado_takes_precedence() {
        let verdict =
            parse_verdict(r#"{"idSolicitud": 3, "estado": "APROBADO", "status": "RECHAZADO"}"#)
                .unwrap();
        assert_eq!(verdict.status_name, "APROBADO");

        let blank_estado =
            parse_verdict(r#"{"idSolicitud": 3, "estado": "  ", "status": "RECHAZADO"}"#).unwrap();
        assert_eq!(blank_estado.status_name, "RECHAZADO");
    }

    #[test]
    fn test_verdict_name_is_not_normalised() {
        let verdict = parse_verdict(r#"{"idSolicitud": 3, "estado": " APROBADO "}"#).unwrap();
        assert_eq!(verdict.status_name, " APROBADO ");
    }

    #[test]
    fn test_malformed_messages_are_dropped() {
        assert!(matches!(parse_verdict("not json"), Err(DropReason::Malformed(_))));
        assert_eq!(
            parse_verdict(r#"{"estado": "APROBADO"}"#),
            Err(DropReason::MissingApplicationId)
        );
        assert_eq!(
            parse_verdict(r#"{"idSolicitud": 1, "estado": ""}"#),
            Err(DropReason::MissingVerdict)
        );
        assert_eq!(parse_verdict(r#"{"idSolicitud": 1}"#), Err(DropReason::MissingVerdict));
    }
}
