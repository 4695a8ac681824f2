//! Asynchronous capacity-assessment round trip
//!
//! - [`producer`]: packages an application with the applicant's history and
//!   publishes it for external evaluation
//! - [`consumer`]: turns a returned verdict into a status transition
//! - [`listener`]: the worker pool feeding the consumer from the result queue

pub mod consumer;
pub mod listener;
pub mod producer;

pub use consumer::{parse_verdict, CapacityAssessmentConsumer, DropReason, ProcessOutcome, Verdict};
pub use listener::{AssessmentListener, Disposition, ListenerConfig, PollSummary};
pub use producer::{ApplicantData, ApplicationData, AssessmentRequest, CapacityAssessmentProducer};
