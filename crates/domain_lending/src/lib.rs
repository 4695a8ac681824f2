//! Lending Domain
//!
//! This crate owns the lifecycle of a loan application:
//!
//! - **Intake**: validation against the loan type's amount bounds and creation
//!   in the pending-review status
//! - **Capacity assessment**: for loan types flagged for automatic review, the
//!   application and the applicant's history are published for external
//!   evaluation; the verdict comes back on a separate queue and is applied as
//!   an ordinary status transition
//! - **Transitions**: status changes with optional applicant notification and
//!   an approval report when an application becomes approved
//!
//! Persistence and messaging are reached only through the traits in [`ports`].
//!
//! # Examples
//!
//! ```rust
//! use domain_lending::calculator::FinancialCalculator;
//! use rust_decimal_macros::dec;
//! use chrono::NaiveDate;
//!
//! let calculator = FinancialCalculator::fixed(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
//! let installment = calculator
//!     .monthly_installment(dec!(10000), dec!(12), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
//!     .unwrap();
//! assert_eq!(installment, dec!(888.49));
//! ```

pub mod adapters;
pub mod applicant;
pub mod application;
pub mod assessment;
pub mod calculator;
pub mod error;
pub mod loan_type;
pub mod mapping;
pub mod ports;
pub mod services;
pub mod status;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use applicant::ApplicantProfile;
pub use application::Application;
pub use assessment::{
    AssessmentListener, CapacityAssessmentConsumer, CapacityAssessmentProducer, ListenerConfig,
    ProcessOutcome,
};
pub use calculator::FinancialCalculator;
pub use error::{LendingError, LendingResult};
pub use loan_type::{validate_range, LoanTypeConfig};
pub use mapping::{LoanKind, StateMapping, WellKnownStatus};
pub use ports::{
    ApplicantPort, ApplicationPort, DeliveryConfirmation, LoanTypePort, MessageSender,
    NotificationGateway, QueueMessage, QueueReceiver, ReceiveOptions, ReportsGateway, StatusPort,
    StatusTotals,
};
pub use services::{
    ApplicationLifecycleService, ApplicationView, DispatchMode, LifecyclePorts, NewApplication,
    NotificationOutcome, ServiceConfig, TransitionOutcome,
};
pub use status::Status;
