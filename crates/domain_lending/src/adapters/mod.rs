//! Queue-backed outbound gateways
//!
//! Notifications and approval reports are not delivered by this system; they
//! are serialized to JSON and published onto a queue through a
//! [`MessageSender`](crate::ports::MessageSender), where downstream services
//! pick them up.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_lending::adapters::{QueueNotificationGateway, QueueReportsGateway};
//! use std::sync::Arc;
//!
//! let sender: Arc<dyn MessageSender> = Arc::new(PgMessageQueue::new(pool));
//! let notifications = QueueNotificationGateway::new(sender.clone(), "notificaciones");
//! let reports = QueueReportsGateway::new(sender, "reportes");
//! ```

pub mod notification;
pub mod reports;

pub use notification::{NotificationMessage, QueueNotificationGateway};
pub use reports::{ApprovedReportMessage, QueueReportsGateway};
