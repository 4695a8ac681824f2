//! SQL repositories
//!
//! Repositories speak rows and [`DatabaseError`](crate::DatabaseError); the
//! adapters in [`crate::adapters`] translate to and from the domain.

pub mod application;
pub mod catalog;
pub mod queue;

pub use application::{ApplicationRepository, ApplicationRow, NewApplicationRow};
pub use catalog::{LoanTypeRepository, LoanTypeRow, StatusRepository, StatusRow};
pub use queue::{ClaimedMessageRow, QueueRepository};
