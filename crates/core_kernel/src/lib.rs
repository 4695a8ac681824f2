//! Core Kernel - Foundational types for the credit origination system
//!
//! This crate provides the building blocks shared by the domain and the
//! infrastructure crates:
//! - Strongly-typed numeric identifiers for persisted entities
//! - Page request/result types used by listing operations
//! - The port error type and marker traits of the hexagonal architecture
//! - The closed set of business error kinds

pub mod identifiers;
pub mod pagination;
pub mod ports;
pub mod error;

pub use identifiers::{ApplicationId, LoanTypeId, StatusId, ApplicantProfileId};
pub use pagination::{PageRequest, PageResult};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
pub use error::ErrorKind;
