//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the credit origination system, built on SQLx.
//!
//! # Layout
//!
//! - [`repositories`]: SQL against the tables below, returning plain rows
//! - [`adapters`]: implementations of the lending domain ports on top of
//!   the repositories
//! - [`MIGRATOR`]: embedded schema and reference data migrations
//!
//! # Schema
//!
//! | table           | contents                                             |
//! |-----------------|------------------------------------------------------|
//! | `solicitud`     | loan applications                                    |
//! | `tipo_prestamo` | loan products with amount bounds and interest rate   |
//! | `estado`        | application statuses                                 |
//! | `message_queue` | queued messages with visibility timeout and receipt  |
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, MIGRATOR};
//! use infra_db::adapters::PostgresApplicationAdapter;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/crediya")).await?;
//! MIGRATOR.run(&pool).await?;
//! let applications = PostgresApplicationAdapter::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{
    PostgresApplicationAdapter, PostgresLoanTypeAdapter, PostgresMessageQueue,
    PostgresStatusAdapter,
};
pub use error::DatabaseError;
pub use pool::{create_pool, DatabaseConfig, DatabasePool};

/// Schema and seed migrations embedded from `migrations/`
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
