//! Port adapters backed by PostgreSQL
//!
//! Each adapter owns a repository built from the shared pool and implements
//! one of the lending domain's port traits, converting rows into domain
//! values and [`DatabaseError`](crate::DatabaseError)s into `PortError`s.

pub mod application;
pub mod catalog;
pub mod queue;

pub use application::PostgresApplicationAdapter;
pub use catalog::{PostgresLoanTypeAdapter, PostgresStatusAdapter};
pub use queue::PostgresMessageQueue;

use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, HealthCheckResult};

/// Runs `SELECT 1` and reports the outcome under `adapter_id`
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await;

    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: Utc::now(),
        },
        Err(e) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Unhealthy,
            latency_ms,
            message: Some(format!("Database error: {}", e)),
            checked_at: Utc::now(),
        },
    }
}
