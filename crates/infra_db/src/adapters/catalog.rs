//! PostgreSQL adapters for the loan type and status catalogues

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{instrument, warn};

use core_kernel::{
    DomainPort, HealthCheckResult, HealthCheckable, LoanTypeId, PortError, StatusId,
};
use domain_lending::{LoanTypeConfig, LoanTypePort, StateMapping, Status, StatusPort, WellKnownStatus};

use crate::repositories::catalog::{LoanTypeRepository, LoanTypeRow, StatusRepository, StatusRow};

/// PostgreSQL-backed implementation of [`LoanTypePort`]
#[derive(Debug, Clone)]
pub struct PostgresLoanTypeAdapter {
    repository: LoanTypeRepository,
    pool: PgPool,
}

impl PostgresLoanTypeAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: LoanTypeRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresLoanTypeAdapter {}

#[async_trait]
impl HealthCheckable for PostgresLoanTypeAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-loan-type-adapter").await
    }
}

#[async_trait]
impl LoanTypePort for PostgresLoanTypeAdapter {
    #[instrument(skip(self), fields(loan_type_id = %id))]
    async fn find_by_id(&self, id: LoanTypeId) -> Result<Option<LoanTypeConfig>, PortError> {
        match self.repository.find_by_id(id.into()).await? {
            Some(row) => row_to_loan_type(row).map(Some),
            None => Ok(None),
        }
    }

    async fn exists_by_id(&self, id: LoanTypeId) -> Result<bool, PortError> {
        Ok(self.repository.exists_by_id(id.into()).await?)
    }
}

/// A row that breaks the loan type invariants is corrupt reference data
fn row_to_loan_type(row: LoanTypeRow) -> Result<LoanTypeConfig, PortError> {
    let id = row.id_tipo_prestamo;
    LoanTypeConfig::new(
        LoanTypeId::new(id),
        row.nombre,
        row.monto_minimo,
        row.monto_maximo,
        row.tasa_interes,
        row.validacion_automatica,
    )
    .map_err(|e| {
        warn!(loan_type_id = id, error = %e, "Invalid loan type row");
        PortError::transformation(format!("loan type {id} is invalid: {e}"))
    })
}

/// PostgreSQL-backed implementation of [`StatusPort`]
///
/// The pending-review status is resolved by the name the [`StateMapping`]
/// gives it, so a database seeded with different ids still works.
#[derive(Debug, Clone)]
pub struct PostgresStatusAdapter {
    repository: StatusRepository,
    pool: PgPool,
    mapping: StateMapping,
}

impl PostgresStatusAdapter {
    pub fn new(pool: PgPool, mapping: StateMapping) -> Self {
        Self {
            repository: StatusRepository::new(pool.clone()),
            pool,
            mapping,
        }
    }
}

impl DomainPort for PostgresStatusAdapter {}

#[async_trait]
impl HealthCheckable for PostgresStatusAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-status-adapter").await
    }
}

#[async_trait]
impl StatusPort for PostgresStatusAdapter {
    #[instrument(skip(self), fields(status_id = %id))]
    async fn find_by_id(&self, id: StatusId) -> Result<Option<Status>, PortError> {
        match self.repository.find_by_id(id.into()).await? {
            Some(row) => row_to_status(row).map(Some),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> Result<Option<Status>, PortError> {
        match self.repository.find_by_name(name).await? {
            Some(row) => row_to_status(row).map(Some),
            None => Ok(None),
        }
    }

    async fn id_for_pending_review(&self) -> Result<Option<StatusId>, PortError> {
        let Some(name) = self.mapping.status_name(WellKnownStatus::PendingReview) else {
            return Ok(None);
        };
        let row = self.repository.find_by_name(name).await?;
        Ok(row.map(|row| StatusId::new(row.id_estado)))
    }
}

fn row_to_status(row: StatusRow) -> Result<Status, PortError> {
    let id = row.id_estado;
    Status::new(StatusId::new(id), row.nombre, row.descripcion)
        .map_err(|e| PortError::transformation(format!("status {id} is invalid: {e}")))
}
