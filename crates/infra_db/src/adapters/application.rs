//! PostgreSQL Application Adapter
//!
//! Implements [`ApplicationPort`] over the `solicitud` table via
//! [`ApplicationRepository`].
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresApplicationAdapter;
//! use domain_lending::ApplicationPort;
//! use std::sync::Arc;
//!
//! let port: Arc<dyn ApplicationPort> = Arc::new(PostgresApplicationAdapter::new(pool));
//! let page = port.list_paged(PageRequest::new(0, 20)).await?;
//! ```

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    ApplicationId, DomainPort, HealthCheckResult, HealthCheckable, LoanTypeId, PageRequest,
    PageResult, PortError, StatusId,
};
use domain_lending::{Application, ApplicationPort, StatusTotals};

use crate::repositories::application::{ApplicationRepository, ApplicationRow, NewApplicationRow};

/// PostgreSQL-backed implementation of [`ApplicationPort`]
///
/// Updates write only the status and `updated_at` columns of a single row,
/// so concurrent transitions of the same application resolve as last write
/// wins.
#[derive(Debug, Clone)]
pub struct PostgresApplicationAdapter {
    repository: ApplicationRepository,
    pool: PgPool,
}

impl PostgresApplicationAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ApplicationRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn repository(&self) -> &ApplicationRepository {
        &self.repository
    }
}

impl DomainPort for PostgresApplicationAdapter {}

#[async_trait]
impl HealthCheckable for PostgresApplicationAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-application-adapter").await
    }
}

#[async_trait]
impl ApplicationPort for PostgresApplicationAdapter {
    #[instrument(skip(self, application), fields(applicant_id = %application.applicant_id))]
    async fn create(&self, application: Application) -> Result<Application, PortError> {
        let row = self.repository.insert(to_new_row(&application)).await?;
        debug!(application_id = row.id_solicitud, "Inserted application");
        Ok(row_to_application(row))
    }

    async fn exists_by_id(&self, id: ApplicationId) -> Result<bool, PortError> {
        Ok(self.repository.exists_by_id(id.into()).await?)
    }

    async fn exists_by_applicant_id(&self, applicant_id: &str) -> Result<bool, PortError> {
        Ok(self.repository.exists_by_applicant(applicant_id).await?)
    }

    #[instrument(skip(self), fields(application_id = %id))]
    async fn find_by_id(&self, id: ApplicationId) -> Result<Option<Application>, PortError> {
        let row = self.repository.find_by_id(id.into()).await?;
        Ok(row.map(row_to_application))
    }

    #[instrument(skip(self, application), fields(status_id = %application.status_id))]
    async fn update(&self, application: &Application) -> Result<Application, PortError> {
        let id = application.id.ok_or_else(|| {
            PortError::validation_field("application has no id", "idSolicitud")
        })?;

        let row = self
            .repository
            .update_status(id.into(), application.status_id.into(), application.updated_at)
            .await?;
        Ok(row_to_application(row))
    }

    #[instrument(skip(self), fields(page = request.page, size = request.size))]
    async fn list_paged(&self, request: PageRequest) -> Result<PageResult<Application>, PortError> {
        if request.size == 0 {
            return Ok(PageResult::empty(request));
        }

        let offset = i64::try_from(request.offset())
            .map_err(|_| PortError::validation_field("page is out of range", "pagina"))?;
        let (rows, total) = self
            .repository
            .page(i64::from(request.size), offset)
            .await?;

        let content = rows.into_iter().map(row_to_application).collect();
        Ok(PageResult::new(
            content,
            request.page,
            request.size,
            u64::try_from(total).unwrap_or_default(),
        ))
    }

    async fn list_by_applicant_id(&self, applicant_id: &str) -> Result<Vec<Application>, PortError> {
        let rows = self.repository.list_by_applicant(applicant_id).await?;
        Ok(rows.into_iter().map(row_to_application).collect())
    }

    #[instrument(skip(self), fields(status_id = %status_id))]
    async fn totals_by_status(&self, status_id: StatusId) -> Result<StatusTotals, PortError> {
        let (count, total_amount) = self.repository.totals_by_status(status_id.into()).await?;
        Ok(StatusTotals {
            count: u64::try_from(count).unwrap_or_default(),
            total_amount,
        })
    }
}

fn to_new_row(application: &Application) -> NewApplicationRow {
    NewApplicationRow {
        id_user: application.applicant_id.clone(),
        email: application.email.clone(),
        monto: application.amount,
        plazo: application.term,
        id_tipo_prestamo: application.loan_type_id.into(),
        id_estado: application.status_id.into(),
        created_at: application.created_at,
        updated_at: application.updated_at,
    }
}

fn row_to_application(row: ApplicationRow) -> Application {
    Application {
        id: Some(ApplicationId::new(row.id_solicitud)),
        applicant_id: row.id_user,
        email: row.email,
        amount: row.monto,
        term: row.plazo,
        loan_type_id: LoanTypeId::new(row.id_tipo_prestamo),
        status_id: StatusId::new(row.id_estado),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn row() -> ApplicationRow {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        ApplicationRow {
            id_solicitud: 41,
            id_user: "1020304050".to_string(),
            email: "ana@example.com".to_string(),
            monto: dec!(2500.00),
            plazo: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            id_tipo_prestamo: 1,
            id_estado: 1,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_row_conversion() {
        let application = row_to_application(row());

        assert_eq!(application.id, Some(ApplicationId::new(41)));
        assert_eq!(application.applicant_id, "1020304050");
        assert_eq!(application.amount, dec!(2500.00));
        assert_eq!(application.loan_type_id, LoanTypeId::new(1));
        assert_eq!(application.status_id, StatusId::new(1));
    }

    #[test]
    fn test_new_row_carries_domain_values() {
        let application = row_to_application(row());
        let new_row = to_new_row(&application);

        assert_eq!(new_row.id_user, application.applicant_id);
        assert_eq!(new_row.monto, application.amount);
        assert_eq!(new_row.plazo, application.term);
        assert_eq!(new_row.id_estado, 1);
    }
}
