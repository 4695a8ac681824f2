//! Application repository
//!
//! SQL access to the `solicitud` table. Rows are returned as
//! [`ApplicationRow`]; conversion to the domain type happens in the adapter.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::DatabaseError;

const COLUMNS: &str = "id_solicitud, id_user, email, monto, plazo, id_tipo_prestamo, \
                       id_estado, created_at, updated_at";

/// A row of the `solicitud` table
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ApplicationRow {
    pub id_solicitud: i64,
    pub id_user: String,
    pub email: String,
    pub monto: Decimal,
    pub plazo: NaiveDate,
    pub id_tipo_prestamo: i64,
    pub id_estado: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a new `solicitud` row
#[derive(Debug, Clone)]
pub struct NewApplicationRow {
    pub id_user: String,
    pub email: String,
    pub monto: Decimal,
    pub plazo: NaiveDate,
    pub id_tipo_prestamo: i64,
    pub id_estado: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, row: NewApplicationRow) -> Result<ApplicationRow, DatabaseError> {
        let sql = format!(
            "INSERT INTO solicitud (id_user, email, monto, plazo, id_tipo_prestamo, id_estado, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(row.id_user)
            .bind(row.email)
            .bind(row.monto)
            .bind(row.plazo)
            .bind(row.id_tipo_prestamo)
            .bind(row.id_estado)
            .bind(row.created_at)
            .bind(row.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(inserted)
    }

    pub async fn exists_by_id(&self, id: i64) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM solicitud WHERE id_solicitud = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn exists_by_applicant(&self, id_user: &str) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM solicitud WHERE id_user = $1)",
        )
        .bind(id_user)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<ApplicationRow>, DatabaseError> {
        let sql = format!("SELECT {COLUMNS} FROM solicitud WHERE id_solicitud = $1");
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Single-row status update; the last writer wins
    pub async fn update_status(
        &self,
        id: i64,
        id_estado: i64,
        updated_at: DateTime<Utc>,
    ) -> Result<ApplicationRow, DatabaseError> {
        let sql = format!(
            "UPDATE solicitud SET id_estado = $2, updated_at = $3 \
             WHERE id_solicitud = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(id)
            .bind(id_estado)
            .bind(updated_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Application", id))
    }

    /// One page ordered by id, plus the total row count
    pub async fn page(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ApplicationRow>, i64), DatabaseError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM solicitud ORDER BY id_solicitud LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM solicitud")
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }

    pub async fn list_by_applicant(&self, id_user: &str) -> Result<Vec<ApplicationRow>, DatabaseError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM solicitud WHERE id_user = $1 ORDER BY id_solicitud"
        );
        let rows = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(id_user)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Count and summed amount of the rows in status `id_estado`
    pub async fn totals_by_status(&self, id_estado: i64) -> Result<(i64, Decimal), DatabaseError> {
        let totals = sqlx::query_as::<_, (i64, Decimal)>(
            "SELECT COUNT(*), COALESCE(SUM(monto), 0) FROM solicitud WHERE id_estado = $1",
        )
        .bind(id_estado)
        .fetch_one(&self.pool)
        .await?;
        Ok(totals)
    }
}
