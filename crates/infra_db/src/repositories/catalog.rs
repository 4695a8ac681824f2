//! Loan type and status repositories
//!
//! Both tables are reference data seeded outside this system and only read.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::DatabaseError;

/// A row of the `tipo_prestamo` table
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct LoanTypeRow {
    pub id_tipo_prestamo: i64,
    pub nombre: String,
    pub monto_minimo: Decimal,
    pub monto_maximo: Decimal,
    pub tasa_interes: Decimal,
    pub validacion_automatica: bool,
}

/// A row of the `estado` table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StatusRow {
    pub id_estado: i64,
    pub nombre: String,
    pub descripcion: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoanTypeRepository {
    pool: PgPool,
}

impl LoanTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<LoanTypeRow>, DatabaseError> {
        let row = sqlx::query_as::<_, LoanTypeRow>(
            "SELECT id_tipo_prestamo, nombre, monto_minimo, monto_maximo, tasa_interes, \
             validacion_automatica \
             FROM tipo_prestamo WHERE id_tipo_prestamo = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn exists_by_id(&self, id: i64) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tipo_prestamo WHERE id_tipo_prestamo = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

#[derive(Debug, Clone)]
pub struct StatusRepository {
    pool: PgPool,
}

impl StatusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<StatusRow>, DatabaseError> {
        let row = sqlx::query_as::<_, StatusRow>(
            "SELECT id_estado, nombre, descripcion FROM estado WHERE id_estado = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Exact, case-sensitive name lookup
    pub async fn find_by_name(&self, name: &str) -> Result<Option<StatusRow>, DatabaseError> {
        let row = sqlx::query_as::<_, StatusRow>(
            "SELECT id_estado, nombre, descripcion FROM estado WHERE nombre = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
