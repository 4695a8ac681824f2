//! Message queue repository
//!
//! The `message_queue` table holds one row per undelivered message. A row is
//! visible when `visible_at <= now()`; claiming it pushes `visible_at` forward
//! by the visibility timeout and stamps a fresh `receipt_handle`, so only the
//! latest receiver can delete it.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// A claimed `message_queue` row
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ClaimedMessageRow {
    pub id: i64,
    pub body: String,
    pub receive_count: i32,
    pub receipt_handle: Uuid,
}

#[derive(Debug, Clone)]
pub struct QueueRepository {
    pool: PgPool,
}

impl QueueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends a message, immediately visible, and returns its id
    pub async fn enqueue(&self, queue: &str, body: &str) -> Result<i64, DatabaseError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO message_queue (queue, body) VALUES ($1, $2) RETURNING id",
        )
        .bind(queue)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Claims up to `limit` visible rows, oldest first
    ///
    /// Rows locked by a concurrent claim are skipped rather than waited on.
    pub async fn claim(
        &self,
        queue: &str,
        limit: i64,
        visibility_secs: f64,
    ) -> Result<Vec<ClaimedMessageRow>, DatabaseError> {
        let mut rows = sqlx::query_as::<_, ClaimedMessageRow>(
            "UPDATE message_queue \
             SET receive_count = receive_count + 1, \
                 receipt_handle = gen_random_uuid(), \
                 visible_at = now() + make_interval(secs => $3) \
             WHERE id IN ( \
                 SELECT id FROM message_queue \
                 WHERE queue = $1 AND visible_at <= now() \
                 ORDER BY id \
                 LIMIT $2 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING id, body, receive_count, receipt_handle",
        )
        .bind(queue)
        .bind(limit)
        .bind(visibility_secs)
        .fetch_all(&self.pool)
        .await?;

        // RETURNING does not preserve the subquery order
        rows.sort_by_key(|row| row.id);
        Ok(rows)
    }

    /// Deletes the row currently claimed under `receipt_handle`
    ///
    /// Returns the number of rows removed: zero when the handle is stale.
    pub async fn delete_by_receipt(
        &self,
        queue: &str,
        receipt_handle: Uuid,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM message_queue WHERE queue = $1 AND receipt_handle = $2")
            .bind(queue)
            .bind(receipt_handle)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
