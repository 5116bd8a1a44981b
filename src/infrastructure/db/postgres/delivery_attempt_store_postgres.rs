use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::DeliveryAttemptRow;
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::stores::delivery_attempt_store::{
    DeliveryAttemptRepositoryError, DeliveryAttemptStore,
};
use async_trait::async_trait;
use sqlx::PgConnection;
use std::sync::Arc;

pub struct DeliveryAttemptStorePostgres {
    db: Arc<PostgresDatabase>,
}

impl DeliveryAttemptStorePostgres {
    /// Build a Postgres-backed delivery attempt store.
    pub fn new(db: Arc<PostgresDatabase>) -> Self {
        Self { db }
    }

    /// Serialize numbering for one event until the surrounding transaction ends.
    async fn lock_event_conn(
        conn: &mut PgConnection,
        event_id: &str,
    ) -> Result<(), DeliveryAttemptRepositoryError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext('webhook_deliveries:' || $1))")
            .bind(event_id)
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        Ok(())
    }

    async fn insert_next_impl_tx(
        conn: &mut PgConnection,
        mut row: DeliveryAttemptRow,
    ) -> Result<DeliveryAttemptRow, DeliveryAttemptRepositoryError> {
        Self::lock_event_conn(conn, &row.event_id).await?;
        row.attempt_number = Self::next_attempt_number_impl_conn(conn, row.event_id.clone()).await?;
        Self::insert_impl_conn(conn, &row).await
    }

    async fn next_attempt_number_impl_conn(
        conn: &mut PgConnection,
        event_id: String,
    ) -> Result<i32, DeliveryAttemptRepositoryError> {
        let next = sqlx::query_scalar::<_, i32>(
            "SELECT COALESCE(MAX(attempt_number), 0) + 1
            FROM webhook_deliveries
            WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(next)
    }

    async fn insert_impl_conn(
        conn: &mut PgConnection,
        row: &DeliveryAttemptRow,
    ) -> Result<DeliveryAttemptRow, DeliveryAttemptRepositoryError> {
        let stored = sqlx::query_as::<_, DeliveryAttemptRow>(
            "INSERT INTO webhook_deliveries (
                id,
                event_id,
                attempt_number,
                status,
                error_message,
                mode_used,
                latency_ms,
                endpoint_id,
                endpoint_url_snapshot,
                received_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
            RETURNING
                id,
                event_id,
                attempt_number,
                status,
                error_message,
                mode_used,
                latency_ms,
                endpoint_id,
                endpoint_url_snapshot,
                received_at",
        )
        .bind(row.id)
        .bind(&row.event_id)
        .bind(row.attempt_number)
        .bind(&row.status)
        .bind(&row.error_message)
        .bind(&row.mode_used)
        .bind(row.latency_ms)
        .bind(row.endpoint_id)
        .bind(&row.endpoint_url_snapshot)
        .bind(row.received_at)
        .fetch_one(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(stored)
    }

    async fn list_by_event_impl_conn(
        conn: &mut PgConnection,
        event_id: String,
    ) -> Result<Vec<DeliveryAttemptRow>, DeliveryAttemptRepositoryError> {
        let rows = sqlx::query_as::<_, DeliveryAttemptRow>(
            "SELECT
                id,
                event_id,
                attempt_number,
                status,
                error_message,
                mode_used,
                latency_ms,
                endpoint_id,
                endpoint_url_snapshot,
                received_at
            FROM webhook_deliveries
            WHERE event_id = $1
            ORDER BY attempt_number ASC",
        )
        .bind(event_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(rows)
    }
}

#[async_trait]
impl DeliveryAttemptStore for DeliveryAttemptStorePostgres {
    async fn next_attempt_number(
        &self,
        event_id: &str,
    ) -> Result<i32, DeliveryAttemptRepositoryError> {
        let event_id = event_id.to_string();
        self.db
            .with_conn(move |conn| Box::pin(Self::next_attempt_number_impl_conn(conn, event_id)))
            .await
    }

    async fn insert_next(
        &self,
        row: &DeliveryAttemptRow,
    ) -> Result<DeliveryAttemptRow, DeliveryAttemptRepositoryError> {
        let row = row.clone();
        self.db
            .with_tx(move |conn| Box::pin(Self::insert_next_impl_tx(conn, row)))
            .await
    }

    async fn list_by_event(
        &self,
        event_id: &str,
    ) -> Result<Vec<DeliveryAttemptRow>, DeliveryAttemptRepositoryError> {
        let event_id = event_id.to_string();
        self.db
            .with_conn(move |conn| Box::pin(Self::list_by_event_impl_conn(conn, event_id)))
            .await
    }
}
