use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::{EventSummaryRow, WebhookEventRow};
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::stores::webhook_event_store::{
    WebhookEventRepositoryError, WebhookEventStore,
};
use async_trait::async_trait;
use sqlx::PgConnection;
use std::sync::Arc;

pub struct WebhookEventStorePostgres {
    db: Arc<PostgresDatabase>,
}

impl WebhookEventStorePostgres {
    /// Build a Postgres-backed webhook event store.
    pub fn new(db: Arc<PostgresDatabase>) -> Self {
        Self { db }
    }

    async fn insert_if_absent_impl_conn(
        conn: &mut PgConnection,
        row: &WebhookEventRow,
    ) -> Result<bool, WebhookEventRepositoryError> {
        let result = sqlx::query(
            "INSERT INTO webhook_events (
                event_id,
                env,
                event_type,
                order_id,
                signature_ok,
                event_timestamp,
                received_at,
                delta_ms,
                payload_json,
                headers_json
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
            ON CONFLICT (event_id) DO NOTHING",
        )
        .bind(&row.event_id)
        .bind(&row.env)
        .bind(&row.event_type)
        .bind(&row.order_id)
        .bind(row.signature_ok)
        .bind(row.event_timestamp)
        .bind(row.received_at)
        .bind(row.delta_ms)
        .bind(&row.payload_json)
        .bind(&row.headers_json)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(result.rows_affected() == 1)
    }

    async fn get_impl_conn(
        conn: &mut PgConnection,
        event_id: String,
    ) -> Result<Option<WebhookEventRow>, WebhookEventRepositoryError> {
        let row = sqlx::query_as::<_, WebhookEventRow>(
            "SELECT
                event_id,
                env,
                event_type,
                order_id,
                signature_ok,
                event_timestamp,
                received_at,
                delta_ms,
                payload_json,
                headers_json
            FROM webhook_events
            WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(row)
    }

    async fn list_impl_conn(
        conn: &mut PgConnection,
        order_id: Option<String>,
        limit: u32,
    ) -> Result<Vec<EventSummaryRow>, WebhookEventRepositoryError> {
        let rows = sqlx::query_as::<_, EventSummaryRow>(
            "SELECT
                e.event_id,
                e.env,
                e.event_type,
                e.order_id,
                e.signature_ok,
                e.event_timestamp,
                e.received_at,
                e.delta_ms,
                COUNT(d.id) AS attempt_count
            FROM webhook_events e
            LEFT JOIN webhook_deliveries d ON d.event_id = e.event_id
            WHERE ($1::TEXT IS NULL OR e.order_id = $1)
            GROUP BY e.event_id
            ORDER BY e.received_at DESC, e.event_id DESC
            LIMIT $2",
        )
        .bind(order_id)
        .bind(i64::from(limit))
        .fetch_all(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(rows)
    }
}

#[async_trait]
impl WebhookEventStore for WebhookEventStorePostgres {
    async fn insert_if_absent(
        &self,
        row: &WebhookEventRow,
    ) -> Result<bool, WebhookEventRepositoryError> {
        let row = row.clone();
        self.db
            .with_conn(move |conn| {
                let row = row;
                Box::pin(async move { Self::insert_if_absent_impl_conn(conn, &row).await })
            })
            .await
    }

    async fn get(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRow>, WebhookEventRepositoryError> {
        let event_id = event_id.to_string();
        self.db
            .with_conn(move |conn| Box::pin(Self::get_impl_conn(conn, event_id)))
            .await
    }

    async fn list_by_order_id(
        &self,
        order_id: &str,
        limit: u32,
    ) -> Result<Vec<EventSummaryRow>, WebhookEventRepositoryError> {
        let order_id = Some(order_id.to_string());
        self.db
            .with_conn(move |conn| Box::pin(Self::list_impl_conn(conn, order_id, limit)))
            .await
    }

    async fn list_recent(
        &self,
        limit: u32,
    ) -> Result<Vec<EventSummaryRow>, WebhookEventRepositoryError> {
        self.db
            .with_conn(move |conn| Box::pin(Self::list_impl_conn(conn, None, limit)))
            .await
    }
}
