use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::CachedOrderRow;
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::stores::cached_order_store::{
    CachedOrderRepositoryError, CachedOrderStore,
};
use async_trait::async_trait;
use sqlx::PgConnection;
use std::sync::Arc;

pub struct CachedOrderStorePostgres {
    db: Arc<PostgresDatabase>,
}

impl CachedOrderStorePostgres {
    /// Build a Postgres-backed cached order store.
    pub fn new(db: Arc<PostgresDatabase>) -> Self {
        Self { db }
    }

    async fn get_impl_conn(
        conn: &mut PgConnection,
        env: String,
        order_id: String,
    ) -> Result<Option<CachedOrderRow>, CachedOrderRepositoryError> {
        let row = sqlx::query_as::<_, CachedOrderRow>(
            "SELECT
                env,
                order_id,
                amount_cents,
                currency,
                status,
                charge_id,
                txid,
                created_at,
                updated_at
            FROM cached_orders
            WHERE env = $1 AND order_id = $2",
        )
        .bind(env)
        .bind(order_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(row)
    }

    async fn upsert_impl_conn(
        conn: &mut PgConnection,
        row: &CachedOrderRow,
    ) -> Result<CachedOrderRow, CachedOrderRepositoryError> {
        // A concurrent writer may have inserted since the caller read; keep any amount it set.
        let stored = sqlx::query_as::<_, CachedOrderRow>(
            "INSERT INTO cached_orders (
                env,
                order_id,
                amount_cents,
                currency,
                status,
                charge_id,
                txid,
                created_at,
                updated_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
            ON CONFLICT (env, order_id) DO UPDATE SET
                amount_cents = COALESCE(EXCLUDED.amount_cents, cached_orders.amount_cents),
                currency = EXCLUDED.currency,
                status = EXCLUDED.status,
                charge_id = COALESCE(EXCLUDED.charge_id, cached_orders.charge_id),
                txid = COALESCE(EXCLUDED.txid, cached_orders.txid),
                updated_at = EXCLUDED.updated_at
            RETURNING
                env,
                order_id,
                amount_cents,
                currency,
                status,
                charge_id,
                txid,
                created_at,
                updated_at",
        )
        .bind(&row.env)
        .bind(&row.order_id)
        .bind(row.amount_cents)
        .bind(&row.currency)
        .bind(&row.status)
        .bind(&row.charge_id)
        .bind(&row.txid)
        .bind(row.created_at)
        .bind(row.updated_at)
        .fetch_one(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(stored)
    }

    async fn list_by_env_impl_conn(
        conn: &mut PgConnection,
        env: String,
        limit: u32,
    ) -> Result<Vec<CachedOrderRow>, CachedOrderRepositoryError> {
        let rows = sqlx::query_as::<_, CachedOrderRow>(
            "SELECT
                env,
                order_id,
                amount_cents,
                currency,
                status,
                charge_id,
                txid,
                created_at,
                updated_at
            FROM cached_orders
            WHERE env = $1
            ORDER BY updated_at DESC, order_id ASC
            LIMIT $2",
        )
        .bind(env)
        .bind(i64::from(limit))
        .fetch_all(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(rows)
    }
}

#[async_trait]
impl CachedOrderStore for CachedOrderStorePostgres {
    async fn get(
        &self,
        env: &str,
        order_id: &str,
    ) -> Result<Option<CachedOrderRow>, CachedOrderRepositoryError> {
        let env = env.to_string();
        let order_id = order_id.to_string();
        self.db
            .with_conn(move |conn| Box::pin(Self::get_impl_conn(conn, env, order_id)))
            .await
    }

    async fn upsert(
        &self,
        row: &CachedOrderRow,
    ) -> Result<CachedOrderRow, CachedOrderRepositoryError> {
        let row = row.clone();
        self.db
            .with_conn(move |conn| {
                let row = row;
                Box::pin(async move { Self::upsert_impl_conn(conn, &row).await })
            })
            .await
    }

    async fn list_by_env(
        &self,
        env: &str,
        limit: u32,
    ) -> Result<Vec<CachedOrderRow>, CachedOrderRepositoryError> {
        let env = env.to_string();
        self.db
            .with_conn(move |conn| Box::pin(Self::list_by_env_impl_conn(conn, env, limit)))
            .await
    }
}
