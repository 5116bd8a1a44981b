use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::{EndpointRow, EndpointUpdateRow, NewEndpointRow};
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::stores::endpoint_store::{EndpointRepositoryError, EndpointStore};
use async_trait::async_trait;
use sqlx::PgConnection;
use std::sync::Arc;

pub struct EndpointStorePostgres {
    db: Arc<PostgresDatabase>,
}

impl EndpointStorePostgres {
    /// Build a Postgres-backed endpoint store.
    pub fn new(db: Arc<PostgresDatabase>) -> Self {
        Self { db }
    }

    /// Serialize writers of one environment until the surrounding transaction ends.
    async fn lock_env_conn(conn: &mut PgConnection, env: &str) -> Result<(), EndpointRepositoryError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext('webhook_endpoints:' || $1))")
            .bind(env)
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        Ok(())
    }

    async fn deactivate_siblings_conn(
        conn: &mut PgConnection,
        env: &str,
        keep_id: Option<i64>,
    ) -> Result<(), EndpointRepositoryError> {
        sqlx::query(
            "UPDATE webhook_endpoints
            SET is_active = FALSE, updated_at = now()
            WHERE env = $1
                AND is_active
                AND ($2::BIGINT IS NULL OR id <> $2)",
        )
        .bind(env)
        .bind(keep_id)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        Ok(())
    }

    async fn get_impl_conn(
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<EndpointRow>, EndpointRepositoryError> {
        let row = sqlx::query_as::<_, EndpointRow>(
            "SELECT
                id,
                env,
                url,
                secret,
                is_active,
                delivery_mode,
                timeout_ms,
                created_at,
                updated_at
            FROM webhook_endpoints
            WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(row)
    }

    async fn get_active_impl_conn(
        conn: &mut PgConnection,
        env: String,
    ) -> Result<Option<EndpointRow>, EndpointRepositoryError> {
        let row = sqlx::query_as::<_, EndpointRow>(
            "SELECT
                id,
                env,
                url,
                secret,
                is_active,
                delivery_mode,
                timeout_ms,
                created_at,
                updated_at
            FROM webhook_endpoints
            WHERE env = $1 AND is_active
            LIMIT 1",
        )
        .bind(env)
        .fetch_optional(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(row)
    }

    async fn list_by_env_impl_conn(
        conn: &mut PgConnection,
        env: String,
    ) -> Result<Vec<EndpointRow>, EndpointRepositoryError> {
        let rows = sqlx::query_as::<_, EndpointRow>(
            "SELECT
                id,
                env,
                url,
                secret,
                is_active,
                delivery_mode,
                timeout_ms,
                created_at,
                updated_at
            FROM webhook_endpoints
            WHERE env = $1
            ORDER BY created_at ASC, id ASC",
        )
        .bind(env)
        .fetch_all(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(rows)
    }

    async fn insert_impl_conn(
        conn: &mut PgConnection,
        row: &NewEndpointRow,
    ) -> Result<EndpointRow, EndpointRepositoryError> {
        let stored = sqlx::query_as::<_, EndpointRow>(
            "INSERT INTO webhook_endpoints (
                env,
                url,
                secret,
                is_active,
                delivery_mode,
                timeout_ms
            )
            VALUES ($1,$2,$3,$4,$5,$6)
            RETURNING
                id,
                env,
                url,
                secret,
                is_active,
                delivery_mode,
                timeout_ms,
                created_at,
                updated_at",
        )
        .bind(&row.env)
        .bind(&row.url)
        .bind(&row.secret)
        .bind(row.is_active)
        .bind(&row.delivery_mode)
        .bind(row.timeout_ms)
        .fetch_one(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(stored)
    }

    async fn insert_impl_tx(
        conn: &mut PgConnection,
        row: NewEndpointRow,
    ) -> Result<EndpointRow, EndpointRepositoryError> {
        // Step 1: Lock the environment so concurrent activations queue up.
        Self::lock_env_conn(conn, &row.env).await?;

        // Step 2: An active insert takes over from the current active endpoint.
        if row.is_active {
            Self::deactivate_siblings_conn(conn, &row.env, None).await?;
        }

        // Step 3: Insert and return the stored row.
        Self::insert_impl_conn(conn, &row).await
    }

    async fn update_impl_tx(
        conn: &mut PgConnection,
        id: i64,
        fields: EndpointUpdateRow,
    ) -> Result<EndpointRow, EndpointRepositoryError> {
        // Step 1: Resolve the endpoint's environment.
        let Some(current) = Self::get_impl_conn(conn, id).await? else {
            return Err(EndpointRepositoryError::NotFound);
        };

        // Step 2: Activation swaps out every sibling under the environment lock.
        if fields.activates() {
            Self::lock_env_conn(conn, &current.env).await?;
            Self::deactivate_siblings_conn(conn, &current.env, Some(id)).await?;
        }

        // Step 3: Apply the present fields and return the stored row.
        let stored = sqlx::query_as::<_, EndpointRow>(
            "UPDATE webhook_endpoints SET
                url = COALESCE($2, url),
                secret = COALESCE($3, secret),
                is_active = COALESCE($4, is_active),
                updated_at = now()
            WHERE id = $1
            RETURNING
                id,
                env,
                url,
                secret,
                is_active,
                delivery_mode,
                timeout_ms,
                created_at,
                updated_at",
        )
        .bind(id)
        .bind(fields.url)
        .bind(fields.secret)
        .bind(fields.is_active)
        .fetch_optional(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        stored.ok_or(EndpointRepositoryError::NotFound)
    }

    async fn upsert_mode_impl_tx(
        conn: &mut PgConnection,
        env: String,
        delivery_mode: String,
        timeout_ms: i32,
        fallback: NewEndpointRow,
    ) -> Result<u64, EndpointRepositoryError> {
        // Step 1: Lock the environment.
        Self::lock_env_conn(conn, &env).await?;

        // Step 2: Update every endpoint of the environment.
        let result = sqlx::query(
            "UPDATE webhook_endpoints SET
                delivery_mode = $2,
                timeout_ms = $3,
                updated_at = now()
            WHERE env = $1",
        )
        .bind(&env)
        .bind(&delivery_mode)
        .bind(timeout_ms)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        if result.rows_affected() > 0 {
            return Ok(result.rows_affected());
        }

        // Step 3: Nothing registered yet, so seed an active default endpoint.
        let seeded = NewEndpointRow {
            env,
            delivery_mode,
            timeout_ms,
            is_active: true,
            ..fallback
        };
        Self::insert_impl_conn(conn, &seeded).await?;
        Ok(1)
    }
}

#[async_trait]
impl EndpointStore for EndpointStorePostgres {
    async fn get(&self, id: i64) -> Result<Option<EndpointRow>, EndpointRepositoryError> {
        self.db
            .with_conn(move |conn| Box::pin(Self::get_impl_conn(conn, id)))
            .await
    }

    async fn get_active(&self, env: &str) -> Result<Option<EndpointRow>, EndpointRepositoryError> {
        let env = env.to_string();
        self.db
            .with_conn(move |conn| Box::pin(Self::get_active_impl_conn(conn, env)))
            .await
    }

    async fn list_by_env(&self, env: &str) -> Result<Vec<EndpointRow>, EndpointRepositoryError> {
        let env = env.to_string();
        self.db
            .with_conn(move |conn| Box::pin(Self::list_by_env_impl_conn(conn, env)))
            .await
    }

    async fn insert(&self, row: &NewEndpointRow) -> Result<EndpointRow, EndpointRepositoryError> {
        let row = row.clone();
        self.db
            .with_tx(move |conn| Box::pin(Self::insert_impl_tx(conn, row)))
            .await
    }

    async fn update(
        &self,
        id: i64,
        fields: &EndpointUpdateRow,
    ) -> Result<EndpointRow, EndpointRepositoryError> {
        let fields = fields.clone();
        self.db
            .with_tx(move |conn| Box::pin(Self::update_impl_tx(conn, id, fields)))
            .await
    }

    async fn upsert_mode(
        &self,
        env: &str,
        delivery_mode: &str,
        timeout_ms: i32,
        fallback: &NewEndpointRow,
    ) -> Result<u64, EndpointRepositoryError> {
        let env = env.to_string();
        let delivery_mode = delivery_mode.to_string();
        let fallback = fallback.clone();
        self.db
            .with_tx(move |conn| {
                Box::pin(Self::upsert_mode_impl_tx(
                    conn,
                    env,
                    delivery_mode,
                    timeout_ms,
                    fallback,
                ))
            })
            .await
    }
}
