use crate::infrastructure::db::database::{Database, DatabaseError};
use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::future::Future;
use std::pin::Pin;

pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn with_conn<T, E, F>(&self, f: F) -> Result<T, E>
    where
        for<'c> F: FnOnce(
            &'c mut sqlx::PgConnection,
        ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>,
        E: From<DatabaseError>,
    {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        f(&mut conn).await
    }

    /// Run `f` inside a transaction; commit on `Ok`, roll back on `Err`.
    pub async fn with_tx<T, E, F>(&self, f: F) -> Result<T, E>
    where
        for<'c> F: FnOnce(
            &'c mut sqlx::PgConnection,
        ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>,
        E: From<DatabaseError>,
    {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        let result = f(&mut *tx).await;
        match result {
            Ok(value) => {
                tx.commit()
                    .await
                    .map_err(|e| DatabaseError::Query(e.to_string()))?;
                Ok(value)
            }
            Err(err) => {
                let _ = tx.rollback().await;
                Err(err)
            }
        }
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    async fn execute(&self, query: &str) -> Result<u64, DatabaseError> {
        let result = sqlx::query(query)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        Ok(result.rows_affected())
    }
}
