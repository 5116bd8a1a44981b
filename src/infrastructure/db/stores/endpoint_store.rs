use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::{EndpointRow, EndpointUpdateRow, NewEndpointRow};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRepositoryError {
    NotFound,
    Conflict,
    InvalidInput,
    StorageUnavailable,
}

impl From<DatabaseError> for EndpointRepositoryError {
    fn from(err: DatabaseError) -> Self {
        if err.is_unique_violation() {
            return EndpointRepositoryError::Conflict;
        }
        EndpointRepositoryError::StorageUnavailable
    }
}

#[async_trait]
pub trait EndpointStore: Send + Sync {
    /// Fetch an endpoint by id. Returns `None` if it doesn't exist.
    async fn get(&self, id: i64) -> Result<Option<EndpointRow>, EndpointRepositoryError>;
    /// Fetch the active endpoint of an environment, if any.
    async fn get_active(&self, env: &str) -> Result<Option<EndpointRow>, EndpointRepositoryError>;
    /// List an environment's endpoints, oldest first.
    async fn list_by_env(&self, env: &str) -> Result<Vec<EndpointRow>, EndpointRepositoryError>;
    /// Insert an endpoint. An active insert deactivates its siblings in the same transaction.
    async fn insert(&self, row: &NewEndpointRow) -> Result<EndpointRow, EndpointRepositoryError>;
    /// Apply a partial update. Activation deactivates siblings in the same transaction.
    async fn update(
        &self,
        id: i64,
        fields: &EndpointUpdateRow,
    ) -> Result<EndpointRow, EndpointRepositoryError>;
    /// Set mode and timeout on every endpoint of `env`, inserting `fallback` when there are none.
    /// Returns the number of rows touched.
    async fn upsert_mode(
        &self,
        env: &str,
        delivery_mode: &str,
        timeout_ms: i32,
        fallback: &NewEndpointRow,
    ) -> Result<u64, EndpointRepositoryError>;
}
