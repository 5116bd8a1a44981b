use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::CachedOrderRow;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachedOrderRepositoryError {
    NotFound,
    Conflict,
    InvalidInput,
    StorageUnavailable,
}

impl From<DatabaseError> for CachedOrderRepositoryError {
    fn from(_: DatabaseError) -> Self {
        CachedOrderRepositoryError::StorageUnavailable
    }
}

#[async_trait]
pub trait CachedOrderStore: Send + Sync {
    /// Fetch one cached order. Returns `None` if it was never projected.
    async fn get(
        &self,
        env: &str,
        order_id: &str,
    ) -> Result<Option<CachedOrderRow>, CachedOrderRepositoryError>;
    /// Insert or overwrite the projection keyed by `(env, order_id)`.
    async fn upsert(
        &self,
        row: &CachedOrderRow,
    ) -> Result<CachedOrderRow, CachedOrderRepositoryError>;
    /// Most recently updated orders of an environment.
    async fn list_by_env(
        &self,
        env: &str,
        limit: u32,
    ) -> Result<Vec<CachedOrderRow>, CachedOrderRepositoryError>;
}
