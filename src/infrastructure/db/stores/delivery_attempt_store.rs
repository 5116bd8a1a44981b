use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::DeliveryAttemptRow;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryAttemptRepositoryError {
    NotFound,
    Conflict,
    InvalidInput,
    StorageUnavailable,
}

impl From<DatabaseError> for DeliveryAttemptRepositoryError {
    fn from(err: DatabaseError) -> Self {
        if err.is_unique_violation() {
            return DeliveryAttemptRepositoryError::Conflict;
        }
        DeliveryAttemptRepositoryError::StorageUnavailable
    }
}

#[async_trait]
pub trait DeliveryAttemptStore: Send + Sync {
    /// Current highest attempt number plus one. Advisory: a concurrent writer may take it first.
    async fn next_attempt_number(
        &self,
        event_id: &str,
    ) -> Result<i32, DeliveryAttemptRepositoryError>;
    /// Insert an attempt under the next free number for its event, ignoring
    /// `row.attempt_number`. Concurrent callers for one event are serialized.
    async fn insert_next(
        &self,
        row: &DeliveryAttemptRow,
    ) -> Result<DeliveryAttemptRow, DeliveryAttemptRepositoryError>;
    /// All attempts for an event ordered by attempt number.
    async fn list_by_event(
        &self,
        event_id: &str,
    ) -> Result<Vec<DeliveryAttemptRow>, DeliveryAttemptRepositoryError>;
}
