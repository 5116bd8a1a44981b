use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::{EventSummaryRow, WebhookEventRow};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEventRepositoryError {
    NotFound,
    Conflict,
    InvalidInput,
    StorageUnavailable,
}

impl From<DatabaseError> for WebhookEventRepositoryError {
    fn from(err: DatabaseError) -> Self {
        if err.is_unique_violation() {
            return WebhookEventRepositoryError::Conflict;
        }
        WebhookEventRepositoryError::StorageUnavailable
    }
}

#[async_trait]
pub trait WebhookEventStore: Send + Sync {
    /// Insert unless an event with the same id exists. Returns `true` when a row was written.
    async fn insert_if_absent(
        &self,
        row: &WebhookEventRow,
    ) -> Result<bool, WebhookEventRepositoryError>;
    /// Fetch an event by its provider id. Returns `None` if it doesn't exist.
    async fn get(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRow>, WebhookEventRepositoryError>;
    /// Events of one order with their attempt counts, newest first.
    async fn list_by_order_id(
        &self,
        order_id: &str,
        limit: u32,
    ) -> Result<Vec<EventSummaryRow>, WebhookEventRepositoryError>;
    /// Most recent events across all orders, newest first.
    async fn list_recent(
        &self,
        limit: u32,
    ) -> Result<Vec<EventSummaryRow>, WebhookEventRepositoryError>;
}
