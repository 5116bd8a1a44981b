use crate::domain::entities::webhook_event::{EventSummary, WebhookEvent};
use crate::domain::value_objects::ids::EventId;
use crate::infrastructure::db::dto::WebhookEventRow;
use crate::infrastructure::db::stores::webhook_event_store::{
    WebhookEventRepositoryError, WebhookEventStore,
};
use std::sync::Arc;

/// Upper bound for any event listing.
pub const MAX_LIST_LIMIT: u32 = 50;

pub struct WebhookEventRepository {
    store: Arc<dyn WebhookEventStore>,
}

impl WebhookEventRepository {
    /// Build a repository that uses the given store implementation.
    pub fn new(store: Arc<dyn WebhookEventStore>) -> Self {
        Self { store }
    }

    /// Record an event unless its id was already seen. Returns `true` for a first sighting.
    pub async fn record_if_new(&self, event: &WebhookEvent) -> Result<bool, WebhookEventRepositoryError> {
        let dto = WebhookEventRow::from_event(event);
        match self.store.insert_if_absent(&dto).await {
            Ok(inserted) => Ok(inserted),
            // A racing insert of the same id is still a duplicate, not a failure.
            Err(WebhookEventRepositoryError::Conflict) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Fetch an event by id. Returns `None` if it doesn't exist.
    pub async fn get(&self, event_id: &EventId) -> Result<Option<WebhookEvent>, WebhookEventRepositoryError> {
        let row = self.store.get(event_id.as_str()).await?;
        Ok(row.map(|row| row.into_event()))
    }

    /// Events for one order, newest first, capped at [`MAX_LIST_LIMIT`].
    pub async fn list_by_order_id(
        &self,
        order_id: &str,
        limit: u32,
    ) -> Result<Vec<EventSummary>, WebhookEventRepositoryError> {
        let rows = self
            .store
            .list_by_order_id(order_id, clamp_limit(limit))
            .await?;
        Ok(rows.into_iter().map(|row| row.into_summary()).collect())
    }

    /// Most recent events system-wide, capped at [`MAX_LIST_LIMIT`].
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<EventSummary>, WebhookEventRepositoryError> {
        let rows = self.store.list_recent(clamp_limit(limit)).await?;
        Ok(rows.into_iter().map(|row| row.into_summary()).collect())
    }
}

fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_LIST_LIMIT)
}
