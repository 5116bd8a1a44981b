// Use case: get_event.

use crate::application::context::AppContext;
use crate::domain::entities::delivery_attempt::DeliveryAttempt;
use crate::domain::entities::webhook_event::WebhookEvent;
use crate::domain::value_objects::ids::EventId;

/// Loads an event with its full delivery history.
pub struct GetEventUseCase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetEventError {
    NotFound,
    Storage(String),
}

#[derive(Debug, Clone)]
pub struct GetEventResult {
    pub event: WebhookEvent,
    pub deliveries: Vec<DeliveryAttempt>,
    pub retry_count: usize,
    pub delta_seconds: Option<i64>,
}

impl GetEventUseCase {
    pub async fn execute(ctx: &AppContext, event_id: &str) -> Result<GetEventResult, GetEventError> {
        let event_id = EventId::new(event_id);

        // Step 1: Load the event.
        let event = ctx
            .repos
            .event
            .get(&event_id)
            .await
            .map_err(|e| GetEventError::Storage(format!("{e:?}")))?
            .ok_or(GetEventError::NotFound)?;

        // Step 2: Load attempts in attempt order.
        let deliveries = ctx
            .repos
            .delivery
            .list_by_event(&event_id)
            .await
            .map_err(|e| GetEventError::Storage(format!("{e:?}")))?;

        Ok(GetEventResult {
            retry_count: deliveries.len(),
            delta_seconds: event.delta_seconds(),
            event,
            deliveries,
        })
    }
}
