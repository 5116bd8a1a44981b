// Use case: list_events.

use crate::application::context::AppContext;
use crate::domain::entities::webhook_event::EventSummary;
use crate::infrastructure::db::repositories::webhook_event_repository::MAX_LIST_LIMIT;

/// Lists events for one order, or the most recent events when no order is given.
pub struct ListEventsUseCase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEventsError {
    Storage(String),
}

#[derive(Debug, Clone, Default)]
pub struct ListEventsQuery {
    pub order_id: Option<String>,
    pub limit: Option<u32>,
}

impl ListEventsUseCase {
    pub async fn execute(
        ctx: &AppContext,
        query: ListEventsQuery,
    ) -> Result<Vec<EventSummary>, ListEventsError> {
        let limit = query.limit.unwrap_or(MAX_LIST_LIMIT);
        let order_id = query
            .order_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());

        let events = match order_id {
            Some(order_id) => ctx.repos.event.list_by_order_id(order_id, limit).await,
            None => ctx.repos.event.list_recent(limit).await,
        };
        events.map_err(|e| ListEventsError::Storage(format!("{e:?}")))
    }
}
