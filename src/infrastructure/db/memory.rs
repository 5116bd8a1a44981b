//! Process-local stores with the same constraints as the Postgres schema.
//!
//! Used when no database URL is configured and by tests. Everything lives behind one mutex,
//! which makes every trait method atomic.

use crate::infrastructure::db::dto::{
    CachedOrderRow, DeliveryAttemptRow, EndpointRow, EndpointUpdateRow, EventSummaryRow,
    NewEndpointRow, WebhookEventRow,
};
use crate::infrastructure::db::repositories::Repositories;
use crate::infrastructure::db::stores::cached_order_store::{
    CachedOrderRepositoryError, CachedOrderStore,
};
use crate::infrastructure::db::stores::delivery_attempt_store::{
    DeliveryAttemptRepositoryError, DeliveryAttemptStore,
};
use crate::infrastructure::db::stores::endpoint_store::{EndpointRepositoryError, EndpointStore};
use crate::infrastructure::db::stores::webhook_event_store::{
    WebhookEventRepositoryError, WebhookEventStore,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use time::OffsetDateTime;

#[derive(Default)]
struct MemoryState {
    next_endpoint_id: i64,
    endpoints: Vec<EndpointRow>,
    events: Vec<WebhookEventRow>,
    deliveries: Vec<DeliveryAttemptRow>,
    orders: Vec<CachedOrderRow>,
}

impl MemoryState {
    fn insert_endpoint(&mut self, row: &NewEndpointRow) -> EndpointRow {
        if row.is_active {
            self.deactivate(&row.env, None);
        }
        self.next_endpoint_id += 1;
        let now = OffsetDateTime::now_utc();
        let stored = EndpointRow {
            id: self.next_endpoint_id,
            env: row.env.clone(),
            url: row.url.clone(),
            secret: row.secret.clone(),
            is_active: row.is_active,
            delivery_mode: row.delivery_mode.clone(),
            timeout_ms: row.timeout_ms,
            created_at: now,
            updated_at: now,
        };
        self.endpoints.push(stored.clone());
        stored
    }

    fn deactivate(&mut self, env: &str, keep_id: Option<i64>) {
        let now = OffsetDateTime::now_utc();
        for endpoint in self
            .endpoints
            .iter_mut()
            .filter(|e| e.env == env && e.is_active && Some(e.id) != keep_id)
        {
            endpoint.is_active = false;
            endpoint.updated_at = now;
        }
    }

    fn summary(&self, event: &WebhookEventRow) -> EventSummaryRow {
        let attempt_count = self
            .deliveries
            .iter()
            .filter(|d| d.event_id == event.event_id)
            .count() as i64;
        EventSummaryRow {
            event_id: event.event_id.clone(),
            env: event.env.clone(),
            event_type: event.event_type.clone(),
            order_id: event.order_id.clone(),
            signature_ok: event.signature_ok,
            event_timestamp: event.event_timestamp,
            received_at: event.received_at,
            delta_ms: event.delta_ms,
            attempt_count,
        }
    }

    fn list_events(&self, order_id: Option<&str>, limit: u32) -> Vec<EventSummaryRow> {
        let mut matching: Vec<&WebhookEventRow> = self
            .events
            .iter()
            .filter(|e| order_id.map_or(true, |id| e.order_id == id))
            .collect();
        matching.sort_by(|a, b| {
            b.received_at
                .cmp(&a.received_at)
                .then_with(|| b.event_id.cmp(&a.event_id))
        });
        matching
            .into_iter()
            .take(limit as usize)
            .map(|e| self.summary(e))
            .collect()
    }
}

/// In-memory implementation of every store trait.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panic while holding the lock leaves plain data behind, so keep using it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Repositories {
    /// Repositories over one shared [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::with_memory_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_memory_store(store: Arc<MemoryStore>) -> Self {
        Self::from_stores(store.clone(), store.clone(), store.clone(), store)
    }
}

#[async_trait]
impl EndpointStore for MemoryStore {
    async fn get(&self, id: i64) -> Result<Option<EndpointRow>, EndpointRepositoryError> {
        Ok(self.lock().endpoints.iter().find(|e| e.id == id).cloned())
    }

    async fn get_active(&self, env: &str) -> Result<Option<EndpointRow>, EndpointRepositoryError> {
        Ok(self
            .lock()
            .endpoints
            .iter()
            .find(|e| e.env == env && e.is_active)
            .cloned())
    }

    async fn list_by_env(&self, env: &str) -> Result<Vec<EndpointRow>, EndpointRepositoryError> {
        let mut rows: Vec<EndpointRow> = self
            .lock()
            .endpoints
            .iter()
            .filter(|e| e.env == env)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn insert(&self, row: &NewEndpointRow) -> Result<EndpointRow, EndpointRepositoryError> {
        Ok(self.lock().insert_endpoint(row))
    }

    async fn update(
        &self,
        id: i64,
        fields: &EndpointUpdateRow,
    ) -> Result<EndpointRow, EndpointRepositoryError> {
        let mut state = self.lock();
        let env = state
            .endpoints
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.env.clone())
            .ok_or(EndpointRepositoryError::NotFound)?;
        if fields.activates() {
            state.deactivate(&env, Some(id));
        }
        let endpoint = state
            .endpoints
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(EndpointRepositoryError::NotFound)?;
        if let Some(url) = &fields.url {
            endpoint.url = url.clone();
        }
        if let Some(secret) = &fields.secret {
            endpoint.secret = secret.clone();
        }
        if let Some(is_active) = fields.is_active {
            endpoint.is_active = is_active;
        }
        endpoint.updated_at = OffsetDateTime::now_utc();
        Ok(endpoint.clone())
    }

    async fn upsert_mode(
        &self,
        env: &str,
        delivery_mode: &str,
        timeout_ms: i32,
        fallback: &NewEndpointRow,
    ) -> Result<u64, EndpointRepositoryError> {
        let mut state = self.lock();
        let now = OffsetDateTime::now_utc();
        let mut touched = 0;
        for endpoint in state.endpoints.iter_mut().filter(|e| e.env == env) {
            endpoint.delivery_mode = delivery_mode.to_string();
            endpoint.timeout_ms = timeout_ms;
            endpoint.updated_at = now;
            touched += 1;
        }
        if touched > 0 {
            return Ok(touched);
        }
        let seeded = NewEndpointRow {
            env: env.to_string(),
            delivery_mode: delivery_mode.to_string(),
            timeout_ms,
            is_active: true,
            ..fallback.clone()
        };
        state.insert_endpoint(&seeded);
        Ok(1)
    }
}

#[async_trait]
impl WebhookEventStore for MemoryStore {
    async fn insert_if_absent(
        &self,
        row: &WebhookEventRow,
    ) -> Result<bool, WebhookEventRepositoryError> {
        let mut state = self.lock();
        if state.events.iter().any(|e| e.event_id == row.event_id) {
            return Ok(false);
        }
        state.events.push(row.clone());
        Ok(true)
    }

    async fn get(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRow>, WebhookEventRepositoryError> {
        Ok(self
            .lock()
            .events
            .iter()
            .find(|e| e.event_id == event_id)
            .cloned())
    }

    async fn list_by_order_id(
        &self,
        order_id: &str,
        limit: u32,
    ) -> Result<Vec<EventSummaryRow>, WebhookEventRepositoryError> {
        Ok(self.lock().list_events(Some(order_id), limit))
    }

    async fn list_recent(
        &self,
        limit: u32,
    ) -> Result<Vec<EventSummaryRow>, WebhookEventRepositoryError> {
        Ok(self.lock().list_events(None, limit))
    }
}

#[async_trait]
impl DeliveryAttemptStore for MemoryStore {
    async fn next_attempt_number(
        &self,
        event_id: &str,
    ) -> Result<i32, DeliveryAttemptRepositoryError> {
        let max = self
            .lock()
            .deliveries
            .iter()
            .filter(|d| d.event_id == event_id)
            .map(|d| d.attempt_number)
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    async fn insert_next(
        &self,
        row: &DeliveryAttemptRow,
    ) -> Result<DeliveryAttemptRow, DeliveryAttemptRepositoryError> {
        let mut state = self.lock();
        if !state.events.iter().any(|e| e.event_id == row.event_id) {
            return Err(DeliveryAttemptRepositoryError::InvalidInput);
        }
        let max = state
            .deliveries
            .iter()
            .filter(|d| d.event_id == row.event_id)
            .map(|d| d.attempt_number)
            .max()
            .unwrap_or(0);
        let stored = DeliveryAttemptRow {
            attempt_number: max + 1,
            ..row.clone()
        };
        state.deliveries.push(stored.clone());
        Ok(stored)
    }

    async fn list_by_event(
        &self,
        event_id: &str,
    ) -> Result<Vec<DeliveryAttemptRow>, DeliveryAttemptRepositoryError> {
        let mut rows: Vec<DeliveryAttemptRow> = self
            .lock()
            .deliveries
            .iter()
            .filter(|d| d.event_id == event_id)
            .cloned()
            .collect();
        rows.sort_by_key(|d| d.attempt_number);
        Ok(rows)
    }
}

#[async_trait]
impl CachedOrderStore for MemoryStore {
    async fn get(
        &self,
        env: &str,
        order_id: &str,
    ) -> Result<Option<CachedOrderRow>, CachedOrderRepositoryError> {
        Ok(self
            .lock()
            .orders
            .iter()
            .find(|o| o.env == env && o.order_id == order_id)
            .cloned())
    }

    async fn upsert(
        &self,
        row: &CachedOrderRow,
    ) -> Result<CachedOrderRow, CachedOrderRepositoryError> {
        let mut state = self.lock();
        match state
            .orders
            .iter_mut()
            .find(|o| o.env == row.env && o.order_id == row.order_id)
        {
            Some(existing) => {
                existing.amount_cents = row.amount_cents.or(existing.amount_cents);
                existing.currency = row.currency.clone();
                existing.status = row.status.clone();
                existing.charge_id = row.charge_id.clone().or(existing.charge_id.take());
                existing.txid = row.txid.clone().or(existing.txid.take());
                existing.updated_at = row.updated_at;
                Ok(existing.clone())
            }
            None => {
                state.orders.push(row.clone());
                Ok(row.clone())
            }
        }
    }

    async fn list_by_env(
        &self,
        env: &str,
        limit: u32,
    ) -> Result<Vec<CachedOrderRow>, CachedOrderRepositoryError> {
        let mut rows: Vec<CachedOrderRow> = self
            .lock()
            .orders
            .iter()
            .filter(|o| o.env == env)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.order_id.cmp(&b.order_id))
        });
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_endpoint(env: &str, active: bool) -> NewEndpointRow {
        NewEndpointRow {
            env: env.to_string(),
            url: "http://x".to_string(),
            secret: "s".to_string(),
            is_active: active,
            delivery_mode: "normal".to_string(),
            timeout_ms: 15000,
        }
    }

    #[tokio::test]
    async fn given_active_insert_when_sibling_active_should_swap() {
        let store = MemoryStore::new();
        let first = EndpointStore::insert(&store, &new_endpoint("sandbox", true))
            .await
            .unwrap();
        let other_env = EndpointStore::insert(&store, &new_endpoint("local", true))
            .await
            .unwrap();
        let second = EndpointStore::insert(&store, &new_endpoint("sandbox", true))
            .await
            .unwrap();

        let rows = EndpointStore::list_by_env(&store, "sandbox").await.unwrap();
        let active: Vec<i64> = rows.iter().filter(|e| e.is_active).map(|e| e.id).collect();
        assert_eq!(active, vec![second.id]);
        assert_ne!(first.id, second.id);
        assert!(store.get_active("local").await.unwrap().is_some_and(|e| e.id == other_env.id));
    }

    #[tokio::test]
    async fn given_empty_env_when_upsert_mode_should_seed_active_endpoint() {
        let store = MemoryStore::new();

        let touched = store
            .upsert_mode("staging", "offline", 1000, &new_endpoint("staging", false))
            .await
            .unwrap();

        assert_eq!(touched, 1);
        let active = store.get_active("staging").await.unwrap().unwrap();
        assert_eq!(active.delivery_mode, "offline");
        assert_eq!(active.timeout_ms, 1000);
    }

    fn event_row(event_id: &str) -> WebhookEventRow {
        WebhookEventRow {
            event_id: event_id.to_string(),
            env: "sandbox".to_string(),
            event_type: "order.created".to_string(),
            order_id: "ord_1".to_string(),
            signature_ok: true,
            event_timestamp: None,
            received_at: OffsetDateTime::now_utc(),
            delta_ms: None,
            payload_json: serde_json::json!({}),
            headers_json: serde_json::json!({}),
        }
    }

    fn delivery_row(event_id: &str) -> DeliveryAttemptRow {
        DeliveryAttemptRow {
            id: uuid::Uuid::new_v4(),
            event_id: event_id.to_string(),
            attempt_number: 0,
            status: "200".to_string(),
            error_message: None,
            mode_used: Some("normal".to_string()),
            latency_ms: Some(1),
            endpoint_id: None,
            endpoint_url_snapshot: None,
            received_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn given_many_concurrent_inserts_when_numbered_should_be_gapless() {
        let store = Arc::new(MemoryStore::new());
        store.insert_if_absent(&event_row("evt_busy")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..12 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.insert_next(&delivery_row("evt_busy")).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let numbers: Vec<i32> = DeliveryAttemptStore::list_by_event(store.as_ref(), "evt_busy")
            .await
            .unwrap()
            .iter()
            .map(|d| d.attempt_number)
            .collect();
        assert_eq!(numbers, (1..=12).collect::<Vec<i32>>());
    }

    #[tokio::test]
    async fn given_delivery_for_unknown_event_when_insert_should_reject() {
        let store = MemoryStore::new();
        let row = DeliveryAttemptRow {
            id: uuid::Uuid::new_v4(),
            event_id: "ghost".to_string(),
            attempt_number: 1,
            status: "200".to_string(),
            error_message: None,
            mode_used: None,
            latency_ms: None,
            endpoint_id: None,
            endpoint_url_snapshot: None,
            received_at: OffsetDateTime::now_utc(),
        };

        let result = store.insert_next(&row).await;

        assert_eq!(result.unwrap_err(), DeliveryAttemptRepositoryError::InvalidInput);
    }
}
