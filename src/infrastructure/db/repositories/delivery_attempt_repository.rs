use crate::domain::entities::delivery_attempt::{DeliveryAttempt, PendingAttempt};
use crate::domain::value_objects::ids::EventId;
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::db::dto::DeliveryAttemptRow;
use crate::infrastructure::db::stores::delivery_attempt_store::{
    DeliveryAttemptRepositoryError, DeliveryAttemptStore,
};
use std::sync::Arc;
use tracing::debug;

pub struct DeliveryAttemptRepository {
    store: Arc<dyn DeliveryAttemptStore>,
}

impl DeliveryAttemptRepository {
    /// Build a repository that uses the given store implementation.
    pub fn new(store: Arc<dyn DeliveryAttemptStore>) -> Self {
        Self { store }
    }

    /// Advisory next attempt number for an event.
    pub async fn next_attempt_number(
        &self,
        event_id: &EventId,
    ) -> Result<i32, DeliveryAttemptRepositoryError> {
        self.store.next_attempt_number(event_id.as_str()).await
    }

    /// Number and store an attempt.
    ///
    /// The store assigns `max + 1` and inserts in one step, serialized per event, so any
    /// number of concurrent writers get distinct, gapless numbers.
    pub async fn record(
        &self,
        pending: PendingAttempt,
    ) -> Result<DeliveryAttempt, DeliveryAttemptRepositoryError> {
        // The stored number replaces this placeholder.
        let attempt = pending.into_attempt(0, Timestamp::now_utc());
        let dto = DeliveryAttemptRow::from_attempt(&attempt);
        let stored = self.store.insert_next(&dto).await?;
        debug!(
            event_id = %stored.event_id,
            attempt_number = stored.attempt_number,
            "delivery attempt recorded"
        );
        Ok(stored.into_attempt())
    }

    /// Attempts for an event ordered by attempt number.
    pub async fn list_by_event(
        &self,
        event_id: &EventId,
    ) -> Result<Vec<DeliveryAttempt>, DeliveryAttemptRepositoryError> {
        let rows = self.store.list_by_event(event_id.as_str()).await?;
        Ok(rows.into_iter().map(|row| row.into_attempt()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::delivery_mode::DeliveryMode;
    use crate::infrastructure::db::dto::WebhookEventRow;
    use crate::infrastructure::db::memory::MemoryStore;
    use crate::infrastructure::db::stores::webhook_event_store::WebhookEventStore;
    use time::OffsetDateTime;

    async fn store_with_event(event_id: &str) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_if_absent(&WebhookEventRow {
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
            })
            .await
            .unwrap();
        store
    }

    fn pending() -> PendingAttempt {
        PendingAttempt {
            event_id: EventId::new("evt_1"),
            status: "200".to_string(),
            error_message: None,
            mode_used: DeliveryMode::Normal,
            latency_ms: 5,
            endpoint_id: None,
            endpoint_url_snapshot: None,
        }
    }

    #[tokio::test]
    async fn given_no_attempts_when_record_should_start_at_one() {
        let repo = DeliveryAttemptRepository::new(store_with_event("evt_1").await);

        let attempt = repo.record(pending()).await.unwrap();

        assert_eq!(attempt.attempt_number, 1);
        assert_eq!(repo.next_attempt_number(&EventId::new("evt_1")).await.unwrap(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn given_many_concurrent_writers_when_record_should_number_every_attempt() {
        let repo = Arc::new(DeliveryAttemptRepository::new(
            store_with_event("evt_1").await,
        ));

        // Step 1: Race more writers than any bounded retry scheme would survive.
        let mut handles = Vec::new();
        for _ in 0..12 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move { repo.record(pending()).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // Step 2: Every attempt landed under its own number.
        let numbers: Vec<i32> = repo
            .list_by_event(&EventId::new("evt_1"))
            .await
            .unwrap()
            .iter()
            .map(|a| a.attempt_number)
            .collect();
        assert_eq!(numbers, (1..=12).collect::<Vec<i32>>());
    }

    #[tokio::test]
    async fn given_unknown_event_when_record_should_reject() {
        let repo = DeliveryAttemptRepository::new(Arc::new(MemoryStore::new()));

        let err = repo.record(pending()).await.unwrap_err();

        assert_eq!(err, DeliveryAttemptRepositoryError::InvalidInput);
    }
}
