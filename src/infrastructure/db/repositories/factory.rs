use std::sync::Arc;

use crate::infrastructure::db::database::{Database, DatabaseError};
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::postgres::cached_order_store_postgres::CachedOrderStorePostgres;
use crate::infrastructure::db::postgres::delivery_attempt_store_postgres::DeliveryAttemptStorePostgres;
use crate::infrastructure::db::postgres::endpoint_store_postgres::EndpointStorePostgres;
use crate::infrastructure::db::postgres::webhook_event_store_postgres::WebhookEventStorePostgres;
use crate::infrastructure::db::repositories::cached_order_repository::CachedOrderRepository;
use crate::infrastructure::db::repositories::delivery_attempt_repository::DeliveryAttemptRepository;
use crate::infrastructure::db::repositories::endpoint_repository::EndpointRepository;
use crate::infrastructure::db::repositories::webhook_event_repository::WebhookEventRepository;
use crate::infrastructure::db::stores::cached_order_store::CachedOrderStore;
use crate::infrastructure::db::stores::delivery_attempt_store::DeliveryAttemptStore;
use crate::infrastructure::db::stores::endpoint_store::EndpointStore;
use crate::infrastructure::db::stores::webhook_event_store::WebhookEventStore;

#[derive(Clone)]
pub struct Repositories {
    pub db: Option<Arc<dyn Database>>,
    pub endpoint: Arc<EndpointRepository>,
    pub event: Arc<WebhookEventRepository>,
    pub delivery: Arc<DeliveryAttemptRepository>,
    pub order: Arc<CachedOrderRepository>,
}

impl Repositories {
    /// Build all repositories backed by Postgres stores.
    pub fn postgres(db: Arc<PostgresDatabase>) -> Self {
        let endpoint_store = Arc::new(EndpointStorePostgres::new(db.clone()));
        let event_store = Arc::new(WebhookEventStorePostgres::new(db.clone()));
        let delivery_store = Arc::new(DeliveryAttemptStorePostgres::new(db.clone()));
        let order_store = Arc::new(CachedOrderStorePostgres::new(db.clone()));
        let handle: Arc<dyn Database> = db;

        Self {
            db: Some(handle),
            endpoint: Arc::new(EndpointRepository::new(endpoint_store)),
            event: Arc::new(WebhookEventRepository::new(event_store)),
            delivery: Arc::new(DeliveryAttemptRepository::new(delivery_store)),
            order: Arc::new(CachedOrderRepository::new(order_store)),
        }
    }

    /// Build repositories over arbitrary store implementations, without a database handle.
    pub fn from_stores(
        endpoint: Arc<dyn EndpointStore>,
        event: Arc<dyn WebhookEventStore>,
        delivery: Arc<dyn DeliveryAttemptStore>,
        order: Arc<dyn CachedOrderStore>,
    ) -> Self {
        Self {
            db: None,
            endpoint: Arc::new(EndpointRepository::new(endpoint)),
            event: Arc::new(WebhookEventRepository::new(event)),
            delivery: Arc::new(DeliveryAttemptRepository::new(delivery)),
            order: Arc::new(CachedOrderRepository::new(order)),
        }
    }

    /// Execute a raw SQL statement outside a transaction.
    pub async fn execute(&self, query: &str) -> Result<u64, DatabaseError> {
        let Some(db) = self.db.as_ref() else {
            return Err(DatabaseError::Connection("db_unavailable".to_string()));
        };
        db.execute(query).await
    }
}
