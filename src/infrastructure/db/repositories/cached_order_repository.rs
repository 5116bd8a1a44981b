use crate::domain::entities::cached_order::CachedOrder;
use crate::domain::services::order_projection::{OrderUpdate, apply};
use crate::domain::value_objects::environment::Environment;
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::db::dto::CachedOrderRow;
use crate::infrastructure::db::stores::cached_order_store::{
    CachedOrderRepositoryError, CachedOrderStore,
};
use std::sync::Arc;

pub struct CachedOrderRepository {
    store: Arc<dyn CachedOrderStore>,
}

impl CachedOrderRepository {
    /// Build a repository that uses the given store implementation.
    pub fn new(store: Arc<dyn CachedOrderStore>) -> Self {
        Self { store }
    }

    pub async fn get(
        &self,
        env: Environment,
        order_id: &str,
    ) -> Result<Option<CachedOrder>, CachedOrderRepositoryError> {
        let row = self.store.get(env.as_str(), order_id).await?;
        Ok(row.map(|row| row.into_order()))
    }

    /// Fold one update into the stored projection and return the result.
    pub async fn apply_update(
        &self,
        update: &OrderUpdate,
    ) -> Result<CachedOrder, CachedOrderRepositoryError> {
        // Step 1: Load the current projection.
        let current = self.get(update.env, &update.order_id).await?;

        // Step 2: Reduce.
        let next = apply(current, update, Timestamp::now_utc());

        // Step 3: Write back.
        let stored = self.store.upsert(&CachedOrderRow::from_order(&next)).await?;
        Ok(stored.into_order())
    }

    pub async fn list(
        &self,
        env: Environment,
        limit: u32,
    ) -> Result<Vec<CachedOrder>, CachedOrderRepositoryError> {
        let rows = self.store.list_by_env(env.as_str(), limit).await?;
        Ok(rows.into_iter().map(|row| row.into_order()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::cached_order::OrderStatus;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct DummyStore {
        pub row: Mutex<Option<CachedOrderRow>>,
    }

    #[async_trait]
    impl CachedOrderStore for DummyStore {
        async fn get(
            &self,
            _env: &str,
            _order_id: &str,
        ) -> Result<Option<CachedOrderRow>, CachedOrderRepositoryError> {
            Ok(self.row.lock().unwrap().clone())
        }

        async fn upsert(
            &self,
            row: &CachedOrderRow,
        ) -> Result<CachedOrderRow, CachedOrderRepositoryError> {
            *self.row.lock().unwrap() = Some(row.clone());
            Ok(row.clone())
        }

        async fn list_by_env(
            &self,
            _env: &str,
            _limit: u32,
        ) -> Result<Vec<CachedOrderRow>, CachedOrderRepositoryError> {
            Ok(self.row.lock().unwrap().clone().into_iter().collect())
        }
    }

    fn update(status: OrderStatus, amount: Option<i64>) -> OrderUpdate {
        OrderUpdate {
            env: Environment::Sandbox,
            order_id: "ord_9".to_string(),
            status,
            amount_cents: amount,
            currency: None,
            charge_id: None,
            txid: None,
        }
    }

    #[tokio::test]
    async fn given_sequence_of_updates_when_applied_should_keep_first_amount() {
        let repo = CachedOrderRepository::new(Arc::new(DummyStore {
            row: Mutex::new(None),
        }));

        repo.apply_update(&update(OrderStatus::Created, Some(5000)))
            .await
            .unwrap();
        let order = repo
            .apply_update(&update(OrderStatus::Released, None))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Released);
        assert_eq!(order.amount_cents, Some(5000));
        assert_eq!(repo.list(Environment::Sandbox, 10).await.unwrap().len(), 1);
    }
}
