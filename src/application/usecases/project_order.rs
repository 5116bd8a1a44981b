// Use case: project_order.

use crate::application::context::AppContext;
use crate::domain::entities::cached_order::CachedOrder;
use crate::domain::services::order_projection::OrderUpdate;
use crate::domain::services::payload_fields::ExtractedFields;
use crate::domain::value_objects::environment::Environment;
use crate::infrastructure::db::stores::cached_order_store::CachedOrderRepositoryError;
use tracing::debug;

/// Folds an inbound event into the cached order projection.
pub struct ProjectOrderUseCase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectOrderError {
    Storage(String),
}

impl From<CachedOrderRepositoryError> for ProjectOrderError {
    fn from(err: CachedOrderRepositoryError) -> Self {
        ProjectOrderError::Storage(format!("{err:?}"))
    }
}

impl ProjectOrderUseCase {
    /// Returns `Ok(None)` when the event does not move any order.
    pub async fn execute(
        ctx: &AppContext,
        env: Environment,
        fields: &ExtractedFields,
    ) -> Result<Option<CachedOrder>, ProjectOrderError> {
        // Step 1: Map the event type onto an order status.
        let Some(update) = OrderUpdate::from_event(env, fields) else {
            debug!(
                env = %env,
                event_type = %fields.event_type,
                order_id = %fields.order_id,
                "event does not affect cached orders"
            );
            return Ok(None);
        };

        // Step 2: Reduce into the stored projection.
        let order = ctx.repos.order.apply_update(&update).await?;
        Ok(Some(order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::context::test_support::test_context;
    use crate::domain::entities::cached_order::OrderStatus;
    use crate::domain::services::payload_fields::extract;
    use serde_json::json;

    fn fields(payload: serde_json::Value) -> ExtractedFields {
        let raw = serde_json::to_vec(&payload).unwrap();
        extract(Some(&payload), &raw)
    }

    #[tokio::test]
    async fn given_release_event_when_execute_should_create_released_order() {
        let ctx = test_context();

        let order = ProjectOrderUseCase::execute(
            &ctx,
            Environment::Sandbox,
            &fields(json!({"id": "evt_1", "type": "order.released", "order_id": "ord_9"})),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(order.status, OrderStatus::Released);
        assert_eq!(order.amount_cents, None);
        assert_eq!(order.currency, "BRL");
    }

    #[tokio::test]
    async fn given_later_event_without_amount_when_execute_should_keep_amount() {
        let ctx = test_context();
        ProjectOrderUseCase::execute(
            &ctx,
            Environment::Sandbox,
            &fields(json!({"type": "order.created", "data": {"order_id": "ord_2", "amount_cents": 1500}})),
        )
        .await
        .unwrap();

        let order = ProjectOrderUseCase::execute(
            &ctx,
            Environment::Sandbox,
            &fields(json!({"type": "charge.paid", "data": {"order_id": "ord_2", "txid": "tx_1"}})),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(order.status, OrderStatus::PaidInEscrow);
        assert_eq!(order.amount_cents, Some(1500));
        assert_eq!(order.txid.as_deref(), Some("tx_1"));
    }

    #[tokio::test]
    async fn given_unmapped_event_type_when_execute_should_leave_cache_untouched() {
        let ctx = test_context();

        let result = ProjectOrderUseCase::execute(
            &ctx,
            Environment::Sandbox,
            &fields(json!({"type": "payout.sent", "order_id": "ord_3"})),
        )
        .await
        .unwrap();

        assert!(result.is_none());
        let cached = ctx.repos.order.get(Environment::Sandbox, "ord_3").await.unwrap();
        assert!(cached.is_none());
    }
}
