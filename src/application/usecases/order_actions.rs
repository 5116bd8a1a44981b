// Use cases: upstream order passthrough (create, release, refund).

use crate::application::context::AppContext;
use crate::domain::entities::cached_order::{DEFAULT_CURRENCY, OrderStatus};
use crate::domain::services::order_projection::OrderUpdate;
use crate::domain::value_objects::environment::Environment;
use crate::infrastructure::upstream::provider_client::{OrderAction, ProviderError};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

pub struct OrderActionsUseCase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderActionError {
    InvalidAmount,
    InvalidEnv,
    OrderIdRequired,
    /// The provider failed or refused; carries its message.
    Upstream(String),
}

impl From<ProviderError> for OrderActionError {
    fn from(err: ProviderError) -> Self {
        OrderActionError::Upstream(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    /// A JSON number of currency units, or a decimal string (`"10,50"` accepted).
    pub amount: Value,
    pub env: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedOrder {
    pub order: Value,
    pub charge: Value,
}

/// Currency units to cents. Non-positive or unreadable amounts yield `None`.
pub fn parse_amount_cents(value: &Value) -> Option<i64> {
    let amount = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => {
            let normalized = text.replacen(',', ".", 1);
            let normalized = normalized.trim();
            if normalized.is_empty() {
                return None;
            }
            normalized.parse::<f64>().ok()?
        }
        _ => return None,
    };
    if !amount.is_finite() || amount <= 0.0 {
        return None;
    }
    let cents = (amount * 100.0).round();
    (cents >= 1.0 && cents <= i64::MAX as f64).then_some(cents as i64)
}

fn idempotency_key(scope: &str) -> String {
    format!("sim-{scope}-{}", Uuid::new_v4())
}

impl OrderActionsUseCase {
    /// Create a provider order, then its Pix charge, and cache the new order locally.
    pub async fn create(
        ctx: &AppContext,
        cmd: CreateOrderCommand,
    ) -> Result<CreatedOrder, OrderActionError> {
        // Step 1: Validate amount and target environment.
        let amount_cents = parse_amount_cents(&cmd.amount).ok_or(OrderActionError::InvalidAmount)?;
        let env_name = cmd
            .env
            .unwrap_or_else(|| ctx.settings.upstream.default_env.clone());
        let env = Environment::parse(&env_name).ok_or(OrderActionError::InvalidEnv)?;

        // Step 2: Create the order.
        let order = ctx
            .provider
            .create_order(amount_cents, DEFAULT_CURRENCY, &idempotency_key("order"))
            .await
            .inspect_err(|e| warn!(error = %e, "provider order creation failed"))?;
        let order_id = order
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| OrderActionError::Upstream("provider order has no id".to_string()))?
            .to_string();

        // Step 3: Open the Pix charge.
        let charge = ctx
            .provider
            .create_pix_charge(&order_id, &idempotency_key("charge"))
            .await
            .inspect_err(|e| warn!(order_id = %order_id, error = %e, "provider charge creation failed"))?;

        // Step 4: Best-effort cache of the new order.
        let update = OrderUpdate {
            env,
            order_id: order_id.clone(),
            status: order
                .get("status")
                .and_then(Value::as_str)
                .and_then(OrderStatus::parse)
                .unwrap_or(OrderStatus::Created),
            amount_cents: order
                .get("amount_cents")
                .and_then(Value::as_i64)
                .or(Some(amount_cents)),
            currency: order
                .get("currency")
                .and_then(Value::as_str)
                .map(str::to_ascii_uppercase),
            charge_id: charge.get("id").and_then(Value::as_str).map(str::to_string),
            txid: charge.get("txid").and_then(Value::as_str).map(str::to_string),
        };
        if let Err(err) = ctx.repos.order.apply_update(&update).await {
            warn!(env = %env, order_id = %order_id, error = ?err, "cached order not written");
        }

        info!(env = %env, order_id = %order_id, amount_cents, "escrow order created");
        Ok(CreatedOrder { order, charge })
    }

    /// Release or refund an order at the provider and return its payload.
    pub async fn act(
        ctx: &AppContext,
        order_id: &str,
        action: OrderAction,
    ) -> Result<Value, OrderActionError> {
        let order_id = order_id.trim();
        if order_id.is_empty() {
            return Err(OrderActionError::OrderIdRequired);
        }

        let payload = ctx
            .provider
            .order_action(order_id, action, &idempotency_key(action.as_str()))
            .await
            .inspect_err(|e| {
                warn!(order_id = %order_id, action = action.as_str(), error = %e, "provider action failed")
            })?;

        info!(order_id = %order_id, action = action.as_str(), "escrow order action sent");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::context::test_support::{
        RecordingForwarder, StubProvider, test_context_with,
    };
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn given_amount_inputs_when_parsed_should_convert_to_cents() {
        assert_eq!(parse_amount_cents(&json!(10)), Some(1000));
        assert_eq!(parse_amount_cents(&json!(12.34)), Some(1234));
        assert_eq!(parse_amount_cents(&json!("10,50")), Some(1050));
        assert_eq!(parse_amount_cents(&json!(" 7.1 ")), Some(710));
        assert_eq!(parse_amount_cents(&json!("")), None);
        assert_eq!(parse_amount_cents(&json!("abc")), None);
        assert_eq!(parse_amount_cents(&json!(0)), None);
        assert_eq!(parse_amount_cents(&json!(-3)), None);
        assert_eq!(parse_amount_cents(&json!(null)), None);
    }

    #[tokio::test]
    async fn given_valid_amount_when_create_should_call_provider_and_cache_order() {
        let provider = Arc::new(StubProvider::ok());
        let ctx = test_context_with(
            Arc::new(RecordingForwarder::answering(200, "")),
            provider.clone(),
        );

        let created = OrderActionsUseCase::create(
            &ctx,
            CreateOrderCommand {
                amount: json!("25,00"),
                env: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(created.order["amount_cents"], json!(2500));
        assert_eq!(created.charge["order_id"], json!("ord_new"));
        let keys = provider.keys.lock().unwrap().clone();
        assert!(keys[0].starts_with("sim-order-"));
        assert!(keys[1].starts_with("sim-charge-"));
        let cached = ctx
            .repos
            .order
            .get(Environment::Sandbox, "ord_new")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cached.status, OrderStatus::Created);
        assert_eq!(cached.amount_cents, Some(2500));
        assert_eq!(cached.txid.as_deref(), Some("tx_new"));
    }

    #[tokio::test]
    async fn given_invalid_amount_when_create_should_not_call_provider() {
        let provider = Arc::new(StubProvider::ok());
        let ctx = test_context_with(
            Arc::new(RecordingForwarder::answering(200, "")),
            provider.clone(),
        );

        let err = OrderActionsUseCase::create(
            &ctx,
            CreateOrderCommand {
                amount: json!("free"),
                env: None,
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err, OrderActionError::InvalidAmount);
        assert!(provider.keys.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn given_provider_rejection_when_act_should_surface_upstream_message() {
        let ctx = test_context_with(
            Arc::new(RecordingForwarder::answering(200, "")),
            Arc::new(StubProvider::rejecting("order not releasable")),
        );

        let err = OrderActionsUseCase::act(&ctx, "ord_1", OrderAction::Release)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            OrderActionError::Upstream("order not releasable".to_string())
        );
    }

    #[tokio::test]
    async fn given_refund_when_act_should_send_scoped_idempotency_key() {
        let provider = Arc::new(StubProvider::ok());
        let ctx = test_context_with(
            Arc::new(RecordingForwarder::answering(200, "")),
            provider.clone(),
        );

        let payload = OrderActionsUseCase::act(&ctx, "ord_1", OrderAction::Refund)
            .await
            .unwrap();

        assert_eq!(payload["action"], json!("refund"));
        assert!(provider.keys.lock().unwrap()[0].starts_with("sim-refund-"));
    }
}
