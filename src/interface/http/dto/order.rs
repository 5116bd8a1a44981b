use crate::domain::entities::cached_order::CachedOrder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct OrdersParams {
    pub env: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateOrderRequest {
    pub amount: Option<Value>,
    pub env: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order: Value,
    pub charge: Value,
}

#[derive(Debug, Serialize)]
pub struct OrderActionResponse {
    pub ok: bool,
    pub payload: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedOrderResponse {
    pub env: &'static str,
    pub order_id: String,
    pub amount_cents: Option<i64>,
    pub currency: String,
    pub status: &'static str,
    pub charge_id: Option<String>,
    pub txid: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CachedOrder> for CachedOrderResponse {
    fn from(order: CachedOrder) -> Self {
        Self {
            env: order.env.as_str(),
            order_id: order.order_id,
            amount_cents: order.amount_cents,
            currency: order.currency,
            status: order.status.as_str(),
            charge_id: order.charge_id,
            txid: order.txid,
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
        }
    }
}
