use super::env_from_str;
use crate::domain::entities::cached_order::{CachedOrder, OrderStatus};
use crate::domain::value_objects::timestamps::Timestamp;
use time::OffsetDateTime;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CachedOrderRow {
    pub env: String,
    pub order_id: String,
    pub amount_cents: Option<i64>,
    pub currency: String,
    pub status: String,
    pub charge_id: Option<String>,
    pub txid: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl CachedOrderRow {
    pub fn from_order(order: &CachedOrder) -> Self {
        Self {
            env: order.env.as_str().to_string(),
            order_id: order.order_id.clone(),
            amount_cents: order.amount_cents,
            currency: order.currency.clone(),
            status: order.status.as_str().to_string(),
            charge_id: order.charge_id.clone(),
            txid: order.txid.clone(),
            created_at: order.created_at.as_inner(),
            updated_at: order.updated_at.as_inner(),
        }
    }

    pub fn into_order(self) -> CachedOrder {
        CachedOrder {
            env: env_from_str(&self.env),
            order_id: self.order_id,
            amount_cents: self.amount_cents,
            currency: self.currency,
            status: OrderStatus::parse(&self.status).unwrap_or(OrderStatus::Created),
            charge_id: self.charge_id,
            txid: self.txid,
            created_at: Timestamp::from(self.created_at),
            updated_at: Timestamp::from(self.updated_at),
        }
    }
}
