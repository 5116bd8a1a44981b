use crate::domain::entities::cached_order::{CachedOrder, DEFAULT_CURRENCY, OrderStatus};
use crate::domain::entities::webhook_event::UNKNOWN_FIELD;
use crate::domain::services::payload_fields::ExtractedFields;
use crate::domain::value_objects::environment::Environment;
use crate::domain::value_objects::timestamps::Timestamp;

/// Event types that move an order, and the status they move it to.
pub const STATUS_TABLE: &[(&str, OrderStatus)] = &[
    ("order.created", OrderStatus::Created),
    ("charge.created", OrderStatus::AwaitingPayment),
    ("order.awaiting_payment", OrderStatus::AwaitingPayment),
    ("charge.paid", OrderStatus::PaidInEscrow),
    ("order.paid_in_escrow", OrderStatus::PaidInEscrow),
    ("order.released", OrderStatus::Released),
    ("order.refunded", OrderStatus::Refunded),
    ("order.disputed", OrderStatus::Disputed),
    ("order.resolved", OrderStatus::Resolved),
];

pub fn status_for_event_type(event_type: &str) -> Option<OrderStatus> {
    STATUS_TABLE
        .iter()
        .find(|(name, _)| *name == event_type)
        .map(|(_, status)| *status)
}

/// A single change to fold into the cached projection of one order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderUpdate {
    pub env: Environment,
    pub order_id: String,
    pub status: OrderStatus,
    pub amount_cents: Option<i64>,
    pub currency: Option<String>,
    pub charge_id: Option<String>,
    pub txid: Option<String>,
}

impl OrderUpdate {
    /// Build an update from event fields. Unknown event types and missing order ids yield `None`.
    pub fn from_event(env: Environment, fields: &ExtractedFields) -> Option<Self> {
        let status = status_for_event_type(&fields.event_type)?;
        if fields.order_id.is_empty() || fields.order_id == UNKNOWN_FIELD {
            return None;
        }
        Some(Self {
            env,
            order_id: fields.order_id.clone(),
            status,
            amount_cents: fields.amount_cents,
            currency: fields.currency.clone(),
            charge_id: fields.charge_id.clone(),
            txid: fields.txid.clone(),
        })
    }
}

/// Fold `update` into `current`. Status always follows the update; every other field keeps
/// its previous value unless the update carries a new one.
pub fn apply(current: Option<CachedOrder>, update: &OrderUpdate, now: Timestamp) -> CachedOrder {
    match current {
        Some(existing) => CachedOrder {
            status: update.status,
            amount_cents: update.amount_cents.or(existing.amount_cents),
            currency: update.currency.clone().unwrap_or(existing.currency),
            charge_id: update.charge_id.clone().or(existing.charge_id),
            txid: update.txid.clone().or(existing.txid),
            updated_at: now,
            ..existing
        },
        None => CachedOrder {
            env: update.env,
            order_id: update.order_id.clone(),
            amount_cents: update.amount_cents,
            currency: update
                .currency
                .clone()
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            status: update.status,
            charge_id: update.charge_id.clone(),
            txid: update.txid.clone(),
            created_at: now,
            updated_at: now,
        },
    }
}
