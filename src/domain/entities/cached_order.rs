use crate::domain::value_objects::environment::Environment;
use crate::domain::value_objects::timestamps::Timestamp;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "BRL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    AwaitingPayment,
    PaidInEscrow,
    Released,
    Refunded,
    Disputed,
    Resolved,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::AwaitingPayment => "AWAITING_PAYMENT",
            OrderStatus::PaidInEscrow => "PAID_IN_ESCROW",
            OrderStatus::Released => "RELEASED",
            OrderStatus::Refunded => "REFUNDED",
            OrderStatus::Disputed => "DISPUTED",
            OrderStatus::Resolved => "RESOLVED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CREATED" => Some(OrderStatus::Created),
            "AWAITING_PAYMENT" => Some(OrderStatus::AwaitingPayment),
            "PAID_IN_ESCROW" => Some(OrderStatus::PaidInEscrow),
            "RELEASED" => Some(OrderStatus::Released),
            "REFUNDED" => Some(OrderStatus::Refunded),
            "DISPUTED" => Some(OrderStatus::Disputed),
            "RESOLVED" => Some(OrderStatus::Resolved),
            _ => None,
        }
    }
}

/// Local, best-effort view of an upstream order. May lag behind the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedOrder {
    pub env: Environment,
    pub order_id: String,
    pub amount_cents: Option<i64>,
    pub currency: String,
    pub status: OrderStatus,
    pub charge_id: Option<String>,
    pub txid: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_status_strings_when_parsed_should_accept_any_case() {
        assert_eq!(OrderStatus::parse("released"), Some(OrderStatus::Released));
        assert_eq!(
            OrderStatus::parse("PAID_IN_ESCROW"),
            Some(OrderStatus::PaidInEscrow)
        );
        assert_eq!(OrderStatus::parse("shipped"), None);
    }

    #[test]
    fn given_status_when_serialized_should_use_screaming_snake_case() {
        let json = serde_json::to_string(&OrderStatus::AwaitingPayment).unwrap();
        assert_eq!(json, "\"AWAITING_PAYMENT\"");
    }
}
