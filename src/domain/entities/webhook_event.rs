use crate::domain::value_objects::environment::Environment;
use crate::domain::value_objects::ids::EventId;
use crate::domain::value_objects::timestamps::Timestamp;
use serde_json::Value;

/// Placeholder stored when a payload carries no event type or order id.
pub const UNKNOWN_FIELD: &str = "unknown";

/// An inbound provider callback, recorded once per event id and never edited.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    pub event_id: EventId,
    pub env: Environment,
    pub event_type: String,
    pub order_id: String,
    pub signature_ok: bool,
    pub event_timestamp: Option<Timestamp>,
    pub received_at: Timestamp,
    pub delta_ms: Option<i64>,
    pub payload: Value,
    pub headers: Value,
}

impl WebhookEvent {
    /// Clock skew rounded to whole seconds, halves rounding up.
    pub fn delta_seconds(&self) -> Option<i64> {
        self.delta_ms
            .map(|ms| (ms as f64 / 1000.0 + 0.5).floor() as i64)
    }

    /// Bytes to re-sign and forward on a manual retry.
    ///
    /// Payloads stored as a parse-failure wrapper replay their original text when it is
    /// non-empty; everything else is re-serialized, so the bytes can differ from what the
    /// provider originally sent.
    pub fn replay_body(&self) -> Vec<u8> {
        if let Some(raw) = self
            .payload
            .get("raw")
            .and_then(Value::as_str)
            .filter(|raw| !raw.is_empty())
        {
            return raw.as_bytes().to_vec();
        }
        serde_json::to_vec(&self.payload).unwrap_or_else(|_| b"{}".to_vec())
    }

    pub fn has_parse_error(&self) -> bool {
        self.payload.get("parse_error").is_some()
    }
}

/// Listing view of an event with the number of delivery attempts recorded for it.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSummary {
    pub event_id: EventId,
    pub env: Environment,
    pub event_type: String,
    pub order_id: String,
    pub signature_ok: bool,
    pub event_timestamp: Option<Timestamp>,
    pub received_at: Timestamp,
    pub delta_ms: Option<i64>,
    pub attempt_count: i64,
}
