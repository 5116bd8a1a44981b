use super::env_from_str;
use crate::domain::entities::webhook_event::{EventSummary, WebhookEvent};
use crate::domain::value_objects::ids::EventId;
use crate::domain::value_objects::timestamps::Timestamp;
use serde_json::Value;
use time::OffsetDateTime;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WebhookEventRow {
    pub event_id: String,
    pub env: String,
    pub event_type: String,
    pub order_id: String,
    pub signature_ok: bool,
    pub event_timestamp: Option<OffsetDateTime>,
    pub received_at: OffsetDateTime,
    pub delta_ms: Option<i64>,
    pub payload_json: Value,
    pub headers_json: Value,
}

impl WebhookEventRow {
    pub fn from_event(event: &WebhookEvent) -> Self {
        Self {
            event_id: event.event_id.as_str().to_string(),
            env: event.env.as_str().to_string(),
            event_type: event.event_type.clone(),
            order_id: event.order_id.clone(),
            signature_ok: event.signature_ok,
            event_timestamp: event.event_timestamp.map(|ts| ts.as_inner()),
            received_at: event.received_at.as_inner(),
            delta_ms: event.delta_ms,
            payload_json: event.payload.clone(),
            headers_json: event.headers.clone(),
        }
    }

    pub fn into_event(self) -> WebhookEvent {
        WebhookEvent {
            event_id: EventId(self.event_id),
            env: env_from_str(&self.env),
            event_type: self.event_type,
            order_id: self.order_id,
            signature_ok: self.signature_ok,
            event_timestamp: self.event_timestamp.map(Timestamp::from),
            received_at: Timestamp::from(self.received_at),
            delta_ms: self.delta_ms,
            payload: self.payload_json,
            headers: self.headers_json,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventSummaryRow {
    pub event_id: String,
    pub env: String,
    pub event_type: String,
    pub order_id: String,
    pub signature_ok: bool,
    pub event_timestamp: Option<OffsetDateTime>,
    pub received_at: OffsetDateTime,
    pub delta_ms: Option<i64>,
    pub attempt_count: i64,
}

impl EventSummaryRow {
    pub fn into_summary(self) -> EventSummary {
        EventSummary {
            event_id: EventId(self.event_id),
            env: env_from_str(&self.env),
            event_type: self.event_type,
            order_id: self.order_id,
            signature_ok: self.signature_ok,
            event_timestamp: self.event_timestamp.map(Timestamp::from),
            received_at: Timestamp::from(self.received_at),
            delta_ms: self.delta_ms,
            attempt_count: self.attempt_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::environment::Environment;
    use serde_json::json;

    #[test]
    fn given_event_when_mapped_through_row_should_keep_fields() {
        let event = WebhookEvent {
            event_id: EventId::new("evt_1"),
            env: Environment::Sandbox,
            event_type: "charge.paid".to_string(),
            order_id: "ord_1".to_string(),
            signature_ok: false,
            event_timestamp: None,
            received_at: Timestamp::now_utc(),
            delta_ms: None,
            payload: json!({"raw": "x", "parse_error": "eof"}),
            headers: json!({"x-signature": "abc"}),
        };

        let row = WebhookEventRow::from_event(&event);
        assert_eq!(row.env, "sandbox");
        assert_eq!(row.event_timestamp, None);

        assert_eq!(row.into_event(), event);
    }
}
