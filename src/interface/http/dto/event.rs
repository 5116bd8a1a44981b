use crate::application::usecases::get_event::GetEventResult;
use crate::domain::entities::delivery_attempt::DeliveryAttempt;
use crate::domain::entities::webhook_event::{EventSummary, WebhookEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct ListEventsParams {
    pub order_id: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub event_id: String,
    pub env: &'static str,
    pub event_type: String,
    pub order_id: String,
    pub signature_ok: bool,
    pub event_timestamp: Option<String>,
    pub received_at: String,
    pub delta_ms: Option<i64>,
    pub payload: Value,
    pub headers: Value,
}

impl From<WebhookEvent> for EventResponse {
    fn from(event: WebhookEvent) -> Self {
        Self {
            event_id: event.event_id.0,
            env: event.env.as_str(),
            event_type: event.event_type,
            order_id: event.order_id,
            signature_ok: event.signature_ok,
            event_timestamp: event.event_timestamp.map(|t| t.to_rfc3339()),
            received_at: event.received_at.to_rfc3339(),
            delta_ms: event.delta_ms,
            payload: event.payload,
            headers: event.headers,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResponse {
    pub id: String,
    pub event_id: String,
    pub attempt_number: i32,
    pub status: String,
    pub error_message: Option<String>,
    pub mode_used: Option<&'static str>,
    pub latency_ms: Option<i64>,
    pub endpoint_id: Option<i64>,
    pub endpoint_url_snapshot: Option<String>,
    pub received_at: String,
}

impl From<DeliveryAttempt> for DeliveryResponse {
    fn from(attempt: DeliveryAttempt) -> Self {
        Self {
            id: attempt.id.0.to_string(),
            event_id: attempt.event_id.0,
            attempt_number: attempt.attempt_number,
            status: attempt.status,
            error_message: attempt.error_message,
            mode_used: attempt.mode_used.map(|m| m.as_str()),
            latency_ms: attempt.latency_ms,
            endpoint_id: attempt.endpoint_id.map(|id| id.0),
            endpoint_url_snapshot: attempt.endpoint_url_snapshot,
            received_at: attempt.received_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailResponse {
    pub event: EventResponse,
    pub deliveries: Vec<DeliveryResponse>,
    pub retry_count: usize,
    pub delta_seconds: Option<i64>,
}

impl From<GetEventResult> for EventDetailResponse {
    fn from(result: GetEventResult) -> Self {
        Self {
            event: result.event.into(),
            deliveries: result.deliveries.into_iter().map(Into::into).collect(),
            retry_count: result.retry_count,
            delta_seconds: result.delta_seconds,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummaryResponse {
    pub event_id: String,
    pub env: &'static str,
    pub event_type: String,
    pub order_id: String,
    pub signature_ok: bool,
    pub event_timestamp: Option<String>,
    pub received_at: String,
    pub delta_ms: Option<i64>,
    pub attempt_count: i64,
}

impl From<EventSummary> for EventSummaryResponse {
    fn from(summary: EventSummary) -> Self {
        Self {
            event_id: summary.event_id.0,
            env: summary.env.as_str(),
            event_type: summary.event_type,
            order_id: summary.order_id,
            signature_ok: summary.signature_ok,
            event_timestamp: summary.event_timestamp.map(|t| t.to_rfc3339()),
            received_at: summary.received_at.to_rfc3339(),
            delta_ms: summary.delta_ms,
            attempt_count: summary.attempt_count,
        }
    }
}
