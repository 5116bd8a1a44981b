use crate::application::usecases::retry_delivery::RetryDeliveryResult;
use crate::interface::http::dto::text_field;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulated: Option<&'static str>,
}

/// Retry body. Fields stay loosely typed so a wrong type reads as "missing".
#[derive(Debug, Default, Deserialize)]
pub struct RetryRequest {
    #[serde(default)]
    pub env: Option<Value>,
    #[serde(default, rename = "eventId")]
    pub event_id_camel: Option<Value>,
    #[serde(default)]
    pub event_id: Option<Value>,
}

impl RetryRequest {
    pub fn env(&self) -> String {
        text_field(self.env.as_ref()).unwrap_or_default()
    }

    /// `eventId` wins over `event_id`.
    pub fn event_id(&self) -> String {
        text_field(self.event_id_camel.as_ref())
            .or_else(|| text_field(self.event_id.as_ref()))
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct RetryResponse {
    pub ok: bool,
    pub attempt_number: i32,
    pub status_code: Option<u16>,
    pub latency_ms: i64,
    pub delivery_id: String,
}

impl From<RetryDeliveryResult> for RetryResponse {
    fn from(result: RetryDeliveryResult) -> Self {
        Self {
            ok: result.ok,
            attempt_number: result.attempt_number,
            status_code: result.status_code,
            latency_ms: result.latency_ms,
            delivery_id: result.delivery_id.0.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_both_id_spellings_when_read_should_prefer_camel_case() {
        let body: RetryRequest =
            serde_json::from_value(json!({"env": "sandbox", "eventId": "evt_a", "event_id": "evt_b"}))
                .unwrap();
        assert_eq!(body.event_id(), "evt_a");

        let body: RetryRequest =
            serde_json::from_value(json!({"env": 3, "eventId": "", "event_id": "evt_b"})).unwrap();
        assert_eq!(body.event_id(), "evt_b");
        assert_eq!(body.env(), "");
    }
}
