use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;

pub const HEADER_API_KEY: &str = "X-API-KEY";
pub const HEADER_IDEMPOTENCY_KEY: &str = "Idempotency-Key";

/// Order mutations exposed by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Release,
    Refund,
}

impl OrderAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderAction::Release => "release",
            OrderAction::Refund => "refund",
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("client build error: {0}")]
    Client(String),

    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("provider returned an unreadable body: {0}")]
    Decode(String),
}

/// Thin client for the upstream escrow provider.
#[async_trait]
pub trait EscrowProvider: Send + Sync {
    async fn create_order(
        &self,
        amount_cents: i64,
        currency: &str,
        idempotency_key: &str,
    ) -> Result<Value, ProviderError>;

    async fn create_pix_charge(
        &self,
        order_id: &str,
        idempotency_key: &str,
    ) -> Result<Value, ProviderError>;

    async fn order_action(
        &self,
        order_id: &str,
        action: OrderAction,
        idempotency_key: &str,
    ) -> Result<Value, ProviderError>;
}

pub struct ProviderClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ProviderClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn post_json(
        &self,
        path: &str,
        body: &Value,
        idempotency_key: &str,
    ) -> Result<Value, ProviderError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header(HEADER_API_KEY, &self.api_key)
            .header(HEADER_IDEMPOTENCY_KEY, idempotency_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                message: rejection_message(&text, status),
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

/// Prefer the provider's own `error`/`message` field, then the raw body, then the reason phrase.
fn rejection_message(body: &str, status: reqwest::StatusCode) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        ["error", "message"]
            .iter()
            .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
    });
    if let Some(message) = from_json {
        return message;
    }
    if !body.trim().is_empty() {
        return body.trim().to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("provider request failed")
        .to_string()
}

#[async_trait]
impl EscrowProvider for ProviderClient {
    async fn create_order(
        &self,
        amount_cents: i64,
        currency: &str,
        idempotency_key: &str,
    ) -> Result<Value, ProviderError> {
        let body = json!({ "amount_cents": amount_cents, "currency": currency });
        self.post_json("/orders", &body, idempotency_key).await
    }

    async fn create_pix_charge(
        &self,
        order_id: &str,
        idempotency_key: &str,
    ) -> Result<Value, ProviderError> {
        let path = format!("/orders/{order_id}/charges/pix");
        self.post_json(&path, &json!({}), idempotency_key).await
    }

    async fn order_action(
        &self,
        order_id: &str,
        action: OrderAction,
        idempotency_key: &str,
    ) -> Result<Value, ProviderError> {
        let path = format!("/orders/{order_id}/{}", action.as_str());
        self.post_json(&path, &json!({}), idempotency_key).await
    }
}
