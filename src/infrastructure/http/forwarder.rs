use crate::domain::value_objects::environment::Environment;
use crate::domain::value_objects::ids::EventId;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub const HEADER_ENV: &str = "x-sim-env";
pub const HEADER_EVENT_ID: &str = "x-event-id";
pub const HEADER_SIGNATURE: &str = "x-signature";

/// Prefix of the body recorded when the downstream status arrived but its body did not.
pub const BODY_READ_FAILED: &str = "response body read failed";

/// One signed POST to a downstream endpoint.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub url: String,
    pub env: Environment,
    pub event_id: EventId,
    pub signature: Option<String>,
    pub body: Vec<u8>,
}

/// Whatever the downstream answered, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardResponse {
    pub status: u16,
    pub body: String,
}

impl ForwardResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Error text recorded for a non-2xx answer: the body, or the reason phrase when empty.
    pub fn error_text(&self) -> Option<String> {
        if self.is_success() {
            return None;
        }
        let body = self.body.trim();
        if !body.is_empty() {
            return Some(body.to_string());
        }
        let reason = reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("request failed");
        Some(reason.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("client build error: {0}")]
    Client(String),

    #[error("{0}")]
    Transport(String),
}

#[async_trait]
pub trait Forwarder: Send + Sync {
    /// Send the request. Only transport failures are errors; any HTTP status is a response.
    async fn forward(&self, request: ForwardRequest) -> Result<ForwardResponse, ForwardError>;
}

pub struct ReqwestForwarder {
    client: reqwest::Client,
}

impl ReqwestForwarder {
    /// Build a forwarder whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ForwardError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Forwarder for ReqwestForwarder {
    async fn forward(&self, request: ForwardRequest) -> Result<ForwardResponse, ForwardError> {
        let mut builder = self
            .client
            .post(&request.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(HEADER_ENV, request.env.as_str())
            .header(HEADER_EVENT_ID, request.event_id.as_str());
        if let Some(signature) = &request.signature {
            builder = builder.header(HEADER_SIGNATURE, signature);
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|e| ForwardError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!(
                    event_id = %request.event_id,
                    status,
                    error = %err,
                    "failed to read downstream response body"
                );
                format!("{BODY_READ_FAILED}: {err}")
            }
        };

        Ok(ForwardResponse { status, body })
    }
}
