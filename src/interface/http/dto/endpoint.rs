use crate::domain::entities::endpoint::WebhookEndpoint;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct EnvParams {
    pub env: Option<String>,
}

/// Create body; `is_active` counts only when it is literally `true`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateEndpointRequest {
    pub env: Option<Value>,
    pub url: Option<Value>,
    pub secret: Option<Value>,
    pub is_active: Option<Value>,
}

/// Patch body. A present but non-string `url`/`secret` is treated as blank.
#[derive(Debug, Default, Deserialize)]
pub struct PatchEndpointRequest {
    pub url: Option<Value>,
    pub secret: Option<Value>,
    pub is_active: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointResponse {
    pub id: i64,
    pub env: &'static str,
    pub url: String,
    pub secret: String,
    pub is_active: bool,
    pub delivery_mode: &'static str,
    pub timeout_ms: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<WebhookEndpoint> for EndpointResponse {
    fn from(endpoint: WebhookEndpoint) -> Self {
        Self {
            id: endpoint.id.0,
            env: endpoint.env.as_str(),
            url: endpoint.url,
            secret: endpoint.secret,
            is_active: endpoint.is_active,
            delivery_mode: endpoint.delivery_mode.as_str(),
            timeout_ms: endpoint.timeout_ms,
            created_at: endpoint.created_at.to_rfc3339(),
            updated_at: endpoint.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEndpointResponse {
    pub env: &'static str,
    pub id: i64,
    pub url: String,
    pub secret: String,
    pub updated_at: String,
}

impl From<WebhookEndpoint> for ActiveEndpointResponse {
    fn from(endpoint: WebhookEndpoint) -> Self {
        Self {
            env: endpoint.env.as_str(),
            id: endpoint.id.0,
            url: endpoint.url,
            secret: endpoint.secret,
            updated_at: endpoint.updated_at.to_rfc3339(),
        }
    }
}
