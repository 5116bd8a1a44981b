use super::env_from_str;
use crate::domain::entities::endpoint::{EndpointPatch, NewEndpoint, WebhookEndpoint};
use crate::domain::value_objects::delivery_mode::DeliveryMode;
use crate::domain::value_objects::ids::EndpointId;
use crate::domain::value_objects::timestamps::Timestamp;
use time::OffsetDateTime;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EndpointRow {
    pub id: i64,
    pub env: String,
    pub url: String,
    pub secret: String,
    pub is_active: bool,
    pub delivery_mode: String,
    pub timeout_ms: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl EndpointRow {
    pub fn into_endpoint(self) -> WebhookEndpoint {
        WebhookEndpoint {
            id: EndpointId(self.id),
            env: env_from_str(&self.env),
            url: self.url,
            secret: self.secret,
            is_active: self.is_active,
            delivery_mode: DeliveryMode::parse(&self.delivery_mode).unwrap_or_default(),
            timeout_ms: u32::try_from(self.timeout_ms).unwrap_or(0),
            created_at: Timestamp::from(self.created_at),
            updated_at: Timestamp::from(self.updated_at),
        }
    }
}

/// Insert payload; the id and timestamps are assigned by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEndpointRow {
    pub env: String,
    pub url: String,
    pub secret: String,
    pub is_active: bool,
    pub delivery_mode: String,
    pub timeout_ms: i32,
}

impl NewEndpointRow {
    pub fn from_new_endpoint(endpoint: &NewEndpoint, mode: DeliveryMode, timeout_ms: u32) -> Self {
        Self {
            env: endpoint.env.as_str().to_string(),
            url: endpoint.url.clone(),
            secret: endpoint.secret.clone(),
            is_active: endpoint.activate,
            delivery_mode: mode.as_str().to_string(),
            timeout_ms: i32::try_from(timeout_ms).unwrap_or(i32::MAX),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointUpdateRow {
    pub url: Option<String>,
    pub secret: Option<String>,
    pub is_active: Option<bool>,
}

impl EndpointUpdateRow {
    pub fn from_patch(patch: &EndpointPatch) -> Self {
        Self {
            url: patch.url.clone(),
            secret: patch.secret.clone(),
            is_active: patch.is_active,
        }
    }

    pub fn activates(&self) -> bool {
        self.is_active == Some(true)
    }
}
