use crate::domain::value_objects::delivery_mode::DeliveryMode;
use crate::domain::value_objects::environment::Environment;
use crate::domain::value_objects::ids::EndpointId;
use crate::domain::value_objects::timestamps::Timestamp;

/// A downstream receiver for forwarded events. At most one per environment is active.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEndpoint {
    pub id: EndpointId,
    pub env: Environment,
    pub url: String,
    pub secret: String,
    pub is_active: bool,
    pub delivery_mode: DeliveryMode,
    pub timeout_ms: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointValidationError {
    UrlRequired,
    SecretRequired,
    NothingToUpdate,
}

/// Validated input for registering an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEndpoint {
    pub env: Environment,
    pub url: String,
    pub secret: String,
    pub activate: bool,
}

impl NewEndpoint {
    pub fn new(
        env: Environment,
        url: &str,
        secret: &str,
        activate: bool,
    ) -> Result<Self, EndpointValidationError> {
        let url = url.trim();
        let secret = secret.trim();
        if url.is_empty() {
            return Err(EndpointValidationError::UrlRequired);
        }
        if secret.is_empty() {
            return Err(EndpointValidationError::SecretRequired);
        }
        Ok(Self {
            env,
            url: url.to_string(),
            secret: secret.to_string(),
            activate,
        })
    }
}

/// Partial update. Every present field has already been trimmed and checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointPatch {
    pub url: Option<String>,
    pub secret: Option<String>,
    pub is_active: Option<bool>,
}

impl EndpointPatch {
    pub fn new(
        url: Option<&str>,
        secret: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<Self, EndpointValidationError> {
        let url = url.map(str::trim);
        let secret = secret.map(str::trim);
        if matches!(url, Some("")) {
            return Err(EndpointValidationError::UrlRequired);
        }
        if matches!(secret, Some("")) {
            return Err(EndpointValidationError::SecretRequired);
        }
        if url.is_none() && secret.is_none() && is_active.is_none() {
            return Err(EndpointValidationError::NothingToUpdate);
        }
        Ok(Self {
            url: url.map(str::to_string),
            secret: secret.map(str::to_string),
            is_active,
        })
    }

    pub fn activation() -> Self {
        Self {
            url: None,
            secret: None,
            is_active: Some(true),
        }
    }

    pub fn activates(&self) -> bool {
        self.is_active == Some(true)
    }
}
