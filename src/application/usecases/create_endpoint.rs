// Use case: create_endpoint.

use crate::application::context::AppContext;
use crate::domain::entities::endpoint::{EndpointValidationError, NewEndpoint, WebhookEndpoint};
use crate::domain::value_objects::environment::Environment;
use crate::infrastructure::db::stores::endpoint_store::EndpointRepositoryError;
use tracing::info;

/// Registers a downstream endpoint, optionally making it the active one.
pub struct CreateEndpointUseCase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateEndpointError {
    InvalidEnv,
    Invalid(EndpointValidationError),
    Conflict,
    Storage(String),
}

#[derive(Debug, Clone)]
pub struct CreateEndpointCommand {
    pub env: Option<String>,
    pub url: Option<String>,
    pub secret: Option<String>,
    pub activate: bool,
}

impl CreateEndpointUseCase {
    pub async fn execute(
        ctx: &AppContext,
        cmd: CreateEndpointCommand,
    ) -> Result<WebhookEndpoint, CreateEndpointError> {
        // Step 1: Validate input before touching storage.
        let env = cmd
            .env
            .as_deref()
            .and_then(Environment::parse)
            .ok_or(CreateEndpointError::InvalidEnv)?;
        let endpoint = NewEndpoint::new(
            env,
            cmd.url.as_deref().unwrap_or_default(),
            cmd.secret.as_deref().unwrap_or_default(),
            cmd.activate,
        )
        .map_err(CreateEndpointError::Invalid)?;

        // Step 2: Insert; activation swaps siblings in the same transaction.
        let stored = ctx
            .repos
            .endpoint
            .create(&endpoint, ctx.settings.delivery.default_timeout_ms)
            .await
            .map_err(|e| match e {
                EndpointRepositoryError::Conflict => CreateEndpointError::Conflict,
                _ => CreateEndpointError::Storage(format!("{e:?}")),
            })?;

        info!(
            env = %stored.env,
            endpoint_id = stored.id.0,
            active = stored.is_active,
            "webhook endpoint created"
        );
        Ok(stored)
    }
}
