// Use case: list_endpoints.

use crate::application::context::AppContext;
use crate::domain::entities::endpoint::WebhookEndpoint;
use crate::domain::value_objects::environment::Environment;

pub struct ListEndpointsUseCase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEndpointsError {
    EnvRequired,
    InvalidEnv,
    Storage(String),
}

impl ListEndpointsUseCase {
    /// Endpoints of one environment, oldest first.
    pub async fn execute(
        ctx: &AppContext,
        env: Option<&str>,
    ) -> Result<Vec<WebhookEndpoint>, ListEndpointsError> {
        let env = env.filter(|e| !e.is_empty()).ok_or(ListEndpointsError::EnvRequired)?;
        let env = Environment::parse(env).ok_or(ListEndpointsError::InvalidEnv)?;

        ctx.repos
            .endpoint
            .list(env)
            .await
            .map_err(|e| ListEndpointsError::Storage(format!("{e:?}")))
    }
}
