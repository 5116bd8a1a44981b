// Use case: get_active_endpoint.

use crate::application::context::AppContext;
use crate::domain::entities::endpoint::WebhookEndpoint;
use crate::domain::value_objects::environment::Environment;

/// Resolves the active endpoint of an environment for out-of-band tooling.
pub struct GetActiveEndpointUseCase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetActiveEndpointError {
    InvalidEnv,
    NoActiveEndpoint,
    Storage(String),
}

impl GetActiveEndpointUseCase {
    pub async fn execute(
        ctx: &AppContext,
        env: Option<&str>,
    ) -> Result<WebhookEndpoint, GetActiveEndpointError> {
        let env = env
            .and_then(Environment::parse)
            .ok_or(GetActiveEndpointError::InvalidEnv)?;

        ctx.repos
            .endpoint
            .get_active(env)
            .await
            .map_err(|e| GetActiveEndpointError::Storage(format!("{e:?}")))?
            .ok_or(GetActiveEndpointError::NoActiveEndpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::context::test_support::test_context;
    use crate::domain::entities::endpoint::NewEndpoint;

    #[tokio::test]
    async fn given_active_endpoint_when_execute_should_return_it() {
        let ctx = test_context();
        let endpoint = NewEndpoint::new(Environment::Staging, "http://stg", "whsec", true).unwrap();
        ctx.repos.endpoint.create(&endpoint, 15000).await.unwrap();

        let active = GetActiveEndpointUseCase::execute(&ctx, Some("staging")).await.unwrap();

        assert_eq!(active.url, "http://stg");
        assert_eq!(active.secret, "whsec");
    }

    #[tokio::test]
    async fn given_only_inactive_endpoints_when_execute_should_report_none_active() {
        let ctx = test_context();
        let endpoint = NewEndpoint::new(Environment::Staging, "http://stg", "whsec", false).unwrap();
        ctx.repos.endpoint.create(&endpoint, 15000).await.unwrap();

        let err = GetActiveEndpointUseCase::execute(&ctx, Some("staging")).await.unwrap_err();

        assert_eq!(err, GetActiveEndpointError::NoActiveEndpoint);
    }

    #[tokio::test]
    async fn given_bad_env_when_execute_should_reject() {
        let ctx = test_context();

        let err = GetActiveEndpointUseCase::execute(&ctx, None).await.unwrap_err();

        assert_eq!(err, GetActiveEndpointError::InvalidEnv);
    }
}
