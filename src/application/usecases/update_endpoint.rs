// Use case: update_endpoint.

use crate::application::context::AppContext;
use crate::domain::entities::endpoint::{EndpointPatch, EndpointValidationError, WebhookEndpoint};
use crate::domain::value_objects::ids::EndpointId;
use crate::infrastructure::db::stores::endpoint_store::EndpointRepositoryError;
use tracing::info;

/// Applies a partial update to an endpoint, keeping one active endpoint per environment.
pub struct UpdateEndpointUseCase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEndpointError {
    InvalidId,
    Invalid(EndpointValidationError),
    NotFound,
    Conflict,
    Storage(String),
}

#[derive(Debug, Clone, Default)]
pub struct UpdateEndpointCommand {
    pub id: i64,
    pub url: Option<String>,
    pub secret: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateEndpointUseCase {
    pub async fn execute(
        ctx: &AppContext,
        cmd: UpdateEndpointCommand,
    ) -> Result<WebhookEndpoint, UpdateEndpointError> {
        // Step 1: Validate id and fields.
        if cmd.id <= 0 {
            return Err(UpdateEndpointError::InvalidId);
        }
        let patch = EndpointPatch::new(cmd.url.as_deref(), cmd.secret.as_deref(), cmd.is_active)
            .map_err(UpdateEndpointError::Invalid)?;

        // Step 2: Apply; activation is an atomic swap within the environment.
        let updated = ctx
            .repos
            .endpoint
            .update(EndpointId(cmd.id), &patch)
            .await
            .map_err(|e| match e {
                EndpointRepositoryError::NotFound => UpdateEndpointError::NotFound,
                EndpointRepositoryError::Conflict => UpdateEndpointError::Conflict,
                _ => UpdateEndpointError::Storage(format!("{e:?}")),
            })?;

        info!(
            env = %updated.env,
            endpoint_id = updated.id.0,
            active = updated.is_active,
            "webhook endpoint updated"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::context::test_support::test_context;
    use crate::domain::entities::endpoint::NewEndpoint;
    use crate::domain::value_objects::environment::Environment;
    use std::sync::Arc;

    async fn seed(ctx: &crate::application::context::AppContext, url: &str, active: bool) -> i64 {
        let endpoint = NewEndpoint::new(Environment::Sandbox, url, "whsec", active).unwrap();
        ctx.repos.endpoint.create(&endpoint, 15000).await.unwrap().id.0
    }

    #[tokio::test]
    async fn given_url_patch_when_execute_should_keep_other_fields() {
        let ctx = test_context();
        let id = seed(&ctx, "http://a", true).await;

        let updated = UpdateEndpointUseCase::execute(
            &ctx,
            UpdateEndpointCommand {
                id,
                url: Some("http://b".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.url, "http://b");
        assert_eq!(updated.secret, "whsec");
        assert!(updated.is_active);
    }

    #[tokio::test]
    async fn given_activation_when_execute_should_swap_active_endpoint() {
        let ctx = test_context();
        let a = seed(&ctx, "http://a", true).await;
        let b = seed(&ctx, "http://b", false).await;

        UpdateEndpointUseCase::execute(
            &ctx,
            UpdateEndpointCommand {
                id: b,
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let active = ctx.repos.endpoint.get_active(Environment::Sandbox).await.unwrap().unwrap();
        assert_eq!(active.id.0, b);
        let old = ctx.repos.endpoint.get(EndpointId(a)).await.unwrap().unwrap();
        assert!(!old.is_active);
    }

    #[tokio::test]
    async fn given_racing_activations_when_execute_should_leave_one_active() {
        let ctx = Arc::new(test_context());
        let a = seed(&ctx, "http://a", false).await;
        let b = seed(&ctx, "http://b", false).await;

        let activate = |id: i64| {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                UpdateEndpointUseCase::execute(
                    &ctx,
                    UpdateEndpointCommand {
                        id,
                        is_active: Some(true),
                        ..Default::default()
                    },
                )
                .await
            })
        };
        let (first, second) = tokio::join!(activate(a), activate(b));
        first.unwrap().unwrap();
        second.unwrap().unwrap();

        let listed = ctx.repos.endpoint.list(Environment::Sandbox).await.unwrap();
        assert_eq!(listed.iter().filter(|e| e.is_active).count(), 1);
    }

    #[tokio::test]
    async fn given_invalid_requests_when_execute_should_return_distinct_errors() {
        let ctx = test_context();
        let id = seed(&ctx, "http://a", false).await;

        assert_eq!(
            UpdateEndpointUseCase::execute(&ctx, UpdateEndpointCommand { id: 0, ..Default::default() })
                .await
                .unwrap_err(),
            UpdateEndpointError::InvalidId
        );
        assert_eq!(
            UpdateEndpointUseCase::execute(&ctx, UpdateEndpointCommand { id, ..Default::default() })
                .await
                .unwrap_err(),
            UpdateEndpointError::Invalid(EndpointValidationError::NothingToUpdate)
        );
        assert_eq!(
            UpdateEndpointUseCase::execute(
                &ctx,
                UpdateEndpointCommand {
                    id: 999,
                    is_active: Some(false),
                    ..Default::default()
                }
            )
            .await
            .unwrap_err(),
            UpdateEndpointError::NotFound
        );
    }
}
