use crate::domain::entities::endpoint::{EndpointPatch, NewEndpoint, WebhookEndpoint};
use crate::domain::value_objects::delivery_mode::DeliveryMode;
use crate::domain::value_objects::environment::Environment;
use crate::domain::value_objects::ids::EndpointId;
use crate::infrastructure::db::dto::{EndpointUpdateRow, NewEndpointRow};
use crate::infrastructure::db::stores::endpoint_store::{EndpointRepositoryError, EndpointStore};
use std::sync::Arc;

/// Settings applied to rows the registry creates on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDefaults {
    pub url: String,
    pub secret: String,
}

pub struct EndpointRepository {
    store: Arc<dyn EndpointStore>,
}

impl EndpointRepository {
    /// Build a repository that uses the given store implementation.
    pub fn new(store: Arc<dyn EndpointStore>) -> Self {
        Self { store }
    }

    /// Fetch an endpoint by id. Returns `None` if it doesn't exist.
    pub async fn get(
        &self,
        id: EndpointId,
    ) -> Result<Option<WebhookEndpoint>, EndpointRepositoryError> {
        let row = self.store.get(id.0).await?;
        Ok(row.map(|row| row.into_endpoint()))
    }

    /// The endpoint currently receiving forwards for `env`, if any.
    pub async fn get_active(
        &self,
        env: Environment,
    ) -> Result<Option<WebhookEndpoint>, EndpointRepositoryError> {
        let row = self.store.get_active(env.as_str()).await?;
        Ok(row.map(|row| row.into_endpoint()))
    }

    pub async fn list(&self, env: Environment) -> Result<Vec<WebhookEndpoint>, EndpointRepositoryError> {
        let rows = self.store.list_by_env(env.as_str()).await?;
        Ok(rows.into_iter().map(|row| row.into_endpoint()).collect())
    }

    /// Register an endpoint. New rows start in `normal` mode with the default delay.
    pub async fn create(
        &self,
        endpoint: &NewEndpoint,
        default_timeout_ms: u32,
    ) -> Result<WebhookEndpoint, EndpointRepositoryError> {
        // Convert entity to DTO
        let row = NewEndpointRow::from_new_endpoint(endpoint, DeliveryMode::Normal, default_timeout_ms);

        // Insert and return the stored row from DB
        let stored = self.store.insert(&row).await?;
        Ok(stored.into_endpoint())
    }

    /// Apply a partial update; `NotFound` when the id is unknown.
    pub async fn update(
        &self,
        id: EndpointId,
        patch: &EndpointPatch,
    ) -> Result<WebhookEndpoint, EndpointRepositoryError> {
        let fields = EndpointUpdateRow::from_patch(patch);
        let stored = self.store.update(id.0, &fields).await?;
        Ok(stored.into_endpoint())
    }

    /// Make `id` the only active endpoint of its environment.
    pub async fn set_active(&self, id: EndpointId) -> Result<WebhookEndpoint, EndpointRepositoryError> {
        self.update(id, &EndpointPatch::activation()).await
    }

    /// Set the simulation mode for a whole environment, seeding a default endpoint if needed.
    pub async fn upsert_mode(
        &self,
        env: Environment,
        mode: DeliveryMode,
        timeout_ms: u32,
        defaults: &EndpointDefaults,
    ) -> Result<u64, EndpointRepositoryError> {
        let timeout_ms = i32::try_from(timeout_ms).map_err(|_| EndpointRepositoryError::InvalidInput)?;
        let fallback = NewEndpointRow {
            env: env.as_str().to_string(),
            url: defaults.url.clone(),
            secret: defaults.secret.clone(),
            is_active: true,
            delivery_mode: mode.as_str().to_string(),
            timeout_ms,
        };
        self.store
            .upsert_mode(env.as_str(), mode.as_str(), timeout_ms, &fallback)
            .await
    }
}
