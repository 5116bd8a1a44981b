use std::sync::Arc;

use crate::config::Settings;
use crate::infrastructure::db::repositories::Repositories;
use crate::infrastructure::db::repositories::endpoint_repository::EndpointDefaults;
use crate::infrastructure::http::forwarder::Forwarder;
use crate::infrastructure::upstream::provider_client::EscrowProvider;

/// Shared application resources used by use cases.
pub struct AppContext {
    pub repos: Repositories,
    pub settings: Settings,
    pub forwarder: Arc<dyn Forwarder>,
    pub provider: Arc<dyn EscrowProvider>,
}

impl AppContext {
    /// Build a new application context with shared repositories and outbound clients.
    pub fn new(
        repos: Repositories,
        settings: Settings,
        forwarder: Arc<dyn Forwarder>,
        provider: Arc<dyn EscrowProvider>,
    ) -> Self {
        Self {
            repos,
            settings,
            forwarder,
            provider,
        }
    }

    /// URL and secret for endpoints the registry seeds on its own.
    pub fn endpoint_defaults(&self) -> EndpointDefaults {
        EndpointDefaults {
            url: self.settings.delivery.default_endpoint_url.clone(),
            secret: self.settings.delivery.default_endpoint_secret.clone(),
        }
    }
}
