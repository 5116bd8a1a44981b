use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: Server,
    pub db: Db,
    pub delivery: Delivery,
    #[serde(default)]
    pub security: Security,
    pub upstream: Upstream,
    pub observability: Observability,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Db {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Delivery {
    /// Upper bound for a real outbound forward in `normal` mode.
    pub request_timeout_ms: u64,
    /// Simulated delay assigned to endpoints that never had one configured.
    pub default_timeout_ms: u32,
    /// Largest delay accepted for the `timeout` simulation mode.
    pub max_simulated_timeout_ms: u32,
    /// URL used when a mode change auto-creates an endpoint for an empty environment.
    pub default_endpoint_url: String,
    /// Baseline secret for auto-created endpoints.
    pub default_endpoint_secret: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Security {
    /// Shared token expected in `x-internal-token` for out-of-band endpoint lookups.
    #[serde(default)]
    pub internal_token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Upstream {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    pub request_timeout_ms: u64,
    pub default_env: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Observability {
    pub log_filter: String,
    pub enable_metrics: bool,
}

fn default_max_connections() -> u32 {
    10
}

/// Load settings from `config/default.toml`, `config/<env>.toml`, and env overrides.
pub fn load() -> Result<Settings, config::ConfigError> {
    let env_name = std::env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());
    config::Config::builder()
        .add_source(config::File::with_name("config/default"))
        .add_source(config::File::with_name(&format!("config/{env_name}")).required(false))
        .add_source(config::Environment::with_prefix("WEBHOOKSIM").separator("__"))
        .build()?
        .try_deserialize()
}
