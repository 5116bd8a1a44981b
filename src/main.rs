use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use webhook_sim::application::context::AppContext;
use webhook_sim::config;
use webhook_sim::infrastructure::db::postgres::PostgresDatabase;
use webhook_sim::infrastructure::db::repositories::Repositories;
use webhook_sim::infrastructure::http::forwarder::ReqwestForwarder;
use webhook_sim::infrastructure::upstream::provider_client::ProviderClient;
use webhook_sim::interface::http;
use webhook_sim::interface::http::state::AppState;

#[tokio::main]
async fn main() {
    // Step 1: Load configuration.
    let settings = config::load().expect("load config");

    // Step 2: Install logging; RUST_LOG wins over the configured filter.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.observability.log_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Step 3: Install the Prometheus recorder when enabled.
    let metrics = if settings.observability.enable_metrics {
        Some(
            PrometheusBuilder::new()
                .install_recorder()
                .expect("install metrics recorder"),
        )
    } else {
        None
    };

    // Step 4: Connect to the database, or fall back to in-memory storage.
    let repos = if settings.db.url.trim().is_empty() {
        warn!("db.url is empty; using in-memory storage");
        Repositories::in_memory()
    } else {
        let db = PostgresDatabase::connect(&settings.db.url, settings.db.max_connections)
            .await
            .expect("connect database");
        db.migrate().await.expect("run migrations");
        Repositories::postgres(Arc::new(db))
    };

    // Step 5: Build outbound clients.
    let forwarder = ReqwestForwarder::new(Duration::from_millis(
        settings.delivery.request_timeout_ms,
    ))
    .expect("build forwarder");
    let provider = ProviderClient::new(
        &settings.upstream.base_url,
        &settings.upstream.api_key,
        Duration::from_millis(settings.upstream.request_timeout_ms),
    )
    .expect("build provider client");

    // Step 6: Assemble shared application context and HTTP state.
    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);
    let ctx = AppContext::new(repos, settings, Arc::new(forwarder), Arc::new(provider));
    let app = http::app(AppState::new(ctx, metrics));

    // Step 7: Bind and serve until ctrl-c.
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("bind server");
    info!(addr = %bind_addr, "webhook simulator listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .expect("serve");
}
