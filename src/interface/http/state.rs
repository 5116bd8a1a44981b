use std::sync::Arc;

use crate::application::context::AppContext;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<AppContext>,
    /// Present when Prometheus export is enabled.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(ctx: AppContext, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            ctx: Arc::new(ctx),
            metrics,
        }
    }
}
