// Use case: deliver_event.

use crate::application::context::AppContext;
use crate::domain::entities::delivery_attempt::{
    DeliveryAttempt, PendingAttempt, TRANSPORT_FAILURE_STATUS,
};
use crate::domain::entities::endpoint::WebhookEndpoint;
use crate::domain::services::signature;
use crate::domain::value_objects::delivery_mode::DeliveryMode;
use crate::domain::value_objects::environment::Environment;
use crate::domain::value_objects::ids::EventId;
use crate::infrastructure::http::forwarder::ForwardRequest;
use metrics::{counter, histogram};
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub const SIMULATED_OFFLINE_STATUS: &str = "503";
pub const SIMULATED_OFFLINE_ERROR: &str = "simulated_offline";
pub const SIMULATED_TIMEOUT_STATUS: &str = "200";
pub const NO_ACTIVE_ENDPOINT_ERROR: &str = "no_active_endpoint";

/// Forwards (or simulates forwarding) one event and records exactly one attempt.
pub struct DeliverEventUseCase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliverEventError {
    Storage(String),
}

#[derive(Debug, Clone)]
pub struct DeliverEventCommand {
    pub env: Environment,
    pub event_id: EventId,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct DeliverEventResult {
    pub attempt: DeliveryAttempt,
    /// Mode in effect when the attempt ran.
    pub mode: DeliveryMode,
}

impl DeliverEventUseCase {
    /// Deliver to the environment's active endpoint, read fresh at call time.
    pub async fn execute(
        ctx: &AppContext,
        cmd: DeliverEventCommand,
    ) -> Result<DeliverEventResult, DeliverEventError> {
        // Step 1: Resolve the active endpoint and its current mode.
        let endpoint = ctx
            .repos
            .endpoint
            .get_active(cmd.env)
            .await
            .map_err(|e| DeliverEventError::Storage(format!("{e:?}")))?;

        // Step 2: Produce the outcome for the configured mode.
        let pending = match endpoint {
            Some(endpoint) => Self::run_mode(ctx, &cmd, &endpoint).await,
            None => PendingAttempt {
                event_id: cmd.event_id.clone(),
                status: TRANSPORT_FAILURE_STATUS.to_string(),
                error_message: Some(NO_ACTIVE_ENDPOINT_ERROR.to_string()),
                mode_used: DeliveryMode::Normal,
                latency_ms: 0,
                endpoint_id: None,
                endpoint_url_snapshot: None,
            },
        };
        let mode = pending.mode_used;

        // Step 3: Number and persist the attempt.
        let attempt = ctx
            .repos
            .delivery
            .record(pending)
            .await
            .map_err(|e| DeliverEventError::Storage(format!("{e:?}")))?;

        // Step 4: Emit logs and metrics for the attempt.
        counter!(
            "webhook_delivery_attempts_total",
            "mode" => mode.as_str(),
            "status" => attempt.status.clone()
        )
        .increment(1);
        histogram!("webhook_delivery_latency_ms", "mode" => mode.as_str())
            .record(attempt.latency_ms.unwrap_or(0) as f64);
        info!(
            env = %cmd.env,
            event_id = %attempt.event_id,
            attempt_number = attempt.attempt_number,
            mode = %mode,
            status = %attempt.status,
            latency_ms = attempt.latency_ms.unwrap_or(0),
            error = attempt.error_message.as_deref().unwrap_or(""),
            "delivery_attempt"
        );

        Ok(DeliverEventResult { attempt, mode })
    }

    async fn run_mode(
        ctx: &AppContext,
        cmd: &DeliverEventCommand,
        endpoint: &WebhookEndpoint,
    ) -> PendingAttempt {
        let start = Instant::now();
        let (status, error_message) = match endpoint.delivery_mode {
            DeliveryMode::Normal => Self::forward(ctx, cmd, endpoint).await,
            DeliveryMode::Offline => (
                SIMULATED_OFFLINE_STATUS.to_string(),
                Some(SIMULATED_OFFLINE_ERROR.to_string()),
            ),
            DeliveryMode::Timeout => {
                let delay = Self::simulated_delay(ctx, endpoint.timeout_ms);
                tokio::time::sleep(delay).await;
                (SIMULATED_TIMEOUT_STATUS.to_string(), None)
            }
        };

        PendingAttempt {
            event_id: cmd.event_id.clone(),
            status,
            error_message,
            mode_used: endpoint.delivery_mode,
            latency_ms: start.elapsed().as_millis() as i64,
            endpoint_id: Some(endpoint.id),
            endpoint_url_snapshot: Some(endpoint.url.clone()),
        }
    }

    async fn forward(
        ctx: &AppContext,
        cmd: &DeliverEventCommand,
        endpoint: &WebhookEndpoint,
    ) -> (String, Option<String>) {
        // Step 1: Sign the exact bytes being sent.
        let signature = (!endpoint.secret.is_empty())
            .then(|| signature::sign(&endpoint.secret, &cmd.body));

        // Step 2: Send and translate the outcome into attempt fields.
        let request = ForwardRequest {
            url: endpoint.url.clone(),
            env: cmd.env,
            event_id: cmd.event_id.clone(),
            signature,
            body: cmd.body.clone(),
        };
        match ctx.forwarder.forward(request).await {
            Ok(response) => (response.status.to_string(), response.error_text()),
            Err(err) => {
                warn!(
                    env = %cmd.env,
                    event_id = %cmd.event_id,
                    url = %endpoint.url,
                    error = %err,
                    "delivery_transport_failed"
                );
                (TRANSPORT_FAILURE_STATUS.to_string(), Some(err.to_string()))
            }
        }
    }

    /// Stored delays are clamped into `1..=max_simulated_timeout_ms`.
    fn simulated_delay(ctx: &AppContext, timeout_ms: u32) -> Duration {
        let max = ctx.settings.delivery.max_simulated_timeout_ms.max(1);
        Duration::from_millis(u64::from(timeout_ms.clamp(1, max)))
    }
}
