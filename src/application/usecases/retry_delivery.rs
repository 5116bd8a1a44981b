// Use case: retry_delivery.

use crate::application::context::AppContext;
use crate::application::usecases::deliver_event::{
    DeliverEventCommand, DeliverEventError, DeliverEventUseCase,
};
use crate::domain::value_objects::delivery_mode::DeliveryMode;
use crate::domain::value_objects::environment::Environment;
use crate::domain::value_objects::ids::{DeliveryId, EventId};
use tracing::info;

/// Operator-triggered re-delivery of a stored event.
pub struct RetryDeliveryUseCase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDeliveryError {
    EnvRequired,
    InvalidEnv,
    EventIdRequired,
    /// Unknown event, or an event recorded under another environment.
    NotFound,
    MissingActiveEndpoint,
    Storage(String),
}

#[derive(Debug, Clone)]
pub struct RetryDeliveryCommand {
    pub env: String,
    pub event_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryDeliveryResult {
    pub ok: bool,
    pub attempt_number: i32,
    /// HTTP status of the attempt; `None` when no response was received.
    pub status_code: Option<u16>,
    pub latency_ms: i64,
    pub delivery_id: DeliveryId,
    pub mode: DeliveryMode,
}

impl RetryDeliveryUseCase {
    /// Re-sign and forward the stored event under the endpoint's current mode.
    pub async fn execute(
        ctx: &AppContext,
        cmd: RetryDeliveryCommand,
    ) -> Result<RetryDeliveryResult, RetryDeliveryError> {
        // Step 1: Validate the request fields.
        let env = cmd.env.trim();
        if env.is_empty() {
            return Err(RetryDeliveryError::EnvRequired);
        }
        let env = Environment::parse(env).ok_or(RetryDeliveryError::InvalidEnv)?;
        let event_id = cmd.event_id.trim();
        if event_id.is_empty() {
            return Err(RetryDeliveryError::EventIdRequired);
        }

        // Step 2: Load the event and check it belongs to the environment.
        let event = ctx
            .repos
            .event
            .get(&EventId::new(event_id))
            .await
            .map_err(|e| RetryDeliveryError::Storage(format!("{e:?}")))?
            .filter(|event| event.env == env)
            .ok_or(RetryDeliveryError::NotFound)?;

        // Step 3: A retry needs a destination.
        let endpoint = ctx
            .repos
            .endpoint
            .get_active(env)
            .await
            .map_err(|e| RetryDeliveryError::Storage(format!("{e:?}")))?;
        let has_destination = endpoint
            .as_ref()
            .is_some_and(|endpoint| !endpoint.url.trim().is_empty());
        if !has_destination {
            return Err(RetryDeliveryError::MissingActiveEndpoint);
        }

        // Step 4: Deliver the replayed body.
        info!(env = %env, event_id = %event.event_id, "webhook retry requested");
        let result = DeliverEventUseCase::execute(
            ctx,
            DeliverEventCommand {
                env,
                event_id: event.event_id.clone(),
                body: event.replay_body(),
            },
        )
        .await
        .map_err(|DeliverEventError::Storage(e)| RetryDeliveryError::Storage(e))?;

        // Step 5: Summarize the recorded attempt.
        let attempt = result.attempt;
        Ok(RetryDeliveryResult {
            ok: attempt.is_success(),
            attempt_number: attempt.attempt_number,
            status_code: attempt.status_code(),
            latency_ms: attempt.latency_ms.unwrap_or(0),
            delivery_id: attempt.id,
            mode: result.mode,
        })
    }
}
