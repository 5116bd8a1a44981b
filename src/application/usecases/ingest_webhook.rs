// Use case: ingest_webhook.
// Drives one inbound provider callback through the ingestion states.

use crate::application::context::AppContext;
use crate::application::usecases::deliver_event::{DeliverEventCommand, DeliverEventUseCase};
use crate::application::usecases::project_order::ProjectOrderUseCase;
use crate::domain::entities::delivery_attempt::DeliveryAttempt;
use crate::domain::entities::webhook_event::WebhookEvent;
use crate::domain::services::payload_fields::{ExtractedFields, extract};
use crate::domain::services::signature;
use crate::domain::value_objects::delivery_mode::DeliveryMode;
use crate::domain::value_objects::environment::Environment;
use crate::domain::value_objects::ids::EventId;
use crate::domain::value_objects::timestamps::Timestamp;
use crate::domain::workflows::ingestion::{IngestionState, IngestionStateMachine};
use metrics::counter;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

pub struct IngestWebhookUseCase;

#[derive(Debug, Clone)]
pub struct IngestWebhookCommand {
    /// Raw environment path segment; unknown values are absorbed.
    pub env: String,
    /// Exact request bytes, used for both parsing and signature verification.
    pub body: Vec<u8>,
    pub signature: Option<String>,
    /// Captured request headers as a JSON object.
    pub headers: Value,
}

#[derive(Debug, Clone)]
pub struct IngestReport {
    pub env: Environment,
    pub event_id: EventId,
    pub signature_ok: bool,
    /// `true` when the event id had already been recorded.
    pub duplicate: bool,
    pub stored: bool,
    pub delivery: Option<DeliveryAttempt>,
    /// Mode that decides the answer sent back to the provider.
    pub mode: DeliveryMode,
    pub state: IngestionState,
}

impl IngestReport {
    /// Offline simulation is mirrored back to the caller.
    pub fn simulated_offline(&self) -> bool {
        self.mode == DeliveryMode::Offline
    }
}

#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// The environment segment is not managed here; nothing was processed.
    Ignored,
    Accepted(IngestReport),
}

/// Parsed body plus the payload value to persist.
struct ParsedBody {
    fields: ExtractedFields,
    stored_payload: Value,
}

impl IngestWebhookUseCase {
    /// Ingest a callback. Internal failures past parsing are logged, never returned.
    pub async fn execute(ctx: &AppContext, cmd: IngestWebhookCommand) -> IngestOutcome {
        let mut state = IngestionState::Received;

        // Step 1: Absorb environments this instance does not manage.
        let Some(env) = Environment::parse(&cmd.env) else {
            info!(env = %cmd.env, "webhook for unmanaged environment ignored");
            return IngestOutcome::Ignored;
        };

        // Step 2: Parse without ever rejecting the body.
        let parsed = Self::parse_body(&cmd.body);
        advance(&mut state, IngestionState::Parsed);

        // Step 3: Verify the signature against the active endpoint's secret.
        let endpoint = match ctx.repos.endpoint.get_active(env).await {
            Ok(endpoint) => endpoint,
            Err(err) => {
                warn!(env = %env, error = ?err, "active endpoint lookup failed");
                None
            }
        };
        let signature_ok = signature::verify(
            endpoint.as_ref().map(|e| e.secret.as_str()),
            &cmd.body,
            cmd.signature.as_deref(),
        );
        advance(&mut state, IngestionState::SignatureChecked);
        counter!(
            "webhook_events_received_total",
            "env" => env.as_str(),
            "signature" => if signature_ok { "valid" } else { "invalid" }
        )
        .increment(1);
        if !signature_ok {
            warn!(
                env = %env,
                event_id = %parsed.fields.event_id,
                has_header = cmd.signature.is_some(),
                "webhook signature mismatch"
            );
        }

        let mut report = IngestReport {
            env,
            event_id: parsed.fields.event_id.clone(),
            signature_ok,
            duplicate: false,
            stored: false,
            delivery: None,
            mode: endpoint.as_ref().map(|e| e.delivery_mode).unwrap_or_default(),
            state,
        };

        // Step 4: Record the event once per id.
        let received_at = Timestamp::now_utc();
        let event = WebhookEvent {
            event_id: parsed.fields.event_id.clone(),
            env,
            event_type: parsed.fields.event_type.clone(),
            order_id: parsed.fields.order_id.clone(),
            signature_ok,
            event_timestamp: parsed.fields.event_timestamp,
            received_at,
            delta_ms: parsed
                .fields
                .event_timestamp
                .map(|asserted| received_at.millis_since(asserted)),
            payload: parsed.stored_payload,
            headers: cmd.headers,
        };
        match ctx.repos.event.record_if_new(&event).await {
            Ok(inserted) => {
                report.stored = true;
                report.duplicate = !inserted;
                advance(&mut report.state, IngestionState::Stored);
                info!(
                    env = %env,
                    event_id = %event.event_id,
                    event_type = %event.event_type,
                    order_id = %event.order_id,
                    signature_ok,
                    duplicate = report.duplicate,
                    "webhook_event_recorded"
                );
            }
            Err(err) => {
                warn!(env = %env, event_id = %event.event_id, error = ?err, "webhook event not stored");
                advance(&mut report.state, IngestionState::Responded);
                return IngestOutcome::Accepted(report);
            }
        }

        // Step 5: Best-effort order projection.
        match ProjectOrderUseCase::execute(ctx, env, &parsed.fields).await {
            Ok(Some(_)) => advance(&mut report.state, IngestionState::OrderProjected),
            Ok(None) => {}
            Err(err) => {
                warn!(
                    env = %env,
                    event_id = %event.event_id,
                    order_id = %event.order_id,
                    error = ?err,
                    "order projection failed"
                );
            }
        }

        // Step 6: Forward under the environment's current mode.
        let delivery = DeliverEventUseCase::execute(
            ctx,
            DeliverEventCommand {
                env,
                event_id: event.event_id.clone(),
                body: cmd.body,
            },
        )
        .await;
        match delivery {
            Ok(result) => {
                report.mode = result.mode;
                report.delivery = Some(result.attempt);
                advance(&mut report.state, IngestionState::Delivered);
            }
            Err(err) => {
                warn!(env = %env, event_id = %event.event_id, error = ?err, "delivery attempt not recorded");
            }
        }

        // Step 7: Done; the caller maps the report to a response.
        advance(&mut report.state, IngestionState::Responded);
        IngestOutcome::Accepted(report)
    }

    fn parse_body(body: &[u8]) -> ParsedBody {
        if body.is_empty() {
            let payload = json!({});
            return ParsedBody {
                fields: extract(Some(&payload), body),
                stored_payload: payload,
            };
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(payload) => ParsedBody {
                fields: extract(Some(&payload), body),
                stored_payload: payload,
            },
            Err(err) => ParsedBody {
                fields: extract(None, body),
                stored_payload: json!({
                    "raw": String::from_utf8_lossy(body),
                    "parse_error": err.to_string(),
                }),
            },
        }
    }
}

fn advance(state: &mut IngestionState, next: IngestionState) {
    match IngestionStateMachine::transition(*state, next) {
        Ok(to) => *state = to,
        Err(_) => debug!(
            from = state.as_str(),
            to = next.as_str(),
            "ingestion transition skipped"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::context::test_support::{
        RecordingForwarder, StubProvider, test_context_with,
    };
    use crate::domain::entities::cached_order::OrderStatus;
    use crate::domain::entities::endpoint::NewEndpoint;
    use std::sync::Arc;

    const SCENARIO: &str = r#"{"id":"evt_1","type":"order.released","order_id":"ord_9","created_at":"2024-01-01T00:00:00Z"}"#;

    async fn context(forwarder: Arc<RecordingForwarder>) -> AppContext {
        let ctx = test_context_with(forwarder, Arc::new(StubProvider::ok()));
        let endpoint =
            NewEndpoint::new(Environment::Sandbox, "http://merchant/hook", "whsec", true).unwrap();
        ctx.repos.endpoint.create(&endpoint, 15000).await.unwrap();
        ctx
    }

    fn command(body: &str, signature: Option<String>) -> IngestWebhookCommand {
        IngestWebhookCommand {
            env: "sandbox".to_string(),
            body: body.as_bytes().to_vec(),
            signature,
            headers: json!({"content-type": "application/json"}),
        }
    }

    fn accepted(outcome: IngestOutcome) -> IngestReport {
        match outcome {
            IngestOutcome::Accepted(report) => report,
            IngestOutcome::Ignored => panic!("expected accepted outcome"),
        }
    }

    #[tokio::test]
    async fn given_signed_release_when_execute_should_store_project_and_deliver() {
        let forwarder = Arc::new(RecordingForwarder::answering(200, ""));
        let ctx = context(forwarder.clone()).await;
        let sig = signature::sign("whsec", SCENARIO.as_bytes());

        let report = accepted(IngestWebhookUseCase::execute(&ctx, command(SCENARIO, Some(sig))).await);

        assert!(report.signature_ok);
        assert!(!report.duplicate);
        assert_eq!(report.state, IngestionState::Responded);
        assert_eq!(report.delivery.as_ref().unwrap().attempt_number, 1);
        assert!(!report.simulated_offline());
        let event = ctx.repos.event.get(&EventId::new("evt_1")).await.unwrap().unwrap();
        assert!(event.signature_ok);
        assert!(event.delta_ms.unwrap() > 0);
        let order = ctx.repos.order.get(Environment::Sandbox, "ord_9").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Released);
        assert_eq!(forwarder.requests.lock().unwrap()[0].body, SCENARIO.as_bytes());
    }

    #[tokio::test]
    async fn given_wrong_signature_when_execute_should_still_store_and_deliver() {
        let forwarder = Arc::new(RecordingForwarder::answering(200, ""));
        let ctx = context(forwarder.clone()).await;

        let report = accepted(
            IngestWebhookUseCase::execute(&ctx, command(SCENARIO, Some("0xdeadbeef".to_string())))
                .await,
        );

        assert!(!report.signature_ok);
        assert!(report.stored);
        assert!(report.delivery.is_some());
        assert_eq!(forwarder.calls(), 1);
    }

    #[tokio::test]
    async fn given_same_body_twice_when_execute_should_keep_one_event_and_add_attempt() {
        let ctx = context(Arc::new(RecordingForwarder::answering(200, ""))).await;

        IngestWebhookUseCase::execute(&ctx, command(SCENARIO, None)).await;
        let second = accepted(IngestWebhookUseCase::execute(&ctx, command(SCENARIO, None)).await);

        assert!(second.duplicate);
        assert_eq!(second.delivery.unwrap().attempt_number, 2);
        let events = ctx.repos.event.list_by_order_id("ord_9", 50).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].attempt_count, 2);
    }

    #[tokio::test]
    async fn given_malformed_body_when_execute_should_store_raw_wrapper_under_fallback_id() {
        let ctx = context(Arc::new(RecordingForwarder::answering(200, ""))).await;
        let body = "{not json";

        let report = accepted(IngestWebhookUseCase::execute(&ctx, command(body, None)).await);

        assert_eq!(report.event_id, EventId::fallback_for(body.as_bytes()));
        let event = ctx.repos.event.get(&report.event_id).await.unwrap().unwrap();
        assert_eq!(event.payload["raw"], json!(body));
        assert!(event.has_parse_error());
        assert_eq!(event.event_type, "unknown");
    }

    #[tokio::test]
    async fn given_empty_body_when_execute_should_store_empty_object() {
        let ctx = context(Arc::new(RecordingForwarder::answering(200, ""))).await;

        let report = accepted(IngestWebhookUseCase::execute(&ctx, command("", None)).await);

        let event = ctx.repos.event.get(&report.event_id).await.unwrap().unwrap();
        assert_eq!(event.payload, json!({}));
        assert_eq!(event.order_id, "unknown");
    }

    #[tokio::test]
    async fn given_offline_mode_when_execute_should_report_simulated_offline() {
        let forwarder = Arc::new(RecordingForwarder::answering(200, ""));
        let ctx = context(forwarder.clone()).await;
        ctx.repos
            .endpoint
            .upsert_mode(Environment::Sandbox, DeliveryMode::Offline, 15000, &ctx.endpoint_defaults())
            .await
            .unwrap();

        let report = accepted(IngestWebhookUseCase::execute(&ctx, command(SCENARIO, None)).await);

        assert!(report.simulated_offline());
        assert_eq!(report.delivery.unwrap().status, "503");
        assert_eq!(forwarder.calls(), 0);
    }

    #[tokio::test]
    async fn given_unknown_env_when_execute_should_ignore_request() {
        let forwarder = Arc::new(RecordingForwarder::answering(200, ""));
        let ctx = context(forwarder.clone()).await;
        let mut cmd = command(SCENARIO, None);
        cmd.env = "production".to_string();

        let outcome = IngestWebhookUseCase::execute(&ctx, cmd).await;

        assert!(matches!(outcome, IngestOutcome::Ignored));
        assert!(ctx.repos.event.get(&EventId::new("evt_1")).await.unwrap().is_none());
        assert_eq!(forwarder.calls(), 0);
    }

    #[tokio::test]
    async fn given_no_endpoint_when_execute_should_record_unsigned_failed_attempt() {
        let ctx = test_context_with(
            Arc::new(RecordingForwarder::answering(200, "")),
            Arc::new(StubProvider::ok()),
        );

        let report = accepted(IngestWebhookUseCase::execute(&ctx, command(SCENARIO, None)).await);

        assert!(!report.signature_ok);
        let attempt = report.delivery.unwrap();
        assert_eq!(attempt.status, "0");
        assert_eq!(attempt.error_message.as_deref(), Some("no_active_endpoint"));
    }
}
