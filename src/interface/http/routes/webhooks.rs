// HTTP routes: inbound provider webhooks and operator retries.

use crate::application::usecases::ingest_webhook::{
    IngestOutcome, IngestWebhookCommand, IngestWebhookUseCase,
};
use crate::application::usecases::retry_delivery::{
    RetryDeliveryCommand, RetryDeliveryError, RetryDeliveryUseCase,
};
use crate::interface::http::dto::webhook::{IngestResponse, RetryRequest, RetryResponse};
use crate::interface::http::problem::{
    SIM_CONFLICT, SIM_NOT_FOUND, bad_request, problem, storage_unavailable,
};
use crate::interface::http::routes::parse_json_body;
use crate::interface::http::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::{Map, Value};
use tracing::warn;

pub const SIGNATURE_HEADER: &str = "x-signature";

/// Builds webhook routes. `/webhooks/retry` wins over the `:env` capture.
pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/webhooks/retry", post(retry))
        .route("/webhooks/:env", post(ingest))
}

/// Accepts a provider callback. Always acknowledges; offline mode answers 503.
async fn ingest(
    State(state): State<AppState>,
    Path(env): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Step 1: Capture the signature and headers alongside the untouched bytes.
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let cmd = IngestWebhookCommand {
        env,
        body: body.to_vec(),
        signature,
        headers: headers_json(&headers),
    };

    // Step 2: Run ingestion and mirror the simulated mode.
    match IngestWebhookUseCase::execute(&state.ctx, cmd).await {
        IngestOutcome::Accepted(report) if report.simulated_offline() => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(IngestResponse {
                ok: false,
                simulated: Some("offline"),
            }),
        )
            .into_response(),
        IngestOutcome::Accepted(_) | IngestOutcome::Ignored => (
            StatusCode::OK,
            Json(IngestResponse {
                ok: true,
                simulated: None,
            }),
        )
            .into_response(),
    }
}

/// Re-delivers a stored event to the active endpoint.
async fn retry(State(state): State<AppState>, body: Bytes) -> Response {
    let instance = "/webhooks/retry";

    // Step 1: Decode the body.
    let payload: RetryRequest = match parse_json_body(&body, instance) {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    // Step 2: Execute the use case.
    let result = RetryDeliveryUseCase::execute(
        &state.ctx,
        RetryDeliveryCommand {
            env: payload.env(),
            event_id: payload.event_id(),
        },
    )
    .await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(out) => (StatusCode::OK, Json(RetryResponse::from(out))).into_response(),
        Err(RetryDeliveryError::EnvRequired) => bad_request("env_required", Some(instance.into())),
        Err(RetryDeliveryError::InvalidEnv) => bad_request("invalid_env", Some(instance.into())),
        Err(RetryDeliveryError::EventIdRequired) => {
            bad_request("event_id_required", Some(instance.into()))
        }
        Err(RetryDeliveryError::NotFound) => problem(
            StatusCode::NOT_FOUND,
            SIM_NOT_FOUND,
            "not_found",
            Some("event not found in this environment".to_string()),
            Some(instance.into()),
        ),
        Err(RetryDeliveryError::MissingActiveEndpoint) => problem(
            StatusCode::CONFLICT,
            SIM_CONFLICT,
            "missing_active_endpoint",
            Some("no active endpoint for this environment".to_string()),
            Some(instance.into()),
        ),
        Err(RetryDeliveryError::Storage(err)) => {
            warn!(error = %err, "retry failed on storage");
            storage_unavailable(Some(instance.into()))
        }
    }
}

/// Request headers as a JSON object; repeated headers are joined with `", "`.
fn headers_json(headers: &HeaderMap) -> Value {
    let mut map = Map::new();
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        map.insert(name.as_str().to_string(), Value::String(joined));
    }
    Value::Object(map)
}
