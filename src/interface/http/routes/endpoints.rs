// HTTP routes: webhook endpoint registry.

use crate::application::usecases::create_endpoint::{
    CreateEndpointCommand, CreateEndpointError, CreateEndpointUseCase,
};
use crate::application::usecases::get_active_endpoint::{
    GetActiveEndpointError, GetActiveEndpointUseCase,
};
use crate::application::usecases::list_endpoints::{ListEndpointsError, ListEndpointsUseCase};
use crate::application::usecases::update_endpoint::{
    UpdateEndpointCommand, UpdateEndpointError, UpdateEndpointUseCase,
};
use crate::domain::entities::endpoint::EndpointValidationError;
use crate::interface::http::dto::endpoint::{
    ActiveEndpointResponse, CreateEndpointRequest, EndpointResponse, EnvParams,
    PatchEndpointRequest,
};
use crate::interface::http::internal_auth::internal_token_middleware;
use crate::interface::http::problem::{
    SIM_CONFLICT, SIM_NOT_FOUND, bad_request, problem, storage_unavailable,
};
use crate::interface::http::routes::parse_json_body;
use crate::interface::http::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use serde_json::Value;
use tracing::warn;

const BASE: &str = "/webhook-endpoints";

/// Builds endpoint registry routes; `/active` sits behind the internal token guard.
pub fn router(state: AppState) -> axum::Router<AppState> {
    let guarded = axum::Router::new()
        .route("/webhook-endpoints/active", get(active_endpoint))
        .route_layer(middleware::from_fn_with_state(
            state,
            internal_token_middleware,
        ));

    axum::Router::new()
        .route("/webhook-endpoints", get(list_endpoints).post(create_endpoint))
        .route("/webhook-endpoints/:id", patch(update_endpoint))
        .merge(guarded)
}

async fn list_endpoints(State(state): State<AppState>, Query(params): Query<EnvParams>) -> Response {
    match ListEndpointsUseCase::execute(&state.ctx, params.env.as_deref()).await {
        Ok(endpoints) => {
            let body: Vec<EndpointResponse> = endpoints.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(ListEndpointsError::EnvRequired) => bad_request("env_required", Some(BASE.into())),
        Err(ListEndpointsError::InvalidEnv) => bad_request("invalid_env", Some(BASE.into())),
        Err(ListEndpointsError::Storage(err)) => {
            warn!(error = %err, "endpoint listing failed");
            storage_unavailable(Some(BASE.into()))
        }
    }
}

async fn create_endpoint(State(state): State<AppState>, body: Bytes) -> Response {
    // Step 1: Decode the body.
    let payload: CreateEndpointRequest = match parse_json_body(&body, BASE) {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    // Step 2: Execute the use case.
    let result = CreateEndpointUseCase::execute(
        &state.ctx,
        CreateEndpointCommand {
            env: payload.env.as_ref().and_then(Value::as_str).map(str::to_string),
            url: payload.url.as_ref().and_then(Value::as_str).map(str::to_string),
            secret: payload.secret.as_ref().and_then(Value::as_str).map(str::to_string),
            activate: payload.is_active == Some(Value::Bool(true)),
        },
    )
    .await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(endpoint) => (StatusCode::CREATED, Json(EndpointResponse::from(endpoint))).into_response(),
        Err(CreateEndpointError::InvalidEnv) => bad_request("invalid_env", Some(BASE.into())),
        Err(CreateEndpointError::Invalid(err)) => {
            bad_request(validation_token(err), Some(BASE.into()))
        }
        Err(CreateEndpointError::Conflict) => problem(
            StatusCode::CONFLICT,
            SIM_CONFLICT,
            "conflict",
            Some("another endpoint was activated concurrently".to_string()),
            Some(BASE.into()),
        ),
        Err(CreateEndpointError::Storage(err)) => {
            warn!(error = %err, "endpoint creation failed");
            storage_unavailable(Some(BASE.into()))
        }
    }
}

async fn update_endpoint(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let instance = format!("{BASE}/{id}");

    // Step 1: Validate the id before reading the body.
    let Some(id) = id.parse::<i64>().ok().filter(|id| *id > 0) else {
        return bad_request("invalid_id", Some(instance));
    };

    // Step 2: Decode the body; present fields must have the right type.
    let payload: PatchEndpointRequest = match parse_json_body(&body, &instance) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let is_active = match payload.is_active {
        None => None,
        Some(Value::Bool(flag)) => Some(flag),
        Some(_) => return bad_request("is_active_boolean", Some(instance)),
    };

    // Step 3: Execute the use case.
    let result = UpdateEndpointUseCase::execute(
        &state.ctx,
        UpdateEndpointCommand {
            id,
            url: payload.url.as_ref().map(string_or_blank),
            secret: payload.secret.as_ref().map(string_or_blank),
            is_active,
        },
    )
    .await;

    // Step 4: Map output to HTTP response.
    match result {
        Ok(endpoint) => (StatusCode::OK, Json(EndpointResponse::from(endpoint))).into_response(),
        Err(UpdateEndpointError::InvalidId) => bad_request("invalid_id", Some(instance)),
        Err(UpdateEndpointError::Invalid(err)) => bad_request(validation_token(err), Some(instance)),
        Err(UpdateEndpointError::NotFound) => problem(
            StatusCode::NOT_FOUND,
            SIM_NOT_FOUND,
            "not_found",
            Some("endpoint not found".to_string()),
            Some(instance),
        ),
        Err(UpdateEndpointError::Conflict) => problem(
            StatusCode::CONFLICT,
            SIM_CONFLICT,
            "conflict",
            Some("another endpoint was activated concurrently".to_string()),
            Some(instance),
        ),
        Err(UpdateEndpointError::Storage(err)) => {
            warn!(error = %err, "endpoint update failed");
            storage_unavailable(Some(instance))
        }
    }
}

/// Active endpoint URL and secret for out-of-band tooling.
async fn active_endpoint(State(state): State<AppState>, Query(params): Query<EnvParams>) -> Response {
    let instance = format!("{BASE}/active");

    match GetActiveEndpointUseCase::execute(&state.ctx, params.env.as_deref()).await {
        Ok(endpoint) => (StatusCode::OK, Json(ActiveEndpointResponse::from(endpoint))).into_response(),
        Err(GetActiveEndpointError::InvalidEnv) => bad_request("invalid_env", Some(instance)),
        Err(GetActiveEndpointError::NoActiveEndpoint) => problem(
            StatusCode::NOT_FOUND,
            SIM_NOT_FOUND,
            "no_active_endpoint",
            Some("no active endpoint for this environment".to_string()),
            Some(instance),
        ),
        Err(GetActiveEndpointError::Storage(err)) => {
            warn!(error = %err, "active endpoint lookup failed");
            storage_unavailable(Some(instance))
        }
    }
}

fn validation_token(err: EndpointValidationError) -> &'static str {
    match err {
        EndpointValidationError::UrlRequired => "url_required",
        EndpointValidationError::SecretRequired => "secret_required",
        EndpointValidationError::NothingToUpdate => "nothing_to_update",
    }
}

fn string_or_blank(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}
