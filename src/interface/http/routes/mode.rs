// HTTP routes: per-environment delivery simulation mode.

use crate::application::usecases::configure_mode::{
    GetModeUseCase, ModeError, SetModeCommand, SetModeUseCase,
};
use crate::interface::http::dto::mode::{ModeResponse, SetModeRequest, SetModeResponse};
use crate::interface::http::problem::{SIM_NOT_FOUND, bad_request, problem, storage_unavailable};
use crate::interface::http::routes::parse_json_body;
use crate::interface::http::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::Value;
use tracing::warn;

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/dev/mode/:env", get(get_mode).post(set_mode))
}

async fn get_mode(State(state): State<AppState>, Path(env): Path<String>) -> Response {
    let instance = format!("/dev/mode/{env}");

    match GetModeUseCase::execute(&state.ctx, &env).await {
        Ok(settings) => (StatusCode::OK, Json(ModeResponse::from(settings))).into_response(),
        Err(err) => map_mode_error(err, instance),
    }
}

async fn set_mode(
    State(state): State<AppState>,
    Path(env): Path<String>,
    body: Bytes,
) -> Response {
    let instance = format!("/dev/mode/{env}");

    // Step 1: Decode the body and coerce field types.
    let payload: SetModeRequest = match parse_json_body(&body, &instance) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let Some(mode) = payload.mode.as_ref().and_then(Value::as_str) else {
        return bad_request("invalid_mode", Some(instance));
    };
    let timeout_ms = match payload.timeout_ms.as_ref() {
        None | Some(Value::Null) => None,
        Some(value) => match integral(value) {
            Some(ms) => Some(ms),
            None => return bad_request("invalid_timeout", Some(instance)),
        },
    };

    // Step 2: Execute the use case.
    let result = SetModeUseCase::execute(
        &state.ctx,
        SetModeCommand {
            env,
            mode: mode.to_string(),
            timeout_ms,
        },
    )
    .await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(settings) => (
            StatusCode::OK,
            Json(SetModeResponse {
                ok: true,
                settings: settings.into(),
            }),
        )
            .into_response(),
        Err(err) => map_mode_error(err, instance),
    }
}

/// Accepts integers and integral floats (`1500.0`); anything else is rejected.
fn integral(value: &Value) -> Option<i64> {
    if let Some(ms) = value.as_i64() {
        return Some(ms);
    }
    let float = value.as_f64()?;
    (float.fract() == 0.0 && float.abs() < i64::MAX as f64).then_some(float as i64)
}

fn map_mode_error(err: ModeError, instance: String) -> Response {
    match err {
        ModeError::InvalidEnv => bad_request("invalid_env", Some(instance)),
        ModeError::InvalidMode => bad_request("invalid_mode", Some(instance)),
        ModeError::InvalidTimeout => bad_request("invalid_timeout", Some(instance)),
        ModeError::NotFound => problem(
            StatusCode::NOT_FOUND,
            SIM_NOT_FOUND,
            "not_found",
            Some("no active endpoint for this environment".to_string()),
            Some(instance),
        ),
        ModeError::Storage(err) => {
            warn!(error = %err, "mode storage failed");
            storage_unavailable(Some(instance))
        }
    }
}
