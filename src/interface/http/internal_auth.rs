use crate::interface::http::problem::{SIM_AUTH_INVALID_TOKEN, problem};
use crate::interface::http::state::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;
use tracing::warn;

pub const INTERNAL_TOKEN_HEADER: &str = "x-internal-token";

/// Guards routes that expose endpoint secrets to out-of-band tooling.
///
/// Requests pass only when a token is configured and `x-internal-token` matches it exactly.
pub async fn internal_token_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let path = req.uri().path().to_string();

    // Step 1: No configured token means the route is closed.
    let expected = state
        .ctx
        .settings
        .security
        .internal_token
        .as_deref()
        .filter(|t| !t.is_empty());

    // Step 2: Compare the presented token.
    let presented = req
        .headers()
        .get(INTERNAL_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    let authorized = match (expected, presented) {
        (Some(expected), Some(presented)) => {
            bool::from(expected.as_bytes().ct_eq(presented.as_bytes()))
        }
        _ => false,
    };

    if !authorized {
        warn!(path = %path, has_header = presented.is_some(), "internal token rejected");
        return Err(problem(
            StatusCode::UNAUTHORIZED,
            SIM_AUTH_INVALID_TOKEN,
            "unauthorized",
            Some("missing or invalid internal token".to_string()),
            Some(path),
        ));
    }

    Ok(next.run(req).await)
}
