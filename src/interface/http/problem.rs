use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// RFC 7807 Problem Details payload.
#[derive(Debug, Serialize)]
pub struct ProblemDetails {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub r#type: String,
    /// A short, human-readable summary of the problem type.
    pub title: String,
    /// The HTTP status code for this occurrence.
    pub status: u16,
    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// A URI reference that identifies this specific occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// A stable, machine-readable application error code (SIM_...).
    pub code: String,
    /// Short snake_case reason token, e.g. `not_found` or `invalid_env`.
    pub error: String,
}

/// Build a Problem Details response with the correct content-type.
pub fn problem(
    status: StatusCode,
    code: &str,
    error: &str,
    detail: Option<String>,
    instance: Option<String>,
) -> Response {
    // Step 1: Build the problem payload.
    let payload = ProblemDetails {
        r#type: "about:blank".to_string(),
        title: status.canonical_reason().unwrap_or("Error").to_string(),
        status: status.as_u16(),
        detail,
        instance,
        code: code.to_string(),
        error: error.to_string(),
    };

    // Step 2: Convert to an HTTP response with JSON body.
    let mut response = (status, Json(payload)).into_response();

    // Step 3: Ensure RFC 7807 content type.
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/problem+json"),
    );

    response
}

/// 400 with `SIM_REQUEST_MALFORMED` and the given reason token.
pub fn bad_request(error: &str, instance: Option<String>) -> Response {
    problem(
        StatusCode::BAD_REQUEST,
        SIM_REQUEST_MALFORMED,
        error,
        None,
        instance,
    )
}

/// 503 for storage failures; the underlying cause is logged by the caller, not echoed.
pub fn storage_unavailable(instance: Option<String>) -> Response {
    problem(
        StatusCode::SERVICE_UNAVAILABLE,
        SIM_STORAGE_UNAVAILABLE,
        "storage_unavailable",
        Some("storage unavailable".to_string()),
        instance,
    )
}

pub const SIM_REQUEST_MALFORMED: &str = "SIM_REQUEST_MALFORMED";
pub const SIM_AUTH_INVALID_TOKEN: &str = "SIM_AUTH_INVALID_TOKEN";
pub const SIM_NOT_FOUND: &str = "SIM_NOT_FOUND";
pub const SIM_CONFLICT: &str = "SIM_CONFLICT";
pub const SIM_UPSTREAM_FAILED: &str = "SIM_UPSTREAM_FAILED";
pub const SIM_STORAGE_UNAVAILABLE: &str = "SIM_STORAGE_UNAVAILABLE";

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    #[tokio::test]
    async fn given_problem_when_rendered_should_carry_code_and_error_token() {
        let response = problem(
            StatusCode::NOT_FOUND,
            SIM_NOT_FOUND,
            "not_found",
            Some("event not found".to_string()),
            Some("/events/evt_x".to_string()),
        );

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/problem+json"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "not_found");
        assert_eq!(json["code"], SIM_NOT_FOUND);
        assert_eq!(json["status"], 404);
        assert_eq!(json["instance"], "/events/evt_x");
    }

    #[tokio::test]
    async fn given_storage_failure_when_rendered_should_be_service_unavailable() {
        let response = storage_unavailable(None);

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "storage_unavailable");
        assert!(json.get("instance").is_none());
    }
}
