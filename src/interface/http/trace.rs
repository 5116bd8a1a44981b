use axum::extract::MatchedPath;
use axum::http::{HeaderName, HeaderValue, Method, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics::{Label, counter, histogram};
use std::time::Instant;
use tracing::{info, warn};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request correlation id, taken from `x-request-id` or generated.
#[derive(Debug, Clone)]
pub struct TraceId(pub String);

/// Attaches a [`TraceId`] to the request and echoes it on the response.
pub async fn trace_id_middleware(mut req: Request<axum::body::Body>, next: Next) -> Response {
    // Step 1: Reuse a caller-provided id or mint one.
    let trace_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let trace_id = TraceId(trace_id);
    req.extensions_mut().insert(trace_id.clone());

    // Step 2: Run the request and echo the id.
    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&trace_id.0) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response.extensions_mut().insert(trace_id);
    response
}

/// Logs every request and records `http_requests_total` / `http_request_duration_ms`.
///
/// Metrics are labelled with the matched route template so path parameters such as event
/// ids do not explode label cardinality.
pub async fn request_log_middleware(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let trace_id = req.extensions().get::<TraceId>().map(|t| t.0.clone());
    let start = Instant::now();

    let response = next.run(req).await;

    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();
    let labels = vec![
        Label::new("method", method_label(&method)),
        Label::new("route", route),
        Label::new("status", status_class(status)),
    ];
    counter!("http_requests_total", labels.clone()).increment(1);
    histogram!("http_request_duration_ms", labels).record(latency_ms as f64);

    if status >= 500 {
        warn!(
            trace_id = trace_id.as_deref().unwrap_or(""),
            method = %method,
            path = %path,
            status,
            latency_ms,
            "http_request"
        );
    } else {
        info!(
            trace_id = trace_id.as_deref().unwrap_or(""),
            method = %method,
            path = %path,
            status,
            latency_ms,
            "http_request"
        );
    }

    response
}

fn method_label(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PATCH => "PATCH",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        _ => "OTHER",
    }
}

fn status_class(status: u16) -> &'static str {
    match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_statuses_when_classified_should_bucket_by_hundreds() {
        assert_eq!(status_class(200), "2xx");
        assert_eq!(status_class(503), "5xx");
        assert_eq!(status_class(409), "4xx");
        assert_eq!(status_class(42), "other");
    }

    #[test]
    fn given_uncommon_method_when_labelled_should_collapse_to_other() {
        assert_eq!(method_label(&Method::PATCH), "PATCH");
        assert_eq!(method_label(&Method::OPTIONS), "OTHER");
    }
}
