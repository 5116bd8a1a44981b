pub mod dto;
pub mod internal_auth;
pub mod problem;
pub mod routes;
pub mod state;
pub mod trace;

use axum::Router;
use axum::middleware;
use state::AppState;

/// Assemble every route with request tracing and access logging.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::ready::router())
        .merge(routes::metrics::router())
        .merge(routes::webhooks::router())
        .merge(routes::events::router())
        .merge(routes::endpoints::router(state.clone()))
        .merge(routes::mode::router())
        .merge(routes::orders::router())
        .merge(routes::dev_orders::router())
        .layer(middleware::from_fn(trace::request_log_middleware))
        .layer(middleware::from_fn(trace::trace_id_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::context::test_support::{
        RecordingForwarder, StubProvider, test_context, test_context_with,
    };
    use crate::domain::services::signature::sign;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn given_request_without_id_when_served_should_echo_generated_request_id() {
        let app = app(AppState::new(test_context(), None));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(trace::REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn given_unknown_env_when_webhook_posted_should_acknowledge_without_storing() {
        let ctx = test_context();
        let state = AppState::new(ctx, None);
        let app = app(state.clone());

        let response = app
            .oneshot(json_request("POST", "/webhooks/production", json!({"id": "evt_x"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"ok": true}));
        let recent = state.ctx.repos.event.list_recent(10).await.unwrap();
        assert!(recent.is_empty());
    }

    #[tokio::test]
    async fn given_signed_webhook_when_posted_should_forward_and_expose_event() {
        let forwarder = Arc::new(RecordingForwarder::answering(200, "ok"));
        let ctx = test_context_with(forwarder.clone(), Arc::new(StubProvider::ok()));
        let state = AppState::new(ctx, None);

        let created = app(state.clone())
            .oneshot(json_request(
                "POST",
                "/webhook-endpoints",
                json!({"env": "sandbox", "url": "http://merchant.test/hook", "secret": "s3cret", "is_active": true}),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);

        let body = json!({"id": "evt_1", "type": "order.created", "data": {"order_id": "ord_9"}}).to_string();
        let signature = sign("s3cret", body.as_bytes());
        let response = app(state.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhooks/sandbox")
                    .header("x-signature", signature)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(forwarder.calls(), 1);

        let detail = app(state)
            .oneshot(Request::builder().uri("/events/evt_1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(detail.status(), StatusCode::OK);
        let json = body_json(detail).await;
        assert_eq!(json["event"]["signatureOk"], true);
        assert_eq!(json["deliveries"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn given_missing_token_when_active_endpoint_requested_should_return_401() {
        let app = app(AppState::new(test_context(), None));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/webhook-endpoints/active?env=sandbox")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "unauthorized");
    }

    #[tokio::test]
    async fn given_metrics_disabled_when_scraped_should_return_503() {
        let app = app(AppState::new(test_context(), None));

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
