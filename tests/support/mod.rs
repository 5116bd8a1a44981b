#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes, to_bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::post;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::util::ServiceExt;
use webhook_sim::application::context::AppContext;
use webhook_sim::config::{Db, Delivery, Observability, Security, Server, Settings, Upstream};
use webhook_sim::infrastructure::db::repositories::Repositories;
use webhook_sim::infrastructure::http::forwarder::ReqwestForwarder;
use webhook_sim::infrastructure::upstream::provider_client::{
    EscrowProvider, OrderAction, ProviderError,
};
use webhook_sim::interface::http;
use webhook_sim::interface::http::state::AppState;

pub const INTERNAL_TOKEN: &str = "internal-test-token";

pub fn settings() -> Settings {
    Settings {
        server: Server {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        db: Db {
            url: String::new(),
            max_connections: 2,
        },
        delivery: Delivery {
            request_timeout_ms: 2000,
            default_timeout_ms: 15000,
            max_simulated_timeout_ms: 60000,
            default_endpoint_url: "http://127.0.0.1:9/hook".to_string(),
            default_endpoint_secret: "dev-secret".to_string(),
        },
        security: Security {
            internal_token: Some(INTERNAL_TOKEN.to_string()),
        },
        upstream: Upstream {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "key".to_string(),
            request_timeout_ms: 500,
            default_env: "sandbox".to_string(),
        },
        observability: Observability {
            log_filter: "warn".to_string(),
            enable_metrics: false,
        },
    }
}

/// Provider double answering every call with canned payloads, or one fixed rejection.
pub struct FakeProvider {
    pub reject: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn ok() -> Self {
        Self {
            reject: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            reject: Some(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn check(&self, call: String) -> Result<(), ProviderError> {
        self.calls.lock().unwrap().push(call);
        match &self.reject {
            Some(message) => Err(ProviderError::Rejected {
                status: 422,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EscrowProvider for FakeProvider {
    async fn create_order(
        &self,
        amount_cents: i64,
        currency: &str,
        _idempotency_key: &str,
    ) -> Result<Value, ProviderError> {
        self.check(format!("create_order:{amount_cents}"))?;
        Ok(json!({"id": "ord_http", "amount_cents": amount_cents, "currency": currency, "status": "CREATED"}))
    }

    async fn create_pix_charge(
        &self,
        order_id: &str,
        _idempotency_key: &str,
    ) -> Result<Value, ProviderError> {
        self.check(format!("pix:{order_id}"))?;
        Ok(json!({"id": "chg_http", "order_id": order_id, "txid": "tx_http", "pix_code": "000201"}))
    }

    async fn order_action(
        &self,
        order_id: &str,
        action: OrderAction,
        _idempotency_key: &str,
    ) -> Result<Value, ProviderError> {
        self.check(format!("{}:{order_id}", action.as_str()))?;
        Ok(json!({"id": order_id, "status": action.as_str().to_uppercase()}))
    }
}

pub fn state_with(repos: Repositories, provider: Arc<dyn EscrowProvider>) -> AppState {
    let settings = settings();
    let forwarder = ReqwestForwarder::new(Duration::from_millis(settings.delivery.request_timeout_ms))
        .unwrap();
    AppState::new(
        AppContext::new(repos, settings, Arc::new(forwarder), provider),
        None,
    )
}

pub fn memory_state() -> AppState {
    state_with(Repositories::in_memory(), Arc::new(FakeProvider::ok()))
}

/// A downstream merchant endpoint that records every request and answers with `status`.
pub struct Receiver {
    pub url: String,
    pub hits: Arc<Mutex<Vec<(HeaderMap, Bytes)>>>,
}

pub async fn spawn_receiver(status: u16) -> Receiver {
    let hits: Arc<Mutex<Vec<(HeaderMap, Bytes)>>> = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route(
            "/hook",
            post(
                move |State(hits): State<Arc<Mutex<Vec<(HeaderMap, Bytes)>>>>,
                      headers: HeaderMap,
                      body: Bytes| async move {
                    hits.lock().unwrap().push((headers, body));
                    StatusCode::from_u16(status).unwrap()
                },
            ),
        )
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Receiver {
        url: format!("http://{addr}/hook"),
        hits,
    }
}

pub async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = http::app(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Registers and activates an endpoint for `env`, returning its id.
pub async fn register_endpoint(state: &AppState, env: &str, url: &str, secret: &str) -> i64 {
    let (status, body) = send(
        state,
        json_request(
            "POST",
            "/webhook-endpoints",
            &json!({"env": env, "url": url, "secret": secret, "is_active": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

pub async fn set_mode(state: &AppState, env: &str, body: Value) -> (StatusCode, Value) {
    send(state, json_request("POST", &format!("/dev/mode/{env}"), &body)).await
}
