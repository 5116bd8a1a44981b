// HTTP routes: developer passthrough to the escrow provider.

use crate::application::usecases::order_actions::{
    CreateOrderCommand, OrderActionError, OrderActionsUseCase,
};
use crate::infrastructure::upstream::provider_client::OrderAction;
use crate::interface::http::dto::order::{
    CreateOrderRequest, CreateOrderResponse, OrderActionResponse,
};
use crate::interface::http::problem::{SIM_UPSTREAM_FAILED, bad_request, problem};
use crate::interface::http::routes::parse_json_body;
use crate::interface::http::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::Value;

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/dev/orders/create", post(create_order))
        .route("/dev/orders/:order_id/release", post(release_order))
        .route("/dev/orders/:order_id/refund", post(refund_order))
}

async fn create_order(State(state): State<AppState>, body: Bytes) -> Response {
    const INSTANCE: &str = "/dev/orders/create";

    // Step 1: Decode the body.
    let payload: CreateOrderRequest = match parse_json_body(&body, INSTANCE) {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    // Step 2: Create the order and its Pix charge upstream.
    let result = OrderActionsUseCase::create(
        &state.ctx,
        CreateOrderCommand {
            amount: payload.amount.unwrap_or(Value::Null),
            env: payload.env,
        },
    )
    .await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(created) => (
            StatusCode::CREATED,
            Json(CreateOrderResponse {
                order: created.order,
                charge: created.charge,
            }),
        )
            .into_response(),
        Err(err) => map_action_error(err, INSTANCE.to_string()),
    }
}

async fn release_order(state: State<AppState>, order_id: Path<String>) -> Response {
    order_action(state, order_id, OrderAction::Release).await
}

async fn refund_order(state: State<AppState>, order_id: Path<String>) -> Response {
    order_action(state, order_id, OrderAction::Refund).await
}

async fn order_action(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    action: OrderAction,
) -> Response {
    let instance = format!("/dev/orders/{order_id}/{}", action.as_str());

    match OrderActionsUseCase::act(&state.ctx, &order_id, action).await {
        Ok(payload) => (
            StatusCode::OK,
            Json(OrderActionResponse { ok: true, payload }),
        )
            .into_response(),
        Err(err) => map_action_error(err, instance),
    }
}

fn map_action_error(err: OrderActionError, instance: String) -> Response {
    match err {
        OrderActionError::InvalidAmount => bad_request("invalid_amount", Some(instance)),
        OrderActionError::InvalidEnv => bad_request("invalid_env", Some(instance)),
        OrderActionError::OrderIdRequired => bad_request("order_id_required", Some(instance)),
        OrderActionError::Upstream(message) => problem(
            StatusCode::BAD_GATEWAY,
            SIM_UPSTREAM_FAILED,
            "upstream_failed",
            Some(message),
            Some(instance),
        ),
    }
}
