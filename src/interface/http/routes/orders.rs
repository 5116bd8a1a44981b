// HTTP routes: cached order projection.

use crate::application::usecases::query_orders::{
    GetOrderUseCase, ListOrdersUseCase, QueryOrdersError,
};
use crate::interface::http::dto::order::{CachedOrderResponse, OrdersParams};
use crate::interface::http::problem::{SIM_NOT_FOUND, bad_request, problem, storage_unavailable};
use crate::interface::http::state::AppState;
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tracing::warn;

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/:order_id", get(get_order))
}

async fn list_orders(
    State(state): State<AppState>,
    params: Result<Query<OrdersParams>, QueryRejection>,
) -> Response {
    let Ok(Query(params)) = params else {
        return bad_request("invalid_query", Some("/orders".to_string()));
    };

    match ListOrdersUseCase::execute(&state.ctx, params.env.as_deref(), params.limit).await {
        Ok(orders) => {
            let body: Vec<CachedOrderResponse> = orders.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => map_query_error(err, "/orders".to_string()),
    }
}

async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    params: Result<Query<OrdersParams>, QueryRejection>,
) -> Response {
    let instance = format!("/orders/{order_id}");
    let Ok(Query(params)) = params else {
        return bad_request("invalid_query", Some(instance));
    };

    match GetOrderUseCase::execute(&state.ctx, params.env.as_deref(), &order_id).await {
        Ok(order) => (StatusCode::OK, Json(CachedOrderResponse::from(order))).into_response(),
        Err(err) => map_query_error(err, instance),
    }
}

fn map_query_error(err: QueryOrdersError, instance: String) -> Response {
    match err {
        QueryOrdersError::InvalidEnv => bad_request("invalid_env", Some(instance)),
        QueryOrdersError::NotFound => problem(
            StatusCode::NOT_FOUND,
            SIM_NOT_FOUND,
            "not_found",
            Some("order not cached".to_string()),
            Some(instance),
        ),
        QueryOrdersError::Storage(err) => {
            warn!(error = %err, "order query failed");
            storage_unavailable(Some(instance))
        }
    }
}
