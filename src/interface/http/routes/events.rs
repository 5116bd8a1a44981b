// HTTP routes: event inspection.

use crate::application::usecases::get_event::{GetEventError, GetEventUseCase};
use crate::application::usecases::list_events::{ListEventsError, ListEventsQuery, ListEventsUseCase};
use crate::interface::http::dto::event::{
    EventDetailResponse, EventSummaryResponse, ListEventsParams,
};
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
        .route("/events", get(list_events))
        .route("/events/:event_id", get(get_event))
}

/// Events of one order (`order_id=`) or the most recent events, newest first.
async fn list_events(
    State(state): State<AppState>,
    params: Result<Query<ListEventsParams>, QueryRejection>,
) -> Response {
    let Ok(Query(params)) = params else {
        return bad_request("invalid_query", Some("/events".to_string()));
    };

    let result = ListEventsUseCase::execute(
        &state.ctx,
        ListEventsQuery {
            order_id: params.order_id,
            limit: params.limit,
        },
    )
    .await;

    match result {
        Ok(events) => {
            let body: Vec<EventSummaryResponse> = events.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(ListEventsError::Storage(err)) => {
            warn!(error = %err, "event listing failed");
            storage_unavailable(Some("/events".to_string()))
        }
    }
}

/// One event with its delivery history.
async fn get_event(State(state): State<AppState>, Path(event_id): Path<String>) -> Response {
    let instance = format!("/events/{event_id}");

    match GetEventUseCase::execute(&state.ctx, &event_id).await {
        Ok(result) => (StatusCode::OK, Json(EventDetailResponse::from(result))).into_response(),
        Err(GetEventError::NotFound) => problem(
            StatusCode::NOT_FOUND,
            SIM_NOT_FOUND,
            "not_found",
            Some("event not found".to_string()),
            Some(instance),
        ),
        Err(GetEventError::Storage(err)) => {
            warn!(event_id = %event_id, error = %err, "event lookup failed");
            storage_unavailable(Some(instance))
        }
    }
}
