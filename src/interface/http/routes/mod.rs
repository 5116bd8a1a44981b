pub mod dev_orders;
pub mod endpoints;
pub mod events;
pub mod health;
pub mod metrics;
pub mod mode;
pub mod orders;
pub mod ready;
pub mod webhooks;

use crate::interface::http::problem::bad_request;
use axum::body::Bytes;
use axum::response::Response;
use serde::de::DeserializeOwned;

/// Decode a JSON request body regardless of content-type; failures become 400 `invalid_json`.
pub(crate) fn parse_json_body<T: DeserializeOwned>(
    body: &Bytes,
    instance: &str,
) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|_| bad_request("invalid_json", Some(instance.to_string())))
}
