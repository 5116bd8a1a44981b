pub mod endpoint;
pub mod event;
pub mod mode;
pub mod order;
pub mod webhook;

use serde_json::Value;

/// A trimmed, non-empty string field; any other JSON type counts as absent.
pub(crate) fn text_field(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
