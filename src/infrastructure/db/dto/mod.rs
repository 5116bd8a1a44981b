pub mod cached_order;
pub mod delivery_attempt;
pub mod endpoint;
pub mod webhook_event;

pub use cached_order::CachedOrderRow;
pub use delivery_attempt::DeliveryAttemptRow;
pub use endpoint::{EndpointRow, EndpointUpdateRow, NewEndpointRow};
pub use webhook_event::{EventSummaryRow, WebhookEventRow};

use crate::domain::value_objects::environment::Environment;

/// Rows are constrained by CHECKs, so an unknown value only appears on manual edits.
fn env_from_str(value: &str) -> Environment {
    Environment::parse(value).unwrap_or(Environment::Local)
}
