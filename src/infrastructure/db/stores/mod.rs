pub mod cached_order_store;
pub mod delivery_attempt_store;
pub mod endpoint_store;
pub mod webhook_event_store;
