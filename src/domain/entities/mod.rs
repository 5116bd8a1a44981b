pub mod cached_order;
pub mod delivery_attempt;
pub mod endpoint;
pub mod webhook_event;
