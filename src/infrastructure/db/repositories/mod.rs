pub mod cached_order_repository;
pub mod delivery_attempt_repository;
pub mod endpoint_repository;
pub mod factory;
pub mod webhook_event_repository;

pub use factory::Repositories;
