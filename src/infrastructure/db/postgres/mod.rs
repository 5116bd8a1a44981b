pub mod cached_order_store_postgres;
mod database;
pub mod delivery_attempt_store_postgres;
pub mod endpoint_store_postgres;
pub mod webhook_event_store_postgres;

pub use database::PostgresDatabase;
