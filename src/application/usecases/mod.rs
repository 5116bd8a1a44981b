pub mod configure_mode;
pub mod create_endpoint;
pub mod deliver_event;
pub mod get_active_endpoint;
pub mod get_event;
pub mod ingest_webhook;
pub mod list_endpoints;
pub mod list_events;
pub mod order_actions;
pub mod project_order;
pub mod query_orders;
pub mod retry_delivery;
pub mod update_endpoint;
