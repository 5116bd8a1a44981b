pub mod order_projection;
pub mod payload_fields;
pub mod signature;
