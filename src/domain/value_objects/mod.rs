pub mod delivery_mode;
pub mod environment;
pub mod ids;
pub mod timestamps;
