pub mod provider_client;
