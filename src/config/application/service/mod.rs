pub mod config_provider;
pub mod config_service;
pub mod config_store;
