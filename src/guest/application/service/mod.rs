pub mod power_service;
