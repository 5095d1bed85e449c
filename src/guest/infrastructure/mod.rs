pub mod power_repository;
