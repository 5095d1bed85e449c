pub mod config_overrides;
